//! # Network Range
//!
//! The CIDR block a probe round covers, e.g. `192.168.1.0/24`.
//!
//! The base address is normalised to the network address on construction, so
//! `192.168.1.77/24` and `192.168.1.0/24` describe the same range.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::ScanError;

/// Smallest prefix that still has distinct network and broadcast addresses
/// around its hosts. `/31` and `/32` blocks are probed in full.
const LAST_PREFIX_WITH_BROADCAST: u8 = 30;

/// Widest block a single probe round accepts (65 534 hosts).
pub const MIN_PREFIX: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    network: Ipv4Network,
}

impl NetworkRange {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        if prefix < MIN_PREFIX {
            return Err(ScanError::invalid_range(
                format!("{addr}/{prefix}"),
                format!("ranges wider than /{MIN_PREFIX} are not supported"),
            ));
        }
        let raw = Ipv4Network::new(addr, prefix)
            .map_err(|e| ScanError::invalid_range(format!("{addr}/{prefix}"), e))?;
        let network = Ipv4Network::new(raw.network(), prefix)
            .map_err(|e| ScanError::invalid_range(format!("{addr}/{prefix}"), e))?;
        Ok(Self { network })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.network.broadcast()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.network.contains(addr)
    }

    /// Returns the addresses a probe round should query.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let (start, end) = self.host_bounds();
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses yielded by [`hosts`](Self::hosts).
    pub fn host_count(&self) -> u64 {
        let (start, end) = self.host_bounds();
        u64::from(end - start) + 1
    }

    /// True for addresses [`hosts`](Self::hosts) yields, which excludes the
    /// network and broadcast addresses of blocks that have them.
    pub fn is_host(&self, addr: Ipv4Addr) -> bool {
        let (start, end) = self.host_bounds();
        (start..=end).contains(&u32::from(addr))
    }

    fn host_bounds(&self) -> (u32, u32) {
        let start: u32 = self.network().into();
        let end: u32 = self.broadcast().into();

        if self.prefix() <= LAST_PREFIX_WITH_BROADCAST {
            (start + 1, end - 1)
        } else {
            (start, end)
        }
    }
}

impl FromStr for NetworkRange {
    type Err = ScanError;

    /// Parses `a.b.c.d/p`. A bare address is read as a `/32` block.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr_str, prefix_str) = s.split_once('/').unwrap_or((s, "32"));

        let addr = addr_str
            .parse::<Ipv4Addr>()
            .map_err(|e| ScanError::invalid_range(s, format!("bad address '{addr_str}': {e}")))?;

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|e| ScanError::invalid_range(s, format!("bad prefix '{prefix_str}': {e}")))?;

        if prefix > 32 {
            return Err(ScanError::invalid_range(s, "prefix must be between 0 and 32"));
        }

        Self::new(addr, prefix)
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
