use std::collections::HashMap;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;

/// Display name given to every device whose reverse lookup failed or was skipped.
pub const UNKNOWN_NAME: &str = "Name unknown";

/// An `(address, link address)` pair observed during a probe round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reply {
    pub address: Ipv4Addr,
    pub mac: MacAddr,
}

impl Reply {
    pub fn new(address: Ipv4Addr, mac: MacAddr) -> Self {
        Self { address, mac }
    }
}

/// A host that answered the probe, with its best-effort name attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub address: Ipv4Addr,
    pub mac: MacAddr,
    pub name: String,
}

impl Device {
    pub fn new(reply: Reply, name: impl Into<String>) -> Self {
        Self {
            address: reply.address,
            mac: reply.mac,
            name: name.into(),
        }
    }

    pub fn unnamed(reply: Reply) -> Self {
        Self::new(reply, UNKNOWN_NAME)
    }

    pub fn has_name(&self) -> bool {
        self.name != UNKNOWN_NAME
    }
}

/// Collapses replies so each address appears once.
///
/// An address keeps the position of its first sighting and the MAC of its
/// last one.
pub fn merge_replies(replies: impl IntoIterator<Item = Reply>) -> Vec<Reply> {
    let mut merged: Vec<Reply> = Vec::new();
    let mut positions: HashMap<Ipv4Addr, usize> = HashMap::new();

    for reply in replies {
        match positions.get(&reply.address) {
            Some(&idx) => merged[idx].mac = reply.mac,
            None => {
                positions.insert(reply.address, merged.len());
                merged.push(reply);
            }
        }
    }

    merged
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
