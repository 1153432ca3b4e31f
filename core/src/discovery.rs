//! # Network Discovery Service
//!
//! Implements the "scan a subnet" use case.
//!
//! Finds devices with a single probe round and, unless told otherwise, attaches
//! a best-effort name to each of them.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use tracing::{Instrument, info, info_span};

use netsweep_common::ScanError;
use netsweep_common::config::ScanConfig;
use netsweep_common::network::device::{self, Device, Reply, UNKNOWN_NAME};

use crate::probe::{ArpProber, Prober};
use crate::resolver::{self, NameResolver};

/// Timing of the name resolution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStats {
    pub elapsed: Duration,
    /// Workers actually started, at most the configured concurrency.
    pub workers: usize,
    /// Devices that received a real name.
    pub resolved: usize,
}

/// Outcome of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// One entry per answering address, in discovery order.
    pub devices: Vec<Device>,
    /// `None` when name resolution was skipped.
    pub resolution: Option<ResolutionStats>,
}

/// Application Service for Network Discovery.
///
/// Orchestrates the discovery process by:
/// 1. delegating the probe round to the [`Prober`] trait.
/// 2. handing every answering address to the [`NameResolver`] in one batch.
pub struct DiscoveryService {
    prober: Box<dyn Prober>,
    resolver: NameResolver,
}

impl DiscoveryService {
    pub fn new(prober: Box<dyn Prober>, resolver: NameResolver) -> Self {
        Self { prober, resolver }
    }

    /// ARP over raw sockets plus the system resolver.
    pub fn system() -> Self {
        Self::new(Box::new(ArpProber), NameResolver::system())
    }

    /// Runs a full scan as described by `cfg`.
    ///
    /// Setup failures (privileges, interface) are returned untouched. Name
    /// lookups never fail the scan.
    pub async fn scan(&self, cfg: &ScanConfig) -> Result<ScanReport, ScanError> {
        let replies: Vec<Reply> = self
            .prober
            .send_and_collect(&cfg.range, cfg.probe_timeout, cfg.interface.as_deref())
            .instrument(info_span!("probe", range = %cfg.range))
            .await?;
        let replies = device::merge_replies(replies);

        if !cfg.resolve_names {
            let devices = replies.into_iter().map(Device::unnamed).collect();
            return Ok(ScanReport {
                devices,
                resolution: None,
            });
        }

        let addresses: HashSet<Ipv4Addr> = replies.iter().map(|reply| reply.address).collect();
        let workers = resolver::effective_concurrency(addresses.len(), cfg.max_concurrency);

        let start = Instant::now();
        let names = self
            .resolver
            .resolve_all(&addresses, cfg.name_timeout, cfg.max_concurrency)
            .instrument(info_span!("resolve", hosts = addresses.len()))
            .await;
        let elapsed = start.elapsed();

        let devices = join_names(replies, names);
        let resolved = devices.iter().filter(|d| d.has_name()).count();

        info!(
            "Resolved {resolved} of {} names in {:.2}s using up to {workers} workers",
            devices.len(),
            elapsed.as_secs_f64()
        );

        Ok(ScanReport {
            devices,
            resolution: Some(ResolutionStats {
                elapsed,
                workers,
                resolved,
            }),
        })
    }
}

fn join_names(replies: Vec<Reply>, mut names: HashMap<Ipv4Addr, String>) -> Vec<Device> {
    replies
        .into_iter()
        .map(|reply| {
            let name = names
                .remove(&reply.address)
                .unwrap_or_else(|| UNKNOWN_NAME.to_string());
            Device::new(reply, name)
        })
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
