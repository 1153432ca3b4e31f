use std::time::Duration;

use crate::network::range::NetworkRange;

pub const DEFAULT_RANGE: &str = "192.168.1.0/24";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_NAME_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

/// Everything a single scan needs to know.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub range: NetworkRange,
    /// How long the probe round listens for replies.
    pub probe_timeout: Duration,
    /// Interface to probe on. `None` lets the prober pick one.
    pub interface: Option<String>,
    /// Skips reverse lookups entirely when false.
    pub resolve_names: bool,
    /// Upper bound for each individual reverse lookup.
    pub name_timeout: Duration,
    /// Upper bound for simultaneous reverse lookups.
    pub max_concurrency: usize,
}

impl ScanConfig {
    pub fn new(range: NetworkRange) -> Self {
        Self {
            range,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            interface: None,
            resolve_names: true,
            name_timeout: DEFAULT_NAME_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}
