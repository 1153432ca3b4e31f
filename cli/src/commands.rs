pub mod discover;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use netsweep_common::config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_RANGE, ScanConfig};
use netsweep_common::network::range::NetworkRange;

#[derive(Parser, Debug)]
#[command(name = "netsweep", version)]
#[command(about = "Discover devices on a local IPv4 network with ARP and name them via reverse DNS.")]
pub struct CommandLine {
    /// Network to scan, in CIDR notation
    #[arg(short = 'r', long = "range", default_value = DEFAULT_RANGE)]
    pub range: NetworkRange,

    /// Seconds to wait for ARP replies
    #[arg(short = 't', long = "timeout", default_value = "3.0", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Interface to send and receive on (picked automatically when omitted)
    #[arg(short = 'i', long = "iface")]
    pub iface: Option<String>,

    /// Write the results to this CSV file
    #[arg(short = 's', long = "save")]
    pub save: Option<PathBuf>,

    /// Skip reverse DNS lookups (faster)
    #[arg(long = "no-name")]
    pub no_name: bool,

    /// Seconds allowed for each reverse DNS lookup
    #[arg(long = "name-timeout", default_value = "1.0", value_parser = parse_seconds)]
    pub name_timeout: Duration,

    /// Maximum number of reverse DNS lookups in flight
    #[arg(long = "max-workers", default_value_t = DEFAULT_MAX_CONCURRENCY, value_parser = parse_workers)]
    pub max_workers: usize,

    /// Print less (repeat to keep only warnings and results)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> ScanConfig {
        ScanConfig {
            range: self.range,
            probe_timeout: self.timeout,
            interface: self.iface.clone(),
            resolve_names: !self.no_name,
            name_timeout: self.name_timeout,
            max_concurrency: self.max_workers,
        }
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{s}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be greater than zero, got {s}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

fn parse_workers(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("at least one worker is required".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("'{s}': {e}")),
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
