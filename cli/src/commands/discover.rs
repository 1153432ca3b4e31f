use std::path::Path;
use std::time::Instant;

use netsweep_common::config::ScanConfig;
use netsweep_common::success;
use netsweep_core::{DiscoveryService, ScanReport};
use tracing::info;

use crate::export;
use crate::terminal::print;

pub async fn discover(cfg: &ScanConfig, save: Option<&Path>, quiet: u8) -> anyhow::Result<()> {
    info!(
        "Scanning {} ({} hosts, timeout {:.1}s)",
        cfg.range,
        cfg.range.host_count(),
        cfg.probe_timeout.as_secs_f64()
    );

    let start_time = Instant::now();
    let report: ScanReport = DiscoveryService::system().scan(cfg).await?;
    let total_time = start_time.elapsed();

    if report.devices.is_empty() {
        print::header("zero devices detected", quiet);
        print::no_results();
    } else {
        print::header("devices found", quiet);
        print::device_table(&report.devices);
        print::summary(report.devices.len(), total_time, report.resolution.as_ref());
    }

    if let Some(path) = save {
        export::save_csv(path, &report.devices)?;
        success!("Results saved to {}", path.display());
    }

    Ok(())
}
