//! CSV persistence of scan results.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use netsweep_common::network::device::Device;

pub const CSV_HEADER: [&str; 3] = ["ip", "mac", "nombre"];

/// Writes `devices` as CSV with a header row to `writer`.
pub fn write_devices<W: Write>(writer: W, devices: &[Device]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for device in devices {
        csv_writer.write_record([
            device.address.to_string(),
            device.mac.to_string(),
            device.name.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Saves `devices` to `path`, creating missing parent directories.
pub fn save_csv(path: &Path, devices: &[Device]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_devices(file, devices).with_context(|| format!("writing {}", path.display()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
