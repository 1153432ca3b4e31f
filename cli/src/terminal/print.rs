use std::time::Duration;

use colored::*;
use netsweep_common::macros::PRINT_TARGET;
use netsweep_common::network::device::Device;
use netsweep_core::ResolutionStats;
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

const IP_COLUMN: usize = 16;
const MAC_COLUMN: usize = 20;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR);
    print(&format!("{}", sep));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}

/// Renders one row per device under an `IP / MAC / NAME` header.
pub fn device_table(devices: &[Device]) {
    let head = format!("{:<IP_COLUMN$}{:<MAC_COLUMN$}{}", "IP", "MAC", "NAME");
    print(&format!("{}", head.bold().color(colors::PRIMARY)));
    print(&format!("{}", "─".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));

    for device in devices {
        print(&device_row(device));
    }
}

fn device_row(device: &Device) -> String {
    let ip = format!("{:<IP_COLUMN$}", device.address.to_string()).color(colors::IPV4_ADDR);
    let mac = format!("{:<MAC_COLUMN$}", device.mac.to_string()).color(colors::MAC_ADDR);
    let name = if device.has_name() {
        device.name.color(colors::TEXT_DEFAULT)
    } else {
        device.name.italic().color(colors::UNKNOWN)
    };
    format!("{ip}{mac}{name}")
}

pub fn no_results() {
    print(&format!("{}", "No devices answered the probe.".red().bold()));
}

pub fn summary(devices: usize, total_time: Duration, resolution: Option<&ResolutionStats>) {
    let found: ColoredString = format!("{devices} devices").bold().green();
    let total: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    fat_separator();
    centerln(&format!("Discovery complete: {found} found in {total}"));

    if let Some(stats) = resolution {
        let resolved = format!("{}/{}", stats.resolved, devices).bold().cyan();
        let elapsed = format!("{:.2}s", stats.elapsed.as_secs_f64()).bold().yellow();
        centerln(&format!(
            "{resolved} names resolved in {elapsed} with up to {} workers",
            stats.workers
        ));
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

#[cfg(test)]
mod tests {
    use super::*;
    use netsweep_common::network::device::Reply;
    use std::net::Ipv4Addr;

    fn device(octet: u8, name: &str) -> Device {
        let reply = Reply::new(Ipv4Addr::new(192, 168, 1, octet), "aa:bb:cc:dd:ee:ff".parse().unwrap());
        Device::new(reply, name)
    }

    #[test]
    fn row_is_column_aligned() {
        colored::control::set_override(false);

        let row = device_row(&device(10, "printer.lan"));
        assert_eq!(&row[..IP_COLUMN], "192.168.1.10    ");
        assert_eq!(&row[IP_COLUMN..IP_COLUMN + MAC_COLUMN], "aa:bb:cc:dd:ee:ff   ");
        assert!(row.ends_with("printer.lan"));
    }
}
