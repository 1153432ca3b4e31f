//! A **local area network (LAN)** prober.
//!
//! Broadcasts one ARP request per host address of the range and records every
//! reply heard on the chosen interface within the listening window.
//!
//! This prober requires **root privileges** to construct and intercept raw
//! Layer 2 packets via the operating system's network sockets.

use std::time::Duration;

use async_trait::async_trait;
use pnet::datalink;
use tracing::info;

use netsweep_common::ScanError;
use netsweep_common::network::device::Reply;
use netsweep_common::network::interface::{self, NetworkInterfaceExtension, ViabilityError};
use netsweep_common::network::range::NetworkRange;

use super::Prober;
use super::channel;

#[derive(Debug, Default, Clone, Copy)]
pub struct ArpProber;

#[async_trait]
impl Prober for ArpProber {
    async fn send_and_collect(
        &self,
        range: &NetworkRange,
        timeout: Duration,
        interface: Option<&str>,
    ) -> Result<Vec<Reply>, ScanError> {
        let range = *range;
        let interface = interface.map(str::to_owned);

        tokio::task::spawn_blocking(move || probe_blocking(range, timeout, interface.as_deref()))
            .await
            .map_err(|e| ScanError::Probe(anyhow::anyhow!("probe round aborted: {e}")))?
    }
}

fn probe_blocking(range: NetworkRange, timeout: Duration, interface: Option<&str>) -> Result<Vec<Reply>, ScanError> {
    let intf = interface::select_interface(interface, &range)?;

    let src_mac = intf.mac.ok_or_else(|| ScanError::InterfaceUnusable {
        name: intf.name.clone(),
        reason: ViabilityError::NoMacAddress,
    })?;
    let src_addr = intf.source_ipv4_for(&range).ok_or_else(|| ScanError::InterfaceUnusable {
        name: intf.name.clone(),
        reason: ViabilityError::NoIpv4Address,
    })?;

    let source = channel::RequestSource {
        mac: src_mac,
        addr: src_addr,
    };
    let (mut tx, mut rx) =
        channel::open_eth_channel(&intf, &channel::channel_config(), datalink::channel, is_root::is_root)?;

    info!(
        "Probing {} hosts in {range} from {} ({src_addr}) for {:.1}s",
        range.host_count(),
        intf.name,
        timeout.as_secs_f64()
    );

    Ok(channel::probe_round(tx.as_mut(), rx.as_mut(), source, range, timeout))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
