//! Datalink channel plumbing for the ARP probe round.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::util::MacAddr;
use tracing::{debug, trace, warn};

use netsweep_common::ScanError;
use netsweep_common::network::device::{self, Reply};
use netsweep_common::network::range::NetworkRange;
use netsweep_protocols::{MIN_ETH_FRAME_NO_FCS, arp};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub type EthernetPair = (Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>);

/// Link and protocol address stamped on every request of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSource {
    pub mac: MacAddr,
    pub addr: Ipv4Addr,
}

pub fn channel_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
    }
}

/// Opens an Ethernet channel on `intf` through `channel_opener`.
///
/// A permission failure while `is_root` reports false maps to
/// [`ScanError::InsufficientPrivilege`].
pub fn open_eth_channel<F, R>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
    is_root: R,
) -> Result<EthernetPair, ScanError>
where
    F: FnOnce(&NetworkInterface, Config) -> std::io::Result<datalink::Channel>,
    R: FnOnce() -> bool,
{
    let ch: Channel = channel_opener(intf, *cfg).map_err(|source| classify_open_error(intf, source, is_root))?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => Err(ScanError::Channel {
            interface: intf.name.clone(),
            source: std::io::Error::other("non-ethernet channel"),
        }),
    }
}

fn classify_open_error(intf: &NetworkInterface, source: std::io::Error, is_root: impl FnOnce() -> bool) -> ScanError {
    if source.kind() == std::io::ErrorKind::PermissionDenied && !is_root() {
        return ScanError::InsufficientPrivilege;
    }
    ScanError::Channel {
        interface: intf.name.clone(),
        source,
    }
}

/// Accumulates replies for one probe round, dropping anything that is not a
/// host of the range.
pub struct ReplyCollector {
    range: NetworkRange,
    replies: Vec<Reply>,
    seen: HashSet<Ipv4Addr>,
}

impl ReplyCollector {
    pub fn new(range: NetworkRange) -> Self {
        Self {
            range,
            replies: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn handle_frame(&mut self, frame: &[u8]) {
        match arp::parse_reply(frame) {
            Ok(reply) if self.range.is_host(reply.address) => {
                trace!("{} is at {}", reply.address, reply.mac);
                self.seen.insert(reply.address);
                self.replies.push(reply);
            }
            Ok(reply) => trace!("ignoring reply from {}, not a host of {}", reply.address, self.range),
            Err(e) => trace!("ignoring frame: {e}"),
        }
    }

    fn answered_all(&self) -> bool {
        self.seen.len() as u64 >= self.range.host_count()
    }

    pub fn finish(self) -> Vec<Reply> {
        device::merge_replies(self.replies)
    }
}

/// Broadcasts one request per host of `range`, building each frame in a
/// single reused buffer. Returns how many could not be sent.
fn send_requests(tx: &mut dyn DataLinkSender, source: RequestSource, range: NetworkRange) -> u64 {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    let mut failed: u64 = 0;

    for target in range.hosts() {
        if let Err(e) = arp::write_request(&mut buffer, source.mac, source.addr, target) {
            debug!("could not build ARP request for {target}: {e:#}");
            failed += 1;
            continue;
        }
        if matches!(tx.send_to(&buffer, None), Some(Err(_))) {
            failed += 1;
        }
    }

    failed
}

/// Sends a request to every host of `range` while reading replies on `rx`.
///
/// Reading stops `timeout` after the last request went out, or as soon as
/// every host has answered.
pub fn probe_round(
    tx: &mut dyn DataLinkSender,
    rx: &mut dyn DataLinkReceiver,
    source: RequestSource,
    range: NetworkRange,
    timeout: Duration,
) -> Vec<Reply> {
    let requests = range.host_count();
    let mut collector = ReplyCollector::new(range);
    let sent_at: OnceLock<Instant> = OnceLock::new();

    let failed_sends = thread::scope(|scope| {
        let sent_at = &sent_at;
        let sender = scope.spawn(move || {
            let failed = send_requests(tx, source, range);
            let _ = sent_at.set(Instant::now());
            failed
        });

        loop {
            let window_closed = match sent_at.get() {
                Some(done) => done.elapsed() >= timeout,
                None => sender.is_finished(),
            };
            if window_closed {
                break;
            }

            // Read timeouts surface as errors; keep polling until the window closes.
            if let Ok(frame) = rx.next() {
                collector.handle_frame(frame);
                if collector.answered_all() {
                    debug!("every host in {range} answered, ending round early");
                    break;
                }
            }
        }

        sender.join().unwrap_or_else(|_| {
            warn!("ARP sender stopped unexpectedly");
            requests
        })
    });

    if failed_sends > 0 {
        warn!("{failed_sends} of {requests} ARP requests could not be sent");
    }
    debug!("sent {} ARP requests", requests.saturating_sub(failed_sends));

    collector.finish()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
