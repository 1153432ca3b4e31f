//! The **abstraction** over a probe round.
//!
//! Higher layers only see [`Prober`]: something that, given a range and a
//! listening window, hands back the `(address, MAC)` pairs that answered. The
//! raw-socket implementation lives in [`arp`]; tests plug in canned replies.

use std::time::Duration;

use async_trait::async_trait;

use netsweep_common::ScanError;
use netsweep_common::network::device::Reply;
use netsweep_common::network::range::NetworkRange;

mod arp;
mod channel;

pub use arp::ArpProber;

#[async_trait]
pub trait Prober: Send + Sync {
    /// Runs exactly one broadcast-and-collect round over `range`.
    ///
    /// Listens for `timeout` (or until every host answered) and returns the
    /// replies in the order they arrived. No answers is `Ok(vec![])`.
    /// `interface` pins the round to one interface; `None` lets the
    /// implementation choose.
    async fn send_and_collect(
        &self,
        range: &NetworkRange,
        timeout: Duration,
        interface: Option<&str>,
    ) -> Result<Vec<Reply>, ScanError>;
}
