use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use netsweep_common::network::device::Reply;
use netsweep_common::network::range::NetworkRange;
use netsweep_common::ScanError;
use netsweep_core::{NameLookup, Prober};
use pnet::util::MacAddr;

pub fn host(octet: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 50, octet)
}

pub fn reply(octet: u8) -> Reply {
    Reply::new(host(octet), MacAddr::new(0x02, 0x42, 0xac, 0x11, 0x00, octet))
}

/// Plays back a fixed set of replies, keeping only those inside the range
/// it is asked about.
pub struct ScriptedProber {
    pub replies: Vec<Reply>,
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn send_and_collect(
        &self,
        range: &NetworkRange,
        _timeout: Duration,
        _interface: Option<&str>,
    ) -> Result<Vec<Reply>, ScanError> {
        Ok(self
            .replies
            .iter()
            .filter(|reply| range.contains(reply.address))
            .copied()
            .collect())
    }
}

/// Behaves like a slow local resolver: answers from `names` after `delay`,
/// errors for anything in `fail` and never answers for anything in `hang`.
#[derive(Default)]
pub struct ScriptedLookup {
    pub names: HashMap<Ipv4Addr, String>,
    pub fail: HashSet<Ipv4Addr>,
    pub hang: HashSet<Ipv4Addr>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameLookup for ScriptedLookup {
    async fn reverse(&self, addr: Ipv4Addr) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang.contains(&addr) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.delay).await;

        if self.fail.contains(&addr) {
            bail!("no PTR record for {addr}");
        }
        match self.names.get(&addr) {
            Some(name) => Ok(name.clone()),
            None => bail!("unknown host {addr}"),
        }
    }
}
