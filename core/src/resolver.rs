//! Reverse name resolution for discovered addresses.
//!
//! Lookups run on a fixed pool of workers that drain a shared address queue
//! and report back over a channel. Each lookup carries its own deadline, so a
//! resolver that never answers costs one slot for `per_lookup_timeout` and
//! nothing more. Every failure turns into [`UNKNOWN_NAME`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::ensure;
use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use netsweep_common::network::device::UNKNOWN_NAME;

/// A single reverse lookup primitive.
#[async_trait]
pub trait NameLookup: Send + Sync {
    async fn reverse(&self, addr: Ipv4Addr) -> anyhow::Result<String>;
}

/// Uses the operating system resolver (`getnameinfo`), which consults
/// `/etc/hosts`, DNS PTR records and whatever else the host is configured for.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

#[async_trait]
impl NameLookup for SystemLookup {
    async fn reverse(&self, addr: Ipv4Addr) -> anyhow::Result<String> {
        let name = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&IpAddr::V4(addr))).await??;
        // getnameinfo falls back to the numeric form when nothing is registered
        ensure!(name != addr.to_string(), "no name registered for {addr}");
        Ok(name)
    }
}

/// Number of workers a batch of `pending` lookups gets under `max_concurrency`.
pub fn effective_concurrency(pending: usize, max_concurrency: usize) -> usize {
    pending.min(max_concurrency.max(1))
}

#[derive(Clone)]
pub struct NameResolver {
    lookup: Arc<dyn NameLookup>,
}

impl NameResolver {
    pub fn new(lookup: Arc<dyn NameLookup>) -> Self {
        Self { lookup }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemLookup))
    }

    /// Resolves every address in `addresses`, returning one entry per address.
    ///
    /// At most `max_concurrency` lookups are in flight at once and each one is
    /// abandoned after `per_lookup_timeout`. Returns once every lookup has
    /// finished or timed out.
    pub async fn resolve_all(
        &self,
        addresses: &HashSet<Ipv4Addr>,
        per_lookup_timeout: Duration,
        max_concurrency: usize,
    ) -> HashMap<Ipv4Addr, String> {
        if addresses.is_empty() {
            return HashMap::new();
        }

        let workers = effective_concurrency(addresses.len(), max_concurrency);
        let queue: Arc<Mutex<VecDeque<Ipv4Addr>>> = Arc::new(Mutex::new(addresses.iter().copied().collect()));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(Ipv4Addr, String)>();

        let mut pool: JoinSet<()> = JoinSet::new();
        for _ in 0..workers {
            pool.spawn(worker(
                self.lookup.clone(),
                queue.clone(),
                result_tx.clone(),
                per_lookup_timeout,
            ));
        }
        drop(result_tx);

        let mut names: HashMap<Ipv4Addr, String> = HashMap::with_capacity(addresses.len());
        while let Some((addr, name)) = result_rx.recv().await {
            names.insert(addr, name);
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!("name resolution worker stopped unexpectedly: {e}");
            }
        }

        // A worker that died mid-lookup leaves its address without a result.
        for addr in addresses {
            names.entry(*addr).or_insert_with(|| UNKNOWN_NAME.to_string());
        }

        names
    }
}

async fn worker(
    lookup: Arc<dyn NameLookup>,
    queue: Arc<Mutex<VecDeque<Ipv4Addr>>>,
    results: UnboundedSender<(Ipv4Addr, String)>,
    per_lookup_timeout: Duration,
) {
    loop {
        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        let Some(addr) = next else {
            break;
        };

        let name = lookup_name(lookup.as_ref(), addr, per_lookup_timeout).await;
        if results.send((addr, name)).is_err() {
            break;
        }
    }
}

/// Runs one lookup under its own deadline. Never fails.
pub async fn lookup_name(lookup: &dyn NameLookup, addr: Ipv4Addr, timeout: Duration) -> String {
    match tokio::time::timeout(timeout, lookup.reverse(addr)).await {
        Ok(Ok(name)) if !name.trim().is_empty() => name,
        Ok(Ok(_)) => {
            debug!("reverse lookup for {addr} returned an empty name");
            UNKNOWN_NAME.to_string()
        }
        Ok(Err(e)) => {
            debug!("reverse lookup for {addr} failed: {e:#}");
            UNKNOWN_NAME.to_string()
        }
        Err(_) => {
            debug!("reverse lookup for {addr} timed out after {timeout:?}");
            UNKNOWN_NAME.to_string()
        }
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
