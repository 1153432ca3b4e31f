use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use netsweep_common::config::ScanConfig;
use netsweep_common::network::device::UNKNOWN_NAME;
use netsweep_core::{DiscoveryService, NameResolver};

use super::fakes::{host, reply, ScriptedLookup, ScriptedProber};

fn config(range: &str) -> ScanConfig {
    let mut cfg = ScanConfig::new(range.parse().unwrap());
    cfg.probe_timeout = Duration::from_millis(100);
    cfg.name_timeout = Duration::from_millis(200);
    cfg.max_concurrency = 2;
    cfg
}

/// Three responders where the middle one has no reverse record.
fn three_responders() -> (DiscoveryService, Arc<ScriptedLookup>) {
    let lookup = Arc::new(ScriptedLookup {
        names: [(host(10), "nas.home".to_string()), (host(30), "printer.home".to_string())]
            .into_iter()
            .collect(),
        fail: [host(20)].into_iter().collect(),
        delay: Duration::from_millis(20),
        ..Default::default()
    });
    let prober = ScriptedProber {
        replies: vec![reply(10), reply(20), reply(30)],
    };
    let service = DiscoveryService::new(Box::new(prober), NameResolver::new(lookup.clone()));
    (service, lookup)
}

#[tokio::test]
async fn discovery_names_responders_and_marks_failures() {
    let (service, lookup) = three_responders();

    let report = service.scan(&config("192.168.50.0/24")).await.unwrap();

    let rows: Vec<(Ipv4Addr, &str)> = report
        .devices
        .iter()
        .map(|d| (d.address, d.name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (host(10), "nas.home"),
            (host(20), UNKNOWN_NAME),
            (host(30), "printer.home"),
        ]
    );
    assert_eq!(lookup.calls(), 3);

    let stats = report.resolution.expect("names were requested");
    assert_eq!(stats.workers, 2);
    assert_eq!(stats.resolved, 2);
    // two rounds of ~20ms, far below three sequential timeouts
    assert!(stats.elapsed < Duration::from_millis(400), "took {:?}", stats.elapsed);
}

#[tokio::test]
async fn discovery_keeps_mac_of_each_responder() {
    let (service, _) = three_responders();

    let report = service.scan(&config("192.168.50.0/24")).await.unwrap();

    for device in &report.devices {
        assert_eq!(device.mac, reply(device.address.octets()[3]).mac);
    }
}

#[tokio::test]
async fn discovery_without_responders_is_empty_not_an_error() {
    let lookup = Arc::new(ScriptedLookup::default());
    let service = DiscoveryService::new(
        Box::new(ScriptedProber { replies: Vec::new() }),
        NameResolver::new(lookup.clone()),
    );

    let report = service.scan(&config("10.9.8.0/29")).await.unwrap();

    assert!(report.devices.is_empty());
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn discovery_outside_range_finds_nothing() {
    let (service, lookup) = three_responders();

    let report = service.scan(&config("10.0.0.0/24")).await.unwrap();

    assert!(report.devices.is_empty());
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn discovery_without_names_skips_resolution() {
    let (service, lookup) = three_responders();
    let mut cfg = config("192.168.50.0/24");
    cfg.resolve_names = false;

    let start = Instant::now();
    let report = service.scan(&cfg).await.unwrap();
    let fast = start.elapsed();

    assert_eq!(report.devices.len(), 3);
    assert!(report.devices.iter().all(|d| !d.has_name()));
    assert!(report.resolution.is_none());
    assert_eq!(lookup.calls(), 0);

    let (service, _) = three_responders();
    let start = Instant::now();
    service.scan(&config("192.168.50.0/24")).await.unwrap();
    assert!(fast < start.elapsed());
}

#[tokio::test]
async fn discovery_collapses_repeated_replies() {
    let lookup = Arc::new(ScriptedLookup::default());
    let prober = ScriptedProber {
        replies: vec![reply(7), reply(8), reply(7), reply(7)],
    };
    let service = DiscoveryService::new(Box::new(prober), NameResolver::new(lookup.clone()));

    let report = service.scan(&config("192.168.50.0/24")).await.unwrap();

    let addresses: Vec<Ipv4Addr> = report.devices.iter().map(|d| d.address).collect();
    assert_eq!(addresses, vec![host(7), host(8)]);
    assert_eq!(addresses.iter().collect::<HashSet<_>>().len(), 2);
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn discovery_survives_unresponsive_resolver() {
    let lookup = Arc::new(ScriptedLookup {
        names: [(host(1), "gateway".to_string())].into_iter().collect(),
        hang: [host(2), host(3), host(4)].into_iter().collect(),
        ..Default::default()
    });
    let prober = ScriptedProber {
        replies: vec![reply(1), reply(2), reply(3), reply(4)],
    };
    let service = DiscoveryService::new(Box::new(prober), NameResolver::new(lookup));
    let mut cfg = config("192.168.50.0/24");
    cfg.max_concurrency = 4;

    let start = Instant::now();
    let report = service.scan(&cfg).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.devices[0].name, "gateway");
    assert!(report.devices[1..].iter().all(|d| d.name == UNKNOWN_NAME));
    // every hang is waited out in parallel, once
    assert!(elapsed < cfg.name_timeout * 2, "took {elapsed:?}");
}

#[test]
fn console_macros_need_no_tracing_dependency() {
    let saved = "scan.csv";
    netsweep_common::success!("Results saved to {}", saved);
    netsweep_common::error!("interface '{}' does not exist", "eth9");
}
