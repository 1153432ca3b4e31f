//! Picks the network interface a probe round runs on.
//!
//! An explicitly named interface is used as-is once it passes the viability
//! checks. Otherwise the interface whose IPv4 subnet holds the target range
//! wins, falling back to the best physical LAN interface (wired first).

use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use thiserror::Error;

#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(not(target_os = "linux"))]
use fallback_impl::{is_physical, is_wireless};

use crate::error::ScanError;
use crate::network::range::NetworkRange;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    #[error("interface is down")]
    IsDown,
    #[error("interface is a loopback device")]
    IsLoopback,
    #[error("interface has no MAC address")]
    NoMacAddress,
    #[error("interface does not support broadcast")]
    NotBroadcast,
    #[error("interface is a point-to-point link")]
    IsPointToPoint,
    #[error("interface has no IPv4 address")]
    NoIpv4Address,
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    /// Address to put in the sender field of ARP requests aimed at `range`.
    fn source_ipv4_for(&self, range: &NetworkRange) -> Option<Ipv4Addr>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) => Some(*ipv4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }

    fn source_ipv4_for(&self, range: &NetworkRange) -> Option<Ipv4Addr> {
        let nets = self.get_ipv4_nets();
        nets.iter()
            .find(|net| net.contains(range.network()))
            .or_else(|| nets.first())
            .map(|net| net.ip())
    }
}

/// Resolves the interface for a scan of `range`.
pub fn select_interface(name: Option<&str>, range: &NetworkRange) -> Result<NetworkInterface, ScanError> {
    select_from(datalink::interfaces(), name, range, is_physical, is_wired)
}

fn select_from(
    interfaces: Vec<NetworkInterface>,
    name: Option<&str>,
    range: &NetworkRange,
    is_physical: impl Fn(&NetworkInterface) -> bool,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Result<NetworkInterface, ScanError> {
    if let Some(name) = name {
        let interface = interfaces
            .into_iter()
            .find(|intf| intf.name == name)
            .ok_or_else(|| ScanError::InterfaceNotFound(name.to_string()))?;

        return match is_viable_arp_interface(&interface) {
            Ok(()) => Ok(interface),
            Err(reason) => Err(ScanError::InterfaceUnusable {
                name: interface.name,
                reason,
            }),
        };
    }

    let viable: Vec<NetworkInterface> = interfaces
        .into_iter()
        .filter(|intf| is_viable_arp_interface(intf).is_ok())
        .collect();

    if let Some(owner) = viable.iter().find(|intf| owns_range(intf, range)) {
        return Ok(owner.clone());
    }

    let physical: Vec<NetworkInterface> = viable.into_iter().filter(|i| is_physical(i)).collect();
    select_best_lan_interface(physical, is_wired)
        .ok_or_else(|| ScanError::NoUsableInterface(range.to_string()))
}

fn owns_range(interface: &NetworkInterface, range: &NetworkRange) -> bool {
    interface
        .get_ipv4_nets()
        .iter()
        .any(|net| net.contains(range.network()) && net.contains(range.broadcast()))
}

fn is_viable_arp_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.mac.is_none() {
        return Err(ViabilityError::NoMacAddress);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if interface.get_ipv4_nets().is_empty() {
        return Err(ViabilityError::NoIpv4Address);
    }

    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wired = interfaces.iter().position(|intf| is_wired(intf));
    let idx = wired.unwrap_or(0);
    interfaces.into_iter().nth(idx)
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.mac.is_some() && !interface.is_loopback()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        interface.name.starts_with("wl")
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
    use pnet::util::MacAddr;

    const IFF_UP: u32 = 1;
    const IFF_BROADCAST: u32 = 1 << 1;
    const IFF_LOOPBACK: u32 = 1 << 3;
    const IFF_POINTTOPOINT: u32 = 1 << 4;

    fn create_mock_interface(name: &str, mac: Option<MacAddr>, ips: Vec<IpNetwork>, flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            description: "An interface".to_string(),
            index: 0,
            mac,
            ips,
            flags,
        }
    }

    fn default_mac() -> Option<MacAddr> {
        Some(MacAddr(0x1, 0x2, 0x3, 0x4, 0x5, 0x6))
    }

    fn net(cidr: &str) -> Vec<IpNetwork> {
        vec![IpNetwork::V4(cidr.parse().unwrap())]
    }

    fn lan_range() -> NetworkRange {
        "192.168.1.0/24".parse().unwrap()
    }

    fn always(_: &NetworkInterface) -> bool {
        true
    }

    #[test]
    fn viable_interface_passes() {
        let intf = create_mock_interface("eth0", default_mac(), net("192.168.1.100/24"), IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_arp_interface(&intf), Ok(()));
    }

    #[test]
    fn viability_failures() {
        let down = create_mock_interface("eth0", default_mac(), net("192.168.1.100/24"), IFF_BROADCAST);
        assert_eq!(is_viable_arp_interface(&down), Err(ViabilityError::IsDown));

        let lo = create_mock_interface("lo", default_mac(), net("127.0.0.1/8"), IFF_UP | IFF_BROADCAST | IFF_LOOPBACK);
        assert_eq!(is_viable_arp_interface(&lo), Err(ViabilityError::IsLoopback));

        let no_mac = create_mock_interface("eth0", None, net("192.168.1.100/24"), IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_arp_interface(&no_mac), Err(ViabilityError::NoMacAddress));

        let no_bcast = create_mock_interface("eth0", default_mac(), net("192.168.1.100/24"), IFF_UP);
        assert_eq!(is_viable_arp_interface(&no_bcast), Err(ViabilityError::NotBroadcast));

        let tun = create_mock_interface(
            "tun0",
            default_mac(),
            net("10.8.0.2/24"),
            IFF_UP | IFF_BROADCAST | IFF_POINTTOPOINT,
        );
        assert_eq!(is_viable_arp_interface(&tun), Err(ViabilityError::IsPointToPoint));

        let v6_only = create_mock_interface(
            "eth0",
            default_mac(),
            vec![IpNetwork::V6("fe80::1/64".parse().unwrap())],
            IFF_UP | IFF_BROADCAST,
        );
        assert_eq!(is_viable_arp_interface(&v6_only), Err(ViabilityError::NoIpv4Address));
    }

    #[test]
    fn named_interface_is_used() {
        let interfaces = vec![
            create_mock_interface("eth0", default_mac(), net("10.0.0.5/24"), IFF_UP | IFF_BROADCAST),
            create_mock_interface("wlan0", default_mac(), net("192.168.1.5/24"), IFF_UP | IFF_BROADCAST),
        ];
        let chosen = select_from(interfaces, Some("eth0"), &lan_range(), always, always).unwrap();
        assert_eq!(chosen.name, "eth0");
    }

    #[test]
    fn named_interface_missing_is_fatal() {
        let interfaces = vec![create_mock_interface(
            "eth0",
            default_mac(),
            net("10.0.0.5/24"),
            IFF_UP | IFF_BROADCAST,
        )];
        let err = select_from(interfaces, Some("eth9"), &lan_range(), always, always).unwrap_err();
        assert!(matches!(err, ScanError::InterfaceNotFound(name) if name == "eth9"));
    }

    #[test]
    fn named_interface_unusable_is_fatal() {
        let interfaces = vec![create_mock_interface(
            "eth0",
            default_mac(),
            net("10.0.0.5/24"),
            IFF_BROADCAST,
        )];
        let err = select_from(interfaces, Some("eth0"), &lan_range(), always, always).unwrap_err();
        assert!(matches!(
            err,
            ScanError::InterfaceUnusable { reason: ViabilityError::IsDown, .. }
        ));
    }

    #[test]
    fn interface_owning_the_range_wins() {
        let interfaces = vec![
            create_mock_interface("eth0", default_mac(), net("10.0.0.5/24"), IFF_UP | IFF_BROADCAST),
            create_mock_interface("wlan0", default_mac(), net("192.168.1.5/24"), IFF_UP | IFF_BROADCAST),
        ];
        let is_wired = |intf: &NetworkInterface| intf.name == "eth0";
        let chosen = select_from(interfaces, None, &lan_range(), always, is_wired).unwrap();
        assert_eq!(chosen.name, "wlan0");
    }

    #[test]
    fn falls_back_to_wired_lan_interface() {
        let interfaces = vec![
            create_mock_interface("wlan0", default_mac(), net("10.0.0.5/24"), IFF_UP | IFF_BROADCAST),
            create_mock_interface("eth0", default_mac(), net("10.1.0.5/24"), IFF_UP | IFF_BROADCAST),
        ];
        let is_wired = |intf: &NetworkInterface| intf.name == "eth0";
        let chosen = select_from(interfaces, None, &lan_range(), always, is_wired).unwrap();
        assert_eq!(chosen.name, "eth0");
    }

    #[test]
    fn no_candidates_is_fatal() {
        let interfaces = vec![create_mock_interface(
            "lo",
            None,
            net("127.0.0.1/8"),
            IFF_UP | IFF_LOOPBACK,
        )];
        let err = select_from(interfaces, None, &lan_range(), always, always).unwrap_err();
        assert!(matches!(err, ScanError::NoUsableInterface(_)));
    }

    #[test]
    fn source_address_prefers_matching_subnet() {
        let mut ips = net("10.0.0.5/24");
        ips.extend(net("192.168.1.5/24"));
        let intf = create_mock_interface("eth0", default_mac(), ips, IFF_UP | IFF_BROADCAST);

        assert_eq!(intf.source_ipv4_for(&lan_range()), Some(Ipv4Addr::new(192, 168, 1, 5)));

        let other: NetworkRange = "172.16.0.0/16".parse().unwrap();
        assert_eq!(intf.source_ipv4_for(&other), Some(Ipv4Addr::new(10, 0, 0, 5)));
    }
}
