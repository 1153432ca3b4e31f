use anyhow::Context;
use pnet::packet::ethernet::{EtherType, MutableEthernetPacket};
use pnet::util::MacAddr;

pub fn make_header(buffer: &mut [u8], src_mac: MacAddr, dst_mac: MacAddr, et: EtherType) -> anyhow::Result<()> {
    let mut eth = MutableEthernetPacket::new(buffer).context("failed to create mutable Ethernet packet")?;

    eth.set_source(src_mac);
    eth.set_destination(dst_mac);
    eth.set_ethertype(et);

    Ok(())
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
    use crate::{ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS};
    use pnet::packet::ethernet::{EtherTypes, EthernetPacket};

    #[test]
    fn ethernet_header_sets_fields() {
        let mut b = [0u8; MIN_ETH_FRAME_NO_FCS];
        let src = MacAddr::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55);

        make_header(&mut b, src, MacAddr::broadcast(), EtherTypes::Arp).unwrap();

        let eth = EthernetPacket::new(&b[..ETH_HDR_LEN]).expect("parse eth");
        assert_eq!(eth.get_source(), src);
        assert_eq!(eth.get_destination(), MacAddr::broadcast());
        assert_eq!(eth.get_ethertype(), EtherTypes::Arp);
    }

    #[test]
    fn ethernet_header_errors_when_buffer_too_small() {
        let mut tiny: [u8; 0] = [];

        let err = make_header(&mut tiny, MacAddr::zero(), MacAddr::zero(), EtherTypes::Arp).unwrap_err();

        assert!(err.to_string().contains("Ethernet"), "unexpected error: {err:?}");
    }
}
