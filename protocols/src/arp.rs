//! ARP request construction and reply parsing.
//!
//! Requests are padded to the minimum Ethernet frame size (without FCS) so
//! drivers that refuse runt frames still transmit them.

use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::util::MacAddr;
use thiserror::Error;

use netsweep_common::network::device::Reply;

use crate::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS, ethernet};

/// Why a captured frame did not yield a [`Reply`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("truncated Ethernet frame (len {0})")]
    TruncatedEthernet(usize),
    #[error("not an ARP frame (ethertype {0})")]
    NotArp(EtherType),
    #[error("truncated or invalid ARP packet (payload len {0})")]
    TruncatedArp(usize),
    #[error("ARP packet is not a reply")]
    NotReply,
}

/// Writes a broadcast "who-has `target`" request sent from `src_mac`/`src_addr`
/// into `buffer`, which must hold at least [`MIN_ETH_FRAME_NO_FCS`] bytes.
///
/// The first [`MIN_ETH_FRAME_NO_FCS`] bytes are overwritten, so one buffer
/// serves every target of a round.
pub fn write_request(buffer: &mut [u8], src_mac: MacAddr, src_addr: Ipv4Addr, target: Ipv4Addr) -> anyhow::Result<()> {
    anyhow::ensure!(
        buffer.len() >= MIN_ETH_FRAME_NO_FCS,
        "ARP request buffer too small ({} < {MIN_ETH_FRAME_NO_FCS})",
        buffer.len()
    );
    buffer[..MIN_ETH_FRAME_NO_FCS].fill(0);
    ethernet::make_header(buffer, src_mac, MacAddr::broadcast(), EtherTypes::Arp)?;

    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .context("failed to create mutable ARP packet")?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(ArpOperations::Request);
    arp_packet.set_sender_hw_addr(src_mac);
    arp_packet.set_target_hw_addr(MacAddr::zero());
    arp_packet.set_sender_proto_addr(src_addr);
    arp_packet.set_target_proto_addr(target);

    Ok(())
}

/// Allocating form of [`write_request`].
pub fn create_request(src_mac: MacAddr, src_addr: Ipv4Addr, target: Ipv4Addr) -> anyhow::Result<Vec<u8>> {
    let mut buffer = vec![0u8; MIN_ETH_FRAME_NO_FCS];
    write_request(&mut buffer, src_mac, src_addr, target)?;
    Ok(buffer)
}

/// Extracts the sender's `(address, MAC)` from an ARP reply frame.
pub fn parse_reply(frame: &[u8]) -> Result<Reply, FrameError> {
    let eth = EthernetPacket::new(frame).ok_or(FrameError::TruncatedEthernet(frame.len()))?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return Err(FrameError::NotArp(eth.get_ethertype()));
    }

    let payload = eth.payload();
    let arp = ArpPacket::new(payload).ok_or(FrameError::TruncatedArp(payload.len()))?;
    if arp.get_operation() != ArpOperations::Reply {
        return Err(FrameError::NotReply);
    }

    Ok(Reply::new(arp.get_sender_proto_addr(), arp.get_sender_hw_addr()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
