//! Link-layer frames used by the ARP probe round.

pub mod arp;
pub mod ethernet;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
