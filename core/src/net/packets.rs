pub mod arp;
pub mod ethernet;
pub mod tcp;

use thiserror::Error;

pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
pub const TCP_HDR_LEN: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for an Ethernet header")]
    EthernetBuffer,
    #[error("buffer too small for an ARP payload")]
    ArpBuffer,
    #[error("buffer too small for a TCP segment")]
    TcpBuffer,
}
