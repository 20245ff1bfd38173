use std::net::Ipv4Addr;

use pnet::packet::tcp::{MutableTcpPacket, TcpFlags, ipv4_checksum};

use super::{PacketError, TCP_HDR_LEN};

/// Connection-initiation segment for a half-open probe.
///
/// The sequence number is randomised per segment; the source port is the
/// caller's to pick so replies can be matched back to the probe.
pub fn syn_segment(
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
) -> Result<Vec<u8>, PacketError> {
    segment(src_addr, dst_addr, src_port, dst_port, TcpFlags::SYN)
}

/// Teardown segment sent once a port has classified as open.
pub fn rst_segment(
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
) -> Result<Vec<u8>, PacketError> {
    segment(src_addr, dst_addr, src_port, dst_port, TcpFlags::RST)
}

fn segment(
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    flags: u8,
) -> Result<Vec<u8>, PacketError> {
    let mut buffer = vec![0u8; TCP_HDR_LEN];
    let mut tcp = MutableTcpPacket::new(&mut buffer).ok_or(PacketError::TcpBuffer)?;
    tcp.set_source(src_port);
    tcp.set_destination(dst_port);
    tcp.set_sequence(rand::random::<u32>());
    tcp.set_acknowledgement(0);
    tcp.set_data_offset(5);
    tcp.set_flags(flags);
    tcp.set_window(65_535);
    tcp.set_urgent_ptr(0);
    let checksum = ipv4_checksum(&tcp.to_immutable(), &src_addr, &dst_addr);
    tcp.set_checksum(checksum);
    Ok(buffer)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
