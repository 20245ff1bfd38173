//! The half-open TCP probe: one SYN out, classify what comes back, reset the
//! exchange if the port answered.
//!
//! Per (target, port) attempt the machine walks
//! `Idle → Sent → {Open, Closed, NoResponse} → (if Open) ResetSent → Done`.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use pnet::packet::tcp::{TcpFlags, TcpPacket};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::net::packets::tcp;
use crate::net::transport::PacketTransport;

/// How long a probed port gets to answer, for both the SYN and the reset.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// The only flag pattern that classifies a port as open.
///
/// Compared with strict equality, not as a bitmask: a reply carrying SYN+ACK
/// plus any further bit (ECE, CWR, ...) does not count as open.
pub const OPEN_FLAGS: u8 = TcpFlags::SYN | TcpFlags::ACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    Closed,
    NoResponse,
}

/// Runs the full probe state machine for one (target, port) pair.
///
/// Transport failures abort only this probe: they are logged and fold into
/// `NoResponse` so the scan continues with the next port.
pub async fn probe_port(
    transport: &mut dyn PacketTransport,
    src_addr: Ipv4Addr,
    target: Ipv4Addr,
    port: u16,
) -> ProbeOutcome {
    let src_port: u16 = rand::random_range(49_152..u16::MAX);
    let syn = match tcp::syn_segment(src_addr, target, src_port, port) {
        Ok(segment) => segment,
        Err(e) => {
            warn!("building SYN for {target}:{port} failed: {e}");
            return ProbeOutcome::NoResponse;
        }
    };
    if let Err(e) = transport.send(&syn, IpAddr::V4(target)) {
        warn!("probing {target}:{port} failed: {e}");
        return ProbeOutcome::NoResponse;
    }
    debug!("SYN {src_addr}:{src_port} -> {target}:{port}");

    match await_response(transport, target, src_port, port).await {
        None => ProbeOutcome::NoResponse,
        Some(flags) if flags == OPEN_FLAGS => {
            teardown(transport, src_addr, target, src_port, port).await;
            ProbeOutcome::Open
        }
        Some(_) => ProbeOutcome::Closed,
    }
}

/// Waits for the segment answering our probe, skipping unrelated traffic.
async fn await_response(
    transport: &mut dyn PacketTransport,
    target: Ipv4Addr,
    src_port: u16,
    port: u16,
) -> Option<u8> {
    let matching = async {
        while let Some((bytes, source)) = transport.recv().await {
            if let Some(flags) = match_response(&bytes, source, target, src_port, port) {
                return Some(flags);
            }
        }
        None
    };
    timeout(PROBE_TIMEOUT, matching).await.ok().flatten()
}

fn match_response(
    bytes: &[u8],
    source: IpAddr,
    target: Ipv4Addr,
    src_port: u16,
    port: u16,
) -> Option<u8> {
    if source != IpAddr::V4(target) {
        return None;
    }
    let segment = TcpPacket::new(bytes)?;
    (segment.get_source() == port && segment.get_destination() == src_port)
        .then(|| segment.get_flags())
}

/// Closes the half-open exchange with a lone RST. A reply may arrive within
/// the timeout but is never inspected.
async fn teardown(
    transport: &mut dyn PacketTransport,
    src_addr: Ipv4Addr,
    target: Ipv4Addr,
    src_port: u16,
    port: u16,
) {
    let rst = match tcp::rst_segment(src_addr, target, src_port, port) {
        Ok(segment) => segment,
        Err(e) => {
            warn!("building RST for {target}:{port} failed: {e}");
            return;
        }
    };
    if let Err(e) = transport.send(&rst, IpAddr::V4(target)) {
        warn!("resetting {target}:{port} failed: {e}");
        return;
    }
    let _ = timeout(PROBE_TIMEOUT, transport.recv()).await;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
