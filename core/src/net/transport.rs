use std::net::IpAddr;

use anyhow::Context;
use async_trait::async_trait;
use pnet::packet::Packet;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::tcp::TcpPacket;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportSender,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_TCP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Tcp));

/// Packet send/receive capability backing the port probe.
///
/// Production code talks to a raw Layer-4 socket; tests substitute a
/// deterministic fake so the probe state machine can run without privileges.
#[async_trait]
pub trait PacketTransport: Send {
    fn send(&mut self, segment: &[u8], destination: IpAddr) -> anyhow::Result<()>;

    /// Next captured TCP segment with its source address, `None` once the
    /// capture side has shut down.
    async fn recv(&mut self) -> Option<(Vec<u8>, IpAddr)>;
}

pub struct TcpTransport {
    tx: TransportSender,
    rx: UnboundedReceiver<(Vec<u8>, IpAddr)>,
}

impl TcpTransport {
    /// Opens the raw channel and spawns the listener thread feeding `rx`.
    /// Requires root.
    pub fn open() -> anyhow::Result<Self> {
        let (tx, mut rx_socket) =
            transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_TCP)
                .context("opening raw TCP transport channel")?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let mut iterator = transport::tcp_packet_iter(&mut rx_socket);
            loop {
                if let Ok((packet, source)) = iterator.next() {
                    if queue_tx.send((packet.packet().to_vec(), source)).is_err() {
                        break;
                    }
                }
            }
        });
        Ok(Self { tx, rx: queue_rx })
    }
}

#[async_trait]
impl PacketTransport for TcpTransport {
    fn send(&mut self, segment: &[u8], destination: IpAddr) -> anyhow::Result<()> {
        let packet = TcpPacket::new(segment).context("truncated TCP segment")?;
        self.tx
            .send_to(packet, destination)
            .with_context(|| format!("sending TCP segment to {destination}"))?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<(Vec<u8>, IpAddr)> {
        self.rx.recv().await
    }
}
