//! Liveness and hardware-address resolution over broadcast ARP.

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::datalink::NetworkInterface;
use pnet::util::MacAddr;
use tokio::time::timeout;
use tracing::debug;

use crate::net::channel::{self, EthernetHandle};
use crate::net::iface;
use crate::net::packets::arp;

/// How long a target gets to answer a who-has broadcast.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-target liveness probe, injectable so the orchestrator can run against
/// a fake in tests.
#[async_trait]
pub trait AddressResolver: Send {
    /// `Ok(None)` means the timeout elapsed without a reply; the host is
    /// treated as down, not as an error.
    async fn resolve(&mut self, target: Ipv4Addr) -> anyhow::Result<Option<MacAddr>>;
}

pub struct ArpResolver {
    handle: EthernetHandle,
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
}

impl ArpResolver {
    /// Binds the resolver to an interface. Requires root for the raw
    /// ethernet channel.
    pub fn open(intf: &NetworkInterface) -> anyhow::Result<Self> {
        let src_mac = intf
            .mac
            .with_context(|| format!("{} has no MAC address", intf.name))?;
        let src_addr = iface::ipv4_of(intf)?;
        Ok(Self {
            handle: channel::start_capture(intf)?,
            src_mac,
            src_addr,
        })
    }
}

#[async_trait]
impl AddressResolver for ArpResolver {
    async fn resolve(&mut self, target: Ipv4Addr) -> anyhow::Result<Option<MacAddr>> {
        let request = arp::request_frame(self.src_mac, self.src_addr, target)?;
        if let Some(Err(e)) = self.handle.tx.send_to(&request, None) {
            return Err(e).with_context(|| format!("broadcasting ARP request for {target}"));
        }
        debug!("ARP who-has {target} sent from {}", self.src_addr);

        // First matching reply wins, even when several devices (proxy ARP)
        // claim the address.
        let first_reply = async {
            while let Some(frame) = self.handle.rx.recv().await {
                if let Some(mac) = arp::match_reply(&frame, target) {
                    return Some(mac);
                }
            }
            None
        };
        Ok(timeout(RESOLVE_TIMEOUT, first_reply).await.unwrap_or(None))
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
    use std::io;
    use std::sync::{Arc, Mutex};

    use pnet::datalink::DataLinkSender;
    use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, MutableArpPacket};
    use pnet::packet::ethernet::EtherTypes;
    use tokio::sync::mpsc;

    use super::*;
    use crate::net::packets::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS, ethernet};

    const SRC_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

    fn src_mac() -> MacAddr {
        MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff)
    }

    // ---- Fake sender to spy on broadcast requests ----
    struct FakeSender {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl FakeSender {
        fn new(fail: bool) -> (Box<dyn DataLinkSender>, Arc<Mutex<Vec<Vec<u8>>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            let sender = FakeSender {
                sent: sent.clone(),
                fail,
            };
            (Box::new(sender), sent)
        }
    }

    impl DataLinkSender for FakeSender {
        fn build_and_send(
            &mut self,
            _num_packets: usize,
            _packet_size: usize,
            _func: &mut dyn for<'a> FnMut(&'a mut [u8]),
        ) -> Option<io::Result<()>> {
            Some(Ok(()))
        }

        fn send_to(
            &mut self,
            packet: &[u8],
            _dst: Option<NetworkInterface>,
        ) -> Option<io::Result<()>> {
            if self.fail {
                return Some(Err(io::Error::new(io::ErrorKind::Other, "boom")));
            }
            self.sent.lock().unwrap().push(packet.to_vec());
            Some(Ok(()))
        }
    }

    fn resolver_with(
        tx: Box<dyn DataLinkSender>,
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> ArpResolver {
        ArpResolver {
            handle: EthernetHandle { tx, rx },
            src_mac: src_mac(),
            src_addr: SRC_ADDR,
        }
    }

    fn reply_frame(sender_mac: MacAddr, sender_addr: Ipv4Addr) -> Vec<u8> {
        let mut buffer = vec![0u8; MIN_ETH_FRAME_NO_FCS];
        ethernet::make_header(&mut buffer, sender_mac, src_mac(), EtherTypes::Arp).unwrap();
        {
            let mut arp =
                MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN]).unwrap();
            arp.set_hardware_type(ArpHardwareTypes::Ethernet);
            arp.set_protocol_type(EtherTypes::Ipv4);
            arp.set_hw_addr_len(6);
            arp.set_proto_addr_len(4);
            arp.set_operation(ArpOperations::Reply);
            arp.set_sender_hw_addr(sender_mac);
            arp.set_target_hw_addr(src_mac());
            arp.set_sender_proto_addr(sender_addr);
            arp.set_target_proto_addr(SRC_ADDR);
        }
        buffer
    }

    #[tokio::test(start_paused = true)]
    async fn first_matching_reply_wins() {
        let target = Ipv4Addr::new(192, 168, 1, 50);
        let replier = MacAddr::new(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01);
        let proxy = MacAddr::new(0x02, 0x02, 0x02, 0x02, 0x02, 0x02);

        let (tx, sent) = FakeSender::new(false);
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        // A reply for another address must be skipped, then first-response-wins.
        queue_tx
            .send(reply_frame(proxy, Ipv4Addr::new(192, 168, 1, 51)))
            .unwrap();
        queue_tx.send(reply_frame(replier, target)).unwrap();
        queue_tx.send(reply_frame(proxy, target)).unwrap();

        let mut resolver = resolver_with(tx, queue_rx);
        let resolved = resolver.resolve(target).await.unwrap();

        assert_eq!(resolved, Some(replier));
        // Exactly one broadcast request went out.
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silence_resolves_to_down() {
        let target = Ipv4Addr::new(192, 168, 1, 50);
        let (tx, _sent) = FakeSender::new(false);
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        let mut resolver = resolver_with(tx, queue_rx);
        let resolved = resolver.resolve(target).await.unwrap();

        assert_eq!(resolved, None);
        drop(queue_tx);
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_is_an_error_not_a_hang() {
        let target = Ipv4Addr::new(192, 168, 1, 50);
        let (tx, _sent) = FakeSender::new(true);
        let (_queue_tx, queue_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        let mut resolver = resolver_with(tx, queue_rx);
        let err = resolver.resolve(target).await.unwrap_err();
        assert!(err.to_string().contains("192.168.1.50"));
    }
}
