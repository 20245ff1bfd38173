//! End-to-end orchestration tests with deterministic collaborators standing
//! in for the network and the fingerprint subprocess.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use pnet::packet::tcp::{MutableTcpPacket, TcpFlags, TcpPacket};
use pnet::util::MacAddr;
use prowlr_common::config::Config;
use prowlr_core::fingerprint::Fingerprinter;
use prowlr_core::net::transport::PacketTransport;
use prowlr_core::probe::ProbeOutcome;
use prowlr_core::scanner::{HostRecord, Scanner};
use prowlr_core::resolver::AddressResolver;
use prowlr_core::vendors::{UNKNOWN_MANUFACTURER, VendorDb};

const SRC_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
const OUI_SAMPLE: &str = "AA-BB-CC   (base 16)\t\tExampleCorp\n";

struct FakeResolver {
    neighbours: HashMap<Ipv4Addr, MacAddr>,
}

#[async_trait]
impl AddressResolver for FakeResolver {
    async fn resolve(&mut self, target: Ipv4Addr) -> anyhow::Result<Option<MacAddr>> {
        Ok(self.neighbours.get(&target).copied())
    }
}

/// Answers every probe from its destination with a fixed flag byte, or stays
/// silent when no flags are scripted.
struct FakeTransport {
    response_flags: Option<u8>,
    pending: Option<(Vec<u8>, IpAddr)>,
}

impl FakeTransport {
    fn answering_with(response_flags: Option<u8>) -> Self {
        Self {
            response_flags,
            pending: None,
        }
    }
}

#[async_trait]
impl PacketTransport for FakeTransport {
    fn send(&mut self, segment: &[u8], destination: IpAddr) -> anyhow::Result<()> {
        if let Some(flags) = self.response_flags {
            let probe = TcpPacket::new(segment).expect("probe segment parses");
            let mut buffer = vec![0u8; 20];
            let mut tcp = MutableTcpPacket::new(&mut buffer).unwrap();
            tcp.set_source(probe.get_destination());
            tcp.set_destination(probe.get_source());
            tcp.set_data_offset(5);
            tcp.set_flags(flags);
            self.pending = Some((buffer, destination));
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<(Vec<u8>, IpAddr)> {
        match self.pending.take() {
            Some(reply) => Some(reply),
            None => std::future::pending().await,
        }
    }
}

struct FakeFingerprinter {
    calls: Arc<AtomicUsize>,
    result: &'static str,
}

impl Fingerprinter for FakeFingerprinter {
    fn fingerprint(&self, _target: Ipv4Addr) -> String {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.result.to_string()
    }
}

struct Harness {
    fingerprint_calls: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    scanner: Scanner,
}

fn harness(neighbours: HashMap<Ipv4Addr, MacAddr>, response_flags: Option<u8>) -> Harness {
    let fingerprint_calls = Arc::new(AtomicUsize::new(0));
    let stop = Arc::new(AtomicBool::new(false));
    let scanner = Scanner::new(
        Box::new(FakeResolver { neighbours }),
        Box::new(FakeTransport::answering_with(response_flags)),
        Box::new(FakeFingerprinter {
            calls: fingerprint_calls.clone(),
            result: "Running: Linux 5.X",
        }),
        VendorDb::parse(OUI_SAMPLE),
        Config::default(),
        SRC_ADDR,
        stop.clone(),
    );
    Harness {
        fingerprint_calls,
        stop,
        scanner,
    }
}

fn known_mac() -> MacAddr {
    MacAddr::new(0xaa, 0xbb, 0xcc, 0x01, 0x02, 0x03)
}

#[tokio::test(start_paused = true)]
async fn down_host_skips_fingerprint_and_ports() {
    let target = Ipv4Addr::new(10, 0, 0, 5);
    let mut h = harness(HashMap::new(), Some(TcpFlags::SYN | TcpFlags::ACK));

    let records = h.scanner.run(&[target], &[80], None).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.addr, target);
    assert!(!record.is_up());
    assert!(record.ports.is_empty());
    assert_eq!(h.fingerprint_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test(start_paused = true)]
async fn up_host_is_enriched_and_swept_in_order() {
    let target = Ipv4Addr::new(192, 168, 1, 50);
    let neighbours = HashMap::from([(target, known_mac())]);
    let mut h = harness(neighbours, Some(TcpFlags::SYN | TcpFlags::ACK));

    let ports = [443, 22, 443];
    let records = h.scanner.run(&[target], &ports, None).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.mac, Some(known_mac()));
    assert_eq!(record.manufacturer.as_deref(), Some("ExampleCorp"));
    assert_eq!(record.os.as_deref(), Some("Running: Linux 5.X"));
    assert_eq!(h.fingerprint_calls.load(Ordering::Relaxed), 1);

    // Port order and duplicates follow the user-given list exactly.
    let probed: Vec<u16> = record.ports.iter().map(|(port, _)| *port).collect();
    assert_eq!(probed, vec![443, 22, 443]);
    assert!(record
        .ports
        .iter()
        .all(|(_, outcome)| *outcome == ProbeOutcome::Open));
    assert_eq!(record.open_ports().collect::<Vec<u16>>(), vec![443, 22, 443]);
}

#[tokio::test(start_paused = true)]
async fn unknown_prefix_resolves_to_the_sentinel() {
    let target = Ipv4Addr::new(192, 168, 1, 50);
    let stranger = MacAddr::new(0x11, 0x22, 0x33, 0x44, 0x55, 0x66);
    let neighbours = HashMap::from([(target, stranger)]);
    let mut h = harness(neighbours, Some(TcpFlags::SYN | TcpFlags::ACK));

    let records = h.scanner.run(&[target], &[], None).await;
    assert_eq!(
        records[0].manufacturer.as_deref(),
        Some(UNKNOWN_MANUFACTURER)
    );
}

#[tokio::test(start_paused = true)]
async fn closed_ports_never_surface_as_open() {
    let target = Ipv4Addr::new(192, 168, 1, 50);
    let neighbours = HashMap::from([(target, known_mac())]);
    let mut h = harness(neighbours, Some(TcpFlags::RST));

    let records = h.scanner.run(&[target], &[22, 80], None).await;
    let record = &records[0];
    assert!(record
        .ports
        .iter()
        .all(|(_, outcome)| *outcome == ProbeOutcome::Closed));
    assert_eq!(record.open_ports().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn silent_ports_fold_into_no_response() {
    let target = Ipv4Addr::new(192, 168, 1, 50);
    let neighbours = HashMap::from([(target, known_mac())]);
    let mut h = harness(neighbours, None);

    let records = h.scanner.run(&[target], &[8080], None).await;
    assert_eq!(records[0].ports, vec![(8080, ProbeOutcome::NoResponse)]);
}

#[tokio::test(start_paused = true)]
async fn targets_run_in_spec_order_with_duplicates() {
    let a = Ipv4Addr::new(10, 0, 0, 1);
    let b = Ipv4Addr::new(10, 0, 0, 2);
    let mut h = harness(HashMap::new(), None);

    let records = h.scanner.run(&[b, a, b], &[80], None).await;
    let order: Vec<Ipv4Addr> = records.iter().map(|record| record.addr).collect();
    assert_eq!(order, vec![b, a, b]);
}

#[tokio::test(start_paused = true)]
async fn repeated_runs_over_down_targets_are_identical() {
    let targets = [Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)];

    let mut first = harness(HashMap::new(), None);
    let mut second = harness(HashMap::new(), None);

    let first_records: Vec<HostRecord> = first.scanner.run(&targets, &[80], None).await;
    let second_records: Vec<HostRecord> = second.scanner.run(&targets, &[80], None).await;

    assert_eq!(first_records, second_records);
}

#[tokio::test(start_paused = true)]
async fn a_raised_stop_signal_ends_the_run() {
    let target = Ipv4Addr::new(10, 0, 0, 1);
    let mut h = harness(HashMap::new(), None);
    h.stop.store(true, Ordering::Relaxed);

    let records = h.scanner.run(&[target], &[80], None).await;
    assert!(records.is_empty());
    assert_eq!(h.fingerprint_calls.load(Ordering::Relaxed), 0);
}
