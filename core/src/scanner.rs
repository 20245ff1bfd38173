//! # Scan Orchestration
//!
//! Drives the per-target pipeline: resolve, fingerprint, port sweep.
//! Targets run strictly in expansion order and ports strictly in the order
//! the user gave them; nothing is reordered, deduplicated or parallelised,
//! so two runs against the same network tell the same story.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pnet::util::MacAddr;
use prowlr_common::config::Config;
use tracing::{debug, info, warn};

use crate::fingerprint::Fingerprinter;
use crate::net::transport::PacketTransport;
use crate::probe::{self, ProbeOutcome};
use crate::resolver::AddressResolver;
use crate::vendors::VendorDb;

/// Callback invoked as each target comes up for probing.
pub type ProgressFn = Box<dyn Fn(usize, Ipv4Addr) + Send + Sync>;

/// Everything learned about one target; discarded after reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub addr: Ipv4Addr,
    /// `None` means the host never answered the who-has broadcast.
    pub mac: Option<MacAddr>,
    pub manufacturer: Option<String>,
    pub os: Option<String>,
    pub ports: Vec<(u16, ProbeOutcome)>,
}

impl HostRecord {
    fn down(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            mac: None,
            manufacturer: None,
            os: None,
            ports: Vec::new(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.mac.is_some()
    }

    pub fn open_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports
            .iter()
            .filter(|(_, outcome)| *outcome == ProbeOutcome::Open)
            .map(|(port, _)| *port)
    }
}

/// Owns the probing capabilities and walks the target list with them.
///
/// The collaborators sit behind traits so the whole pipeline runs against
/// fakes in tests; only the cli wires in the raw-socket implementations.
pub struct Scanner {
    resolver: Box<dyn AddressResolver>,
    transport: Box<dyn PacketTransport>,
    fingerprinter: Box<dyn Fingerprinter>,
    vendors: VendorDb,
    cfg: Config,
    src_addr: Ipv4Addr,
    stop: Arc<AtomicBool>,
}

impl Scanner {
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        transport: Box<dyn PacketTransport>,
        fingerprinter: Box<dyn Fingerprinter>,
        vendors: VendorDb,
        cfg: Config,
        src_addr: Ipv4Addr,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            resolver,
            transport,
            fingerprinter,
            vendors,
            cfg,
            src_addr,
            stop,
        }
    }

    /// Sweeps every target against every port.
    ///
    /// The stop signal is honoured between probes, never inside one, so an
    /// interrupt ends the run without cutting a probe short.
    pub async fn run(
        &mut self,
        targets: &[Ipv4Addr],
        ports: &[u16],
        on_target: Option<ProgressFn>,
    ) -> Vec<HostRecord> {
        let mut records = Vec::with_capacity(targets.len());
        for (idx, &target) in targets.iter().enumerate() {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            if let Some(callback) = on_target.as_ref() {
                callback(idx, target);
            }
            records.push(self.scan_host(target, ports).await);
        }
        records
    }

    /// One target through the whole pipeline. A host that never resolves is
    /// reported down and skips both the fingerprint and the port sweep.
    async fn scan_host(&mut self, target: Ipv4Addr, ports: &[u16]) -> HostRecord {
        info!("Scanning host {target}...");
        let mac = match self.resolver.resolve(target).await {
            Ok(mac) => mac,
            Err(e) => {
                warn!("address resolution for {target} failed: {e}");
                None
            }
        };
        let Some(mac) = mac else {
            info!("Host {target} seems down.");
            return HostRecord::down(target);
        };

        let manufacturer = self.vendors.lookup(mac).to_string();
        let os = self.fingerprinter.fingerprint(target);
        info!("Host {target} is up. MAC: {mac}, Manufacturer: {manufacturer}, OS Info: {os}");

        let mut outcomes = Vec::with_capacity(ports.len());
        for &port in ports {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let outcome =
                probe::probe_port(self.transport.as_mut(), self.src_addr, target, port).await;
            match outcome {
                ProbeOutcome::Open => info!("Port {port} is open"),
                other if self.cfg.verbose => debug!("port {port} on {target}: {other:?}"),
                _ => {}
            }
            outcomes.push((port, outcome));
        }

        HostRecord {
            addr: target,
            mac: Some(mac),
            manufacturer: Some(manufacturer),
            os: Some(os),
            ports: outcomes,
        }
    }
}
