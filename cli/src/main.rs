mod commands;
mod terminal;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use commands::CommandLine;
use prowlr_common::config::Config;
use prowlr_common::network::{ports, range};
use prowlr_core::fingerprint::NmapFingerprinter;
use prowlr_core::net::iface;
use prowlr_core::net::transport::TcpTransport;
use prowlr_core::resolver::ArpResolver;
use prowlr_core::scanner::{ProgressFn, Scanner};
use prowlr_core::vendors::VendorDb;
use terminal::{logging, print, spinner};
use tracing::{error, info, warn};

/// The vendor prefix database ships next to the binary.
const OUI_DATABASE_PATH: &str = "oui.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse_args();
    let cfg = Config {
        verbose: args.verbose,
    };

    logging::init(cfg.verbose);
    print::banner();

    let Some(ranges_spec) = args.ip_ranges else {
        error!("IP ranges (--ip-ranges) are required.");
        return Ok(());
    };
    let Some(ports_spec) = args.ports else {
        error!("Ports (--ports) are required.");
        return Ok(());
    };

    let targets = range::expand_ip_ranges(&ranges_spec)?;
    let ports = ports::expand_ports(&ports_spec)?;
    info!("{} targets and {} ports queued", targets.len(), ports.len());

    let vendors = VendorDb::load(Path::new(OUI_DATABASE_PATH))
        .context("the OUI vendor database is required; place oui.txt in the working directory")?;
    info!("Loaded {} vendor prefixes", vendors.len());

    if !is_root::is_root() {
        warn!("not running as root; raw-socket probes will likely fail");
    }

    let intf = iface::lan_interface()?;
    let src_addr = iface::ipv4_of(&intf)?;
    info!("Selected {} with address {src_addr}", intf.name);

    let resolver = ArpResolver::open(&intf)?;
    let transport = TcpTransport::open()?;
    let fingerprinter = NmapFingerprinter::new(cfg);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut scanner = Scanner::new(
        Box::new(resolver),
        Box::new(transport),
        Box::new(fingerprinter),
        vendors,
        cfg,
        src_addr,
        stop.clone(),
    );

    let total = targets.len();
    let on_target: ProgressFn = Box::new(move |idx, addr| {
        spinner::get().set_message(format!("Probing {addr} ({}/{total})", idx + 1));
    });

    let records = scanner.run(&targets, &ports, Some(on_target)).await;
    spinner::finish();

    if stop.load(Ordering::Relaxed) {
        print::farewell();
        return Ok(());
    }
    print::report(&records);
    Ok(())
}
