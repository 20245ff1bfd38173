//! Best-effort OS identification via the external nmap binary.
//!
//! nmap is an opaque collaborator here: its combined output is captured and
//! pattern-matched, and every failure mode collapses into a fixed result
//! string rather than an error.

use std::net::Ipv4Addr;
use std::process::Command;

use prowlr_common::config::Config;
use tracing::{info, warn};

pub const OS_NOT_DETECTED: &str = "OS not detected";
pub const DETECTION_FAILED: &str = "Nmap OS detection failed";

const NMAP_PROGRAM: &str = "nmap";
const NMAP_ARGS: [&str; 2] = ["-O", "--osscan-guess"];
/// A line carrying either marker is the whole summary.
const OS_MARKERS: [&str; 2] = ["OS details", "Running"];

pub trait Fingerprinter: Send {
    /// Always yields a displayable string; collaborator failures degrade to
    /// sentinel values instead of propagating.
    fn fingerprint(&self, target: Ipv4Addr) -> String;
}

pub struct NmapFingerprinter {
    program: String,
    cfg: Config,
}

impl NmapFingerprinter {
    pub fn new(cfg: Config) -> Self {
        Self::with_program(NMAP_PROGRAM, cfg)
    }

    /// Points the probe at a specific binary, e.g. an nmap outside `PATH`.
    pub fn with_program(program: impl Into<String>, cfg: Config) -> Self {
        Self {
            program: program.into(),
            cfg,
        }
    }
}

impl Fingerprinter for NmapFingerprinter {
    fn fingerprint(&self, target: Ipv4Addr) -> String {
        let output = match Command::new(&self.program)
            .args(NMAP_ARGS)
            .arg(target.to_string())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("failed to launch {}: {e}", self.program);
                return DETECTION_FAILED.to_string();
            }
        };
        if !output.status.success() {
            return DETECTION_FAILED.to_string();
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if self.cfg.verbose {
            // Verbose trades the one-line summary for the full capture.
            info!("Nmap OS detection output:");
            info!("{text}");
            return OS_NOT_DETECTED.to_string();
        }
        summarize(&text).unwrap_or_else(|| OS_NOT_DETECTED.to_string())
    }
}

/// First line naming an OS, trimmed.
pub fn summarize(text: &str) -> Option<String> {
    text.lines()
        .find(|line| OS_MARKERS.iter().any(|marker| line.contains(marker)))
        .map(|line| line.trim().to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
