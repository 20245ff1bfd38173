//! # Target Range Expansion
//!
//! Turns the `--ip-ranges` spec into the flat, ordered list of addresses the
//! scanner walks. Two item forms are accepted:
//! * `A-B`: two full dotted quads, expanded inclusively in ascending order.
//! * `192.168.1.`: a prefix ending in a dot, read as that /24 and expanded to
//!   its usable hosts (network and broadcast excluded).
//!
//! Items are concatenated in input order and never deduplicated; the scan order
//! is exactly the enumeration order.

use std::net::Ipv4Addr;

use crate::error::ParseError;

/// An inclusive span of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Ascending iteration; empty when `end_addr < start_addr`.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }
}

/// Expands a comma-separated range spec into scan targets.
///
/// An inverted range (`B < A`) contributes nothing rather than erroring.
/// That mirrors plain enumeration and is kept deliberately.
pub fn expand_ip_ranges(spec: &str) -> Result<Vec<Ipv4Addr>, ParseError> {
    let mut targets: Vec<Ipv4Addr> = Vec::new();
    for item in spec.split(',') {
        let item = item.trim();
        if let Some((start, end)) = item.split_once('-') {
            let range = Ipv4Range::new(parse_addr(start)?, parse_addr(end)?);
            targets.extend(range.iter());
        } else {
            targets.extend(subnet_hosts(item)?);
        }
    }
    Ok(targets)
}

fn parse_addr(s: &str) -> Result<Ipv4Addr, ParseError> {
    s.parse::<Ipv4Addr>()
        .map_err(|_| ParseError::InvalidAddress(s.to_string()))
}

/// `"192.168.1."` means every usable host of `192.168.1.0/24`.
///
/// The prefix is completed with a trailing `0` and masked down to its /24, so
/// host bits in the completed address are tolerated the same way a non-strict
/// network parse would tolerate them.
fn subnet_hosts(prefix: &str) -> Result<impl Iterator<Item = Ipv4Addr>, ParseError> {
    let completed: Ipv4Addr = format!("{prefix}0")
        .parse()
        .map_err(|_| ParseError::InvalidAddress(prefix.to_string()))?;
    let network = u32::from(completed) & !0xff;
    Ok(((network + 1)..(network + 255)).map(Ipv4Addr::from))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
