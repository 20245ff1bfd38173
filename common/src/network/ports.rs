//! Port spec expansion: `"22,80,1000-2000"` into the ordered probe list.

use crate::error::ParseError;

/// Expands a comma-separated port spec into the exact probe order.
///
/// Duplicates are preserved and an inverted span (`M < N`) contributes
/// nothing, matching the behavior of the range expander.
pub fn expand_ports(spec: &str) -> Result<Vec<u16>, ParseError> {
    let mut ports: Vec<u16> = Vec::new();
    for item in spec.split(',') {
        let item = item.trim();
        if let Some((start, end)) = item.split_once('-') {
            ports.extend(parse_port(start)?..=parse_port(end)?);
        } else {
            ports.push(parse_port(item)?);
        }
    }
    Ok(ports)
}

fn parse_port(s: &str) -> Result<u16, ParseError> {
    s.parse::<u16>()
        .map_err(|_| ParseError::InvalidPort(s.to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
