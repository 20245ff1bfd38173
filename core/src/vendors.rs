//! Manufacturer lookup backed by an OUI prefix database.
//!
//! The database is the plain-text registry format: entries carry a
//! `"(base 16)"` marker separating the hex prefix from the organisation name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use pnet::util::MacAddr;

pub const UNKNOWN_MANUFACTURER: &str = "Unknown Manufacturer";

const OUI_MARKER: &str = "(base 16)";
/// Three octets plus two separators of a colon-formatted address.
const PREFIX_LEN: usize = 8;

pub struct VendorDb {
    entries: HashMap<String, String>,
}

impl VendorDb {
    /// Loads the database from disk. A missing file is the one startup
    /// condition the scanner cannot work around.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading OUI database at {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Lines without the marker are ignored; prefixes are normalised to
    /// lowercase colon-separated form.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            if let Some((prefix, manufacturer)) = line.split_once(OUI_MARKER) {
                let prefix = prefix.trim().replace('-', ":").to_lowercase();
                entries.insert(prefix, manufacturer.trim().to_string());
            }
        }
        Self { entries }
    }

    /// Resolves a hardware address to its manufacturer, keyed by the first
    /// three octets. A miss resolves to [`UNKNOWN_MANUFACTURER`], never an
    /// error.
    pub fn lookup(&self, mac: MacAddr) -> &str {
        let prefix: String = mac
            .to_string()
            .to_lowercase()
            .chars()
            .take(PREFIX_LEN)
            .collect();
        self.entries
            .get(&prefix)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_MANUFACTURER)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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
