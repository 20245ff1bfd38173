use colored::*;
use prowlr_core::scanner::HostRecord;
use unicode_width::UnicodeWidthStr;

use crate::terminal::spinner;

pub const TOTAL_WIDTH: usize = 64;

const BANNER: &str = r#"
  ____  ____   _____        ___     ____
 |  _ \|  _ \ / _ \ \      / / |   |  _ \
 | |_) | |_) | | | \ \ /\ / /| |   | |_) |
 |  __/|  _ <| |_| |\ V  V / | |___|  _ <
 |_|   |_| \_\\___/  \_/\_/  |_____|_| \_\
"#;

pub fn line(msg: &str) {
    spinner::get().println(msg);
}

pub fn banner() {
    let text_content: String = format!("⟦ PROWLR v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2)
        .bright_black();
    let text: ColoredString = text_content.bright_green().bold();
    line(&format!("{}{}{}", sep, text, sep));
    line(&format!("{}", BANNER.bright_green()));
    centerln("LAN discovery and half-open port scanning");
    centerln("Press Ctrl+C to exit");
    line("");
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let rendered: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    line(&format!("{}", rendered));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    line(&format!("{space}{msg}"));
}

pub fn fat_separator() {
    line(&format!("{}", "═".repeat(TOTAL_WIDTH).bright_black()));
}

/// Post-run result tree. Hosts that stayed down were already reported while
/// scanning and do not reappear here.
pub fn report(records: &[HostRecord]) {
    line("");
    header("Scan Results");

    let live: Vec<&HostRecord> = records.iter().filter(|record| record.is_up()).collect();
    if live.is_empty() {
        line(&format!("{}", "No live hosts identified.".red().bold()));
    }

    for (idx, record) in live.iter().enumerate() {
        tree_head(idx, &record.addr.to_string());

        let mut details: Vec<(String, ColoredString)> = Vec::new();
        if let Some(mac) = record.mac {
            details.push(("MAC".to_string(), mac.to_string().cyan()));
        }
        if let Some(manufacturer) = record.manufacturer.as_deref() {
            details.push(("Vendor".to_string(), manufacturer.normal()));
        }
        if let Some(os) = record.os.as_deref() {
            details.push(("OS".to_string(), os.normal()));
        }
        let open: Vec<String> = record.open_ports().map(|port| port.to_string()).collect();
        let rendered: ColoredString = if open.is_empty() {
            "none".dimmed()
        } else {
            open.join(", ").green().bold()
        };
        details.push(("Open".to_string(), rendered));

        as_tree_one_level(details);
        if idx + 1 != live.len() {
            line("");
        }
    }

    let summary: String = format!(
        "Scan complete: {}",
        format!("{} of {} hosts up", live.len(), records.len())
            .bold()
            .green()
    );
    line("");
    fat_separator();
    centerln(&summary);
}

fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().yellow());
    line(&format!(
        "{} {}",
        idx_str.bright_black(),
        name.bright_green()
    ));
}

fn as_tree_one_level(key_value_pairs: Vec<(String, ColoredString)>) {
    for (i, (key, value)) in key_value_pairs.iter().enumerate() {
        let last: bool = i + 1 == key_value_pairs.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key,
            ".".repeat(7usize.saturating_sub(key.len())).bright_black(),
            ":".bright_black(),
            value
        );
        line(&output);
    }
}

pub fn farewell() {
    line("");
    line(&format!("{}", "Prowlr terminated. Goodbye!".bold()));
}
