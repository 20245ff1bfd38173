use clap::Parser;

#[derive(Parser)]
#[command(name = "prowlr")]
#[command(about = "LAN host discovery and half-open port scanning.")]
#[command(after_help = "Examples:
  Scan specific IP ranges:  prowlr --ip-ranges \"192.168.1.1-192.168.1.50\" --ports \"22,80\"
  Scan an entire subnet:    prowlr --ip-ranges \"192.168.1.\" --ports \"22,80,443,1000-2000\"")]
pub struct CommandLine {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// IP ranges or subnets to scan (e.g. "192.168.1.1-192.168.1.50,192.168.2.")
    #[arg(long, value_name = "SPEC")]
    pub ip_ranges: Option<String>,

    /// Ports to scan, separated by commas or ranges (e.g. "22,80,443,1000-2000")
    #[arg(long, value_name = "SPEC")]
    pub ports: Option<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
