use std::net::Ipv4Addr;

use anyhow::{Context, bail};
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

/// Picks the interface the scan runs on: up, broadcast-capable, not loopback
/// or point-to-point, carrying both a MAC and an IPv4 network.
pub fn lan_interface() -> anyhow::Result<NetworkInterface> {
    let candidate = datalink::interfaces().into_iter().find(|intf| {
        intf.is_up()
            && !intf.is_loopback()
            && intf.is_broadcast()
            && !intf.is_point_to_point()
            && intf.mac.is_some()
            && intf.ips.iter().any(IpNetwork::is_ipv4)
    });
    match candidate {
        Some(intf) => Ok(intf),
        None => bail!("no suitable LAN interface found"),
    }
}

/// The interface's primary IPv4 address, used as the probe source.
pub fn ipv4_of(intf: &NetworkInterface) -> anyhow::Result<Ipv4Addr> {
    intf.ips
        .iter()
        .find_map(|net| match net {
            IpNetwork::V4(v4) => Some(v4.ip()),
            _ => None,
        })
        .with_context(|| format!("{} has no IPv4 address", intf.name))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
