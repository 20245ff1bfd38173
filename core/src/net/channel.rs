use std::time::Duration;

use anyhow::{Context, bail};
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// A raw ethernet endpoint: frames go out through `tx`, every frame seen on
/// the interface arrives on `rx` via a background capture thread.
pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: UnboundedReceiver<Vec<u8>>,
}

pub fn start_capture(intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
    let (tx, rx_link) = open_eth_channel(intf, &capture_config(), datalink::channel)?;
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    spawn_frame_listener(queue_tx, rx_link);
    Ok(EthernetHandle { tx, rx: queue_rx })
}

fn spawn_frame_listener(queue_tx: UnboundedSender<Vec<u8>>, mut rx: Box<dyn DataLinkReceiver>) {
    std::thread::spawn(move || {
        loop {
            match rx.next() {
                Ok(frame) => {
                    if queue_tx.send(frame.to_vec()).is_err() {
                        break;
                    }
                }
                // Read timeouts surface as errors; use them to notice a
                // dropped receiver during quiet periods.
                Err(_) => {
                    if queue_tx.is_closed() {
                        break;
                    }
                }
            }
        }
    });
}

fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)>
where
    F: FnOnce(&NetworkInterface, Config) -> std::io::Result<datalink::Channel>,
{
    let ch: Channel =
        channel_opener(intf, *cfg).with_context(|| format!("opening on {}", intf.name))?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => bail!("non-ethernet channel for {}", intf.name),
    }
}

fn capture_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
