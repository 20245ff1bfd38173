pub mod channel;
pub mod iface;
pub mod packets;
pub mod transport;
