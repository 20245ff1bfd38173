use thiserror::Error;

/// Errors raised while expanding user-supplied target and port specs.
///
/// These are reported before any packet leaves the machine; nothing
/// that happens during a scan maps onto this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}
