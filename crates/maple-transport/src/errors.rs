//! Error type for the serial-port-backed [`ProxyTransport`] implementation.
//!
//! [`ProxyTransport`]: maple_core::ProxyTransport

use std::time::Duration;

use thiserror::Error;

/// Errors raised while opening or driving the physical serial link.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to open the serial port at the given path.
    #[error("failed to open serial port {path}: {source}")]
    Open {
        /// Platform device path, e.g. `/dev/ttyUSB0` or `COM3`.
        path: String,
        /// Underlying `serialport` failure.
        #[source]
        source: serialport::Error,
    },

    /// A read or write on an already-open port failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// No `0x01` are-you-there reply was observed within the handshake's
    /// total time budget.
    #[error("proxy handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),
}
