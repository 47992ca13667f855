//! Thin owning wrapper around a `serialport` handle.

use std::{io::Read as _, io::Write as _, time::Duration};

use crate::errors::TransportError;

/// Baud rate the maple proxy firmware is wired for.
pub const BAUD_RATE: u32 = 57600;

/// Per-read timeout; also the unit the handshake's retry loop sleeps against.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// A single-owner handle to the serial port the maple proxy is attached to.
///
/// `!Sync` by construction: every operation takes `&mut self`, and the
/// underlying `Box<dyn SerialPort>` is never wrapped in anything offering
/// interior mutability, so concurrent access cannot type-check.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink {
    /// Open `path` at `baud_rate`, 8N1, with a 1 s read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Open`] if the port cannot be opened.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open { path: path.to_string(), source })?;
        Ok(Self { port })
    }

    /// Write every byte of `bytes`, blocking until the write completes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] on a failed write.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        Ok(())
    }

    /// Read exactly `buf.len()` bytes, or fail with a timeout `Io` error.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] on a failed or timed-out read.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.port.read_exact(buf)?;
        Ok(())
    }

    /// Read up to one byte, returning `Ok(None)` on a timeout rather than
    /// propagating it as an error. Used by the handshake, where a timed-out
    /// read is an expected "not yet" rather than a failure.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] for any non-timeout read failure.
    pub fn try_read_one(&mut self) -> Result<Option<u8>, TransportError> {
        let mut byte = [0u8; 1];
        match self.port.read_exact(&mut byte) {
            Ok(()) => Ok(Some(byte[0])),
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
