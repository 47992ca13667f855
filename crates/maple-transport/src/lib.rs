//! Serial-port-backed [`ProxyTransport`] implementation.
//!
//! Owns a [`SerialLink`], performs the are-you-there [`handshake`] once at
//! connect time, and implements the proxy wire framing (length-prefixed
//! frame out, length-prefixed sample payload in) that `maple-core`'s
//! [`Transactor`](maple_core::Transactor) is generic over.

mod errors;
mod handshake;
mod serial_link;

pub use errors::TransportError;
pub use serial_link::{SerialLink, BAUD_RATE, READ_TIMEOUT};

use std::io;

use maple_core::{MapleError, ProxyTransport};
use tracing::debug;

/// A [`ProxyTransport`] backed by a real serial port.
pub struct SerialProxyTransport {
    link: SerialLink,
}

impl SerialProxyTransport {
    /// Open `path` at `baud_rate` and run the are-you-there handshake.
    ///
    /// # Errors
    ///
    /// Returns [`MapleError::Io`] if the port cannot be opened or a
    /// read/write fails, or [`MapleError::ProxyNotFound`] if the handshake
    /// never observes a reply within its budget.
    pub fn connect(path: &str, baud_rate: u32) -> Result<Self, MapleError> {
        let mut link = SerialLink::open(path, baud_rate)
            .map_err(|err| MapleError::Io(io::Error::other(err)))?;
        handshake::perform(&mut link).map_err(|err| MapleError::ProxyNotFound(err.to_string()))?;
        Ok(Self { link })
    }
}

impl ProxyTransport for SerialProxyTransport {
    fn round_trip(&mut self, frame: &[u8], recv_skip: u16) -> io::Result<Vec<u8>> {
        #[allow(clippy::cast_possible_truncation)]
        let frame_length = frame.len() as u8;

        let mut header = Vec::with_capacity(3);
        header.push(frame_length);
        header.extend_from_slice(&recv_skip.to_le_bytes());

        self.link.write_all(&header).map_err(io::Error::other)?;
        self.link.write_all(frame).map_err(io::Error::other)?;

        let mut length_bytes = [0u8; 2];
        // A read timeout here is the ordinary "no device answered" case,
        // not a transport failure: treat it the same as an explicit
        // zero-length response, the way handshake.rs's try_read_one does.
        match self.link.read_exact(&mut length_bytes) {
            Ok(()) => {}
            Err(TransportError::Io(err)) if err.kind() == io::ErrorKind::TimedOut => {
                debug!(frame_len = frame.len(), recv_skip, "proxy read timed out, no response");
                return Ok(Vec::new());
            }
            Err(err) => return Err(io::Error::other(err)),
        }
        let payload_length = u16::from_be_bytes(length_bytes) as usize;

        if payload_length == 0 {
            debug!(frame_len = frame.len(), recv_skip, "empty proxy response");
            return Ok(Vec::new());
        }

        let mut payload = vec![0u8; payload_length];
        self.link.read_exact(&mut payload).map_err(io::Error::other)?;
        debug!(frame_len = frame.len(), recv_skip, payload_length, "proxy response");
        Ok(payload)
    }
}
