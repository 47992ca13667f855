//! The Sans-IO seam between the transaction core and a concrete transport.

use std::io;

/// Abstracts "send a framed request to the proxy, get back zero or more raw
/// sample-packed bytes" — the proxy wire format lives entirely on the
/// implementor's side of this trait.
///
/// `maple-core` drives retries, skip arithmetic and duplicate-confirmation
/// against this trait only; `maple-transport` is the sole crate that backs
/// it with a real serial port. Tests back it with an in-memory double.
pub trait ProxyTransport {
    /// Frame one request (`frame`, already checksummed) together with the
    /// given `recv_skip` sample-slot count, send it to the proxy, and
    /// return the raw sample-packed bytes of its response.
    ///
    /// An empty vector means the proxy reported a zero-length response (no
    /// device answered this round). This method does not decode anything;
    /// decoding is the transaction core's job.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the underlying transport fails to write
    /// or read.
    fn round_trip(&mut self, frame: &[u8], recv_skip: u16) -> io::Result<Vec<u8>>;
}
