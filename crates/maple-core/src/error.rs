//! Error types for the transaction core.

use thiserror::Error;

/// Errors that can occur while driving a Maple transaction.
#[derive(Error, Debug)]
pub enum MapleError {
    /// The proxy handshake did not complete within its budget. Fatal; the
    /// session should be aborted.
    #[error("proxy not found: {0}")]
    ProxyNotFound(String),

    /// The underlying transport failed to send or receive.
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The proxy reported a zero-length response (no device answered).
    #[error("short response: proxy returned no data")]
    ShortResponse,

    /// The decoder never observed a sustained idle run within the retry
    /// budget; the accumulated bytes may be incomplete.
    #[error("decode incomplete after {attempts} attempt(s)")]
    DecodeIncomplete {
        /// Number of proxy round-trips attempted.
        attempts: u32,
    },

    /// A caller-side precondition was violated (payload alignment, fixed
    /// buffer size). Refuse to send rather than transmit malformed data.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A frame-level protocol error surfaced while encoding a request.
    #[error("protocol error: {0}")]
    Protocol(#[from] maple_proto::ProtocolError),
}

/// Convenience alias for `Result<T, MapleError>`.
pub type Result<T> = std::result::Result<T, MapleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_convert_via_from() {
        let err: MapleError = maple_proto::ProtocolError::UnalignedPayload(3).into();
        assert!(matches!(err, MapleError::Protocol(_)));
    }
}
