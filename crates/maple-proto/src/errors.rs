//! Error types for frame construction and parsing.

use thiserror::Error;

/// Errors raised while building or parsing a Maple frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload length was not a multiple of 4 bytes.
    #[error("payload length {0} is not a multiple of 4")]
    UnalignedPayload(usize),

    /// Payload length reached or exceeded the 256-byte frame limit.
    #[error("payload length {0} is too large (must be < 256 bytes)")]
    PayloadTooLarge(usize),

    /// A buffer handed to a parser was shorter than the format requires.
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Minimum required length.
        expected: usize,
        /// Actual length supplied.
        actual: usize,
    },
}

/// Convenience alias for `Result<T, ProtocolError>`.
pub type Result<T> = std::result::Result<T, ProtocolError>;
