//! Frame construction, parsing, word-swap and checksum.
//!
//! Wire layout: `[cmd][recipient][sender][word_count][payload...][xor_checksum]`.
//! The four header bytes are also the little-endian encoding of the 32-bit
//! word `(cmd << 24) | (recipient << 16) | (sender << 8) | word_count`, so the
//! first byte on the wire is `word_count` and the last is `cmd`.

use crate::{
    address::Address,
    errors::{ProtocolError, Result},
};

/// Maximum payload length a single frame may carry (exclusive).
pub const MAX_PAYLOAD_LEN: usize = 256;

/// The four fixed fields carried by every Maple frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Command byte (see [`crate::Command`]).
    pub cmd: u8,
    /// Destination address.
    pub recipient: Address,
    /// Source address (`0x00` for host-originated frames).
    pub sender: Address,
    /// Payload length in 32-bit words.
    pub word_count: u8,
}

/// XOR every byte together. The empty slice checksums to zero.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Build a complete outbound frame: header, payload, trailing checksum byte.
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLarge`] if `payload.len() >=
/// `MAX_PAYLOAD_LEN`, or [`ProtocolError::UnalignedPayload`] if its length is
/// not a multiple of 4.
pub fn encode_request(cmd: u8, recipient: Address, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() >= MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge(payload.len()));
    }
    if payload.len() % 4 != 0 {
        return Err(ProtocolError::UnalignedPayload(payload.len()));
    }

    #[allow(clippy::cast_possible_truncation)]
    let word_count = (payload.len() / 4) as u8;

    let mut frame = Vec::with_capacity(5 + payload.len());
    frame.push(word_count);
    frame.push(crate::address::ADDRESS_HOST); // sender
    frame.push(recipient);
    frame.push(cmd);
    frame.extend_from_slice(payload);
    frame.push(checksum(&frame));
    Ok(frame)
}

/// Parse the four-byte header prefix of an inbound frame.
///
/// # Errors
///
/// Returns [`ProtocolError::BufferTooShort`] if fewer than 4 bytes are given.
pub fn decode_header(frame: &[u8]) -> Result<FrameHeader> {
    if frame.len() < 4 {
        return Err(ProtocolError::BufferTooShort { expected: 4, actual: frame.len() });
    }
    Ok(FrameHeader {
        word_count: frame[0],
        sender: frame[1],
        recipient: frame[2],
        cmd: frame[3],
    })
}

/// Reverse the byte order within each 4-byte group.
///
/// Self-inverse and length-preserving. Bridges the bus's per-word big-endian
/// field layout and little-endian payload fields.
///
/// # Errors
///
/// Returns [`ProtocolError::UnalignedPayload`] if `bytes.len()` is not a
/// multiple of 4.
pub fn word_swap(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() % 4 != 0 {
        return Err(ProtocolError::UnalignedPayload(bytes.len()));
    }

    let mut out = Vec::with_capacity(bytes.len());
    for chunk in bytes.chunks_exact(4) {
        out.extend(chunk.iter().rev());
    }
    Ok(out)
}
