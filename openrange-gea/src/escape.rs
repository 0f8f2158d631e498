//! Byte stuffing for the GEA2 wire format
//!
//! Four byte values are reserved as control markers. Inside a frame body
//! they are prefixed with [`ESCAPE`] and transmitted unchanged; the first
//! and last byte of a frame are the delimiters themselves and are never
//! escaped. Destuffing is the exact inverse, so after an [`ESCAPE`] only
//! one of the four reserved values may appear.

use crate::frame::MAX_FRAME_SIZE;
use heapless::Vec;

/// Escape marker, prefixes a reserved value inside a frame body
pub const ESCAPE: u8 = 0xE0;
/// Acknowledge marker, written after every transmitted frame
pub const ACK: u8 = 0xE1;
/// Start-of-frame delimiter
pub const FRAME_START: u8 = 0xE2;
/// End-of-frame delimiter
pub const FRAME_END: u8 = 0xE3;

/// Worst-case wire size: every interior byte escaped
pub const MAX_WIRE_SIZE: usize = 2 * MAX_FRAME_SIZE - 2;

/// Errors that can occur while stuffing or destuffing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EscapeError {
    /// An escape marker with no byte following it
    TruncatedEscape,
    /// The byte after an escape marker was not a reserved value
    UnrecognizedEscape,
    /// Output buffer too small for the result
    BufferTooSmall,
}

/// Check if a byte value must be escaped inside a frame body
#[inline]
pub fn needs_escape(byte: u8) -> bool {
    matches!(byte, ESCAPE | ACK | FRAME_START | FRAME_END)
}

/// Result of a stuffing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stuffed {
    /// Total bytes written to the output
    pub len: usize,
    /// How many escape markers were inserted
    pub inserted: usize,
}

/// Escape a frame for transmission
///
/// Byte 0 and the last byte are copied unchanged; every interior reserved
/// byte is prefixed with [`ESCAPE`]. Returns the output length together
/// with the number of inserted markers so the caller knows the true wire
/// length.
pub fn stuff(frame: &[u8], out: &mut [u8]) -> Result<Stuffed, EscapeError> {
    let last = frame.len().saturating_sub(1);
    let mut written = 0;
    let mut inserted = 0;

    for (i, &byte) in frame.iter().enumerate() {
        if i != 0 && i != last && needs_escape(byte) {
            if written >= out.len() {
                return Err(EscapeError::BufferTooSmall);
            }
            out[written] = ESCAPE;
            written += 1;
            inserted += 1;
        }
        if written >= out.len() {
            return Err(EscapeError::BufferTooSmall);
        }
        out[written] = byte;
        written += 1;
    }

    Ok(Stuffed {
        len: written,
        inserted,
    })
}

/// Escape a frame into an owned buffer
pub fn stuff_to_vec(frame: &[u8]) -> Result<(Vec<u8, MAX_WIRE_SIZE>, usize), EscapeError> {
    let mut buffer = [0u8; MAX_WIRE_SIZE];
    let stuffed = stuff(frame, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..stuffed.len])
        .map_err(|()| EscapeError::BufferTooSmall)?;
    Ok((vec, stuffed.inserted))
}

/// Remove escape markers from a received wire buffer
///
/// The first and last byte are copied unchanged, mirroring [`stuff`].
/// Returns the number of bytes written to `out`.
pub fn destuff(wire: &[u8], out: &mut [u8]) -> Result<usize, EscapeError> {
    let last = wire.len().saturating_sub(1);
    let mut written = 0;
    let mut i = 0;

    while i < wire.len() {
        let value = if i != 0 && i != last && wire[i] == ESCAPE {
            i += 1;
            if i >= last {
                // Dangling escape: the next byte is the terminator or
                // missing entirely
                return Err(EscapeError::TruncatedEscape);
            }
            let escaped = wire[i];
            if !needs_escape(escaped) {
                return Err(EscapeError::UnrecognizedEscape);
            }
            escaped
        } else {
            wire[i]
        };

        if written >= out.len() {
            return Err(EscapeError::BufferTooSmall);
        }
        out[written] = value;
        written += 1;
        i += 1;
    }

    Ok(written)
}

/// Remove escape markers into an owned buffer
pub fn destuff_to_vec(wire: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, EscapeError> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = destuff(wire, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|()| EscapeError::BufferTooSmall)?;
    Ok(vec)
}
