//! Frame building, validation, and parsing
//!
//! Unescaped frame layout:
//! ```text
//! ┌───────┬─────┬────────┬─────┬─────┬─────────────┬────────┬────────┬─────┐
//! │ START │ DST │ LENGTH │ SRC │ CMD │ PAYLOAD     │ CRC HI │ CRC LO │ END │
//! │ 0xE2  │ 1B  │ 1B     │ 1B  │ 1B  │ 0–247B      │ 1B     │ 1B     │0xE3 │
//! └───────┴─────┴────────┴─────┴─────┴─────────────┴────────┴────────┴─────┘
//! ```
//!
//! LENGTH counts the whole frame including both delimiters, so it is always
//! payload length + 8. The CRC covers everything from the start marker
//! through the end of the payload, computed over unescaped bytes.

use crate::crc;
use crate::escape::{FRAME_END, FRAME_START};
use heapless::Vec;

/// Fixed per-frame overhead: 5-byte header + 2-byte CRC + terminator
pub const OVERHEAD: usize = 8;

/// Bus address of this node. Protocol constant shared with the boards.
pub const LOCAL_ADDR: u8 = 0x87;

/// Maximum unescaped frame size; the length field is a single byte
pub const MAX_FRAME_SIZE: usize = 255;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - OVERHEAD;

/// Header bytes preceding the payload
const HEADER_SIZE: usize = 5;

/// Payload of a single message
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// Errors that can occur while building or parsing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Byte 0 was not the start-of-frame marker
    InvalidStart,
    /// Declared length disagrees with the observed frame length
    LengthMismatch,
    /// Recomputed CRC disagrees with the transmitted trailer
    ChecksumMismatch,
    /// Last byte was not the end-of-frame marker
    MissingTerminator,
}

/// One validated bus message
///
/// Owned by whichever layer produced it; the payload is copied out of any
/// transient receive buffer on parse and never aliases it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    /// Destination node address
    pub destination: u8,
    /// Source node address
    pub source: u8,
    /// Command code
    pub command: u8,
    /// Command payload
    pub payload: Payload,
}

impl Message {
    /// Create an outgoing message from this node
    ///
    /// Rejects payloads that would push the single-byte length field past
    /// 255 before any I/O happens.
    pub fn request(destination: u8, command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(payload)
            .map_err(|()| FrameError::PayloadTooLarge)?;

        Ok(Self {
            destination,
            source: LOCAL_ADDR,
            command,
            payload: bytes,
        })
    }

    /// Total unescaped frame length for this message
    pub fn frame_len(&self) -> usize {
        self.payload.len() + OVERHEAD
    }

    /// Encode this message into an unescaped frame
    ///
    /// Returns the number of bytes written. The caller is responsible for
    /// stuffing the result before transmission and for appending the
    /// acknowledge marker after the escaped bytes.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.frame_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let body_end = HEADER_SIZE + self.payload.len();

        buffer[0] = FRAME_START;
        buffer[1] = self.destination;
        buffer[2] = frame_len as u8;
        buffer[3] = self.source;
        buffer[4] = self.command;
        buffer[HEADER_SIZE..body_end].copy_from_slice(&self.payload);

        let crc = crc::checksum(&buffer[..body_end]);
        buffer[body_end] = (crc >> 8) as u8;
        buffer[body_end + 1] = (crc & 0xFF) as u8;
        buffer[body_end + 2] = FRAME_END;

        Ok(frame_len)
    }

    /// Encode this message into an owned unescaped frame
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|()| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Validate an unescaped frame and extract the message
    ///
    /// Each validation failure is distinct so the caller can tell a garbled
    /// frame from a truncated one:
    /// 1. byte 0 must be the start marker,
    /// 2. the declared length must match the observed length (and cover the
    ///    fixed overhead),
    /// 3. the recomputed CRC must match the big-endian trailer,
    /// 4. the last byte must be the end marker.
    pub fn parse(frame: &[u8]) -> Result<Self, FrameError> {
        if frame.first() != Some(&FRAME_START) {
            return Err(FrameError::InvalidStart);
        }

        let len = frame.len();
        if len < OVERHEAD || usize::from(frame[2]) != len {
            return Err(FrameError::LengthMismatch);
        }

        let computed = crc::checksum(&frame[..len - 3]);
        let received = u16::from_be_bytes([frame[len - 3], frame[len - 2]]);
        if computed != received {
            return Err(FrameError::ChecksumMismatch);
        }

        if frame[len - 1] != FRAME_END {
            return Err(FrameError::MissingTerminator);
        }

        let mut payload = Vec::new();
        payload
            .extend_from_slice(&frame[HEADER_SIZE..len - 3])
            .map_err(|()| FrameError::LengthMismatch)?;

        Ok(Self {
            destination: frame[1],
            source: frame[3],
            command: frame[4],
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_power_level_frame() {
        let msg = Message::request(0x88, 0x28, &[0x0A, 0x0B, 0x00]).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        assert_eq!(
            &frame[..],
            &[0xE2, 0x88, 0x0B, 0x87, 0x28, 0x0A, 0x0B, 0x00, 0xAB, 0x7E, 0xE3]
        );
    }

    #[test]
    fn encode_empty_payload_frame() {
        let msg = Message::request(0x88, 0x9E, &[]).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        assert_eq!(frame.len(), OVERHEAD);
        assert_eq!(frame[2], OVERHEAD as u8);
        assert_eq!(frame[3], LOCAL_ADDR);
        assert_eq!(frame[frame.len() - 1], FRAME_END);
    }

    #[test]
    fn parse_recovers_the_message() {
        let msg = Message::request(0x89, 0x26, &[0x01, 0x02]).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        let parsed = Message::parse(&frame).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn payload_too_large_is_rejected_before_io() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            Message::request(0x88, 0x28, &payload),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn max_payload_is_accepted() {
        let payload = [0x55u8; MAX_PAYLOAD_SIZE];
        let msg = Message::request(0x88, 0x28, &payload).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        assert_eq!(frame.len(), MAX_FRAME_SIZE);
        assert_eq!(frame[2], 0xFF);
        assert_eq!(Message::parse(&frame).unwrap(), msg);
    }

    #[test]
    fn wrong_start_byte() {
        let msg = Message::request(0x88, 0x28, &[0x01]).unwrap();
        let mut frame = msg.encode_to_vec().unwrap();
        frame[0] = 0x00;
        assert_eq!(Message::parse(&frame), Err(FrameError::InvalidStart));
        assert_eq!(Message::parse(&[]), Err(FrameError::InvalidStart));
    }

    #[test]
    fn declared_length_must_match_observed() {
        // Declared 0x0B but one extra byte observed on the wire
        let msg = Message::request(0x88, 0x28, &[0x0A, 0x0B, 0x00]).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        let mut longer = Vec::<u8, MAX_FRAME_SIZE>::new();
        longer.extend_from_slice(&frame).unwrap();
        longer.push(0x00).unwrap();
        assert_eq!(Message::parse(&longer), Err(FrameError::LengthMismatch));
    }

    #[test]
    fn runt_frame_is_a_length_mismatch() {
        assert_eq!(
            Message::parse(&[FRAME_START, 0x88, 0x03]),
            Err(FrameError::LengthMismatch)
        );
    }

    #[test]
    fn corrupted_payload_fails_the_checksum() {
        let msg = Message::request(0x88, 0x28, &[0x0A, 0x0B, 0x00]).unwrap();
        let mut frame = msg.encode_to_vec().unwrap();
        frame[6] ^= 0x01; // single bit flip in the payload
        assert_eq!(Message::parse(&frame), Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn corrupted_trailer_fails_the_checksum() {
        let msg = Message::request(0x88, 0x28, &[0x0A]).unwrap();
        let mut frame = msg.encode_to_vec().unwrap();
        let crc_hi = frame.len() - 3;
        frame[crc_hi] ^= 0x80;
        assert_eq!(Message::parse(&frame), Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn missing_terminator() {
        let msg = Message::request(0x88, 0x28, &[0x0A]).unwrap();
        let mut frame = msg.encode_to_vec().unwrap();
        let last = frame.len() - 1;
        frame[last] = 0x00;
        assert_eq!(Message::parse(&frame), Err(FrameError::MissingTerminator));
    }

    #[test]
    fn encode_rejects_short_buffer() {
        let msg = Message::request(0x88, 0x28, &[0x0A, 0x0B]).unwrap();
        let mut buffer = [0u8; 9];
        assert_eq!(msg.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }
}
