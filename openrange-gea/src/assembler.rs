//! Receive-side frame assembly
//!
//! A byte-at-a-time state machine that delimits frames on the raw byte
//! stream and resolves escape sequences as it goes. Each [`FrameAssembler::push`]
//! consumes exactly one byte and never blocks; a complete unescaped frame
//! (including both delimiters) is delivered the moment the end marker is
//! seen, ready for [`Message::parse`](crate::frame::Message::parse).
//!
//! The buffer is fixed-capacity and is reset, never resized. A start marker
//! in the middle of a frame restarts collection, discarding the partial
//! frame; bytes beyond capacity are silently dropped so an adversarial
//! stream can neither corrupt memory nor grow the buffer (the truncated
//! frame then fails validation downstream).

use crate::escape::{self, EscapeError, ESCAPE, FRAME_END, FRAME_START};
use heapless::Vec;

/// Receive buffer capacity per physical link
pub const RX_BUFFER_SIZE: usize = 300;

/// One assembled unescaped frame, delimiters included
pub type RawFrame = Vec<u8, RX_BUFFER_SIZE>;

/// Byte-oriented frame assembler for one bus link
#[derive(Debug, Clone, Default)]
pub struct FrameAssembler {
    buffer: RawFrame,
    escape_pending: bool,
}

impl FrameAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            escape_pending: false,
        }
    }

    /// Discard any partial frame and pending escape
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.escape_pending = false;
    }

    /// Consume one byte from the bus
    ///
    /// Returns `Ok(Some(frame))` when an end marker completes a frame,
    /// `Ok(None)` when more bytes are needed. A malformed escape sequence
    /// discards the partial frame and is reported; the assembler is
    /// immediately usable for the next frame.
    pub fn push(&mut self, byte: u8) -> Result<Option<RawFrame>, EscapeError> {
        if self.escape_pending {
            self.escape_pending = false;
            if !escape::needs_escape(byte) {
                self.reset();
                return Err(EscapeError::UnrecognizedEscape);
            }
            // Escaped delimiters are payload data, not markers
            self.store(byte);
            return Ok(None);
        }

        match byte {
            FRAME_START => {
                // Restart collection, dropping any partial frame
                self.reset();
                self.store(FRAME_START);
                Ok(None)
            }
            FRAME_END => {
                // The final slot is reserved by store(), so this cannot fail
                let _ = self.buffer.push(FRAME_END);
                let frame = self.buffer.clone();
                self.reset();
                Ok(Some(frame))
            }
            ESCAPE => {
                self.escape_pending = true;
                Ok(None)
            }
            data => {
                self.store(data);
                Ok(None)
            }
        }
    }

    /// Consume bytes until a frame completes
    ///
    /// Returns the first complete frame found, if any; remaining bytes are
    /// not consumed.
    pub fn push_all(&mut self, bytes: &[u8]) -> Result<Option<RawFrame>, EscapeError> {
        for &byte in bytes {
            if let Some(frame) = self.push(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Store a byte, keeping one slot free for the terminator
    ///
    /// Overflow bytes are dropped rather than corrupting the frame; the
    /// transport has no flow control, so this is a safety valve, not an
    /// error.
    fn store(&mut self, byte: u8) {
        if self.buffer.len() < RX_BUFFER_SIZE - 1 {
            let _ = self.buffer.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Message;

    fn feed(assembler: &mut FrameAssembler, bytes: &[u8]) -> Option<RawFrame> {
        assembler.push_all(bytes).unwrap()
    }

    #[test]
    fn assembles_a_plain_frame() {
        let msg = Message::request(0x88, 0x9E, &[]).unwrap();
        let frame = msg.encode_to_vec().unwrap();

        let mut assembler = FrameAssembler::new();
        let raw = feed(&mut assembler, &frame).unwrap();
        assert_eq!(&raw[..], &frame[..]);
        assert_eq!(Message::parse(&raw).unwrap(), msg);
    }

    #[test]
    fn assembles_a_stuffed_frame() {
        // Payload made entirely of reserved values
        let msg = Message::request(0x88, 0x28, &[0xE0, 0xE3]).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        let (wire, inserted) = escape::stuff_to_vec(&frame).unwrap();
        assert!(inserted >= 2);

        let mut assembler = FrameAssembler::new();
        let raw = feed(&mut assembler, &wire).unwrap();
        assert_eq!(&raw[..], &frame[..]);
        assert_eq!(Message::parse(&raw).unwrap(), msg);
    }

    #[test]
    fn start_marker_mid_frame_discards_partial_data() {
        let msg = Message::request(0x88, 0x28, &[0x03]).unwrap();
        let frame = msg.encode_to_vec().unwrap();

        let mut assembler = FrameAssembler::new();
        // A frame that dies half-way, then a complete one
        assert!(feed(&mut assembler, &[FRAME_START, 0x01, 0x02]).is_none());
        let raw = feed(&mut assembler, &frame).unwrap();
        assert_eq!(&raw[..], &frame[..]);
    }

    #[test]
    fn garbage_before_first_start_marker_fails_validation() {
        // Noise terminated by a stray end marker assembles into a junk
        // frame that parse() rejects by its start byte
        let mut assembler = FrameAssembler::new();
        let raw = feed(&mut assembler, &[0x55, 0xAA, FRAME_END]).unwrap();
        assert_eq!(
            Message::parse(&raw),
            Err(crate::frame::FrameError::InvalidStart)
        );
    }

    #[test]
    fn unrecognized_escape_discards_the_frame() {
        let mut assembler = FrameAssembler::new();
        assert!(feed(&mut assembler, &[FRAME_START, 0x01]).is_none());
        assert_eq!(
            assembler.push_all(&[ESCAPE, 0x42]),
            Err(EscapeError::UnrecognizedEscape)
        );

        // The link stays usable for the next frame
        let msg = Message::request(0x88, 0x28, &[0x07]).unwrap();
        let frame = msg.encode_to_vec().unwrap();
        let raw = feed(&mut assembler, &frame).unwrap();
        assert_eq!(Message::parse(&raw).unwrap(), msg);
    }

    #[test]
    fn escaped_end_marker_is_data_not_a_terminator() {
        let mut assembler = FrameAssembler::new();
        assert!(feed(&mut assembler, &[FRAME_START, 0x01, ESCAPE, FRAME_END]).is_none());
        // Only the unescaped end marker completes the frame
        let raw = feed(&mut assembler, &[FRAME_END]).unwrap();
        assert_eq!(&raw[..], &[FRAME_START, 0x01, FRAME_END, FRAME_END]);
    }

    #[test]
    fn overflow_bytes_are_dropped_not_stored() {
        let mut assembler = FrameAssembler::new();
        assembler.push(FRAME_START).unwrap();
        for _ in 0..2 * RX_BUFFER_SIZE {
            assembler.push(0x11).unwrap();
        }
        let raw = assembler.push(FRAME_END).unwrap().unwrap();
        assert_eq!(raw.len(), RX_BUFFER_SIZE);
        assert_eq!(raw[raw.len() - 1], FRAME_END);
    }
}
