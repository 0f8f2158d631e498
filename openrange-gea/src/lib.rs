//! GEA2 Appliance Bus Codec
//!
//! This crate implements the framing and validation layer of the GEA2
//! serial protocol spoken by GE appliance boards: building a byte-stuffed,
//! checksummed wire frame from a command and payload, and turning the raw
//! byte stream coming back off the bus into a validated, typed message.
//!
//! # Wire Overview
//!
//! All messages use a single binary frame format:
//! ```text
//! ┌───────┬─────┬────────┬─────┬─────┬─────────────┬───────┬─────┐
//! │ START │ DST │ LENGTH │ SRC │ CMD │ PAYLOAD     │ CRC16 │ END │
//! │ 1B    │ 1B  │ 1B     │ 1B  │ 1B  │ 0–247B      │ 2B    │ 1B  │
//! └───────┴─────┴────────┴─────┴─────┴─────────────┴───────┴─────┘
//! ```
//!
//! The byte values 0xE0–0xE3 (escape, acknowledge, start, end) are reserved;
//! inside a frame body they travel behind an escape marker. The receive path
//! is a byte-at-a-time state machine with no blocking and a fixed buffer, so
//! truncated, corrupted, or adversarial input can never crash the link.

#![no_std]
#![deny(unsafe_code)]

pub mod assembler;
pub mod crc;
pub mod escape;
pub mod frame;

pub use assembler::{FrameAssembler, RawFrame, RX_BUFFER_SIZE};
pub use escape::{EscapeError, Stuffed, ACK, ESCAPE, FRAME_END, FRAME_START};
pub use frame::{
    FrameError, Message, Payload, LOCAL_ADDR, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, OVERHEAD,
};
