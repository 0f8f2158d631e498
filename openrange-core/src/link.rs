//! Synchronous request/response link layer
//!
//! One [`GeaLink`] owns one physical bus. A send fully transmits its frame
//! before returning; receiving advances the frame assembler one byte per
//! poll inside an elapsed-time bound, so the link never blocks and a silent
//! far end surfaces as [`LinkError::Timeout`] instead of a hang.

use crate::config::LinkConfig;
use openrange_gea::escape::{self, ACK, MAX_WIRE_SIZE};
use openrange_gea::{EscapeError, FrameAssembler, FrameError, Message, Payload};
use openrange_gea::{LOCAL_ADDR, MAX_FRAME_SIZE};
use openrange_hal::{Bus, BusTx, Monotonic};

/// Error type of a link's underlying transport
pub type TransportError<B> = <B as BusTx>::Error;

/// Errors reported by the link layer
///
/// All of them are local and recoverable: the link stays usable for the
/// next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Frame build or validation failure
    Frame(FrameError),
    /// Malformed escape sequence on the wire
    Escape(EscapeError),
    /// The transport reported an error
    Transport(E),
    /// No matching response arrived within the bounded wait
    Timeout,
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(err: FrameError) -> Self {
        LinkError::Frame(err)
    }
}

impl<E> From<EscapeError> for LinkError<E> {
    fn from(err: EscapeError) -> Self {
        LinkError::Escape(err)
    }
}

/// One synchronous bus link
///
/// Owns the transport, the clock, and the reusable receive buffer. Exactly
/// one of these exists per physical link, so no locking is needed.
pub struct GeaLink<B, C> {
    bus: B,
    clock: C,
    config: LinkConfig,
    assembler: FrameAssembler,
}

impl<B, C> GeaLink<B, C>
where
    B: Bus,
    C: Monotonic,
{
    /// Create a link with the default configuration
    pub fn new(bus: B, clock: C) -> Self {
        Self::with_config(bus, clock, LinkConfig::default())
    }

    /// Create a link with an explicit configuration
    pub fn with_config(bus: B, clock: C, config: LinkConfig) -> Self {
        Self {
            bus,
            clock,
            config,
            assembler: FrameAssembler::new(),
        }
    }

    /// Access the underlying transport (diagnostics and tests)
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Build, escape, and fully transmit one frame
    ///
    /// The escaped frame is followed by the acknowledge marker as a
    /// transport courtesy byte. Returns only once the transport has
    /// accepted every byte.
    pub fn transmit(
        &mut self,
        destination: u8,
        command: u8,
        payload: &[u8],
    ) -> Result<(), LinkError<TransportError<B>>> {
        let message = Message::request(destination, command, payload)?;

        let mut frame = [0u8; MAX_FRAME_SIZE];
        let frame_len = message.encode(&mut frame)?;

        let mut wire = [0u8; MAX_WIRE_SIZE];
        let stuffed = escape::stuff(&frame[..frame_len], &mut wire)?;

        self.bus
            .write(&wire[..stuffed.len])
            .map_err(LinkError::Transport)?;
        self.bus.write(&[ACK]).map_err(LinkError::Transport)?;
        self.bus.flush().map_err(LinkError::Transport)?;
        Ok(())
    }

    /// Wait for one validated frame from `source` carrying `command`
    ///
    /// Polls the transport until the deadline; absence of data just means
    /// "try again". Well-formed frames addressed elsewhere or carrying a
    /// different source or command are discarded and the wait continues.
    /// A malformed frame is reported to the caller, who decides whether to
    /// re-request.
    pub fn receive_payload(
        &mut self,
        source: u8,
        command: u8,
        timeout_ms: u32,
    ) -> Result<Payload, LinkError<TransportError<B>>> {
        let deadline = self.clock.now_ms().saturating_add(u64::from(timeout_ms));

        while self.clock.now_ms() < deadline {
            let Some(byte) = self.bus.poll_byte().map_err(LinkError::Transport)? else {
                continue;
            };
            let Some(raw) = self.assembler.push(byte)? else {
                continue;
            };

            let message = Message::parse(&raw)?;
            if message.destination != LOCAL_ADDR
                || message.source != source
                || message.command != command
            {
                continue;
            }
            return Ok(message.payload);
        }

        Err(LinkError::Timeout)
    }

    /// One full request/response exchange
    ///
    /// Transmits to `destination` and waits for that node's response to the
    /// same command, bounded by the configured response timeout.
    pub fn request(
        &mut self,
        destination: u8,
        command: u8,
        payload: &[u8],
    ) -> Result<Payload, LinkError<TransportError<B>>> {
        self.transmit(destination, command, payload)?;
        self.receive_payload(destination, command, self.config.response_timeout_ms)
    }
}
