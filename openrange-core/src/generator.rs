//! Typed commands for the GE induction generator boards
//!
//! The generator boards answer four commands: a software version query, a
//! one-time coil configuration, the periodic power-level update, and a
//! status query. Payload layouts follow the boards' packed little-endian
//! structures.

use crate::link::{GeaLink, LinkError, TransportError};
use openrange_hal::{Bus, Monotonic};

/// Generator board addresses, left to right on the bus
pub const GEN1_ADDR: u8 = 0x88;
pub const GEN2_ADDR: u8 = 0x89;
pub const GEN3_ADDR: u8 = 0x8A;

/// Command codes understood by the generator boards
pub const CMD_GET_SW_VERSION: u8 = 0x01;
pub const CMD_SET_BOARD_CONFIG: u8 = 0x26;
pub const CMD_SET_PWR_LEVELS: u8 = 0x28;
pub const CMD_GET_STATUS: u8 = 0x9E;

/// Response payload lengths per query
pub const RESP_LEN_SW_VERSION: usize = 4;
pub const RESP_LEN_PWR_LEVELS: usize = 2;
pub const RESP_LEN_STATUS: usize = 20;

/// The boards support 20 discrete power levels
pub const MAX_POWER_STEP: u8 = 19;

/// Coil power profile fitted to a generator output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CoilProfile {
    NotFitted = 0x00,
    Watts1800 = 0x01,
    Watts2500 = 0x02,
    Watts3200 = 0x03,
    Watts3700 = 0x04,
}

/// Errors reported by generator board operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeneratorError<E> {
    /// Requested power level outside 0..=19
    PowerOutOfRange,
    /// The board's response payload was shorter than its documented length
    ShortResponse,
    /// Bus-level failure
    Link(LinkError<E>),
}

impl<E> From<LinkError<E>> for GeneratorError<E> {
    fn from(err: LinkError<E>) -> Self {
        GeneratorError::Link(err)
    }
}

/// Software version reported by a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftwareVersion {
    pub crit_major: u8,
    pub crit_minor: u8,
    pub noncrit_major: u8,
    pub noncrit_minor: u8,
}

impl SoftwareVersion {
    /// Decode a version query response payload
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() < RESP_LEN_SW_VERSION {
            return None;
        }
        Some(Self {
            crit_major: payload[0],
            crit_minor: payload[1],
            noncrit_major: payload[2],
            noncrit_minor: payload[3],
        })
    }
}

/// Operating telemetry reported by a board
///
/// The first ten bytes of the status payload are undocumented and skipped;
/// the named fields follow as little-endian words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardStatus {
    pub half_bridge0_temp: u16,
    pub coil0_temp: u16,
    pub half_bridge1_temp: u16,
    pub coil1_temp: u16,
    pub ac_line_voltage: u16,
}

impl BoardStatus {
    /// Decode a status query response payload
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() < RESP_LEN_STATUS {
            return None;
        }
        let word = |offset: usize| u16::from_le_bytes([payload[offset], payload[offset + 1]]);
        Some(Self {
            half_bridge0_temp: word(10),
            coil0_temp: word(12),
            half_bridge1_temp: word(14),
            coil1_temp: word(16),
            ac_line_voltage: word(18),
        })
    }
}

/// One generator board on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorBoard {
    address: u8,
}

impl GeneratorBoard {
    /// Address a board on the bus
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// This board's bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Tell the board what type of coils are connected
    pub fn configure<B, C>(
        &self,
        link: &mut GeaLink<B, C>,
        coil1: CoilProfile,
        coil2: CoilProfile,
    ) -> Result<(), GeneratorError<TransportError<B>>>
    where
        B: Bus,
        C: Monotonic,
    {
        link.transmit(self.address, CMD_SET_BOARD_CONFIG, &[coil1 as u8, coil2 as u8])?;
        Ok(())
    }

    /// Update the board's power levels and heartbeat
    ///
    /// Levels outside the supported range are rejected before any I/O.
    pub fn set_power_levels<B, C>(
        &self,
        link: &mut GeaLink<B, C>,
        coil1_level: u8,
        coil2_level: u8,
        heartbeat: u8,
    ) -> Result<(), GeneratorError<TransportError<B>>>
    where
        B: Bus,
        C: Monotonic,
    {
        if coil1_level > MAX_POWER_STEP || coil2_level > MAX_POWER_STEP {
            return Err(GeneratorError::PowerOutOfRange);
        }
        link.transmit(
            self.address,
            CMD_SET_PWR_LEVELS,
            &[coil1_level, coil2_level, heartbeat],
        )?;
        Ok(())
    }

    /// Query the board's software version
    pub fn software_version<B, C>(
        &self,
        link: &mut GeaLink<B, C>,
    ) -> Result<SoftwareVersion, GeneratorError<TransportError<B>>>
    where
        B: Bus,
        C: Monotonic,
    {
        let payload = link.request(self.address, CMD_GET_SW_VERSION, &[])?;
        SoftwareVersion::from_payload(&payload).ok_or(GeneratorError::ShortResponse)
    }

    /// Query the board's operating telemetry
    pub fn status<B, C>(
        &self,
        link: &mut GeaLink<B, C>,
    ) -> Result<BoardStatus, GeneratorError<TransportError<B>>>
    where
        B: Bus,
        C: Monotonic,
    {
        let payload = link.request(self.address, CMD_GET_STATUS, &[])?;
        BoardStatus::from_payload(&payload).ok_or(GeneratorError::ShortResponse)
    }
}
