//! Openrange Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the bus link layer is written
//! against, so the same protocol code runs on any board that can provide a
//! UART and a monotonic clock.
//!
//! # Traits
//!
//! - [`uart::BusTx`], [`uart::BusRx`] - Serial transport for the GEA2 bus
//! - [`time::Monotonic`] - Monotonic milliseconds for bounded waits

#![no_std]
#![deny(unsafe_code)]

pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use time::Monotonic;
pub use uart::{Bus, BusConfig, BusRx, BusTx};
