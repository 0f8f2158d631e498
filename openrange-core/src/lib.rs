//! Board-agnostic control logic for the Openrange controller
//!
//! This crate contains everything above the codec and below the hardware:
//!
//! - The synchronous request/response link layer over any
//!   [`openrange_hal`] transport, with bounded response waits
//! - Typed commands for the GE induction generator boards
//! - Link configuration types

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod generator;
pub mod link;

pub use config::LinkConfig;
pub use generator::{BoardStatus, CoilProfile, GeneratorBoard, GeneratorError, SoftwareVersion};
pub use link::{GeaLink, LinkError};
