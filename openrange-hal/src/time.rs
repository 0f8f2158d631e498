//! Monotonic time source
//!
//! The link layer never blocks waiting for a response; it polls the bus
//! inside an elapsed-time bound. This trait provides that time base.

/// Monotonic millisecond clock
///
/// The origin is arbitrary but fixed; the value must never go backwards.
pub trait Monotonic {
    /// Milliseconds since the clock's origin
    fn now_ms(&self) -> u64;
}
