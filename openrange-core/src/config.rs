//! Link configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Link-layer tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// How long a request waits for its matching response, in milliseconds
    pub response_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: 200,
        }
    }
}
