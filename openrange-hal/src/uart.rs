//! UART serial transport abstractions
//!
//! The GEA2 bus is a point-to-point serial link; the protocol core only
//! needs "write bytes" and "read one byte if available" from the physical
//! device, so that is all these traits expose.

/// Bus transmitter
pub trait BusTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the bus
    ///
    /// Returns once every byte has been accepted by the device.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Bus receiver
///
/// Receiving is strictly non-blocking: the link layer polls this in a loop
/// and treats absence of data as "try again later", never as an error.
pub trait BusRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is available
    ///
    /// Returns `Ok(None)` when no byte is waiting. Must not block.
    fn poll_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Combined bus interface
///
/// For transports that provide both TX and RX on a single peripheral with a
/// single error type.
pub trait Bus: BusTx + BusRx<Error = <Self as BusTx>::Error> {}

// Blanket implementation
impl<T: BusTx + BusRx<Error = <T as BusTx>::Error>> Bus for T {}

/// Bus configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for BusConfig {
    /// The GEA2 bus runs at 19200 8N1
    fn default() -> Self {
        Self {
            baudrate: 19200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
