//! Peripheral abstraction layer
//!
//! Byte transfers use the `embedded-hal` 1.0 traits directly; this module
//! only adds what those traits leave out.

use embedded_hal::spi::ErrorType;

/// Runtime bus clock control.
///
/// SD cards must be brought up at 100–400 kHz and may then be clocked at full
/// speed, so the card driver needs to retune the SPI bus it owns. A rejected
/// clock is reported through the bus's own `embedded-hal` error type.
pub trait BusSpeed: ErrorType {
    /// Reconfigure the bus clock to `hz` (or the nearest rate below it).
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;
}

impl<T: BusSpeed + ?Sized> BusSpeed for &mut T {
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        T::set_frequency(self, hz)
    }
}
