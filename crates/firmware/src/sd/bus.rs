//! Embassy SPI peripheral with a retunable clock.

use embassy_stm32::spi::{self, Config, Instance, Spi};
use embassy_stm32::time::Hertz;
use embedded_hal::spi::{ErrorKind, ErrorType, SpiBus};
use platform::BusSpeed;

/// `Spi` plus the config it was created with, so the card driver can move
/// it from the bring-up clock to the operating clock.
pub struct ClockedSpi<'d, T: Instance, Tx, Rx> {
    spi: Spi<'d, T, Tx, Rx>,
    config: Config,
}

impl<'d, T: Instance, Tx, Rx> ClockedSpi<'d, T, Tx, Rx> {
    /// Wrap `spi`, which must currently run with `config`.
    pub fn new(spi: Spi<'d, T, Tx, Rx>, config: Config) -> Self {
        Self { spi, config }
    }
}

/// Transfer or clock-switch failure on a [`ClockedSpi`].
#[derive(Debug, Clone, Copy)]
pub enum ClockedSpiError {
    /// The peripheral reported a transfer error.
    Transfer(spi::Error),
    /// The peripheral rejected this clock rate.
    ClockRejected(u32),
}

impl embedded_hal::spi::Error for ClockedSpiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Transfer(e) => embedded_hal::spi::Error::kind(e),
            Self::ClockRejected(_) => ErrorKind::Other,
        }
    }
}

impl<'d, T: Instance, Tx, Rx> ErrorType for ClockedSpi<'d, T, Tx, Rx> {
    type Error = ClockedSpiError;
}

impl<'d, T: Instance, Tx, Rx> BusSpeed for ClockedSpi<'d, T, Tx, Rx> {
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.config.frequency = Hertz(hz);
        self.spi
            .set_config(&self.config)
            .map_err(|()| ClockedSpiError::ClockRejected(hz))
    }
}

impl<'d, T: Instance, Tx, Rx> SpiBus<u8> for ClockedSpi<'d, T, Tx, Rx>
where
    Spi<'d, T, Tx, Rx>: SpiBus<u8, Error = spi::Error>,
{
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.read(words).map_err(ClockedSpiError::Transfer)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(words).map_err(ClockedSpiError::Transfer)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.spi
            .transfer(read, write)
            .map_err(ClockedSpiError::Transfer)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.spi
            .transfer_in_place(words)
            .map_err(ClockedSpiError::Transfer)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        SpiBus::flush(&mut self.spi).map_err(ClockedSpiError::Transfer)
    }
}
