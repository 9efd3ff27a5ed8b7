//! SD/SDHC card driver, SPI mode.
//!
//! [`SdCard`] implements [`platform::BlockDevice`] over any
//! `embedded_hal::spi::SpiBus<u8>` that can also retune its clock
//! ([`platform::BusSpeed`]): the card is brought up at
//! [`SD_INIT_HZ`](platform::config::SD_INIT_HZ) and read at
//! [`SD_OPERATING_HZ`](platform::config::SD_OPERATING_HZ).
//!
//! # Read framing
//!
//! ```text
//! CS low
//!   CMD17 frame ─ up to 10 polls for 0x00 ─ wait 0xFE ─ 512 data ─ 2 CRC
//! CS high, 1 clock
//!
//! CS low
//!   CMD18 frame ─ 0x00 ─ { wait 0xFE ─ 512 data ─ 2 CRC } × n
//!   CMD12 frame ─ stuff byte ─ R1 ─ busy until 0xFF
//! CS high, 1 clock
//! ```
//!
//! A read command that is never accepted is logged and the transfer carries
//! on; a card that fails to go idle after reset is an error the caller turns
//! into a halt.

mod card;
pub mod command;
pub mod sim;

#[cfg(feature = "hardware")]
pub mod bus;

pub use card::{CardType, SdCard, SdError};
pub use command::R1;
