//! SD/SDHC card over a dedicated SPI bus.
//!
//! The driver owns the bus and the chip-select pin outright: every command
//! needs 0xFF padding bytes clocked with chip-select high, which an
//! `SpiDevice` transaction cannot express.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use platform::config::{SD_INIT_HZ, SD_OPERATING_HZ};
use platform::{Block, BlockDevice, BlockIdx, BusSpeed, BLOCK_SIZE};
use thiserror_no_std::Error;

use super::command::{
    frame, R1, ACCEPT_POLLS, APP_CMD, CHECK_PATTERN, CRC_GO_IDLE, CRC_IF_COND, CRC_NONE,
    DATA_START, GO_IDLE_STATE, HCS, IDLE_BYTE, IF_COND_ARG, OCR_CCS, READ_MULTIPLE_BLOCK,
    READ_OCR, READ_SINGLE_BLOCK, RESPONSE_POLLS, SD_SEND_OP_COND, SEND_IF_COND, SET_BLOCKLEN,
    STOP_TRANSMISSION, WAKE_BYTES,
};

/// Card generation, decided during [`SdCard::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardType {
    /// Version 1 (rejects CMD8), byte addressed.
    Sd1,
    /// Version 2 standard capacity, byte addressed.
    Sd2,
    /// Version 2 high capacity, block addressed.
    Sdhc,
}

impl CardType {
    /// Command argument addressing `block`.
    pub fn address(self, block: BlockIdx) -> u32 {
        match self {
            Self::Sdhc => block.0,
            Self::Sd1 | Self::Sd2 => block.0.wrapping_mul(BLOCK_SIZE as u32),
        }
    }
}

/// SD driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdError<E: core::fmt::Debug> {
    /// SPI transfer failed.
    #[error("spi: {0:?}")]
    Bus(E),
    /// Driving chip-select failed.
    #[error("chip-select pin")]
    ChipSelect,
    /// Switching the bus clock failed.
    #[error("bus clock switch: {0:?}")]
    Clock(E),
    /// `GO_IDLE_STATE` answered with something other than the idle bit.
    #[error("card not idle after reset (r1 = {0:#04x})")]
    NotIdle(u8),
    /// `SEND_IF_COND` echoed the wrong check pattern.
    #[error("check pattern mismatch ({0:#04x})")]
    CheckPatternMismatch(u8),
    /// The card sent a data error token instead of a block.
    #[error("data error token {0:#04x}")]
    DataError(u8),
    /// Read attempted before a successful [`SdCard::initialize`].
    #[error("card not initialized")]
    NotInitialized,
}

/// SD card in SPI mode.
pub struct SdCard<SPI, CS> {
    spi: SPI,
    cs: CS,
    card_type: Option<CardType>,
}

impl<SPI, CS> SdCard<SPI, CS>
where
    SPI: SpiBus<u8> + BusSpeed,
    CS: OutputPin,
{
    /// Wrap the bus and chip-select. No bus traffic until
    /// [`initialize`](Self::initialize).
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            card_type: None,
        }
    }

    /// Bring the card up.
    ///
    /// 80 idle clocks with chip-select high, `GO_IDLE_STATE` (must answer
    /// exactly idle), `SEND_IF_COND` to tell version 1 from version 2,
    /// `APP_CMD` + `SD_SEND_OP_COND` until ready, `READ_OCR` for the
    /// addressing mode, `SET_BLOCKLEN` on byte-addressed cards, then the
    /// bus moves to its operating clock.
    ///
    /// The ready loop has no retry limit: a card that answers `GO_IDLE_STATE`
    /// is expected to finish its power-up.
    pub fn initialize(&mut self) -> Result<CardType, SdError<SPI::Error>> {
        self.card_type = None;
        self.spi
            .set_frequency(SD_INIT_HZ)
            .map_err(SdError::Clock)?;

        self.cs.set_high().map_err(|_| SdError::ChipSelect)?;
        for _ in 0..WAKE_BYTES {
            self.exchange(IDLE_BYTE)?;
        }

        let r1 = self.simple_command(GO_IDLE_STATE, 0, CRC_GO_IDLE)?;
        if !r1.is_idle_only() {
            #[cfg(feature = "defmt")]
            defmt::error!("sd: no idle response after reset (r1={=u8:#x})", r1.bits());
            return Err(SdError::NotIdle(r1.bits()));
        }

        let version2 = self.send_if_cond()?;

        let op_cond = if version2 { HCS } else { 0 };
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.wrapping_add(1);
            self.simple_command(APP_CMD, 0, CRC_NONE)?;
            if self.simple_command(SD_SEND_OP_COND, op_cond, CRC_NONE)?.is_ready() {
                break;
            }
        }
        #[cfg(not(feature = "defmt"))]
        let _ = attempts;

        let card_type = if version2 && self.read_ocr()? & OCR_CCS != 0 {
            CardType::Sdhc
        } else if version2 {
            CardType::Sd2
        } else {
            CardType::Sd1
        };

        if card_type != CardType::Sdhc {
            self.simple_command(SET_BLOCKLEN, BLOCK_SIZE as u32, CRC_NONE)?;
        }

        self.spi
            .set_frequency(SD_OPERATING_HZ)
            .map_err(SdError::Clock)?;
        self.card_type = Some(card_type);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "sd: {} ready after {=u32} op-cond polls",
            card_type,
            attempts
        );
        Ok(card_type)
    }

    /// Card generation, once initialized.
    pub fn card_type(&self) -> Option<CardType> {
        self.card_type
    }

    /// Release the bus and pin.
    pub fn into_inner(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// `SEND_IF_COND`: `true` for a version 2 card.
    fn send_if_cond(&mut self) -> Result<bool, SdError<SPI::Error>> {
        self.framed(|card| {
            let r1 = card.command(SEND_IF_COND, IF_COND_ARG, CRC_IF_COND)?;
            if r1.contains(R1::ILLEGAL_COMMAND) {
                return Ok(false);
            }
            let [_, _, _, echo] = card.read_trailer()?;
            if echo != CHECK_PATTERN {
                return Err(SdError::CheckPatternMismatch(echo));
            }
            Ok(true)
        })
    }

    /// `READ_OCR`: first OCR byte (power-up and capacity bits).
    fn read_ocr(&mut self) -> Result<u8, SdError<SPI::Error>> {
        self.framed(|card| {
            card.command(READ_OCR, 0, CRC_NONE)?;
            let [high, ..] = card.read_trailer()?;
            Ok(high)
        })
    }

    /// One command with an R1-only response.
    fn simple_command(&mut self, index: u8, argument: u32, crc: u8) -> Result<R1, SdError<SPI::Error>> {
        self.framed(|card| card.command(index, argument, crc))
    }

    /// The four bytes following the R1 of an R3/R7 response.
    fn read_trailer(&mut self) -> Result<[u8; 4], SdError<SPI::Error>> {
        let mut trailer = [IDLE_BYTE; 4];
        self.spi
            .transfer_in_place(&mut trailer)
            .map_err(SdError::Bus)?;
        Ok(trailer)
    }

    /// Send a frame and poll up to [`RESPONSE_POLLS`] bytes for its R1.
    /// Chip-select must already be low.
    fn command(&mut self, index: u8, argument: u32, crc: u8) -> Result<R1, SdError<SPI::Error>> {
        self.spi
            .write(&frame(index, argument, crc))
            .map_err(SdError::Bus)?;
        let mut response = IDLE_BYTE;
        for _ in 0..RESPONSE_POLLS {
            response = self.exchange(IDLE_BYTE)?;
            if response != IDLE_BYTE {
                break;
            }
        }
        Ok(R1::from_byte(response))
    }

    // ── Data transfer ────────────────────────────────────────────────────────

    /// Send a read command and wait for its `0x00` acceptance.
    ///
    /// A card that never accepts is logged and the read carries on: the
    /// data-token wait that follows is where a dead card would hang anyway.
    fn start_read(&mut self, index: u8, argument: u32) -> Result<(), SdError<SPI::Error>> {
        self.spi
            .write(&frame(index, argument, CRC_NONE))
            .map_err(SdError::Bus)?;
        for _ in 0..ACCEPT_POLLS {
            if self.exchange(IDLE_BYTE)? == 0x00 {
                return Ok(());
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("sd: CMD{=u8} not accepted, reading anyway", index);
        Ok(())
    }

    /// Wait for the data token, then read one payload and drop its CRC.
    fn read_data(&mut self, block: &mut Block) -> Result<(), SdError<SPI::Error>> {
        loop {
            match self.exchange(IDLE_BYTE)? {
                DATA_START => break,
                token if is_error_token(token) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("sd: data error token {=u8:#x}", token);
                    return Err(SdError::DataError(token));
                }
                _ => {}
            }
        }
        block.fill(IDLE_BYTE);
        self.spi.transfer_in_place(block).map_err(SdError::Bus)?;
        let mut crc = [IDLE_BYTE; 2];
        self.spi.transfer_in_place(&mut crc).map_err(SdError::Bus)?;
        Ok(())
    }

    /// `STOP_TRANSMISSION`, skip the stuff byte, take the R1 and drain busy.
    fn stop_transmission(&mut self) -> Result<(), SdError<SPI::Error>> {
        self.spi
            .write(&frame(STOP_TRANSMISSION, 0, CRC_NONE))
            .map_err(SdError::Bus)?;
        self.exchange(IDLE_BYTE)?;
        for _ in 0..RESPONSE_POLLS {
            if self.exchange(IDLE_BYTE)? != IDLE_BYTE {
                break;
            }
        }
        while self.exchange(IDLE_BYTE)? != IDLE_BYTE {}
        Ok(())
    }

    fn addressing(&self) -> Result<CardType, SdError<SPI::Error>> {
        self.card_type.ok_or(SdError::NotInitialized)
    }

    // ── Bus primitives ───────────────────────────────────────────────────────

    fn exchange(&mut self, byte: u8) -> Result<u8, SdError<SPI::Error>> {
        let mut word = [byte];
        self.spi.transfer_in_place(&mut word).map_err(SdError::Bus)?;
        let [received] = word;
        Ok(received)
    }

    /// Run `f` with chip-select low; the card is deselected whatever `f`
    /// returns, and an error from `f` wins over one from deselecting.
    fn framed<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, SdError<SPI::Error>>,
    ) -> Result<R, SdError<SPI::Error>> {
        self.select()?;
        let result = f(self);
        let released = self.deselect();
        let value = result?;
        released.map(|()| value)
    }

    fn select(&mut self) -> Result<(), SdError<SPI::Error>> {
        self.cs.set_low().map_err(|_| SdError::ChipSelect)
    }

    /// Chip-select high plus one clock so the card releases MISO.
    fn deselect(&mut self) -> Result<(), SdError<SPI::Error>> {
        self.cs.set_high().map_err(|_| SdError::ChipSelect)?;
        self.exchange(IDLE_BYTE)?;
        Ok(())
    }
}

impl<SPI, CS> BlockDevice for SdCard<SPI, CS>
where
    SPI: SpiBus<u8> + BusSpeed,
    CS: OutputPin,
{
    type Error = SdError<SPI::Error>;

    fn read_block(&mut self, index: BlockIdx, block: &mut Block) -> Result<(), Self::Error> {
        let argument = self.addressing()?.address(index);
        #[cfg(feature = "defmt")]
        defmt::trace!("sd: read block {=u32}", index.0);

        self.framed(|card| {
            card.start_read(READ_SINGLE_BLOCK, argument)?;
            card.read_data(block)
        })
    }

    fn read_blocks(&mut self, start: BlockIdx, blocks: &mut [Block]) -> Result<(), Self::Error> {
        match blocks {
            [] => return Ok(()),
            [only] => return self.read_block(start, only),
            _ => {}
        }
        let argument = self.addressing()?.address(start);
        #[cfg(feature = "defmt")]
        defmt::trace!("sd: read {=usize} blocks from {=u32}", blocks.len(), start.0);

        self.framed(|card| {
            card.start_read(READ_MULTIPLE_BLOCK, argument)?;
            let streamed = blocks.iter_mut().try_for_each(|block| card.read_data(block));
            // The card keeps streaming until told to stop, even after an error.
            let stopped = card.stop_transmission();
            streamed?;
            stopped
        })
    }
}

/// Data error tokens are `0b0000_xxxx` with at least one flag set.
fn is_error_token(byte: u8) -> bool {
    byte != 0 && byte & 0xF0 == 0
}
