//! Scripted SD card for host tests.
//!
//! [`SimulatedCard`] implements `embedded_hal::spi::SpiBus<u8>` and answers
//! the SPI-mode command set the driver uses, byte by byte, from an in-memory
//! image. Its chip-select line is the [`SimChipSelect`] handed out by
//! [`SimulatedCard::chip_select`]: with it high the card ignores the bus and
//! drops any half-sent response, like real silicon.
#![cfg(any(test, feature = "std"))]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{ErrorType, SpiBus};
use platform::{BusSpeed, BLOCK_SIZE};

use super::command::{
    APP_CMD, CHECK_PATTERN, CRC_GO_IDLE, DATA_START, GO_IDLE_STATE, IDLE_BYTE,
    READ_MULTIPLE_BLOCK, READ_OCR, READ_SINGLE_BLOCK, SD_SEND_OP_COND, SEND_IF_COND,
    SET_BLOCKLEN, STOP_TRANSMISSION,
};

/// Which generation of card to impersonate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimKind {
    /// Rejects CMD8, byte addressed.
    V1,
    /// Standard capacity version 2, byte addressed.
    V2,
    /// High capacity, block addressed.
    Sdhc,
    /// Nothing in the slot: the bus floats high.
    Absent,
}

const R1_READY: u8 = 0x00;
const R1_IDLE: u8 = 0x01;
const ILLEGAL_BIT: u8 = 0x04;
const R1_ILLEGAL: u8 = ILLEGAL_BIT | R1_IDLE;
const R1_CRC: u8 = 0x09;
const R1_ADDRESS: u8 = 0x20;
const STUFF_BYTE: u8 = 0x3F;

/// Data error token sent by [`SimulatedCard::with_data_error_at`]
/// (out-of-range flag).
pub const DATA_ERROR_TOKEN: u8 = 0x08;

/// In-memory SD card speaking SPI mode.
pub struct SimulatedCard {
    kind: SimKind,
    image: Vec<u8>,
    selected: Rc<Cell<bool>>,
    out: VecDeque<u8>,
    frame: Vec<u8>,
    app_next: bool,
    ready: bool,
    busy_polls: u32,
    accept_delay: usize,
    echo: u8,
    data_error_at: Option<u32>,
    streaming: Option<u32>,
    commands: Vec<(u8, u32)>,
    frequencies: Vec<u32>,
}

impl SimulatedCard {
    /// Card of `kind` holding `image` (read past its end as zeros).
    pub fn new(kind: SimKind, image: Vec<u8>) -> Self {
        Self {
            kind,
            image,
            selected: Rc::new(Cell::new(false)),
            out: VecDeque::new(),
            frame: Vec::with_capacity(6),
            app_next: false,
            ready: false,
            busy_polls: 0,
            accept_delay: 0,
            echo: CHECK_PATTERN,
            data_error_at: None,
            streaming: None,
            commands: Vec::new(),
            frequencies: Vec::new(),
        }
    }

    /// Answer "still idle" to the first `polls` `SD_SEND_OP_COND`s.
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Pad `bytes` idle bytes before each read acceptance.
    pub fn with_accept_delay(mut self, bytes: usize) -> Self {
        self.accept_delay = bytes;
        self
    }

    /// Echo `pattern` instead of the CMD8 check pattern.
    pub fn with_check_echo(mut self, pattern: u8) -> Self {
        self.echo = pattern;
        self
    }

    /// Send [`DATA_ERROR_TOKEN`] instead of `block` the first time a
    /// multi-block read streams it.
    pub fn with_data_error_at(mut self, block: u32) -> Self {
        self.data_error_at = Some(block);
        self
    }

    /// The card's chip-select input.
    pub fn chip_select(&self) -> SimChipSelect {
        SimChipSelect {
            selected: Rc::clone(&self.selected),
        }
    }

    /// Every command received, with its argument.
    pub fn commands(&self) -> &[(u8, u32)] {
        &self.commands
    }

    /// How often command `index` was received.
    pub fn count(&self, index: u8) -> usize {
        self.commands.iter().filter(|(i, _)| *i == index).count()
    }

    /// Every clock rate the bus was set to, in order.
    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    /// One full-duplex byte.
    fn clock(&mut self, mosi: u8) -> u8 {
        if !self.selected.get() {
            self.out.clear();
            self.frame.clear();
            return IDLE_BYTE;
        }
        if self.out.is_empty() {
            self.stream_next_block();
        }
        let miso = self.out.pop_front().unwrap_or(IDLE_BYTE);
        self.receive(mosi);
        miso
    }

    fn receive(&mut self, mosi: u8) {
        if self.frame.is_empty() && mosi & 0xC0 != 0x40 {
            return;
        }
        self.frame.push(mosi);
        if let &[cmd, a, b, c, d, crc] = self.frame.as_slice() {
            self.frame.clear();
            self.execute(cmd & 0x3F, u32::from_be_bytes([a, b, c, d]), crc);
        }
    }

    fn execute(&mut self, index: u8, argument: u32, crc: u8) {
        self.commands.push((index, argument));
        // A streaming card only listens for the stop (or a reset).
        if self.streaming.is_some() && index != STOP_TRANSMISSION && index != GO_IDLE_STATE {
            return;
        }
        self.out.clear();
        if self.kind == SimKind::Absent {
            return;
        }
        let app = std::mem::take(&mut self.app_next);
        let state = if self.ready { R1_READY } else { R1_IDLE };

        // Ncr: one idle byte before every response.
        self.out.push_back(IDLE_BYTE);
        match index {
            GO_IDLE_STATE if crc != CRC_GO_IDLE => self.out.push_back(R1_CRC),
            GO_IDLE_STATE => {
                self.ready = false;
                self.streaming = None;
                self.out.push_back(R1_IDLE);
            }
            SEND_IF_COND if self.kind == SimKind::V1 => self.out.push_back(R1_ILLEGAL),
            SEND_IF_COND => {
                let [.., voltage, _] = argument.to_be_bytes();
                self.out.extend([state, 0x00, 0x00, voltage, self.echo]);
            }
            APP_CMD => {
                self.app_next = true;
                self.out.push_back(state);
            }
            SD_SEND_OP_COND if app => {
                if self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    self.out.push_back(R1_IDLE);
                } else {
                    self.ready = true;
                    self.out.push_back(R1_READY);
                }
            }
            READ_OCR => {
                let ccs = if self.kind == SimKind::Sdhc { 0x40 } else { 0x00 };
                self.out.extend([state, 0x80 | ccs, 0xFF, 0x80, 0x00]);
            }
            SET_BLOCKLEN => self.out.push_back(state),
            READ_SINGLE_BLOCK | READ_MULTIPLE_BLOCK if !self.ready => {
                self.out.push_back(R1_ILLEGAL);
            }
            READ_SINGLE_BLOCK | READ_MULTIPLE_BLOCK => {
                let Some(block) = self.block_index(argument) else {
                    self.out.push_back(R1_ADDRESS);
                    return;
                };
                self.out.extend(std::iter::repeat(IDLE_BYTE).take(self.accept_delay));
                self.out.push_back(R1_READY);
                if index == READ_SINGLE_BLOCK {
                    self.push_block(block);
                } else {
                    self.streaming = Some(block);
                }
            }
            STOP_TRANSMISSION => {
                self.streaming = None;
                self.out.clear();
                // Stuff byte, R1, two busy bytes, released.
                self.out
                    .extend([STUFF_BYTE, IDLE_BYTE, R1_READY, 0x00, 0x00, IDLE_BYTE]);
            }
            _ => self.out.push_back(ILLEGAL_BIT | state),
        }
    }

    fn block_index(&self, argument: u32) -> Option<u32> {
        match self.kind {
            SimKind::Sdhc => Some(argument),
            _ if argument % BLOCK_SIZE as u32 != 0 => None,
            _ => Some(argument / BLOCK_SIZE as u32),
        }
    }

    fn stream_next_block(&mut self) {
        if let Some(block) = self.streaming {
            self.out.push_back(IDLE_BYTE);
            if self.data_error_at == Some(block) {
                self.data_error_at = None;
                self.out.extend([IDLE_BYTE, DATA_ERROR_TOKEN]);
            } else {
                self.push_block(block);
            }
            self.streaming = Some(block + 1);
        }
    }

    fn push_block(&mut self, block: u32) {
        let start = block as usize * BLOCK_SIZE;
        self.out.extend([IDLE_BYTE, DATA_START]);
        self.out.extend(
            (start..start + BLOCK_SIZE).map(|at| self.image.get(at).copied().unwrap_or(0)),
        );
        self.out.extend([0xC3, 0x3C]);
    }
}

impl ErrorType for SimulatedCard {
    type Error = Infallible;
}

impl SpiBus<u8> for SimulatedCard {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.clock(IDLE_BYTE);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.clock(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for at in 0..read.len().max(write.len()) {
            let miso = self.clock(write.get(at).copied().unwrap_or(IDLE_BYTE));
            if let Some(slot) = read.get_mut(at) {
                *slot = miso;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.clock(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl BusSpeed for SimulatedCard {
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.frequencies.push(hz);
        Ok(())
    }
}

/// Chip-select line wired to a [`SimulatedCard`]. Active low.
pub struct SimChipSelect {
    selected: Rc<Cell<bool>>,
}

impl SimChipSelect {
    /// Whether the card is currently selected.
    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }
}

impl PinErrorType for SimChipSelect {
    type Error = Infallible;
}

impl OutputPin for SimChipSelect {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.selected.set(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.selected.set(false);
        Ok(())
    }
}
