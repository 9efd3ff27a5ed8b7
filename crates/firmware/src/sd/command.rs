//! SD SPI-mode command framing and responses.
//!
//! # Command frame (6 bytes)
//!
//! ```text
//! [0]     0b01 | index (6 bits)   -> index | 0x40
//! [1..5]  argument, big-endian
//! [5]     CRC7 << 1 | 1
//! ```
//!
//! CRC is only checked by the card before it leaves the idle state, so only
//! CMD0 and CMD8 carry a real checksum; every other frame sends the end bit
//! alone.

use bitflags::bitflags;

/// Reset, enter SPI mode.
pub const GO_IDLE_STATE: u8 = 0;
/// Voltage check; rejected as illegal by version 1 cards.
pub const SEND_IF_COND: u8 = 8;
/// Stop a multi-block read.
pub const STOP_TRANSMISSION: u8 = 12;
/// Block length for byte-addressed cards.
pub const SET_BLOCKLEN: u8 = 16;
/// Single-block read.
pub const READ_SINGLE_BLOCK: u8 = 17;
/// Multi-block read, ended by [`STOP_TRANSMISSION`].
pub const READ_MULTIPLE_BLOCK: u8 = 18;
/// Application command (ACMD41).
pub const SD_SEND_OP_COND: u8 = 41;
/// Prefix for the next command being application specific.
pub const APP_CMD: u8 = 55;
/// Read the operation conditions register.
pub const READ_OCR: u8 = 58;

/// Precomputed CRC byte for `CMD0(0)`.
pub const CRC_GO_IDLE: u8 = 0x95;
/// Precomputed CRC byte for `CMD8(0x1AA)`.
pub const CRC_IF_COND: u8 = 0x87;
/// End bit only, for frames sent after CRC checking is off.
pub const CRC_NONE: u8 = 0x01;

/// CMD8 argument: 2.7-3.6 V supply plus the `0xAA` check pattern.
pub const IF_COND_ARG: u32 = 0x0000_01AA;
/// Check pattern echoed back in the last byte of the R7 response.
pub const CHECK_PATTERN: u8 = 0xAA;
/// ACMD41 argument bit announcing host support for high capacity cards.
pub const HCS: u32 = 1 << 30;
/// OCR bit (first response byte) set once power-up has completed.
pub const OCR_POWER_UP: u8 = 0x80;
/// OCR card capacity status bit (first response byte): block addressing.
pub const OCR_CCS: u8 = 0x40;

/// Token preceding every data block.
pub const DATA_START: u8 = 0xFE;
/// Idle bus level; also what the host clocks out while reading.
pub const IDLE_BYTE: u8 = 0xFF;

/// Bytes polled for an R1 after a command frame.
pub const RESPONSE_POLLS: usize = 9;
/// Bytes polled for the `0x00` acceptance of a read command.
pub const ACCEPT_POLLS: usize = 10;
/// Idle bytes clocked with chip-select high at power-up (80 clocks).
pub const WAKE_BYTES: usize = 10;

/// Encode a command frame.
pub fn frame(index: u8, argument: u32, crc: u8) -> [u8; 6] {
    let [a, b, c, d] = argument.to_be_bytes();
    [index | 0x40, a, b, c, d, crc]
}

bitflags! {
    /// R1 response: one status byte after every command.
    ///
    /// Bit 7 is always clear in a real response; `0xFF` means the card
    /// never answered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct R1: u8 {
        /// Card is in the idle state, running its init process.
        const IDLE = 1 << 0;
        /// An erase sequence was cleared before executing.
        const ERASE_RESET = 1 << 1;
        /// Command index not supported in the current state.
        const ILLEGAL_COMMAND = 1 << 2;
        /// CRC check of the last command failed.
        const CRC_ERROR = 1 << 3;
        /// Error in the sequence of erase commands.
        const ERASE_SEQUENCE_ERROR = 1 << 4;
        /// Misaligned address.
        const ADDRESS_ERROR = 1 << 5;
        /// Argument outside the allowed range.
        const PARAMETER_ERROR = 1 << 6;
        /// Never set by a card that answered.
        const NO_RESPONSE = 1 << 7;
    }
}

impl R1 {
    /// Decode a raw byte, keeping every bit.
    pub fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// Command accepted and card out of idle.
    pub fn is_ready(self) -> bool {
        self.is_empty()
    }

    /// Exactly the idle bit, as required after `GO_IDLE_STATE`.
    pub fn is_idle_only(self) -> bool {
        self == Self::IDLE
    }

    /// Any of the six error bits, or no answer at all.
    pub fn has_error(self) -> bool {
        self.intersects(!(Self::IDLE))
    }
}
