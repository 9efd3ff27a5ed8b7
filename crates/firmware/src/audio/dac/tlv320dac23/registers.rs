//! TLV320DAC23 register map
//!
//! Source: Texas Instruments TLV320DAC23 data manual (SLWS106).
//!
//! # Control word
//!
//! Each write is a 16-bit word sent MSB first as two bytes: a 7-bit register
//! address followed by a 9-bit value. Bit 8 of the value therefore rides in
//! the low bit of the first byte:
//!
//! ```text
//! byte 0: A6 A5 A4 A3 A2 A1 A0 D8
//! byte 1: D7 D6 D5 D4 D3 D2 D1 D0
//! ```
//!
//! The chip is write-only; there is no register read-back.

/// 7-bit I²C address with CS tied low.
pub const I2C_ADDR: u8 = 0x1A;

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Left line input channel volume control
pub const REG_LEFT_LINE_IN: u8 = 0x00;

/// Right line input channel volume control
pub const REG_RIGHT_LINE_IN: u8 = 0x01;

/// Left channel headphone volume control
pub const REG_LEFT_HEADPHONE: u8 = 0x02;

/// Right channel headphone volume control
pub const REG_RIGHT_HEADPHONE: u8 = 0x03;

/// Analog audio path control
pub const REG_ANALOG_PATH: u8 = 0x04;

/// Digital audio path control
pub const REG_DIGITAL_PATH: u8 = 0x05;

/// Power-down control (a set bit powers the block down)
pub const REG_POWER_DOWN: u8 = 0x06;

/// Digital audio interface format
pub const REG_INTERFACE_FORMAT: u8 = 0x07;

/// Sample rate control
pub const REG_SAMPLE_RATE: u8 = 0x08;

/// Digital interface activation
pub const REG_ACTIVATION: u8 = 0x09;

/// Reset register
pub const REG_RESET: u8 = 0x0A;

// ---------------------------------------------------------------------------
// Line input (0x00 / 0x01)
// ---------------------------------------------------------------------------

/// Left/right simultaneous update
pub const LINE_IN_LRS: u16 = 1 << 8;

/// Line input mute
pub const LINE_IN_MUTE: u16 = 1 << 7;

// ---------------------------------------------------------------------------
// Headphone volume (0x02 / 0x03)
// ---------------------------------------------------------------------------

/// Left/right simultaneous update
pub const HP_LRS: u16 = 1 << 8;

/// Zero-cross detect: change gain only at a zero crossing
pub const HP_ZCE: u16 = 1 << 7;

/// Register value of the quietest audible step; anything below mutes.
pub const HP_VOLUME_OFFSET: u16 = 48;

/// Highest volume step (+6 dB at register value 127).
pub const HP_VOLUME_MAX: u8 = 79;

// ---------------------------------------------------------------------------
// Analog path (0x04)
// ---------------------------------------------------------------------------

/// DAC selected onto the output mixer
pub const ANALOG_DAC_SELECT: u16 = 1 << 4;

/// Line input bypass onto the output mixer
pub const ANALOG_BYPASS: u16 = 1 << 3;

// ---------------------------------------------------------------------------
// Digital path (0x05)
// ---------------------------------------------------------------------------

/// DAC soft mute
pub const DIGITAL_MUTE: u16 = 1 << 3;

/// De-emphasis control, 44.1 kHz (DEEMP = 0b10)
pub const DIGITAL_DEEMPHASIS_44K1: u16 = 0b10 << 1;

// ---------------------------------------------------------------------------
// Power down (0x06)
// ---------------------------------------------------------------------------

/// Whole device off
pub const PWR_OFF: u16 = 1 << 7;

/// Clock off
pub const PWR_CLK: u16 = 1 << 6;

/// Oscillator off
pub const PWR_OSC: u16 = 1 << 5;

/// Outputs off
pub const PWR_OUT: u16 = 1 << 4;

/// DAC off
pub const PWR_DAC: u16 = 1 << 3;

/// Line input off
pub const PWR_LINE: u16 = 1 << 0;

// ---------------------------------------------------------------------------
// Interface format (0x07)
// ---------------------------------------------------------------------------

/// Master mode (clear: slave, the MCU drives BCLK and LRCLK)
pub const FORMAT_MASTER: u16 = 1 << 6;

/// Swap left and right
pub const FORMAT_LR_SWAP: u16 = 1 << 5;

/// LRCLK phase
pub const FORMAT_LRP: u16 = 1 << 4;

/// I²S format, 16-bit word (IWL = 00, FOR = 10)
pub const FORMAT_I2S_16BIT: u16 = 0b10;

// ---------------------------------------------------------------------------
// Sample rate (0x08)
// ---------------------------------------------------------------------------

/// Clock output divider
pub const RATE_CLKOUT_DIV2: u16 = 1 << 7;

/// Clock input divider
pub const RATE_CLKIN_DIV2: u16 = 1 << 6;

/// Normal mode, 384 fs, 16.9344 MHz MCLK: 44.1 kHz (SR = 1000, BOSR = 1)
pub const RATE_NORMAL_44K1: u16 = (1 << 5) | (1 << 1);

// ---------------------------------------------------------------------------
// Activation (0x09) / reset (0x0A)
// ---------------------------------------------------------------------------

/// Digital interface active
pub const ACTIVATE: u16 = 1;

/// Value written to the reset register
pub const RESET_VALUE: u16 = 0xFF;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Pack a 7-bit register address and 9-bit value into the two bytes sent
/// on the bus.
#[allow(clippy::cast_possible_truncation)]
pub const fn encode(reg: u8, value: u16) -> [u8; 2] {
    [(reg << 1) | ((value >> 8) & 1) as u8, (value & 0xFF) as u8]
}

/// Headphone volume word for step `volume`, clamped to
/// [`HP_VOLUME_MAX`], applied to both channels at a zero crossing.
pub const fn headphone_volume(volume: u8) -> u16 {
    let step = if volume > HP_VOLUME_MAX {
        HP_VOLUME_MAX
    } else {
        volume
    };
    HP_LRS | HP_ZCE | (step as u16 + HP_VOLUME_OFFSET)
}

/// Digital path word: soft mute on or off, 44.1 kHz de-emphasis.
pub const fn digital_path(muted: bool) -> u16 {
    let mute = if muted { DIGITAL_MUTE } else { 0 };
    mute | DIGITAL_DEEMPHASIS_44K1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_bit_eight_lands_in_first_byte() {
        assert_eq!(encode(REG_LEFT_LINE_IN, LINE_IN_LRS | LINE_IN_MUTE), [0x01, 0x80]);
        assert_eq!(encode(REG_RESET, RESET_VALUE), [0x14, 0xFF]);
        assert_eq!(encode(REG_ACTIVATION, ACTIVATE), [0x12, 0x01]);
    }

    #[test]
    fn volume_above_range_is_clamped_before_encoding() {
        assert_eq!(headphone_volume(85), headphone_volume(HP_VOLUME_MAX));
        assert_eq!(encode(REG_RIGHT_HEADPHONE, headphone_volume(85)), [0x07, 0xFF]);
    }

    #[test]
    fn volume_zero_sits_on_the_mute_boundary() {
        assert_eq!(headphone_volume(0) & 0x7F, 48);
        assert_eq!(encode(REG_RIGHT_HEADPHONE, headphone_volume(20)), [0x07, 0xC4]);
    }

    #[test]
    fn digital_path_mute_bit() {
        assert_eq!(digital_path(false), 0x04);
        assert_eq!(digital_path(true), 0x0C);
    }
}
