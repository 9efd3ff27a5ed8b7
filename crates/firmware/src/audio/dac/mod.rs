//! DAC drivers
//!
//! - `tlv320dac23`: TI TLV320DAC23 stereo DAC with headphone amplifier,
//!   controlled over I²C, fed 16-bit I²S from the SAI

pub mod tlv320dac23;
