//! Audio domain newtypes for compile-time safety.
//!
//! - `HeadphoneVolume`: clamps 0–79, the codec's audible gain range
//! - `SampleRateHz`: validates the 8–96 kHz range the codec clocks support

use thiserror_no_std::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── HeadphoneVolume ──────────────────────────────────────────────────────────

/// Headphone gain step, clamped to `0..=79`.
///
/// The codec register encodes this with an offset of 48 (register values
/// below 48 mute the output); the offset is applied by the codec driver, so
/// this type only carries the user-facing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct HeadphoneVolume(u8);

impl HeadphoneVolume {
    /// Highest accepted volume step.
    pub const MAX: u8 = 79;

    /// Create a `HeadphoneVolume`, clamping values above 79 to 79.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// Create a `HeadphoneVolume`, returning an error if `value > 79`.
    pub fn try_new(value: u8) -> Result<Self, OutOfRangeError> {
        if value > Self::MAX {
            Err(OutOfRangeError {
                value: u32::from(value),
                min: 0,
                max: u32::from(Self::MAX),
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Louder by `step`, saturating at 79.
    #[must_use]
    pub fn step_up(self, step: u8) -> Self {
        Self::new(self.0.saturating_add(step))
    }

    /// Quieter by `step`, saturating at 0.
    #[must_use]
    pub fn step_down(self, step: u8) -> Self {
        Self(self.0.saturating_sub(step))
    }

    /// Return the inner volume step (0–79).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range the codec's divider table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz.
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 96000 Hz.
    pub const MAX_HZ: u32 = 96_000;

    /// 44.1 kHz, the rate the codec clock tree is wired for.
    pub const CD: Self = Self(44_100);

    /// Create a `SampleRateHz`, returning an error if out of 8000–96000 Hz.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}
