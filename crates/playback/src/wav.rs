//! Canonical 44-byte RIFF/WAVE header.
//!
//! Only the fixed layout is understood; files with extra chunks before
//! `data` are reported as [`WavError::MissingData`] and played with the
//! default format anyway.
//!
//! ```text
//! [0..4]   "RIFF"
//! [4..8]   RIFF size        u32 le
//! [8..12]  "WAVE"
//! [12..16] "fmt "
//! [16..20] fmt chunk size   u32 le
//! [20..22] audio format     u16 le  (1 = PCM)
//! [22..24] channels         u16 le
//! [24..28] sample rate      u32 le
//! [28..32] byte rate        u32 le
//! [32..34] block align      u16 le
//! [34..36] bits per sample  u16 le
//! [36..40] "data"
//! [40..44] data length      u32 le
//! ```

use platform::{config::WAV_HEADER_BYTES, OutOfRangeError, SampleRateHz};
use thiserror_no_std::Error;

/// Audio format tag for integer PCM.
pub const FORMAT_PCM: u16 = 1;

/// Header parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WavError {
    /// Bytes 0..4 are not `RIFF`.
    #[error("not a RIFF file")]
    NotRiff,
    /// Bytes 8..12 are not `WAVE`.
    #[error("RIFF form is not WAVE")]
    NotWave,
    /// Bytes 12..16 are not `fmt `.
    #[error("fmt chunk not at offset 12")]
    MissingFmt,
    /// Bytes 36..40 are not `data`.
    #[error("data chunk not at offset 36")]
    MissingData,
    /// Audio format tag other than PCM.
    #[error("unsupported audio format {0}")]
    UnsupportedFormat(u16),
    /// The file ended before a full header.
    #[error("file shorter than a WAV header")]
    Truncated,
}

/// Fields recovered from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavHeader {
    /// Channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bytes per second.
    pub byte_rate: u32,
    /// Bytes per frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Length of the sample data in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Parse the fixed header.
    ///
    /// All offsets are constants inside the 44-byte array.
    #[allow(clippy::indexing_slicing)]
    pub fn parse(raw: &[u8; WAV_HEADER_BYTES]) -> Result<Self, WavError> {
        let le16 = |at: usize| u16::from_le_bytes([raw[at], raw[at + 1]]);
        let le32 = |at: usize| u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);

        if &raw[0..4] != b"RIFF" {
            return Err(WavError::NotRiff);
        }
        if &raw[8..12] != b"WAVE" {
            return Err(WavError::NotWave);
        }
        if &raw[12..16] != b"fmt " {
            return Err(WavError::MissingFmt);
        }
        let format = le16(20);
        if format != FORMAT_PCM {
            return Err(WavError::UnsupportedFormat(format));
        }
        if &raw[36..40] != b"data" {
            return Err(WavError::MissingData);
        }

        Ok(Self {
            channels: le16(22),
            sample_rate: le32(24),
            byte_rate: le32(28),
            block_align: le16(32),
            bits_per_sample: le16(34),
            data_len: le32(40),
        })
    }

    /// Sample rate as a validated newtype.
    pub fn sample_rate_hz(&self) -> Result<SampleRateHz, OutOfRangeError> {
        SampleRateHz::new(self.sample_rate)
    }
}
