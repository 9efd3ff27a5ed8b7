//! Audio codec abstraction

use crate::audio_types::{HeadphoneVolume, SampleRateHz};

/// Audio codec trait
///
/// Covers only the control plane: sample data reaches the codec over the
/// serial audio bus via [`crate::AudioStream`], never through this trait.
pub trait AudioCodec {
    /// Error type
    type Error: core::fmt::Debug;

    /// Initialize codec with configuration
    fn init(
        &mut self,
        config: AudioConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Set headphone output gain.
    fn set_volume(
        &mut self,
        volume: HeadphoneVolume,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Mute or unmute the digital audio path.
    ///
    /// The serial audio stream keeps running while muted.
    fn set_mute(
        &mut self,
        muted: bool,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Audio configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate
    pub sample_rate: SampleRateHz,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u8,
    /// Bit depth
    pub bit_depth: u8,
    /// Initial headphone volume
    pub volume: HeadphoneVolume,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRateHz::CD,
            channels: 2,
            bit_depth: 16,
            volume: HeadphoneVolume::new(crate::config::DEFAULT_VOLUME),
        }
    }
}
