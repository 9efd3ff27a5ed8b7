//! Transport commands: what each button gesture does to playback.
//!
//! | Gesture                  | Effect                                    |
//! |--------------------------|-------------------------------------------|
//! | Volume up, short press   | Gain +[`VOLUME_STEP`], clamped at 79      |
//! | Volume down, short press | Gain -[`VOLUME_STEP`], clamped at 0       |
//! | Play, short press / hold | Toggle play/pause (mute, stream keeps running) |
//! | Volume up, hold          | Next track                                |
//! | Volume down, hold        | Previous track                            |

use platform::config::VOLUME_STEP;
use platform::{AudioCodec, BlockDevice, Button, HeadphoneVolume, InputEvent};
use playback::{Direction, EngineError, PlaybackBufferEngine};

/// What a handled gesture changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportAction {
    /// Headphone gain written to the codec.
    Volume(HeadphoneVolume),
    /// Now playing (`true`) or paused.
    Playing(bool),
    /// Moved one track in this direction.
    Skipped(Direction),
}

/// Maps button gestures onto the codec and the buffer engine.
#[derive(Debug, Clone, Copy)]
pub struct TransportController {
    volume: HeadphoneVolume,
}

impl TransportController {
    /// Start from the gain the codec was initialised with.
    pub fn new(volume: HeadphoneVolume) -> Self {
        Self { volume }
    }

    /// Current headphone gain.
    pub fn volume(&self) -> HeadphoneVolume {
        self.volume
    }

    /// Carry out one gesture.
    pub async fn handle<D, C, const N: usize, const P: usize>(
        &mut self,
        event: InputEvent,
        engine: &mut PlaybackBufferEngine<'_, D, N, P>,
        codec: &mut C,
    ) -> Result<TransportAction, EngineError<D::Error, C::Error>>
    where
        D: BlockDevice,
        C: AudioCodec,
    {
        let action = match event {
            InputEvent::ShortPress(Button::VolumeUp) => self
                .set_volume(self.volume.step_up(VOLUME_STEP), codec)
                .await
                .map_err(EngineError::Peripheral)?,
            InputEvent::ShortPress(Button::VolumeDown) => self
                .set_volume(self.volume.step_down(VOLUME_STEP), codec)
                .await
                .map_err(EngineError::Peripheral)?,
            InputEvent::ShortPress(Button::Play) | InputEvent::Hold(Button::Play) => {
                let playing = engine
                    .toggle_playing(codec)
                    .await
                    .map_err(EngineError::Peripheral)?;
                TransportAction::Playing(playing)
            }
            InputEvent::Hold(Button::VolumeUp) => {
                engine.transition(Direction::Next, codec).await?;
                TransportAction::Skipped(Direction::Next)
            }
            InputEvent::Hold(Button::VolumeDown) => {
                engine.transition(Direction::Previous, codec).await?;
                TransportAction::Skipped(Direction::Previous)
            }
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("transport: {} -> {}", event, action);
        Ok(action)
    }

    async fn set_volume<C: AudioCodec>(
        &mut self,
        volume: HeadphoneVolume,
        codec: &mut C,
    ) -> Result<TransportAction, C::Error> {
        codec.set_volume(volume).await?;
        self.volume = volume;
        Ok(TransportAction::Volume(volume))
    }
}
