//! The player context: everything the main loop owns, in one place.
//!
//! ```text
//!            ┌──────────── Player ─────────────┐
//! buttons ──►│ input ──► transport ──┐         │
//!            │                       ▼         │
//!  card ────►│ engine (volume, playlist) ◄─ codec
//!            └─────────────────────────────────┘
//!                       ▲ refill flags
//!                SAI task (on_buffer_exhausted)
//! ```
//!
//! One [`Player::run_once`] is one main-loop iteration: refill what the SAI
//! has finished with, then act on every queued gesture.

use platform::{AudioCodec, AudioStream, BlockDevice, HeadphoneVolume, InputDevice};
use playback::{EngineError, PlaybackBufferEngine, PollOutcome};

use crate::transport::{TransportAction, TransportController};

/// What one main-loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    /// Buffer engine result.
    pub outcome: PollOutcome,
    /// Gestures handled.
    pub events: usize,
    /// The last gesture's effect, if any.
    pub last_action: Option<TransportAction>,
}

/// Buffer engine, codec, button source and transport state.
pub struct Player<'a, D, C, I, const N: usize, const P: usize> {
    engine: PlaybackBufferEngine<'a, D, N, P>,
    codec: C,
    input: I,
    transport: TransportController,
}

impl<'a, D, C, I, const N: usize, const P: usize> Player<'a, D, C, I, N, P>
where
    D: BlockDevice,
    C: AudioCodec,
    I: InputDevice,
{
    /// Bundle the parts; `volume` is the gain the codec was initialised with.
    pub fn new(
        engine: PlaybackBufferEngine<'a, D, N, P>,
        codec: C,
        input: I,
        volume: HeadphoneVolume,
    ) -> Self {
        Self {
            engine,
            codec,
            input,
            transport: TransportController::new(volume),
        }
    }

    /// Prime both buffers and arm `stream`.
    pub fn start<S: AudioStream>(
        &mut self,
        stream: &mut S,
    ) -> Result<(), EngineError<D::Error, S::Error>> {
        self.engine.start(stream)
    }

    /// One main-loop iteration.
    pub async fn run_once(&mut self) -> Result<Step, EngineError<D::Error, C::Error>> {
        let outcome = self.engine.poll(&mut self.codec).await?;

        let mut step = Step {
            outcome,
            events: 0,
            last_action: None,
        };
        while let Some(event) = self.input.poll_event() {
            let action = self
                .transport
                .handle(event, &mut self.engine, &mut self.codec)
                .await?;
            step.events += 1;
            step.last_action = Some(action);
        }
        Ok(step)
    }

    /// The buffer engine.
    pub fn engine(&self) -> &PlaybackBufferEngine<'a, D, N, P> {
        &self.engine
    }

    /// The codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// The button source.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Current headphone gain.
    pub fn volume(&self) -> HeadphoneVolume {
        self.transport.volume()
    }
}
