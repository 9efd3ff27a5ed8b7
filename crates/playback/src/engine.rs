//! Playback buffer engine.
//!
//! `PlaybackBufferEngine` keeps the hardware fed: it primes both stream
//! buffers from the current file, arms the [`AudioStream`], and on every
//! main-loop [`poll`](PlaybackBufferEngine::poll) refills whichever buffer the
//! buffer-exhausted handler has flagged. A refill that comes back short of a
//! full buffer is the end-of-file signal and moves to the next track.
//!
//! # Real-time contract
//!
//! One refill must complete in less than one buffer's play time
//! (`N / (sample_rate * block_align)` seconds). A slower refill means the
//! hardware replays a stale buffer and the output audibly glitches.
//!
//! # Masking
//!
//! The check, clear and read for one buffer run inside a single critical
//! section, as does the re-prime after a track change, so the handler can
//! never flip ownership halfway through. Codec writes are awaited outside
//! any critical section.

use fat16::{Fat16Error, Fat16Volume, FileCursor};
use platform::config::WAV_HEADER_BYTES;
use platform::{AudioCodec, AudioStream, BlockDevice};
use thiserror_no_std::Error;

use crate::buffers::{Slot, StreamBuffers};
use crate::playlist::{Direction, Playlist};
use crate::wav::{WavError, WavHeader};

/// What one [`PlaybackBufferEngine::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No buffer was waiting for a refill.
    Idle,
    /// At least one buffer was refilled with a full block.
    Refilled,
    /// The current file ran out and the next track is now primed.
    TrackChanged,
}

/// Errors returned by `PlaybackBufferEngine` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError<E: core::fmt::Debug, P: core::fmt::Debug> {
    /// Reading the track failed.
    #[error("storage: {0}")]
    Storage(Fat16Error<E>),
    /// The codec or stream peripheral rejected a command.
    #[error("peripheral: {0:?}")]
    Peripheral(P),
    /// The playlist has no current track.
    #[error("no tracks")]
    NoTracks,
}

impl<E: core::fmt::Debug, P: core::fmt::Debug> From<Fat16Error<E>> for EngineError<E, P> {
    fn from(e: Fat16Error<E>) -> Self {
        Self::Storage(e)
    }
}

/// Double-buffered streamer from a FAT16 volume to the audio hardware.
pub struct PlaybackBufferEngine<'a, D, const N: usize, const P: usize> {
    volume: Fat16Volume<D>,
    buffers: &'a StreamBuffers<N>,
    playlist: Playlist<P>,
    cursor: FileCursor,
    format: Result<WavHeader, WavError>,
    transitions: u32,
}

impl<'a, D: BlockDevice, const N: usize, const P: usize> PlaybackBufferEngine<'a, D, N, P> {
    /// Open the playlist's current track and skip its header. Nothing is
    /// buffered until [`start`](Self::start).
    pub fn new(
        mut volume: Fat16Volume<D>,
        buffers: &'a StreamBuffers<N>,
        playlist: Playlist<P>,
    ) -> Result<Self, EngineError<D::Error, core::convert::Infallible>> {
        let entry = playlist.current().ok_or(EngineError::NoTracks)?;
        let (cursor, format) = open_track(&mut volume, entry)?;
        Ok(Self {
            volume,
            buffers,
            playlist,
            cursor,
            format,
            transitions: 0,
        })
    }

    /// Prime front and back buffers, then arm the stream.
    pub fn start<S: AudioStream>(
        &mut self,
        stream: &mut S,
    ) -> Result<(), EngineError<D::Error, S::Error>> {
        critical_section::with(|cs| {
            self.buffers.reset(cs);
            for slot in Slot::ALL {
                self.prime(cs, slot)?;
            }
            Ok::<_, Fat16Error<D::Error>>(())
        })?;
        stream.start().map_err(EngineError::Peripheral)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "playback: streaming track {=usize}/{=usize}",
            self.playlist.index() + 1,
            self.playlist.len()
        );
        Ok(())
    }

    /// Refill every flagged buffer; change track on end of file.
    ///
    /// Call once per main-loop iteration. Blocking storage reads happen
    /// here and nowhere else.
    pub async fn poll<C: AudioCodec>(
        &mut self,
        codec: &mut C,
    ) -> Result<PollOutcome, EngineError<D::Error, C::Error>> {
        let mut outcome = PollOutcome::Idle;
        for slot in Slot::ALL {
            let refill = critical_section::with(|cs| {
                let Some(mut buf) = self.buffers.take_refill(cs, slot) else {
                    return Ok(None);
                };
                let got = self.volume.read(&mut self.cursor, buf.bytes_mut())?;
                buf.silence_from(got);
                Ok::<_, Fat16Error<D::Error>>(Some(got))
            })?;

            match refill {
                None => {}
                Some(got) if got == N => {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("playback: refilled {}", slot);
                    outcome = PollOutcome::Refilled;
                }
                Some(_) => {
                    self.transition(Direction::Next, codec).await?;
                    return Ok(PollOutcome::TrackChanged);
                }
            }
        }
        Ok(outcome)
    }

    /// Switch to the neighbouring track in `direction`.
    ///
    /// Mutes, advances the playlist, reopens and skips the header, re-primes
    /// both buffers, drops pending refill requests and unmutes if playing.
    ///
    /// If the new track cannot be opened the playlist stays on it and the
    /// codec stays muted; the next transition moves on from there.
    pub async fn transition<C: AudioCodec>(
        &mut self,
        direction: Direction,
        codec: &mut C,
    ) -> Result<(), EngineError<D::Error, C::Error>> {
        codec.set_mute(true).await.map_err(EngineError::Peripheral)?;

        let index = self.playlist.advance(direction);
        critical_section::with(|cs| {
            let entry = self.playlist.current().ok_or(EngineError::NoTracks)?;
            let (cursor, format) = open_track(&mut self.volume, entry)?;
            self.cursor = cursor;
            self.format = format;

            let live = self.buffers.in_flight(cs);
            self.prime(cs, live)?;
            self.prime(cs, live.other())?;
            self.buffers.clear_refill_flags(cs);
            Ok::<_, EngineError<D::Error, C::Error>>(())
        })?;
        self.transitions = self.transitions.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::info!("playback: {} -> track {=usize}", direction, index + 1);
        #[cfg(not(feature = "defmt"))]
        let _ = index;

        if self.playlist.is_playing() {
            codec.set_mute(false).await.map_err(EngineError::Peripheral)?;
        }
        Ok(())
    }

    /// Play or pause by unmuting or muting the digital path. The hardware
    /// stream keeps running either way.
    pub async fn set_playing<C: AudioCodec>(
        &mut self,
        playing: bool,
        codec: &mut C,
    ) -> Result<(), C::Error> {
        codec.set_mute(!playing).await?;
        self.playlist.set_playing(playing);
        Ok(())
    }

    /// Flip between playing and paused; returns the new playing state.
    pub async fn toggle_playing<C: AudioCodec>(&mut self, codec: &mut C) -> Result<bool, C::Error> {
        let playing = !self.playlist.is_playing();
        self.set_playing(playing, codec).await?;
        #[cfg(feature = "defmt")]
        defmt::debug!("playback: {}", if playing { "play" } else { "pause" });
        Ok(playing)
    }

    /// Fill `slot` from the cursor, silencing whatever the file could not
    /// supply.
    fn prime(
        &mut self,
        cs: critical_section::CriticalSection<'_>,
        slot: Slot,
    ) -> Result<usize, Fat16Error<D::Error>> {
        let Some(mut buf) = self.buffers.buffer_mut(cs, slot) else {
            return Ok(0);
        };
        let got = self.volume.read(&mut self.cursor, buf.bytes_mut())?;
        buf.silence_from(got);
        Ok(got)
    }

    /// Transport position.
    pub fn playlist(&self) -> &Playlist<P> {
        &self.playlist
    }

    /// Position in the current file.
    pub fn cursor(&self) -> &FileCursor {
        &self.cursor
    }

    /// Header of the current file, or why it could not be read.
    pub fn format(&self) -> Result<WavHeader, WavError> {
        self.format
    }

    /// Track changes since construction.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// The mounted volume.
    pub fn volume(&mut self) -> &mut Fat16Volume<D> {
        &mut self.volume
    }
}

/// Open `entry` and consume its header, leaving the cursor on the first
/// sample byte.
fn open_track<D: BlockDevice>(
    volume: &mut Fat16Volume<D>,
    entry: &fat16::DirectoryEntry,
) -> Result<(FileCursor, Result<WavHeader, WavError>), Fat16Error<D::Error>> {
    let mut cursor = volume.open(entry)?;
    let mut raw = [0u8; WAV_HEADER_BYTES];
    let got = volume.read(&mut cursor, &mut raw)?;
    let format = if got < WAV_HEADER_BYTES {
        Err(WavError::Truncated)
    } else {
        WavHeader::parse(&raw)
    };

    #[cfg(feature = "defmt")]
    match &format {
        Ok(h) => defmt::debug!(
            "playback: {=u16} ch, {=u32} Hz, {=u16} bit, {=u32} bytes",
            h.channels,
            h.sample_rate,
            h.bits_per_sample,
            h.data_len
        ),
        Err(e) => defmt::warn!("playback: bad WAV header ({}), playing as raw PCM", e),
    }

    Ok((cursor, format))
}
