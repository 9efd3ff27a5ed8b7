//! Audio playback engine: double-buffered WAV streaming from a FAT16 volume
//!
//! # Modules
//!
//! - [`buffers`]: front/back stream buffers shared with the buffer-exhausted handler
//! - [`playlist`]: track list, current index, playing flag
//! - [`wav`]: 44-byte RIFF/WAVE header
//! - [`engine`]: [`PlaybackBufferEngine`]: prime, refill, track transitions

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod buffers;
pub mod engine;
pub mod playlist;
pub mod wav;

pub use buffers::{Slot, StreamBuffer, StreamBuffers};
pub use engine::{EngineError, PlaybackBufferEngine, PollOutcome};
pub use playlist::{Direction, Playlist};
pub use wav::{WavError, WavHeader};
