//! Hardware Abstraction Layer (HAL) for the NoiseBLASTER player
//!
//! This crate provides trait-based abstractions for every peripheral the
//! playback pipeline touches, so the storage, filesystem and buffer engine
//! crates can be developed and tested on the host without a board.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: main loop, transport, drivers)
//!         ↓
//! Feature Layers (fat16, playback)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstractions
//!
//! - [`BlockDevice`] - 512-byte sector I/O, plus [`ByteWindow`] for
//!   byte-granular reads that straddle sectors
//! - [`AudioCodec`] - DAC register control (volume, mute)
//! - [`AudioStream`] - hardware double-buffered sample consumer
//! - [`InputDevice`] - debounced transport buttons
//! - [`BusSpeed`] - SPI clock switching for card bring-up
//!
//! # Features
//!
//! - `std`: host mocks in [`mocks`]
//! - `defmt`: `defmt::Format` derives

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
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod audio;
pub mod audio_types;
pub mod config;
pub mod dma;
pub mod input;
pub mod mocks;
pub mod peripheral;
pub mod storage;

// Re-export main high-level traits
pub use audio::{AudioCodec, AudioConfig};
pub use audio_types::{HeadphoneVolume, OutOfRangeError, SampleRateHz};
pub use dma::AudioStream;
pub use input::{Button, InputDevice, InputEvent};
pub use peripheral::BusSpeed;
pub use storage::{Block, BlockDevice, BlockIdx, ByteWindow, BLOCK_SIZE};
