//! NoiseBLASTER firmware
//!
//! WAV player for STM32H7: SD card over SPI, FAT16, double-buffered SAI
//! output to a TLV320DAC23, three-button transport.
//!
//! # Architecture
//!
//! ```text
//! Application Layer (main.rs, player, transport, fault)
//!         ↓
//! Feature Layers (fat16, playback crates)
//!         ↓
//! Drivers (sd, audio, input)
//!         ↓
//! Platform HAL (Embassy, STM32)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy, defmt)
//! - `std` - Host build: scripted SD card and platform mocks for tests
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Host Tests
//!
//! ```bash
//! cargo test -p firmware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::unused_self)]
#![allow(clippy::unused_async)]

pub mod audio;
pub mod boot;
pub mod fault;
pub mod input;
pub mod player;
pub mod sd;
pub mod transport;

// Re-export key types
pub use audio::{StreamHandle, Tlv320Dac23};
pub use boot::{mount_library, Library};
pub use fault::FatalFault;
pub use input::{ButtonEvents, TransportDebouncer};
pub use player::{Player, Step};
pub use sd::{CardType, SdCard, SdError};
pub use transport::{TransportAction, TransportController};
