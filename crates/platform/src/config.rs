//! Application configuration and constants
//!
//! Central tuning values shared by the storage, playback and transport
//! layers. Everything here is compile-time; there is no runtime config store.

/// The application name
pub const APP_NAME: &str = "NoiseBLASTER";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Transport / debounce ─────────────────────────────────────────────────────

/// Debounce tick rate in Hz.
pub const DEBOUNCE_TICK_HZ: u32 = 25;

/// Debounce tick period in milliseconds.
pub const DEBOUNCE_TICK_MS: u64 = 1_000 / DEBOUNCE_TICK_HZ as u64;

/// Minimum held ticks for a release to count as a short press.
pub const SHORT_PRESS_TICKS: u8 = 3;

/// Held ticks at which a hold gesture fires.
pub const HOLD_TICKS: u8 = 15;

/// Volume change per short press of a volume button.
pub const VOLUME_STEP: u8 = 4;

/// Headphone volume applied at power-up.
pub const DEFAULT_VOLUME: u8 = 20;

// ── Library ──────────────────────────────────────────────────────────────────

/// 8.3 extension of playable files.
pub const TRACK_EXTENSION: [u8; 3] = *b"WAV";

/// Maximum number of tracks collected from the root directory.
pub const MAX_TRACKS: usize = 100;

/// Size of the RIFF/WAVE header skipped before the first sample.
pub const WAV_HEADER_BYTES: usize = 44;

// ── Streaming ────────────────────────────────────────────────────────────────

/// Bytes per stream buffer.
///
/// At 44.1 kHz 16-bit stereo one buffer lasts ~11.6 ms; a refill must finish
/// within that window or the output underruns.
pub const STREAM_BUFFER_BYTES: usize = 2048;

// ── SD card bus ──────────────────────────────────────────────────────────────

/// SPI clock during card bring-up (must stay within 100–400 kHz).
pub const SD_INIT_HZ: u32 = 250_000;

/// SPI clock once the card reports ready.
pub const SD_OPERATING_HZ: u32 = 20_000_000;
