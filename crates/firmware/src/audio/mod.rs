//! Audio output: the codec's control plane and the serial sample stream.
//!
//! # Structure
//!
//! - `dac/`: TLV320DAC23 register map and I²C driver
//! - `sai_task`: copies the in-flight stream buffer to the SAI and reports
//!   buffer exhaustion back to the buffer engine
//!
//! Application code targets [`platform::AudioCodec`] and
//! [`platform::AudioStream`]; concrete types are injected at the call site:
//!
//! ```rust,ignore
//! // Hardware:
//! Player::new(engine, Tlv320Dac23::new(i2c), ButtonEvents::new(&BUTTON_EVENTS));
//! // Tests:
//! Player::new(engine, MockCodec::new(), MockInput::new());
//! ```

pub mod dac;
pub mod sai_task;

pub use dac::tlv320dac23::Tlv320Dac23;
pub use sai_task::{pump_once, SampleSink, StreamHandle, StreamSignal};
