//! SAI audio output: streams the in-flight stream buffer to the codec.
//!
//! # Hardware: SAI1 block A (master transmitter), 16-bit I²S, 44.1 kHz
//!
//! ## SAI1 Pin Assignments (STM32H743ZI LQFP-144)
//!   - PE2  → SAI1_MCLK_A  (master clock out, 256×fs)
//!   - PE4  → SAI1_FS_A    (frame sync / L/R clock)
//!   - PE5  → SAI1_SCK_A   (bit clock)
//!   - PE6  → SAI1_SD_A    (serial data out)
//!
//! ## Hand-off with the buffer engine
//!
//! ```text
//!   main loop                         SAI task
//!   ─────────                         ────────
//!   engine.start(&mut StreamHandle) ──► StreamSignal fires
//!                                     loop {
//!                                       copy in-flight buffer → DMA ring
//!                                       buffers.on_buffer_exhausted()
//!   engine.poll() ◄── refill flag ────  }
//! ```
//!
//! The task never reads storage: a pass is one critical-section copy of the
//! in-flight buffer plus a DMA ring write. The buffer-exhausted event is
//! raised once the whole buffer has been handed to the ring, which is when
//! the engine may start overwriting it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use platform::AudioStream;
use playback::{Slot, StreamBuffers};

/// Raised once by [`StreamHandle::start`]; the SAI task waits on it before
/// the first transfer.
pub type StreamSignal = Signal<CriticalSectionRawMutex, ()>;

/// Destination for 16-bit interleaved stereo samples.
pub trait SampleSink {
    /// Error type
    type Error: core::fmt::Debug;

    /// Queue `samples` for output, waiting for room if the ring is full.
    fn write(
        &mut self,
        samples: &[u16],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Send the in-flight buffer to `sink`, then flip buffers.
///
/// `scratch` holds the little-endian words of one buffer; anything beyond
/// `N / 2` words is unused. Returns the slot now in flight.
pub async fn pump_once<S: SampleSink, const N: usize>(
    sink: &mut S,
    buffers: &StreamBuffers<N>,
    scratch: &mut [u16],
) -> Result<Slot, S::Error> {
    let words = buffers
        .with_in_flight(|bytes| to_words(bytes, scratch))
        .unwrap_or_else(|| silence(scratch, N / 2));

    sink.write(scratch.get(..words).unwrap_or_default()).await?;

    let next = buffers.on_buffer_exhausted();
    #[cfg(feature = "defmt")]
    defmt::trace!("sai: {=usize} words out, {} in flight", words, next);
    Ok(next)
}

fn to_words(bytes: &[u8], scratch: &mut [u16]) -> usize {
    let mut words = 0;
    for (word, pair) in scratch.iter_mut().zip(bytes.chunks_exact(2)) {
        if let &[lo, hi] = pair {
            *word = u16::from_le_bytes([lo, hi]);
            words += 1;
        }
    }
    words
}

// The in-flight buffer is only unavailable while the main loop holds it,
// which cannot happen across a critical section; keep the clock running.
fn silence(scratch: &mut [u16], words: usize) -> usize {
    let words = words.min(scratch.len());
    if let Some(head) = scratch.get_mut(..words) {
        head.fill(0);
    }
    words
}

/// [`AudioStream`] half owned by the buffer engine: arming it releases the
/// SAI task.
pub struct StreamHandle<'a> {
    armed: &'a StreamSignal,
    running: bool,
}

impl<'a> StreamHandle<'a> {
    /// Handle that fires `armed` on start.
    pub fn new(armed: &'a StreamSignal) -> Self {
        Self {
            armed,
            running: false,
        }
    }
}

impl AudioStream for StreamHandle<'_> {
    type Error = core::convert::Infallible;

    fn start(&mut self) -> Result<(), Self::Error> {
        if !self.running {
            self.armed.signal(());
            self.running = true;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

// ── Hardware task ────────────────────────────────────────────────────────────

#[cfg(feature = "hardware")]
pub use hardware::{sai_task, SaiOut, STREAM_ARMED, STREAM_WORDS};

#[cfg(feature = "hardware")]
mod hardware {
    use embassy_stm32::peripherals::SAI1;
    use embassy_stm32::sai::{Error as SaiError, Sai};
    use platform::config::STREAM_BUFFER_BYTES;
    use playback::StreamBuffers;

    use super::{pump_once, SampleSink, StreamSignal};

    /// Words per stream buffer.
    pub const STREAM_WORDS: usize = STREAM_BUFFER_BYTES / 2;

    /// The board's stream start signal.
    pub static STREAM_ARMED: StreamSignal = StreamSignal::new();

    /// SAI1 block A driving 16-bit words.
    pub type SaiOut = Sai<'static, SAI1, u16>;

    impl SampleSink for SaiOut {
        type Error = SaiError;

        async fn write(&mut self, samples: &[u16]) -> Result<(), Self::Error> {
            Sai::write(self, samples).await
        }
    }

    /// Wait for the engine to arm the stream, then feed the SAI forever.
    ///
    /// A ring overrun is logged and streaming carries on from the current
    /// in-flight buffer.
    #[embassy_executor::task]
    pub async fn sai_task(
        mut sai: SaiOut,
        buffers: &'static StreamBuffers<STREAM_BUFFER_BYTES>,
    ) {
        STREAM_ARMED.wait().await;
        defmt::info!("sai: streaming");

        let mut scratch = [0u16; STREAM_WORDS];
        loop {
            if let Err(e) = pump_once(&mut sai, buffers, &mut scratch).await {
                defmt::warn!("sai: {}", defmt::Debug2Format(&e));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<Vec<u16>>,
    }

    impl SampleSink for Recorder {
        type Error = core::convert::Infallible;

        async fn write(&mut self, samples: &[u16]) -> Result<(), Self::Error> {
            self.writes.push(samples.to_vec());
            Ok(())
        }
    }

    fn fill(buffers: &StreamBuffers<8>, slot: Slot, bytes: [u8; 8]) {
        critical_section::with(|cs| {
            *buffers.buffer_mut(cs, slot).unwrap().bytes_mut() = bytes;
        });
    }

    #[tokio::test]
    async fn pump_sends_little_endian_words_and_flips() {
        let buffers = StreamBuffers::<8>::new();
        fill(&buffers, Slot::Front, [0x01, 0x02, 0x03, 0x04, 0, 0, 0xFF, 0x7F]);
        let mut sink = Recorder::default();
        let mut scratch = [0u16; 4];

        let next = pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();

        assert_eq!(next, Slot::Back);
        assert_eq!(sink.writes, vec![vec![0x0201, 0x0403, 0x0000, 0x7FFF]]);
        assert!(buffers.refill_pending(Slot::Front));
        assert!(!buffers.refill_pending(Slot::Back));
    }

    #[tokio::test]
    async fn consecutive_pumps_alternate_buffers() {
        let buffers = StreamBuffers::<8>::new();
        fill(&buffers, Slot::Front, [1; 8]);
        fill(&buffers, Slot::Back, [2; 8]);
        let mut sink = Recorder::default();
        let mut scratch = [0u16; 4];

        pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();
        pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();
        let next = pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();

        assert_eq!(next, Slot::Back);
        let firsts: Vec<u16> = sink.writes.iter().map(|w| w[0]).collect();
        assert_eq!(firsts, [0x0101, 0x0202, 0x0101]);
    }

    #[test]
    fn stream_handle_signals_once() {
        let armed = StreamSignal::new();
        let mut stream = StreamHandle::new(&armed);
        assert!(!stream.is_running());
        assert!(!armed.signaled());

        stream.start().unwrap();
        assert!(stream.is_running());
        assert!(armed.signaled());

        armed.reset();
        stream.start().unwrap();
        assert!(!armed.signaled());
    }
}
