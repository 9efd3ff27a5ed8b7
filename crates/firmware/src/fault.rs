//! Fatal bring-up faults.
//!
//! Storage and codec failures during boot are not recoverable without a power cycle:
//! the player halts and blinks the fault LED in a pattern naming the cause.
//! There is no watchdog; [`halt`] never returns.
//!
//! ```text
//! CardNotIdle       ██ ██                 (2 blinks, pause, repeat)
//! NoFat16Partition  ██ ██ ██              (3)
//! NoTracks          ██ ██ ██ ██           (4)
//! Storage           ██ ██ ██ ██ ██        (5)
//! Codec             ██ ██ ██ ██ ██ ██     (6)
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use thiserror_no_std::Error;

/// LED on/off time of one blink, in milliseconds.
pub const BLINK_MS: u32 = 200;

/// Dark gap between two repetitions of a pattern, in milliseconds.
pub const PATTERN_GAP_MS: u32 = 1_000;

/// Conditions that stop the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalFault {
    /// The card did not enter the idle state after reset (missing or dead).
    #[error("card not idle after reset")]
    CardNotIdle,
    /// The partition table has no FAT16 entry.
    #[error("no FAT16 partition")]
    NoFat16Partition,
    /// The root directory holds no playable files.
    #[error("no tracks")]
    NoTracks,
    /// Any other card or filesystem error during bring-up.
    #[error("storage error")]
    Storage,
    /// The DAC did not acknowledge its register writes.
    #[error("codec not responding")]
    Codec,
}

impl FatalFault {
    /// Blinks per repetition of this fault's pattern.
    pub fn blinks(self) -> u8 {
        match self {
            Self::CardNotIdle => 2,
            Self::NoFat16Partition => 3,
            Self::NoTracks => 4,
            Self::Storage => 5,
            Self::Codec => 6,
        }
    }
}

/// Blink `fault`'s pattern once, ending dark after the pattern gap.
///
/// Pin errors are ignored: there is nothing left to report them to.
pub fn signal<L: OutputPin, D: DelayNs>(led: &mut L, delay: &mut D, fault: FatalFault) {
    for _ in 0..fault.blinks() {
        led.set_high().ok();
        delay.delay_ms(BLINK_MS);
        led.set_low().ok();
        delay.delay_ms(BLINK_MS);
    }
    delay.delay_ms(PATTERN_GAP_MS);
}

/// Stop the player, repeating `fault`'s pattern forever.
pub fn halt<L: OutputPin, D: DelayNs>(mut led: L, mut delay: D, fault: FatalFault) -> ! {
    #[cfg(feature = "defmt")]
    defmt::error!("halted: {}", fault);
    loop {
        signal(&mut led, &mut delay, fault);
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn each_fault_has_a_distinct_pattern() {
        let all = [
            FatalFault::CardNotIdle,
            FatalFault::NoFat16Partition,
            FatalFault::NoTracks,
            FatalFault::Storage,
            FatalFault::Codec,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.blinks(), b.blinks());
            }
        }
    }

    #[test]
    fn signal_blinks_the_pattern_once_and_ends_dark() {
        let expected: Vec<_> = (0..FatalFault::NoFat16Partition.blinks())
            .flat_map(|_| [Transaction::set(State::High), Transaction::set(State::Low)])
            .collect();
        let mut led = PinMock::new(&expected);
        signal(&mut led, &mut NoopDelay::new(), FatalFault::NoFat16Partition);
        led.done();
    }
}
