//! Debounce tick task: samples the buttons and blinks the liveness LED.
//!
//! # Pin assignments
//!
//! | Signal        | MCU pin | Notes                         |
//! |---------------|---------|-------------------------------|
//! | Play/Pause    | PC0     | Active-low, internal pull-up  |
//! | Volume up     | PC1     | Active-low, internal pull-up  |
//! | Volume down   | PC2     | Active-low, internal pull-up  |
//! | Liveness LED  | PB0     | Toggled every tick            |

use embassy_stm32::gpio::{AnyPin, Input, Output};
use embassy_time::{Duration, Ticker};
use platform::config::DEBOUNCE_TICK_MS;

use super::{publish, TransportDebouncer, BUTTON_EVENTS};

/// Sample the three buttons at the debounce rate and queue their gestures
/// on [`BUTTON_EVENTS`].
///
/// Never touches storage or the codec; a tick costs three pin reads and at
/// most three non-blocking queue pushes.
#[embassy_executor::task]
pub async fn debounce_task(
    play: Input<'static, AnyPin>,
    volume_up: Input<'static, AnyPin>,
    volume_down: Input<'static, AnyPin>,
    mut led: Output<'static, AnyPin>,
) {
    let mut ticker = Ticker::every(Duration::from_millis(DEBOUNCE_TICK_MS));
    let mut debouncer = TransportDebouncer::new();
    loop {
        ticker.next().await;
        led.toggle();
        let pressed = [play.is_low(), volume_up.is_low(), volume_down.is_low()];
        for event in debouncer.tick(pressed) {
            defmt::debug!("input: {}", event);
            publish(&BUTTON_EVENTS, event);
        }
    }
}
