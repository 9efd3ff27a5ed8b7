//! Tick-driven button debouncing.
//!
//! Sampled at [`DEBOUNCE_TICK_HZ`](platform::config::DEBOUNCE_TICK_HZ). A
//! button's counter climbs while it reads pressed:
//!
//! ```text
//! ticks held   0  1  2  3 ... 14  15  16 ...
//!              └─ noise ─┘└ short ┘└ hold ─────
//! ```
//!
//! - released with `SHORT_PRESS_TICKS <= held < HOLD_TICKS`: one short press
//! - reaching `HOLD_TICKS` while held: one hold, immediately; nothing more
//!   until the button is released and the counter resets
//! - released below `SHORT_PRESS_TICKS`: bounce, ignored

use platform::config::{HOLD_TICKS, SHORT_PRESS_TICKS};
use platform::{Button, InputEvent};

/// Debounce state for one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonDebouncer {
    button: Button,
    held: u8,
}

impl ButtonDebouncer {
    /// Released, counter at zero.
    pub const fn new(button: Button) -> Self {
        Self { button, held: 0 }
    }

    /// Feed one sample.
    pub fn tick(&mut self, pressed: bool) -> Option<InputEvent> {
        if pressed {
            self.held = self.held.saturating_add(1);
            return (self.held == HOLD_TICKS).then_some(InputEvent::Hold(self.button));
        }
        let held = core::mem::take(&mut self.held);
        (SHORT_PRESS_TICKS..HOLD_TICKS)
            .contains(&held)
            .then_some(InputEvent::ShortPress(self.button))
    }

    /// Ticks held so far.
    pub fn held_ticks(&self) -> u8 {
        self.held
    }

    /// The button this state belongs to.
    pub fn button(&self) -> Button {
        self.button
    }
}

/// The three transport buttons, sampled together.
#[derive(Debug, Clone)]
pub struct TransportDebouncer {
    buttons: [ButtonDebouncer; 3],
}

impl TransportDebouncer {
    /// All buttons released.
    pub const fn new() -> Self {
        let [play, up, down] = Button::ALL;
        Self {
            buttons: [
                ButtonDebouncer::new(play),
                ButtonDebouncer::new(up),
                ButtonDebouncer::new(down),
            ],
        }
    }

    /// Feed one sample per button, in [`Button::ALL`] order; returns the
    /// gestures completed on this tick.
    pub fn tick(&mut self, pressed: [bool; 3]) -> heapless::Vec<InputEvent, 3> {
        let mut events = heapless::Vec::new();
        for (state, level) in self.buttons.iter_mut().zip(pressed) {
            if let Some(event) = state.tick(level) {
                // Capacity equals the button count.
                let _ = events.push(event);
            }
        }
        events
    }
}

impl Default for TransportDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(d: &mut ButtonDebouncer, samples: impl IntoIterator<Item = bool>) -> Vec<InputEvent> {
        samples.into_iter().filter_map(|s| d.tick(s)).collect()
    }

    fn held_then_released(ticks: usize) -> impl Iterator<Item = bool> {
        core::iter::repeat(true)
            .take(ticks)
            .chain(core::iter::once(false))
    }

    #[test]
    fn three_ticks_is_one_short_press() {
        let mut d = ButtonDebouncer::new(Button::Play);
        assert_eq!(
            run(&mut d, held_then_released(3)),
            [InputEvent::ShortPress(Button::Play)]
        );
        assert_eq!(d.held_ticks(), 0);
    }

    #[test]
    fn fifteen_ticks_is_one_hold_and_no_short_press() {
        let mut d = ButtonDebouncer::new(Button::VolumeUp);
        assert_eq!(
            run(&mut d, held_then_released(15)),
            [InputEvent::Hold(Button::VolumeUp)]
        );
    }

    #[test]
    fn hold_fires_while_still_pressed_and_only_once() {
        let mut d = ButtonDebouncer::new(Button::VolumeDown);
        let events = run(&mut d, core::iter::repeat(true).take(14));
        assert!(events.is_empty());
        assert_eq!(d.tick(true), Some(InputEvent::Hold(Button::VolumeDown)));
        assert!(run(&mut d, core::iter::repeat(true).take(400)).is_empty());
        assert_eq!(d.tick(false), None);
    }

    #[test]
    fn bounce_below_threshold_is_ignored() {
        let mut d = ButtonDebouncer::new(Button::Play);
        assert!(run(&mut d, held_then_released(2)).is_empty());
        assert!(run(&mut d, held_then_released(1)).is_empty());
    }

    #[test]
    fn fourteen_ticks_is_still_short() {
        let mut d = ButtonDebouncer::new(Button::Play);
        assert_eq!(
            run(&mut d, held_then_released(14)),
            [InputEvent::ShortPress(Button::Play)]
        );
    }

    #[test]
    fn counter_resets_between_presses() {
        let mut d = ButtonDebouncer::new(Button::Play);
        let samples = held_then_released(10).chain(held_then_released(10));
        assert_eq!(run(&mut d, samples).len(), 2);
    }

    #[test]
    fn transport_reports_buttons_independently() {
        let mut t = TransportDebouncer::new();
        for _ in 0..3 {
            assert!(t.tick([true, true, false]).is_empty());
        }
        let events = t.tick([false, true, false]);
        assert_eq!(events.as_slice(), [InputEvent::ShortPress(Button::Play)]);
        for _ in 0..10 {
            t.tick([false, true, false]);
        }
        let events = t.tick([false, true, false]);
        assert_eq!(events.as_slice(), [InputEvent::Hold(Button::VolumeUp)]);
    }
}
