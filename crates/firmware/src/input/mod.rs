//! Transport buttons: debouncing and event delivery.
//!
//! The debounce tick (timer context) produces [`InputEvent`]s and pushes them
//! into an [`EventChannel`] with [`publish`]; the main loop drains them via
//! [`ButtonEvents`], which implements [`platform::InputDevice`].
//!
//! The channel's `CriticalSectionRawMutex` masks interrupts around every
//! queue operation, so each push and pop is a single cross-context
//! read-modify-write with no partial masking.
//!
//! # Overflow handling
//!
//! [`publish`] never waits. If the main loop falls [`EVENT_DEPTH`] events
//! behind, new gestures are dropped rather than stalling the tick.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};

pub use platform::{Button, InputDevice, InputEvent};

pub mod debounce;
pub use debounce::{ButtonDebouncer, TransportDebouncer};

#[cfg(feature = "hardware")]
pub mod hardware;

/// Gestures that may queue before new ones are dropped.
pub const EVENT_DEPTH: usize = 8;

/// Queue from the debounce tick to the main loop.
pub type EventChannel = Channel<CriticalSectionRawMutex, InputEvent, EVENT_DEPTH>;

/// The board's button event queue.
pub static BUTTON_EVENTS: EventChannel = Channel::new();

/// Queue `event` without blocking; `false` if the queue was full and the
/// event was dropped.
pub fn publish(channel: &EventChannel, event: InputEvent) -> bool {
    match channel.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("input: queue full, dropped {}", event);
            false
        }
    }
}

/// Main-loop end of an [`EventChannel`].
pub struct ButtonEvents<'a> {
    rx: Receiver<'a, CriticalSectionRawMutex, InputEvent, EVENT_DEPTH>,
}

impl<'a> ButtonEvents<'a> {
    /// Consume events from `channel`.
    pub fn new(channel: &'a EventChannel) -> Self {
        Self {
            rx: channel.receiver(),
        }
    }
}

impl InputDevice for ButtonEvents<'_> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        // Empty is the only receive error.
        self.rx.try_receive().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let channel = EventChannel::new();
        let mut events = ButtonEvents::new(&channel);
        assert!(publish(&channel, InputEvent::ShortPress(Button::Play)));
        assert!(publish(&channel, InputEvent::Hold(Button::VolumeDown)));
        assert_eq!(events.poll_event(), Some(InputEvent::ShortPress(Button::Play)));
        assert_eq!(events.poll_event(), Some(InputEvent::Hold(Button::VolumeDown)));
        assert_eq!(events.poll_event(), None);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let channel = EventChannel::new();
        for _ in 0..EVENT_DEPTH {
            assert!(publish(&channel, InputEvent::ShortPress(Button::VolumeUp)));
        }
        assert!(!publish(&channel, InputEvent::Hold(Button::Play)));

        let mut events = ButtonEvents::new(&channel);
        let drained = core::iter::from_fn(|| events.poll_event()).count();
        assert_eq!(drained, EVENT_DEPTH);
    }
}
