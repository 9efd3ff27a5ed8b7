//! Input device abstraction

/// Input device trait for the transport buttons
pub trait InputDevice {
    /// Poll for event (non-blocking)
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Debounced button gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Pressed and released within the short-press window
    ShortPress(Button),
    /// Held past the hold threshold (emitted while still held)
    Hold(Button),
}

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Play/Pause button
    Play,
    /// Volume up (hold: next track)
    VolumeUp,
    /// Volume down (hold: previous track)
    VolumeDown,
}

impl Button {
    /// All buttons, in debounce scan order.
    pub const ALL: [Self; 3] = [Self::Play, Self::VolumeUp, Self::VolumeDown];
}
