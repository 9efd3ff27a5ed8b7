//! Hardware streaming abstraction
//!
//! The audio path is a hardware-triggered double buffer: once armed, the
//! peripheral consumes the front buffer, raises a buffer-exhausted event,
//! flips to the back buffer, and so on without CPU involvement. The event
//! handler only flips ownership and raises a refill flag; refills happen in
//! the main loop.

/// Hardware consumer of the two stream buffers.
pub trait AudioStream {
    /// Error type
    type Error: core::fmt::Debug;

    /// Arm continuous, hardware-autonomous consumption starting with the
    /// front buffer.
    ///
    /// Both buffers must already be primed.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Whether [`start`](Self::start) has been called.
    fn is_running(&self) -> bool;
}
