//! Double-buffered sample storage shared with the buffer-exhausted handler.
//!
//! Two fixed `StreamBuffer<N>`s alternate: at any instant one is in flight
//! to the hardware consumer and the other belongs to software for refilling.
//! The buffer-exhausted handler calls [`StreamBuffers::on_buffer_exhausted`],
//! which flips the in-flight slot and raises the refill flag on the buffer
//! the hardware just finished. The main loop picks the flag up with
//! [`StreamBuffers::take_refill`].
//!
//! Every access goes through a `critical_section::Mutex`, so any
//! read-modify-write on the flags or the in-flight slot runs with interrupts
//! masked. There is no way to touch a buffer without a `CriticalSection`
//! token.
//!
//! # Constraints
//!
//! - `no_std`, no allocation: both buffers live inline, intended for a
//!   `static`.
//! - The handler side never blocks and never reads storage.

use core::cell::{Cell, RefCell, RefMut};

use critical_section::{CriticalSection, Mutex};

/// One of the two buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// Consumed first after [`crate::PlaybackBufferEngine::start`].
    Front,
    /// Consumed after the front buffer.
    Back,
}

impl Slot {
    /// Both slots, in priming order.
    pub const ALL: [Self; 2] = [Self::Front, Self::Back];

    /// The other buffer.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Fixed-capacity block of raw PCM bytes plus its refill-needed flag.
pub struct StreamBuffer<const N: usize> {
    bytes: [u8; N],
    refill_needed: bool,
}

impl<const N: usize> StreamBuffer<N> {
    /// Zeroed buffer with no refill pending.
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            refill_needed: false,
        }
    }

    /// Sample bytes, always `N` long.
    pub fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Mutable sample bytes.
    pub fn bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }

    /// Zero everything from `filled` onward so a short refill plays silence
    /// rather than stale samples.
    pub fn silence_from(&mut self, filled: usize) {
        if let Some(tail) = self.bytes.get_mut(filled..) {
            tail.fill(0);
        }
    }

    /// Whether the hardware has finished with this buffer since its last
    /// refill.
    pub fn refill_needed(&self) -> bool {
        self.refill_needed
    }
}

impl<const N: usize> Default for StreamBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The front/back pair and the in-flight marker.
pub struct StreamBuffers<const N: usize> {
    slots: [Mutex<RefCell<StreamBuffer<N>>>; 2],
    in_flight: Mutex<Cell<Slot>>,
}

impl<const N: usize> StreamBuffers<N> {
    /// Both buffers zeroed, front in flight.
    pub const fn new() -> Self {
        Self {
            slots: [
                Mutex::new(RefCell::new(StreamBuffer::new())),
                Mutex::new(RefCell::new(StreamBuffer::new())),
            ],
            in_flight: Mutex::new(Cell::new(Slot::Front)),
        }
    }

    fn cell<'cs>(&'cs self, cs: CriticalSection<'cs>, slot: Slot) -> &'cs RefCell<StreamBuffer<N>> {
        let [front, back] = &self.slots;
        match slot {
            Slot::Front => front.borrow(cs),
            Slot::Back => back.borrow(cs),
        }
    }

    /// Buffer-exhausted event: the hardware finished the in-flight buffer
    /// and moved on to the other one.
    ///
    /// Flips the in-flight slot, flags the finished buffer for refill and
    /// returns the slot now in flight.
    pub fn on_buffer_exhausted(&self) -> Slot {
        critical_section::with(|cs| {
            let marker = self.in_flight.borrow(cs);
            let finished = marker.get();
            let next = finished.other();
            marker.set(next);
            if let Ok(mut buf) = self.cell(cs, finished).try_borrow_mut() {
                buf.refill_needed = true;
            }
            next
        })
    }

    /// Slot currently owned by the hardware.
    pub fn in_flight(&self, cs: CriticalSection<'_>) -> Slot {
        self.in_flight.borrow(cs).get()
    }

    /// If `slot` is flagged for refill, clear the flag and hand out the
    /// buffer for writing.
    pub fn take_refill<'cs>(
        &'cs self,
        cs: CriticalSection<'cs>,
        slot: Slot,
    ) -> Option<RefMut<'cs, StreamBuffer<N>>> {
        let mut buf = self.cell(cs, slot).try_borrow_mut().ok()?;
        if !buf.refill_needed {
            return None;
        }
        buf.refill_needed = false;
        Some(buf)
    }

    /// Unconditional write access to `slot`, used when priming.
    pub fn buffer_mut<'cs>(
        &'cs self,
        cs: CriticalSection<'cs>,
        slot: Slot,
    ) -> Option<RefMut<'cs, StreamBuffer<N>>> {
        self.cell(cs, slot).try_borrow_mut().ok()
    }

    /// Drop any pending refill requests.
    pub fn clear_refill_flags(&self, cs: CriticalSection<'_>) {
        for slot in Slot::ALL {
            if let Ok(mut buf) = self.cell(cs, slot).try_borrow_mut() {
                buf.refill_needed = false;
            }
        }
    }

    /// Front in flight, no refills pending.
    pub fn reset(&self, cs: CriticalSection<'_>) {
        self.in_flight.borrow(cs).set(Slot::Front);
        self.clear_refill_flags(cs);
    }

    /// Run `f` over the bytes of the buffer the hardware is consuming.
    ///
    /// Used by the streaming side to copy the next block out to the
    /// peripheral.
    pub fn with_in_flight<R>(&self, f: impl FnOnce(&[u8; N]) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let slot = self.in_flight(cs);
            let buf = self.cell(cs, slot).try_borrow().ok()?;
            Some(f(buf.bytes()))
        })
    }

    /// Whether `slot` currently has a refill pending.
    pub fn refill_pending(&self, slot: Slot) -> bool {
        critical_section::with(|cs| {
            self.cell(cs, slot)
                .try_borrow()
                .is_ok_and(|buf| buf.refill_needed)
        })
    }
}

impl<const N: usize> Default for StreamBuffers<N> {
    fn default() -> Self {
        Self::new()
    }
}
