//! Interrupt-safe mailboxes shared between the ISRs and the control loop.
//!
//! Each mailbox is a single-producer/single-consumer slot of depth one: the
//! interrupt context writes, the control loop reads and clears. A value and
//! its freshness flag live in one `Cell` behind a `critical_section::Mutex`,
//! so every update and every read-and-clear happens inside one critical
//! section and the consumer never sees a flag without its matching value.
//!
//! Both mailboxes have `const` constructors and are meant to be `static`:
//!
//! ```rust
//! use pingburst::mailbox::{SampleMailbox, TickMailbox};
//!
//! static TICKS: TickMailbox = TickMailbox::new();
//! static SAMPLES: SampleMailbox = SampleMailbox::new();
//!
//! // In the timer ISR:
//! TICKS.on_tick();
//! // In the ADC ISR:
//! SAMPLES.on_sample(600);
//!
//! assert_eq!(TICKS.read_latest(), (1, true));
//! assert_eq!(SAMPLES.read_latest(), (600, true));
//! assert_eq!(SAMPLES.read_latest(), (600, false));
//! ```
//!
//! Neither mailbox ever looks at the responder [`Mode`](crate::responder::Mode);
//! the ISR side updates unconditionally.

use core::cell::Cell;
use critical_section::Mutex;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
struct Slot {
    value: u16,
    fresh: bool,
}

impl Slot {
    const EMPTY: Self = Self {
        value: 0,
        fresh: false,
    };

    /// Returns the current contents and marks them consumed.
    fn take(&mut self) -> (u16, bool) {
        let read = (self.value, self.fresh);
        self.fresh = false;
        read
    }
}

/// Tick counter and its freshness flag.
///
/// Ticks accumulate: a second tick before the consumer reads adds to the
/// count, only the flag is overwritten. The count saturates at `u16::MAX`.
#[derive(Debug)]
pub struct TickMailbox {
    slot: Mutex<Cell<Slot>>,
}

impl TickMailbox {
    /// Creates an empty mailbox (count 0, not fresh).
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(Slot::EMPTY)),
        }
    }

    /// Records one elapsed tick period. Called from the timer ISR.
    pub fn on_tick(&self) {
        critical_section::with(|cs| {
            let cell = self.slot.borrow(cs);
            let mut slot = cell.get();
            slot.value = slot.value.saturating_add(1);
            slot.fresh = true;
            cell.set(slot);
        });
    }

    /// Atomically captures the count and clears the freshness flag.
    ///
    /// # Returns
    /// `(count, is_fresh)`; `is_fresh` is `true` if at least one tick arrived
    /// since the previous read or reset.
    pub fn read_latest(&self) -> (u16, bool) {
        critical_section::with(|cs| {
            let cell = self.slot.borrow(cs);
            let mut slot = cell.get();
            let read = slot.take();
            cell.set(slot);
            read
        })
    }

    /// Atomically checks the count against `duration` and, if a fresh tick
    /// reached it, zeroes the count in the same critical section.
    ///
    /// A tick arriving right after a successful check is therefore counted
    /// in the next phase instead of being lost to a separate reset.
    ///
    /// # Returns
    /// `(is_fresh, elapsed)`; the freshness flag is cleared either way, the
    /// count only when `elapsed`.
    pub fn take_if_at_least(&self, duration: u16) -> (bool, bool) {
        critical_section::with(|cs| {
            let cell = self.slot.borrow(cs);
            let mut slot = cell.get();
            let (count, fresh) = slot.take();
            let elapsed = fresh && count >= duration;
            cell.set(if elapsed { Slot::EMPTY } else { slot });
            (fresh, elapsed)
        })
    }

    /// Atomically zeroes the count and clears the freshness flag.
    pub fn reset(&self) {
        critical_section::with(|cs| self.slot.borrow(cs).set(Slot::EMPTY));
    }
}

impl Default for TickMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest raw analog sample and its freshness flag.
///
/// A new sample before the consumer reads overwrites the previous one.
#[derive(Debug)]
pub struct SampleMailbox {
    slot: Mutex<Cell<Slot>>,
}

impl SampleMailbox {
    /// Creates an empty mailbox (value 0, not fresh).
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(Slot::EMPTY)),
        }
    }

    /// Stores a finished conversion. Called from the ADC ISR.
    pub fn on_sample(&self, raw: u16) {
        critical_section::with(|cs| {
            self.slot.borrow(cs).set(Slot {
                value: raw,
                fresh: true,
            })
        });
    }

    /// Atomically captures the latest value and clears the freshness flag.
    ///
    /// If no sample arrived since the last read, the last captured value is
    /// returned with `is_fresh == false`.
    pub fn read_latest(&self) -> (u16, bool) {
        critical_section::with(|cs| {
            let cell = self.slot.borrow(cs);
            let mut slot = cell.get();
            let read = slot.take();
            cell.set(slot);
            read
        })
    }

    /// Marks any unconsumed sample as stale, keeping its value.
    pub fn discard(&self) {
        critical_section::with(|cs| {
            let cell = self.slot.borrow(cs);
            let mut slot = cell.get();
            slot.fresh = false;
            cell.set(slot);
        });
    }
}

impl Default for SampleMailbox {
    fn default() -> Self {
        Self::new()
    }
}
