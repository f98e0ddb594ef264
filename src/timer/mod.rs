//! Periodic tick clock.
//!
//! The tick clock is the time base of every timed response phase. It is split
//! in two halves:
//! - a hardware half implementing [`TickTimer`], which only knows how to arm
//!   and disarm a periodic interrupt at the rate fixed during HAL setup;
//! - the [`TickMailbox`] the timer ISR reports into via
//!   [`TickMailbox::on_tick`].
//!
//! [`TickClock`] joins the two for the control loop.
//!
//! ```rust
//! use pingburst::mailbox::TickMailbox;
//! use pingburst::timer::{TickClock, TickTimer};
//!
//! struct Timer0;
//! impl TickTimer for Timer0 {
//!     fn arm(&mut self) { /* preload, clear flag, enable interrupt, run */ }
//!     fn disarm(&mut self) { /* stop, disable interrupt */ }
//! }
//!
//! static TICKS: TickMailbox = TickMailbox::new();
//!
//! let mut clock = TickClock::new(Timer0, &TICKS);
//! clock.reset();
//! clock.start();
//! TICKS.on_tick(); // from the ISR
//! assert_eq!(clock.read_latest(), (1, true));
//! ```
//!
//! Common reload settings for a 16-bit up-counter overflowing at 1 kHz
//! (reload = 65536 - timer_clock / 1000):
//!
//! | Timer clock | Reload   |
//! |-------------|----------|
//! | 4 MHz       | `0xF060` |
//! | 2 MHz       | `0xF830` |
//! | 1 MHz       | `0xFC18` |

use crate::mailbox::TickMailbox;

mod macros;
#[allow(unused_imports)]
pub use macros::*;

/// Hardware periodic interrupt source.
///
/// Implementations configure the period once (outside of this crate) and
/// only start/stop it here. Each elapsed period must end in a call to
/// [`TickMailbox::on_tick`] from the ISR.
pub trait TickTimer {
    /// Starts the periodic interrupt with a full period before the first tick.
    fn arm(&mut self);
    /// Stops the periodic interrupt.
    fn disarm(&mut self);
}

/// Control-loop handle on the periodic tick source and its mailbox.
#[derive(Debug)]
pub struct TickClock<'a, T: TickTimer> {
    timer: T,
    mailbox: &'a TickMailbox,
    running: bool,
}

impl<'a, T: TickTimer> TickClock<'a, T> {
    /// Wraps a timer and the mailbox its ISR writes into.
    ///
    /// The timer is disarmed, whatever state the HAL setup left it in.
    pub fn new(mut timer: T, mailbox: &'a TickMailbox) -> Self {
        timer.disarm();
        Self {
            timer,
            mailbox,
            running: false,
        }
    }

    /// Arms the periodic source. No-op if already running.
    pub fn start(&mut self) {
        if !self.running {
            self.timer.arm();
            self.running = true;
        }
    }

    /// Disarms the periodic source. No-op if already stopped.
    pub fn stop(&mut self) {
        if self.running {
            self.timer.disarm();
            self.running = false;
        }
    }

    /// Zeroes the tick counter and clears its freshness flag without
    /// stopping the clock.
    pub fn reset(&mut self) {
        self.mailbox.reset();
    }

    /// Atomically captures the tick count and clears its freshness flag.
    pub fn read_latest(&self) -> (u16, bool) {
        self.mailbox.read_latest()
    }

    /// Ends a phase of `duration` ticks if a fresh tick reached it, zeroing
    /// the counter in the same critical section.
    /// See [`TickMailbox::take_if_at_least`].
    pub fn take_if_at_least(&mut self, duration: u16) -> (bool, bool) {
        self.mailbox.take_if_at_least(duration)
    }

    /// Whether the periodic source is armed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Borrow the underlying timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Releases the underlying timer.
    pub fn free(self) -> T {
        self.timer
    }
}
