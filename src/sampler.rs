//! Analog ping sampling.
//!
//! The ADC conversion-complete ISR stores its result with
//! [`SampleMailbox::on_sample`]; [`SignalSampler`] is the control-loop side,
//! able to (re)arm the converter and take the latest reading.
//!
//! Some converters run continuously and need no trigger; use [`FreeRunning`]
//! for those. Others convert once per trigger and must be re-armed after
//! every result.
//!
//! Comparing a reading against the ping window is left to the caller, see
//! [`ThresholdWindow::classify`](crate::config::ThresholdWindow::classify).

use crate::mailbox::SampleMailbox;

pub use crate::config::PingState;

/// Hardware analog-to-digital converter capability.
pub trait SampleTrigger {
    /// Starts a conversion. Its result arrives through the ADC ISR.
    fn start_conversion(&mut self);
}

/// Trigger for a converter that samples continuously on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeRunning;

impl SampleTrigger for FreeRunning {
    fn start_conversion(&mut self) {}
}

/// Control-loop handle on the analog converter and its mailbox.
#[derive(Debug)]
pub struct SignalSampler<'a, S: SampleTrigger> {
    adc: S,
    mailbox: &'a SampleMailbox,
}

impl<'a, S: SampleTrigger> SignalSampler<'a, S> {
    /// Wraps a configured converter and the mailbox its ISR writes into.
    pub fn new(adc: S, mailbox: &'a SampleMailbox) -> Self {
        Self { adc, mailbox }
    }

    /// Drops any unconsumed reading and starts a new conversion.
    ///
    /// Readings taken while a response was in progress are stale by the
    /// time the responder listens again, so only results that complete
    /// after this call are reported as fresh.
    pub fn arm(&mut self) {
        self.mailbox.discard();
        self.adc.start_conversion();
    }

    /// Atomically captures the latest reading and clears its freshness flag.
    ///
    /// Never blocks. With no new sample since the last call, returns the
    /// previous value and `false`.
    pub fn read_latest(&self) -> (u16, bool) {
        self.mailbox.read_latest()
    }

    /// Borrow the underlying converter.
    pub fn adc(&self) -> &S {
        &self.adc
    }

    /// Releases the underlying converter.
    pub fn free(self) -> S {
        self.adc
    }
}
