//! Deployment constants for the responder.
//!
//! Everything here is fixed once the [`Responder`](crate::responder::Responder)
//! is built: the ping detection window, the tick rate, and the length of each
//! timed phase of the response.
//!
//! | Value            | Reference  | Unit        |
//! |------------------|------------|-------------|
//! | window low       | 464        | raw ADC     |
//! | window high      | 564        | raw ADC     |
//! | tick rate        | 1000       | Hz          |
//! | wait before send | 15         | ticks       |
//! | sending          | 16         | ticks       |
//! | wait after send  | 15         | ticks       |

use crate::consts::{
    PING_PRESENT_HIGH, PING_PRESENT_LOW, SENDING_TICKS, TICK_RATE_HZ, WAIT_AFTER_SEND_TICKS,
    WAIT_BEFORE_SEND_TICKS,
};
use crate::error::ConfigError;

/// Result of classifying one raw sample against a [`ThresholdWindow`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PingState {
    /// The sample is inside the window: nothing to do.
    Present,
    /// The sample is outside the window: start a response.
    Absent,
}

/// Inclusive `low..=high` window of raw sample values in which the ping is present.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ThresholdWindow {
    low: u16,
    high: u16,
}

impl ThresholdWindow {
    /// The reference calibration, `464..=564`.
    pub const REFERENCE: Self = Self {
        low: PING_PRESENT_LOW,
        high: PING_PRESENT_HIGH,
    };

    /// Creates a window, rejecting `low > high`.
    pub const fn new(low: u16, high: u16) -> Result<Self, ConfigError> {
        if low > high {
            return Err(ConfigError::InvertedWindow { low, high });
        }
        Ok(Self { low, high })
    }

    /// Lower bound (inclusive)
    pub const fn low(&self) -> u16 {
        self.low
    }

    /// Upper bound (inclusive)
    pub const fn high(&self) -> u16 {
        self.high
    }

    /// Whether `value` lies inside the window, bounds included.
    pub const fn contains(&self, value: u16) -> bool {
        value >= self.low && value <= self.high
    }

    /// Classifies a raw sample. Pure and stateless.
    pub const fn classify(&self, value: u16) -> PingState {
        if self.contains(value) {
            PingState::Present
        } else {
            PingState::Absent
        }
    }
}

impl Default for ThresholdWindow {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Frequency of the periodic tick clock. One tick is the unit of every
/// [`PhaseDurations`] value.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TickRate {
    hz: u32,
}

impl TickRate {
    /// 1 kHz, one tick per millisecond.
    pub const REFERENCE: Self = Self { hz: TICK_RATE_HZ };

    /// Creates a tick rate, rejecting 0 Hz.
    pub const fn from_hz(hz: u32) -> Result<Self, ConfigError> {
        if hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(Self { hz })
    }

    /// Rate in Hz
    pub const fn hz(&self) -> u32 {
        self.hz
    }

    /// Number of whole ticks elapsed in `millis` milliseconds, rounded to nearest.
    ///
    /// # Errors
    /// [`ConfigError::DurationOverflow`] if the result does not fit in the
    /// 16-bit tick counter.
    pub const fn ticks_from_millis(&self, millis: u32) -> Result<u16, ConfigError> {
        let ticks = (millis as u64 * self.hz as u64 + 500) / 1_000;
        if ticks > u16::MAX as u64 {
            return Err(ConfigError::DurationOverflow { millis });
        }
        Ok(ticks as u16)
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Length, in ticks, of each timed phase of a response.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PhaseDurations {
    /// Delay between losing the ping and starting the burst.
    pub wait_before_send: u16,
    /// How long the burst stays on.
    pub sending: u16,
    /// Quiet period after the burst, before listening again.
    pub wait_after_send: u16,
}

impl PhaseDurations {
    /// 15 / 16 / 15 ticks.
    pub const REFERENCE: Self = Self {
        wait_before_send: WAIT_BEFORE_SEND_TICKS,
        sending: SENDING_TICKS,
        wait_after_send: WAIT_AFTER_SEND_TICKS,
    };

    /// Builds phase durations from milliseconds at the given tick rate.
    pub const fn from_millis(
        rate: TickRate,
        wait_before_send_ms: u32,
        sending_ms: u32,
        wait_after_send_ms: u32,
    ) -> Result<Self, ConfigError> {
        let wait_before_send = match rate.ticks_from_millis(wait_before_send_ms) {
            Ok(t) => t,
            Err(e) => return Err(e),
        };
        let sending = match rate.ticks_from_millis(sending_ms) {
            Ok(t) => t,
            Err(e) => return Err(e),
        };
        let wait_after_send = match rate.ticks_from_millis(wait_after_send_ms) {
            Ok(t) => t,
            Err(e) => return Err(e),
        };
        Ok(Self {
            wait_before_send,
            sending,
            wait_after_send,
        })
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Complete configuration of a [`Responder`](crate::responder::Responder).
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ResponderConfig {
    /// Ping detection window
    pub window: ThresholdWindow,
    /// Timed phase lengths
    pub durations: PhaseDurations,
}

impl ResponderConfig {
    /// Combines a validated window and phase durations.
    pub const fn new(window: ThresholdWindow, durations: PhaseDurations) -> Self {
        Self { window, durations }
    }
}
