//! Status indicator outputs.
//!
//! Two optional pins report what the responder is doing:
//! - the **listening** indicator is `HIGH` while the responder waits for a
//!   lost ping, and `LOW` for the whole response;
//! - the **heartbeat** flips every time a timed phase sees a fresh tick, so a
//!   response in progress blinks it at half the tick rate.
//!
//! Both are driven from the control loop; the ISRs never touch them.
//! Boards without indicators pass [`StatusPins::none()`].

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};

/// Placeholder output for a board without indicator pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// The listening indicator and heartbeat outputs.
#[derive(Debug)]
pub struct StatusPins<P: OutputPin> {
    /// Listening indicator pin
    pub listening: Option<P>,
    /// Heartbeat pin
    pub heartbeat: Option<P>,
    beat: bool,
}

impl StatusPins<NoPin> {
    /// No indicators at all.
    pub const fn none() -> Self {
        Self {
            listening: None,
            heartbeat: None,
            beat: false,
        }
    }
}

impl<P: OutputPin> StatusPins<P> {
    /// Wraps the indicator pins. Both are driven `LOW` immediately.
    pub fn new(listening: Option<P>, heartbeat: Option<P>) -> Self {
        let mut status = Self {
            listening,
            heartbeat,
            beat: false,
        };
        write_pin(status.listening.as_mut(), false);
        write_pin(status.heartbeat.as_mut(), false);
        status
    }

    /// Drives the listening indicator.
    pub fn show_listening(&mut self, listening: bool) {
        write_pin(self.listening.as_mut(), listening);
    }

    /// Flips the heartbeat output.
    pub fn beat(&mut self) {
        self.beat = !self.beat;
        write_pin(self.heartbeat.as_mut(), self.beat);
    }
}

fn write_pin<P: OutputPin>(pin: Option<&mut P>, high: bool) {
    if let Some(pin) = pin {
        if high {
            let _ = pin.set_high();
        } else {
            let _ = pin.set_low();
        }
    }
}
