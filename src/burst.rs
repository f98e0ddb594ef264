//! Modulated burst output.
//!
//! The burst is the response emitted while the responder is in
//! [`Mode::Sending`](crate::responder::Mode::Sending). How the carrier is
//! generated (PWM frequency, duty cycle, pin muxing) belongs to the HAL setup;
//! the core only switches it on and off through [`BurstOutput`].
//!
//! Two adapters over `embedded-hal` are provided:
//! - [`GatedCarrier`]: an output pin gating a carrier generated elsewhere
//!   (e.g. a free-running PWM whose pin is switched between output and input).
//! - [`PwmCarrier`]: a PWM channel driven to a fixed duty cycle while on and
//!   fully off otherwise.
//!
//! [`BurstTransmitter`] adds idempotence on top of either.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

/// Modulated output peripheral capability.
pub trait BurstOutput {
    /// Starts emitting the carrier.
    fn enable(&mut self);
    /// Stops emitting the carrier.
    fn disable(&mut self);
}

/// An output pin gating an externally generated carrier.
#[derive(Debug)]
pub struct GatedCarrier<P: OutputPin> {
    /// Gate pin
    pub pin: P,
    inverted: bool,
}

impl<P: OutputPin> GatedCarrier<P> {
    /// Wraps a gate pin.
    ///
    /// # Arguments
    /// - `pin`: The gate output.
    /// - `inverted`: Whether the carrier is on while the pin is `LOW`.
    pub fn new(pin: P, inverted: Option<bool>) -> Self {
        Self {
            pin,
            inverted: inverted.unwrap_or(false),
        }
    }

    fn write_gate(&mut self, on: bool) {
        let state = if self.inverted { !on } else { on };
        if state {
            let _ = self.pin.set_high();
        } else {
            let _ = self.pin.set_low();
        }
    }
}

impl<P: OutputPin> BurstOutput for GatedCarrier<P> {
    fn enable(&mut self) {
        self.write_gate(true);
    }

    fn disable(&mut self) {
        self.write_gate(false);
    }
}

/// A PWM channel emitting the carrier at a fixed duty cycle.
#[derive(Debug)]
pub struct PwmCarrier<P: SetDutyCycle> {
    /// PWM channel
    pub pwm: P,
    duty_percent: u8,
}

impl<P: SetDutyCycle> PwmCarrier<P> {
    /// Wraps a PWM channel whose frequency is already configured.
    ///
    /// `duty_percent` is clamped to 100.
    pub fn new(pwm: P, duty_percent: u8) -> Self {
        Self {
            pwm,
            duty_percent: duty_percent.min(100),
        }
    }

    /// A square carrier (50% duty).
    pub fn square(pwm: P) -> Self {
        Self::new(pwm, 50)
    }
}

impl<P: SetDutyCycle> BurstOutput for PwmCarrier<P> {
    fn enable(&mut self) {
        let _ = self.pwm.set_duty_cycle_percent(self.duty_percent);
    }

    fn disable(&mut self) {
        let _ = self.pwm.set_duty_cycle_fully_off();
    }
}

/// Idempotent on/off control of a [`BurstOutput`].
///
/// Construction drives the output off. Calling [`start()`](Self::start) while
/// active, or [`stop()`](Self::stop) while inactive, touches nothing.
#[derive(Debug)]
pub struct BurstTransmitter<O: BurstOutput> {
    output: O,
    active: bool,
}

impl<O: BurstOutput> BurstTransmitter<O> {
    /// Wraps an output and makes sure it is off.
    pub fn new(output: O) -> Self {
        let mut output = output;
        output.disable();
        Self {
            output,
            active: false,
        }
    }

    /// Starts the burst.
    pub fn start(&mut self) {
        if !self.active {
            self.output.enable();
            self.active = true;
        }
    }

    /// Stops the burst.
    pub fn stop(&mut self) {
        if self.active {
            self.output.disable();
            self.active = false;
        }
    }

    /// Whether the burst is currently being emitted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Borrow the underlying output.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Mutably borrow the underlying output.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
