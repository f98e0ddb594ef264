//! # pingburst
//!
//! A portable, no_std Rust core for a ping-loss responder: a battery-powered
//! controller that listens for an analog "ping", and when the ping goes
//! missing answers with a precisely timed burst before listening again.
//!
//! This crate implements:
//! - interrupt-safe tick and sample mailboxes using `critical-section`
//! - a four-phase response state machine driven from the main loop
//! - `embedded-hal` adapters for the burst output (gate pin or PWM channel)
//! - optional listening and heartbeat indicator pins
//! - a framed serial protocol for coordinates and debug text, with a
//!   blocking `nb`-based transmit path and a matching decoder
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` and uses the `critical-section` std implementation |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `log`       | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pingburst::responder::{Responder, run_response_loop};
//!
//! pingburst::declare_mailboxes!();
//!
//! #[interrupt]
//! fn TIMER0() {
//!     TICKS.on_tick();
//! }
//!
//! #[interrupt]
//! fn ADC() {
//!     SAMPLES.on_sample(adc_result());
//! }
//!
//! let mut responder = Responder::new(
//!     TickClock::new(timer0, &TICKS),
//!     SignalSampler::new(adc, &SAMPLES),
//!     PwmCarrier::square(pwm),
//!     StatusPins::new(Some(led_listening), Some(led_heartbeat)),
//!     Some(SerialFramer::new(SerialChannel::new(uart_tx))),
//!     ResponderConfig::default(),
//! );
//! run_response_loop(&mut responder);
//! ```
//!
//! ## Integration Notes
//!
//! - Oscillator, timer reload, ADC channel and PWM frequency setup are the
//!   HAL's job; this crate only starts and stops those peripherals.
//! - The ISRs must only call `on_tick()` / `on_sample()`.
//! - Serial writes busy-wait; never send frames from an ISR.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use critical_section;
pub use heapless;

#[macro_use]
mod fmt;

pub mod burst;
pub mod config;
pub mod consts;
pub mod error;
pub mod mailbox;
pub mod protocol;
pub mod responder;
pub mod sampler;
pub mod serial;
pub mod status;
pub mod timer;
