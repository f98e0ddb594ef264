//! Ping-loss response state machine.
//!
//! This module provides the [`Responder`], which listens for the analog ping
//! and, as soon as a sample falls outside the ping window, runs a timed
//! response: wait, emit the burst, wait again, listen again.
//!
//! ```text
//!            sample outside window
//! Listening ───────────────────────▶ WaitBeforeSend
//!     ▲                                   │ ticks >= wait_before_send
//!     │ ticks >= wait_after_send          ▼
//! WaitAfterSend ◀──────────────────── Sending
//!                 ticks >= sending
//! ```
//!
//! The responder runs in the control loop. The ISRs only feed the
//! [`TickMailbox`](crate::mailbox::TickMailbox) and
//! [`SampleMailbox`](crate::mailbox::SampleMailbox) and never look at the
//! current [`Mode`].
//!
//! ## Example
//!
//! ```rust
//! use core::convert::Infallible;
//! use pingburst::burst::BurstOutput;
//! use pingburst::config::ResponderConfig;
//! use pingburst::protocol::SerialFramer;
//! use pingburst::responder::{Mode, Responder};
//! use pingburst::sampler::{FreeRunning, SignalSampler};
//! use pingburst::status::StatusPins;
//! use pingburst::timer::{TickClock, TickTimer};
//!
//! struct Timer0;
//! impl TickTimer for Timer0 {
//!     fn arm(&mut self) {}
//!     fn disarm(&mut self) {}
//! }
//! struct Pwm;
//! impl BurstOutput for Pwm {
//!     fn enable(&mut self) {}
//!     fn disable(&mut self) {}
//! }
//!
//! pingburst::declare_mailboxes!();
//!
//! let mut responder = Responder::new(
//!     TickClock::new(Timer0, &TICKS),
//!     SignalSampler::new(FreeRunning, &SAMPLES),
//!     Pwm,
//!     StatusPins::none(),
//!     None::<SerialFramer<Infallible>>,
//!     ResponderConfig::default(),
//! );
//!
//! SAMPLES.on_sample(600); // from the ADC ISR
//! assert_eq!(responder.poll(), Some(Mode::WaitBeforeSend));
//! // Main loop: `pingburst::responder::run_response_loop(&mut responder)`
//! ```
//!
//! ## Timing
//!
//! Every entry into a timed phase zeroes the tick counter and clears its
//! freshness flag in one critical section. Leaving `Listening` resets the
//! counter explicitly; the end of `WaitBeforeSend` and `Sending` zeroes it
//! inside the same critical section as the check that ended the phase, so a
//! tick arriving during the entry actions is counted in the new phase. A
//! phase therefore only ever compares its duration against ticks counted
//! since it began, and needs at least one fresh tick to end.

use crate::burst::{BurstOutput, BurstTransmitter};
use crate::config::{PingState, ResponderConfig};
use crate::consts::PING_LOST_MESSAGE;
use crate::protocol::framer::SerialFramer;
use crate::sampler::{SampleTrigger, SignalSampler};
use crate::serial::SerialTx;
use crate::status::StatusPins;
use crate::timer::{TickClock, TickTimer};
use embedded_hal::digital::OutputPin;

/// Current phase of the response sequence.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Mode {
    ///   Waiting for a sample outside of the ping window.
    ///   The tick clock is stopped and the burst is off.
    #[default]
    Listening,
    ///   The ping was lost; waiting before answering.
    WaitBeforeSend,
    ///   The burst is being emitted. The only mode in which it is.
    Sending,
    ///   Quiet period after the burst, before listening again.
    WaitAfterSend,
}

/// The response state machine.
///
/// ## Type Parameters
///
/// - `T`: periodic tick source, see [`TickTimer`]
/// - `S`: analog converter, see [`SampleTrigger`]
/// - `B`: burst output, see [`BurstOutput`]
/// - `W`: serial transmitter for telemetry, see [`SerialTx`]
///   (`core::convert::Infallible` when there is none)
/// - `P`: indicator pins, see [`StatusPins`]
///   ([`NoPin`](crate::status::NoPin) when there are none)
#[derive(Debug)]
pub struct Responder<'a, T, S, B, W, P>
where
    T: TickTimer,
    S: SampleTrigger,
    B: BurstOutput,
    W: SerialTx,
    P: OutputPin,
{
    mode: Mode,
    clock: TickClock<'a, T>,
    sampler: SignalSampler<'a, S>,
    burst: BurstTransmitter<B>,
    status: StatusPins<P>,
    telemetry: Option<SerialFramer<W>>,
    config: ResponderConfig,
    responses: u16,
    pings: u16,
}

impl<'a, T, S, B, W, P> Responder<'a, T, S, B, W, P>
where
    T: TickTimer,
    S: SampleTrigger,
    B: BurstOutput,
    W: SerialTx,
    P: OutputPin,
{
    /// Creates a responder in [`Mode::Listening`].
    ///
    /// # Arguments
    /// - `clock`: The tick clock. Disarmed since construction.
    /// - `sampler`: The ping sampler.
    /// - `burst`: The burst output. Driven off immediately.
    /// - `status`: Indicator pins. The listening indicator is driven high.
    /// - `telemetry`: Optional serial framer; announces every lost ping.
    /// - `config`: Window and phase durations.
    ///
    /// # Notes
    /// The sampler is armed before returning.
    pub fn new(
        clock: TickClock<'a, T>,
        sampler: SignalSampler<'a, S>,
        burst: B,
        status: StatusPins<P>,
        telemetry: Option<SerialFramer<W>>,
        config: ResponderConfig,
    ) -> Self {
        let mut responder = Self {
            mode: Mode::Listening,
            clock,
            sampler,
            burst: BurstTransmitter::new(burst),
            status,
            telemetry,
            config,
            responses: 0,
            pings: 0,
        };
        responder.status.show_listening(true);
        responder.sampler.arm();
        responder
    }

    /// Evaluates the current mode once.
    ///
    /// Reads the mailbox relevant to the current mode, and takes at most one
    /// transition. Conditions of the next mode are only looked at on the
    /// next call.
    ///
    /// # Returns
    /// - `Some(mode)`: a transition into `mode` was taken
    /// - `None`: the mode is unchanged
    pub fn poll(&mut self) -> Option<Mode> {
        let durations = self.config.durations;
        let next = match self.mode {
            Mode::Listening => return self.poll_listening(),
            Mode::WaitBeforeSend => self
                .phase_elapsed(durations.wait_before_send)
                .then_some(Mode::Sending),
            Mode::Sending => self
                .phase_elapsed(durations.sending)
                .then_some(Mode::WaitAfterSend),
            Mode::WaitAfterSend => self
                .phase_elapsed(durations.wait_after_send)
                .then_some(Mode::Listening),
        }?;
        self.enter(next);
        Some(next)
    }

    fn poll_listening(&mut self) -> Option<Mode> {
        let (value, fresh) = self.sampler.read_latest();
        if !fresh {
            return None;
        }
        match self.config.window.classify(value) {
            PingState::Present => {
                self.pings = self.pings.wrapping_add(1);
                self.sampler.arm();
                None
            }
            PingState::Absent => {
                self.enter(Mode::WaitBeforeSend);
                // The clock is already counting; a slow serial write only
                // delays the next poll.
                if let Some(framer) = self.telemetry.as_mut() {
                    let _ = framer.send_debug_fmt(format_args!("{} {}", PING_LOST_MESSAGE, value));
                }
                Some(Mode::WaitBeforeSend)
            }
        }
    }

    /// `true` once a fresh tick reaches `duration`; the counter is then
    /// already zero for the next phase. Every fresh tick beats the heartbeat.
    fn phase_elapsed(&mut self, duration: u16) -> bool {
        let (fresh, elapsed) = self.clock.take_if_at_least(duration);
        if fresh {
            self.status.beat();
        }
        elapsed
    }

    /// Runs the entry actions of `next` and makes it current.
    fn enter(&mut self, next: Mode) {
        match next {
            Mode::WaitBeforeSend => {
                self.status.show_listening(false);
                self.clock.reset();
                self.clock.start();
            }
            // Counter zeroed by `phase_elapsed`
            Mode::Sending => self.burst.start(),
            Mode::WaitAfterSend => self.burst.stop(),
            Mode::Listening => {
                self.clock.stop();
                self.responses = self.responses.wrapping_add(1);
                self.sampler.arm();
                self.status.show_listening(true);
                info!("response {} complete", self.responses);
            }
        }
        debug!("mode {:?} -> {:?}", self.mode, next);
        self.mode = next;
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the burst is being emitted. Always equal to
    /// `mode() == Mode::Sending`.
    pub fn is_bursting(&self) -> bool {
        self.burst.is_active()
    }

    /// Number of completed response cycles (wraps).
    pub fn responses(&self) -> u16 {
        self.responses
    }

    /// Number of samples classified as ping present (wraps).
    pub fn pings(&self) -> u16 {
        self.pings
    }

    /// The active configuration.
    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Borrow the tick clock.
    pub fn clock(&self) -> &TickClock<'a, T> {
        &self.clock
    }

    /// Borrow the sampler.
    pub fn sampler(&self) -> &SignalSampler<'a, S> {
        &self.sampler
    }

    /// Borrow the burst transmitter.
    pub fn burst(&self) -> &BurstTransmitter<B> {
        &self.burst
    }

    /// Borrow the indicator pins.
    pub fn status(&self) -> &StatusPins<P> {
        &self.status
    }

    /// Mutably borrow the telemetry framer, if any (e.g. to report
    /// coordinates from the control loop).
    pub fn telemetry_mut(&mut self) -> Option<&mut SerialFramer<W>> {
        self.telemetry.as_mut()
    }
}

/// Runs the responder forever.
///
/// This is the whole control loop of a single-purpose firmware: the ISRs
/// feed the mailboxes, and this loop keeps calling
/// [`poll()`](Responder::poll).
pub fn run_response_loop<T, S, B, W, P>(responder: &mut Responder<'_, T, S, B, W, P>) -> !
where
    T: TickTimer,
    S: SampleTrigger,
    B: BurstOutput,
    W: SerialTx,
    P: OutputPin,
{
    loop {
        let _ = responder.poll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::GatedCarrier;
    use crate::burst::tests::FakeOutput;
    use crate::config::{PhaseDurations, ThresholdWindow};
    use crate::mailbox::{SampleMailbox, TickMailbox};
    use crate::protocol::encoding::encode_debug;
    use crate::sampler::tests::FakeAdc;
    use crate::serial::SerialChannel;
    use crate::serial::tests::FakeUart;
    use crate::status::NoPin;
    use crate::timer::tests::FakeTimer;
    use core::convert::Infallible;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    type TestResponder<'a> = Responder<'a, FakeTimer, FakeAdc, FakeOutput, Infallible, NoPin>;

    fn responder<'a>(
        ticks: &'a TickMailbox,
        samples: &'a SampleMailbox,
        config: ResponderConfig,
    ) -> TestResponder<'a> {
        Responder::new(
            TickClock::new(FakeTimer::default(), ticks),
            SignalSampler::new(FakeAdc::default(), samples),
            FakeOutput::default(),
            StatusPins::none(),
            None,
            config,
        )
    }

    /// Delivers `n` ticks, polling after each, and records
    /// `(tick number, new mode)` for every transition.
    fn run_ticks<T, S, B, W, P>(
        responder: &mut Responder<'_, T, S, B, W, P>,
        ticks: &TickMailbox,
        n: usize,
    ) -> Vec<(usize, Mode)>
    where
        T: TickTimer,
        S: SampleTrigger,
        B: BurstOutput,
        W: SerialTx,
        P: OutputPin,
    {
        let mut transitions = Vec::new();
        for i in 1..=n {
            ticks.on_tick();
            if let Some(mode) = responder.poll() {
                transitions.push((i, mode));
            }
            assert_eq!(responder.is_bursting(), responder.mode() == Mode::Sending);
        }
        transitions
    }

    #[test]
    fn test_responder_initialization() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let r = responder(&ticks, &samples, ResponderConfig::default());
        assert_eq!(r.mode(), Mode::Listening);
        assert!(!r.is_bursting());
        assert!(!r.clock().is_running());
        assert_eq!(r.sampler().adc().conversions, 1);
        assert_eq!(r.burst().output().disables, 1);
    }

    #[test]
    fn test_no_fresh_sample_keeps_listening() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());
        assert_eq!(r.poll(), None);
        assert_eq!(r.poll(), None);
        assert_eq!(r.mode(), Mode::Listening);
    }

    #[test]
    fn test_ping_present_rearms_sampler() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());
        for value in [464, 500, 564] {
            samples.on_sample(value);
            assert_eq!(r.poll(), None);
        }
        assert_eq!(r.mode(), Mode::Listening);
        assert_eq!(r.pings(), 3);
        assert_eq!(r.sampler().adc().conversions, 4);
        assert!(!r.clock().is_running());
    }

    #[test]
    fn test_ping_absent_enters_wait_before_send() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());
        // Leftover ticks from an earlier cycle
        ticks.on_tick();
        ticks.on_tick();

        samples.on_sample(600);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));
        assert_eq!(r.mode(), Mode::WaitBeforeSend);
        assert!(r.clock().is_running());
        assert!(r.clock().timer().armed);
        assert!(!r.is_bursting());
        assert_eq!(ticks.read_latest(), (0, false));
    }

    #[test]
    fn test_full_cycle_visits_every_phase_in_order() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());

        samples.on_sample(463);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));

        let transitions = run_ticks(&mut r, &ticks, 60);
        assert_eq!(
            transitions,
            vec![
                (15, Mode::Sending),
                (31, Mode::WaitAfterSend),
                (46, Mode::Listening)
            ]
        );
        assert_eq!(r.responses(), 1);
        assert!(!r.clock().is_running());
        assert_eq!(r.clock().timer().arms, 1);
        // Once at construction, once on returning to Listening
        assert_eq!(r.clock().timer().disarms, 2);
        assert_eq!(r.burst().output().enables, 1);
        // Initial disable plus the one ending the burst
        assert_eq!(r.burst().output().disables, 2);
    }

    #[test]
    fn test_phase_never_counts_ticks_from_previous_phase() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());
        samples.on_sample(0);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));

        // The control loop is stalled (e.g. by a serial write) while far
        // more ticks than the wait phase needs arrive.
        for _ in 0..40 {
            ticks.on_tick();
        }
        assert_eq!(r.poll(), Some(Mode::Sending));

        // None of those 40 ticks may shorten the burst
        assert_eq!(r.poll(), None);
        let transitions = run_ticks(&mut r, &ticks, 16);
        assert_eq!(transitions, vec![(16, Mode::WaitAfterSend)]);
    }

    #[test]
    fn test_one_transition_per_poll() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let config = ResponderConfig::new(
            ThresholdWindow::REFERENCE,
            PhaseDurations {
                wait_before_send: 0,
                sending: 1,
                wait_after_send: 0,
            },
        );
        let mut r = responder(&ticks, &samples, config);
        samples.on_sample(1000);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));
        // A zero-length phase still needs one fresh tick
        assert_eq!(r.poll(), None);
        let transitions = run_ticks(&mut r, &ticks, 3);
        assert_eq!(
            transitions,
            vec![
                (1, Mode::Sending),
                (2, Mode::WaitAfterSend),
                (3, Mode::Listening)
            ]
        );
    }

    #[test]
    fn test_samples_taken_during_response_are_discarded() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());
        samples.on_sample(600);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));

        for i in 0..46 {
            // Free-running converter keeps reporting while we respond
            samples.on_sample(900 + i);
            ticks.on_tick();
            let _ = r.poll();
        }
        assert_eq!(r.mode(), Mode::Listening);
        assert_eq!(r.poll(), None);

        samples.on_sample(700);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));
    }

    #[test]
    fn test_repeated_cycles() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = responder(&ticks, &samples, ResponderConfig::default());
        for cycle in 1..=3 {
            samples.on_sample(100);
            assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));
            let transitions = run_ticks(&mut r, &ticks, 46);
            assert_eq!(transitions.len(), 3);
            assert_eq!(r.responses(), cycle);
        }
    }

    #[test]
    fn test_ping_lost_telemetry() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let framer = SerialFramer::new(SerialChannel::new(FakeUart::with_busy_polls(2)));
        let mut r = Responder::new(
            TickClock::new(FakeTimer::default(), &ticks),
            SignalSampler::new(FakeAdc::default(), &samples),
            FakeOutput::default(),
            StatusPins::none(),
            Some(framer),
            ResponderConfig::default(),
        );
        samples.on_sample(600);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));

        // Ticks keep accumulating while the frame is being written
        let transitions = run_ticks(&mut r, &ticks, 15);
        assert_eq!(transitions, vec![(15, Mode::Sending)]);

        let framer = r.telemetry_mut().unwrap();
        assert_eq!(framer.frames_sent(), 1);
        framer.send_coordinate(120, 45);
        let expected: Vec<u8> = encode_debug(b"ping lost 600")
            .chain([0x16, 0x00, 120, 0x00, 45])
            .collect();
        assert_eq!(framer.channel().tx().sent, expected);
    }

    #[test]
    fn test_gated_carrier_follows_sending_phase() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut r = Responder::new(
            TickClock::new(FakeTimer::default(), &ticks),
            SignalSampler::new(FakeAdc::default(), &samples),
            GatedCarrier::new(pin, None),
            StatusPins::none(),
            None::<SerialFramer<Infallible>>,
            ResponderConfig::default(),
        );
        samples.on_sample(600);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));
        let transitions = run_ticks(&mut r, &ticks, 46);
        assert_eq!(transitions.last(), Some(&(46, Mode::Listening)));
        let mut carrier = r.burst;
        carrier.output_mut().pin.done();
    }

    #[test]
    fn test_status_pins_follow_response() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let listening = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut beats = vec![PinTransaction::set(PinState::Low)];
        for i in 0..3 {
            let state = if i % 2 == 0 { PinState::High } else { PinState::Low };
            beats.push(PinTransaction::set(state));
        }
        let heartbeat = PinMock::new(&beats);
        let config = ResponderConfig::new(
            ThresholdWindow::REFERENCE,
            PhaseDurations {
                wait_before_send: 1,
                sending: 1,
                wait_after_send: 1,
            },
        );
        let mut r = Responder::new(
            TickClock::new(FakeTimer::default(), &ticks),
            SignalSampler::new(FakeAdc::default(), &samples),
            FakeOutput::default(),
            StatusPins::new(Some(listening), Some(heartbeat)),
            None::<SerialFramer<Infallible>>,
            config,
        );

        // In-window samples leave both pins alone
        samples.on_sample(500);
        assert_eq!(r.poll(), None);

        samples.on_sample(600);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));
        // No tick yet, no beat
        assert_eq!(r.poll(), None);
        let transitions = run_ticks(&mut r, &ticks, 3);
        assert_eq!(transitions.last(), Some(&(3, Mode::Listening)));

        // Listening never beats, even if a tick slips in
        ticks.on_tick();
        assert_eq!(r.poll(), None);

        let status = &mut r.status;
        let _ = status.listening.as_mut().map(|pin| pin.done());
        let _ = status.heartbeat.as_mut().map(|pin| pin.done());
    }

    /// Reports a tick from inside every enable/disable, like a timer
    /// interrupt firing while the carrier is being switched.
    #[derive(Debug)]
    struct TickingOutput<'a> {
        ticks: &'a TickMailbox,
    }

    impl BurstOutput for TickingOutput<'_> {
        fn enable(&mut self) {
            self.ticks.on_tick();
        }

        fn disable(&mut self) {
            self.ticks.on_tick();
        }
    }

    #[test]
    fn test_tick_during_entry_counts_in_new_phase() {
        let ticks = TickMailbox::new();
        let samples = SampleMailbox::new();
        let mut r = Responder::new(
            TickClock::new(FakeTimer::default(), &ticks),
            SignalSampler::new(FakeAdc::default(), &samples),
            TickingOutput { ticks: &ticks },
            StatusPins::none(),
            None::<SerialFramer<Infallible>>,
            ResponderConfig::default(),
        );
        samples.on_sample(600);
        assert_eq!(r.poll(), Some(Mode::WaitBeforeSend));

        let transitions = run_ticks(&mut r, &ticks, 60);
        // The ticks raised while starting and stopping the burst each
        // shorten the following phase by one
        assert_eq!(
            transitions,
            vec![
                (15, Mode::Sending),
                (30, Mode::WaitAfterSend),
                (44, Mode::Listening)
            ]
        );
    }
}
