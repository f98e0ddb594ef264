/// Declares the static tick and sample mailboxes shared with the ISRs.
///
/// With no arguments the statics are named `TICKS` and `SAMPLES`; pass two
/// identifiers to choose other names.
///
/// # Example
/// ```rust
/// pingburst::declare_mailboxes!();
///
/// // #[interrupt]
/// fn timer0() {
///     TICKS.on_tick();
/// }
///
/// // #[interrupt]
/// fn adc() {
///     SAMPLES.on_sample(600);
/// }
///
/// timer0();
/// adc();
/// assert_eq!(TICKS.read_latest(), (1, true));
/// assert_eq!(SAMPLES.read_latest(), (600, true));
/// ```
///
/// # Notes
/// - The ISRs must only call `on_tick()` / `on_sample()`; all reading and
///   clearing belongs to the control loop.
/// - Pass `&TICKS` / `&SAMPLES` to [`TickClock::new`](crate::timer::TickClock::new)
///   and [`SignalSampler::new`](crate::sampler::SignalSampler::new).
#[macro_export]
macro_rules! declare_mailboxes {
    () => {
        $crate::declare_mailboxes!(TICKS, SAMPLES);
    };
    ( $ticks:ident, $samples:ident ) => {
        pub static $ticks: $crate::mailbox::TickMailbox = $crate::mailbox::TickMailbox::new();
        pub static $samples: $crate::mailbox::SampleMailbox =
            $crate::mailbox::SampleMailbox::new();
    };
}
