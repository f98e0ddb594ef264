//! Constants used across the responder and the serial protocol.
//!
//! This module defines the reserved wire markers of the framing protocol,
//! the reference sensor calibration, and the reference response timing.
//!
//! ## Key Concepts
//!
//! - **Markers**: Byte values with protocol meaning. They never appear inside a
//!   debug payload; a payload is cut short at the first one.
//! - **Calibration**: The raw ADC window in which the ping is considered present.
//! - **Timing**: Phase lengths expressed in ticks of the periodic tick clock.
//!
//! The calibration and timing values are the defaults of
//! [`ResponderConfig`](crate::config::ResponderConfig); deployments with a
//! different front end should build their own configuration instead of
//! editing these.

/// Begins a fixed 5-byte coordinate frame.
pub const START_COORD: u8 = 0x16;

/// Begins a variable-length debug frame.
pub const START_DEBUG: u8 = 0x02;

/// Ends a debug frame.
pub const END_DEBUG: u8 = 0x03;

/// All byte values reserved by the protocol.
pub const RESERVED_BYTES: [u8; 3] = [START_COORD, START_DEBUG, END_DEBUG];

/// Length (in bytes) of a complete coordinate frame, marker included.
pub const COORD_FRAME_LEN: usize = 5;

/// Maximum debug payload length accepted by the
/// [`FrameDecoder`](crate::protocol::decoder::FrameDecoder).
///
/// The encoder itself streams and has no limit.
pub const DEBUG_PAYLOAD_CAPACITY: usize = 64;

/// Lowest raw sample value (inclusive) at which the ping is considered present.
pub const PING_PRESENT_LOW: u16 = 464;

/// Highest raw sample value (inclusive) at which the ping is considered present.
pub const PING_PRESENT_HIGH: u16 = 564;

/// Reference tick rate of the periodic tick clock, in Hz (1 tick = 1 ms).
pub const TICK_RATE_HZ: u32 = 1_000;

/// Ticks spent waiting between losing the ping and starting the burst.
pub const WAIT_BEFORE_SEND_TICKS: u16 = 15;

/// Ticks the burst stays active.
pub const SENDING_TICKS: u16 = 16;

/// Ticks spent waiting after the burst before listening again.
pub const WAIT_AFTER_SEND_TICKS: u16 = 15;

/// Debug text announced when the ping is lost, followed by the raw sample.
pub const PING_LOST_MESSAGE: &str = "ping lost";
