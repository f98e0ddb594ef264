//! Error types.
//!
//! The runtime path of the responder has no recoverable errors; these are only
//! returned while building a configuration or while decoding frames on the
//! receiving side of the serial link.

use thiserror::Error;

/// Rejected deployment constants.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigError {
    /// The threshold window's lower bound is above its upper bound.
    #[error("threshold window is inverted: low {low} > high {high}")]
    InvertedWindow {
        /// Requested lower bound
        low: u16,
        /// Requested upper bound
        high: u16,
    },
    /// A tick clock cannot run at 0 Hz.
    #[error("tick rate must be non-zero")]
    ZeroTickRate,
    /// A phase duration does not fit in the 16-bit tick counter.
    #[error("phase of {millis} ms does not fit in the tick counter")]
    DurationOverflow {
        /// Requested phase length in milliseconds
        millis: u32,
    },
}

/// Malformed input seen by the [`FrameDecoder`](crate::protocol::decoder::FrameDecoder).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameError {
    /// A non-marker byte arrived outside of any frame.
    #[error("stray byte {0:#04x} outside a frame")]
    StrayByte(u8),
    /// `END_DEBUG` arrived outside of a debug frame.
    #[error("end marker outside a debug frame")]
    UnexpectedEnd,
    /// A start marker arrived inside a debug frame. The partial frame was
    /// dropped and the new one has begun.
    #[error("debug frame interrupted by start marker {0:#04x}")]
    Interrupted(u8),
    /// The debug payload exceeded the decoder capacity and was dropped.
    #[error("debug payload exceeds decoder capacity")]
    PayloadOverflow,
}
