//! Wire encoding of coordinate and debug frames.
//!
//! ## Frame layout
//!
//! ```text
//! Coordinate:  [0x16] [x_hi] [x_lo] [y_hi] [y_lo]
//! Debug:       [0x02] [payload ...] [0x03]
//! ```
//!
//! Coordinates are unsigned 16-bit, big-endian, in caller-defined units
//! (centimetres in the reference deployment). Their bytes are raw and may
//! take any value, markers included; a receiver tells the frame apart by its
//! fixed length.
//!
//! Debug payloads are text and must not contain a reserved byte. Instead of
//! escaping, the payload is **truncated** at the first reserved byte: the rest
//! of the message is dropped and the closing marker is still sent, so the
//! stream never enters an invalid state.
//!
//! The encoders are lazy and allocation-free; bytes are produced on demand
//! and can be streamed straight into a
//! [`SerialChannel`](crate::serial::SerialChannel).

use core::iter::{Chain, Copied, Once, once};
use core::slice;

use crate::consts::{COORD_FRAME_LEN, END_DEBUG, RESERVED_BYTES, START_COORD, START_DEBUG};

/// Whether `byte` is one of the protocol markers in [`RESERVED_BYTES`].
pub const fn is_reserved(byte: u8) -> bool {
    let mut i = 0;
    while i < RESERVED_BYTES.len() {
        if RESERVED_BYTES[i] == byte {
            return true;
        }
        i += 1;
    }
    false
}

/// Encodes a coordinate pair as a complete 5-byte frame.
pub const fn encode_coordinate(x: u16, y: u16) -> [u8; COORD_FRAME_LEN] {
    let [x_hi, x_lo] = x.to_be_bytes();
    let [y_hi, y_lo] = y.to_be_bytes();
    [START_COORD, x_hi, x_lo, y_hi, y_lo]
}

/// The part of `text` that fits in a debug frame: everything before the
/// first reserved byte.
pub fn debug_payload(text: &[u8]) -> &[u8] {
    let end = text
        .iter()
        .position(|&b| is_reserved(b))
        .unwrap_or(text.len());
    &text[..end]
}

/// Encodes `text` as a complete debug frame, truncated at the first
/// reserved byte.
pub fn encode_debug(text: &[u8]) -> DebugBytes<'_> {
    DebugBytes {
        inner: once(START_DEBUG)
            .chain(debug_payload(text).iter().copied())
            .chain(once(END_DEBUG)),
    }
}

/// Iterator over the bytes of an encoded debug frame.
#[derive(Debug, Clone)]
pub struct DebugBytes<'a> {
    inner: Chain<Chain<Once<u8>, Copied<slice::Iter<'a, u8>>>, Once<u8>>,
}

impl Iterator for DebugBytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A message to be sent on the serial link.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Frame<'a> {
    /// A reported position
    Coordinate {
        /// Horizontal coordinate
        x: u16,
        /// Vertical coordinate
        y: u16,
    },
    /// Free-form debug text
    Debug(&'a [u8]),
}

impl<'a> Frame<'a> {
    /// Encoded bytes of the frame, markers included.
    pub fn bytes(&self) -> FrameBytes<'a> {
        match *self {
            Frame::Coordinate { x, y } => {
                FrameBytes::Coordinate(encode_coordinate(x, y).into_iter())
            }
            Frame::Debug(text) => FrameBytes::Debug(encode_debug(text)),
        }
    }

    /// Number of bytes the frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match *self {
            Frame::Coordinate { .. } => COORD_FRAME_LEN,
            Frame::Debug(text) => debug_payload(text).len() + 2,
        }
    }
}

/// Iterator over the bytes of an encoded [`Frame`].
#[derive(Debug, Clone)]
pub enum FrameBytes<'a> {
    /// Bytes of a coordinate frame
    Coordinate(core::array::IntoIter<u8, COORD_FRAME_LEN>),
    /// Bytes of a debug frame
    Debug(DebugBytes<'a>),
}

impl Iterator for FrameBytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        match self {
            FrameBytes::Coordinate(bytes) => bytes.next(),
            FrameBytes::Debug(bytes) => bytes.next(),
        }
    }
}
