//! Framed serial protocol for coordinate and debug messages.
//!
//! The protocol reserves three byte values ([`START_COORD`], [`START_DEBUG`],
//! [`END_DEBUG`]):
//!
//! ```text
//! Coordinate:  [0x16] [x_hi] [x_lo] [y_hi] [y_lo]
//! Debug:       [0x02] [byte1] [byte2] ... [byteN] [0x03]
//! ```
//!
//! - [`encoding`]: pure, lazy encoders
//! - [`framer`]: sends frames through a blocking [`SerialChannel`](crate::serial::SerialChannel)
//! - [`decoder`]: parses the same stream on the receiving end

pub use crate::consts::{END_DEBUG, START_COORD, START_DEBUG};

pub mod decoder;
pub mod encoding;
pub mod framer;

pub use decoder::{DecodedFrame, FrameDecoder};
pub use encoding::{Frame, encode_coordinate, encode_debug, is_reserved};
pub use framer::{DebugWriter, SerialFramer};
