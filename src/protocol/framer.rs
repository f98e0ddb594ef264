//! Streams frames onto a [`SerialChannel`].
//!
//! Every method here blocks until the last byte has been accepted by the
//! transmitter; see the [`serial`](crate::serial) contract.

use core::fmt;

use crate::consts::{END_DEBUG, START_DEBUG};
use crate::protocol::encoding::{Frame, encode_coordinate, encode_debug, is_reserved};
use crate::serial::{SerialChannel, SerialTx};

/// Sends coordinate and debug frames over a serial link.
#[derive(Debug)]
pub struct SerialFramer<W: SerialTx> {
    channel: SerialChannel<W>,
    frames_sent: u16,
}

impl<W: SerialTx> SerialFramer<W> {
    /// Wraps a serial channel.
    pub fn new(channel: SerialChannel<W>) -> Self {
        Self {
            channel,
            frames_sent: 0,
        }
    }

    /// Sends a coordinate frame.
    pub fn send_coordinate(&mut self, x: u16, y: u16) {
        self.channel.write_all(encode_coordinate(x, y));
        self.frames_sent = self.frames_sent.wrapping_add(1);
    }

    /// Sends `text` as a debug frame, truncated at the first reserved byte.
    pub fn send_debug(&mut self, text: &[u8]) {
        self.channel.write_all(encode_debug(text));
        self.frames_sent = self.frames_sent.wrapping_add(1);
    }

    /// Sends any [`Frame`].
    pub fn send_frame(&mut self, frame: &Frame<'_>) {
        self.channel.write_all(frame.bytes());
        self.frames_sent = self.frames_sent.wrapping_add(1);
    }

    /// Formats `args` straight onto the wire as one debug frame.
    ///
    /// The text is truncated at the first reserved byte, exactly as with
    /// [`send_debug`](Self::send_debug). The frame is always closed, even if
    /// a `Display` implementation reports an error.
    ///
    /// # Example
    /// ```rust,ignore
    /// framer.send_debug_fmt(format_args!("sample {}", value))?;
    /// ```
    pub fn send_debug_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        let result = {
            let mut writer = DebugWriter::begin(&mut self.channel);
            fmt::Write::write_fmt(&mut writer, args)
        };
        self.frames_sent = self.frames_sent.wrapping_add(1);
        result
    }

    /// Number of frames sent so far (wraps).
    pub fn frames_sent(&self) -> u16 {
        self.frames_sent
    }

    /// Borrow the underlying channel.
    pub fn channel(&self) -> &SerialChannel<W> {
        &self.channel
    }

    /// Releases the underlying channel.
    pub fn free(self) -> SerialChannel<W> {
        self.channel
    }
}

/// An open debug frame accepting text through [`fmt::Write`].
///
/// `START_DEBUG` is written on [`begin`](Self::begin) and `END_DEBUG` when the
/// writer is dropped. Once a reserved byte has been seen, all further text is
/// discarded.
#[derive(Debug)]
pub struct DebugWriter<'c, W: SerialTx> {
    channel: &'c mut SerialChannel<W>,
    truncated: bool,
}

impl<'c, W: SerialTx> DebugWriter<'c, W> {
    /// Opens a debug frame on `channel`.
    pub fn begin(channel: &'c mut SerialChannel<W>) -> Self {
        channel.write_byte(START_DEBUG);
        Self {
            channel,
            truncated: false,
        }
    }

    /// Whether a reserved byte cut the payload short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Closes the frame.
    pub fn finish(self) {}
}

impl<W: SerialTx> fmt::Write for DebugWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        for b in s.bytes() {
            if is_reserved(b) {
                self.truncated = true;
                break;
            }
            self.channel.write_byte(b);
        }
        Ok(())
    }
}

impl<W: SerialTx> Drop for DebugWriter<'_, W> {
    fn drop(&mut self) {
        self.channel.write_byte(END_DEBUG);
    }
}
