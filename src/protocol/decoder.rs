//! Byte-at-a-time parser for the receiving end of the serial link.
//!
//! Feed every received byte to [`FrameDecoder::push`]; a complete frame is
//! returned as soon as its last byte arrives.
//!
//! Coordinate frames are recognised by their fixed length: the four bytes
//! after `START_COORD` are taken verbatim, even when they equal a marker.
//! Debug payloads never contain a marker, so inside a debug frame any start
//! marker means the previous frame was cut off on the wire.

use heapless::Vec;

use crate::consts::{DEBUG_PAYLOAD_CAPACITY, END_DEBUG, START_COORD, START_DEBUG};
use crate::error::FrameError;

/// A fully received frame.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum DecodedFrame {
    /// A reported position
    Coordinate {
        /// Horizontal coordinate
        x: u16,
        /// Vertical coordinate
        y: u16,
    },
    /// Debug text payload, markers stripped
    Debug(Vec<u8, DEBUG_PAYLOAD_CAPACITY>),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum State {
    Idle,
    Coordinate { buf: [u8; 4], len: u8 },
    Debug,
    /// Payload overflowed; skip until the frame ends.
    Discarding,
}

/// Incremental frame parser.
#[derive(Debug)]
pub struct FrameDecoder {
    state: State,
    payload: Vec<u8, DEBUG_PAYLOAD_CAPACITY>,
    /// Number of errors reported so far
    pub bad: u16,
}

impl FrameDecoder {
    /// Creates a decoder waiting for a start marker.
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            payload: Vec::new(),
            bad: 0,
        }
    }

    /// Whether the decoder is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Processes one received byte.
    ///
    /// # Returns
    /// - `Ok(Some(frame))`: `byte` completed a frame
    /// - `Ok(None)`: more bytes are needed
    /// - `Err(_)`: `byte` was unexpected; the decoder has already recovered
    ///   and the next byte can be pushed as usual
    pub fn push(&mut self, byte: u8) -> Result<Option<DecodedFrame>, FrameError> {
        let result = self.step(byte);
        if result.is_err() {
            self.bad = self.bad.saturating_add(1);
        }
        result
    }

    fn step(&mut self, byte: u8) -> Result<Option<DecodedFrame>, FrameError> {
        match self.state {
            State::Idle => match byte {
                START_COORD | START_DEBUG => {
                    self.begin(byte);
                    Ok(None)
                }
                END_DEBUG => Err(FrameError::UnexpectedEnd),
                other => Err(FrameError::StrayByte(other)),
            },
            State::Coordinate { mut buf, len } => {
                buf[len as usize] = byte;
                let len = len + 1;
                if len as usize == buf.len() {
                    self.state = State::Idle;
                    Ok(Some(DecodedFrame::Coordinate {
                        x: u16::from_be_bytes([buf[0], buf[1]]),
                        y: u16::from_be_bytes([buf[2], buf[3]]),
                    }))
                } else {
                    self.state = State::Coordinate { buf, len };
                    Ok(None)
                }
            }
            State::Debug => match byte {
                END_DEBUG => {
                    self.state = State::Idle;
                    let payload = self.payload.clone();
                    self.payload.clear();
                    Ok(Some(DecodedFrame::Debug(payload)))
                }
                START_COORD | START_DEBUG => {
                    self.begin(byte);
                    Err(FrameError::Interrupted(byte))
                }
                other => {
                    if self.payload.push(other).is_err() {
                        self.payload.clear();
                        self.state = State::Discarding;
                        return Err(FrameError::PayloadOverflow);
                    }
                    Ok(None)
                }
            },
            State::Discarding => {
                match byte {
                    END_DEBUG => self.state = State::Idle,
                    START_COORD | START_DEBUG => self.begin(byte),
                    _ => {}
                }
                Ok(None)
            }
        }
    }

    fn begin(&mut self, marker: u8) {
        self.payload.clear();
        self.state = if marker == START_COORD {
            State::Coordinate {
                buf: [0; 4],
                len: 0,
            }
        } else {
            State::Debug
        };
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encoding::{encode_coordinate, encode_debug};

    fn decode_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<DecodedFrame, 8> {
        let mut frames = Vec::new();
        for &b in bytes {
            if let Ok(Some(frame)) = decoder.push(b) {
                frames.push(frame).unwrap();
            }
        }
        frames
    }

    fn debug(text: &[u8]) -> DecodedFrame {
        DecodedFrame::Debug(Vec::from_slice(text).unwrap())
    }

    #[test]
    fn test_decode_coordinate_with_marker_valued_bytes() {
        let mut decoder = FrameDecoder::new();
        let frames = decode_all(&mut decoder, &encode_coordinate(0x0216, 0x0302));
        assert_eq!(
            frames.as_slice(),
            &[DecodedFrame::Coordinate {
                x: 0x0216,
                y: 0x0302
            }]
        );
        assert!(decoder.is_idle());
        assert_eq!(decoder.bad, 0);
    }

    #[test]
    fn test_decode_mixed_stream() {
        let mut stream: std::vec::Vec<u8> = encode_debug(b"ping lost 600").collect();
        stream.extend_from_slice(&encode_coordinate(120, 45));
        stream.extend(encode_debug(b"A\x02B"));

        let mut decoder = FrameDecoder::new();
        let frames = decode_all(&mut decoder, &stream);
        assert_eq!(
            frames.as_slice(),
            &[
                debug(b"ping lost 600"),
                DecodedFrame::Coordinate { x: 120, y: 45 },
                debug(b"A"),
            ]
        );
        assert_eq!(decoder.bad, 0);
    }

    #[test]
    fn test_stray_and_unexpected_end() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(b'x'), Err(FrameError::StrayByte(b'x')));
        assert_eq!(decoder.push(0x03), Err(FrameError::UnexpectedEnd));
        assert_eq!(decoder.bad, 2);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_interrupted_debug_frame_starts_new_frame() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(0x02), Ok(None));
        assert_eq!(decoder.push(b'h'), Ok(None));
        assert_eq!(decoder.push(0x16), Err(FrameError::Interrupted(0x16)));
        let frames = decode_all(&mut decoder, &[0x00, 0x07, 0x00, 0x08]);
        assert_eq!(
            frames.as_slice(),
            &[DecodedFrame::Coordinate { x: 7, y: 8 }]
        );
    }

    #[test]
    fn test_payload_overflow_is_dropped() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(0x02), Ok(None));
        for _ in 0..DEBUG_PAYLOAD_CAPACITY {
            assert_eq!(decoder.push(b'a'), Ok(None));
        }
        assert_eq!(decoder.push(b'a'), Err(FrameError::PayloadOverflow));
        // The rest of the oversized frame is skipped silently
        assert_eq!(decoder.push(b'a'), Ok(None));
        assert_eq!(decoder.push(0x03), Ok(None));
        assert!(decoder.is_idle());

        let frames = decode_all(&mut decoder, &[0x02, b'o', b'k', 0x03]);
        assert_eq!(frames.as_slice(), &[debug(b"ok")]);
    }
}
