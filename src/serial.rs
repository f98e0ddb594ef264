//! Blocking byte transmit over a non-blocking UART primitive.
//!
//! HAL UART transmitters usually expose an `nb`-style "try to write one
//! byte" operation that answers `WouldBlock` while the transmit register is
//! still busy. [`SerialChannel::write_byte`] spins on it with
//! [`nb::block!`] until the byte is accepted.
//!
//! ## Contract
//!
//! - `write_byte` **blocks until the transmitter is ready**. There is no
//!   timeout and no buffering beyond the one byte in flight.
//! - While it spins, the whole control loop stalls, including the
//!   responder's timing checks. Tick counting continues in the ISR, so phase
//!   timing is not lost, only observed late.
//! - Never call it from an interrupt handler.

use core::convert::Infallible;
use nb::block;

/// Non-blocking single-byte UART transmit capability.
pub trait SerialTx {
    /// Hard transmit error reported by the peripheral.
    type Error;

    /// Attempts to hand one byte to the transmitter.
    ///
    /// # Returns
    /// - `Ok(())`: the byte was accepted
    /// - `Err(nb::Error::WouldBlock)`: the transmitter is busy, try again
    /// - `Err(nb::Error::Other(e))`: the byte could not be sent
    fn try_write(&mut self, byte: u8) -> nb::Result<(), Self::Error>;
}

/// No serial link at all. Lets a [`Responder`](crate::responder::Responder)
/// run without telemetry: `None::<SerialFramer<Infallible>>`.
impl SerialTx for Infallible {
    type Error = Infallible;

    fn try_write(&mut self, _byte: u8) -> nb::Result<(), Infallible> {
        match *self {}
    }
}

/// A byte-oriented serial link with a blocking `write_byte`.
#[derive(Debug)]
pub struct SerialChannel<W: SerialTx> {
    tx: W,
    dropped: u16,
}

impl<W: SerialTx> SerialChannel<W> {
    /// Wraps a configured transmitter (baud rate, framing and pins are
    /// the HAL's business).
    pub fn new(tx: W) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Writes one byte, busy-waiting until the transmitter accepts it.
    ///
    /// A hard transmit error drops the byte and is counted in
    /// [`dropped()`](Self::dropped).
    pub fn write_byte(&mut self, byte: u8) {
        if block!(self.tx.try_write(byte)).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("serial: dropped byte {}", byte);
        }
    }

    /// Writes every byte in order.
    pub fn write_all<I: IntoIterator<Item = u8>>(&mut self, bytes: I) {
        for b in bytes {
            self.write_byte(b);
        }
    }

    /// Number of bytes lost to hard transmit errors.
    pub fn dropped(&self) -> u16 {
        self.dropped
    }

    /// Borrow the underlying transmitter.
    pub fn tx(&self) -> &W {
        &self.tx
    }

    /// Releases the underlying transmitter.
    pub fn free(self) -> W {
        self.tx
    }
}
