//! Byte I/O seam of the block-transfer protocol.

use crate::error::TransportError;
use crate::io::RingBuffer;
use crate::platform::SerialPort;

/// The four operations the transmitter needs from a link.
pub trait BlockIo {
    /// Move up to `buf.len()` received bytes into `buf`; returns the count.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Send all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    fn is_inbound_empty(&self) -> bool;

    fn is_outbound_full(&self) -> bool;
}

/// Receive ring buffer plus blocking serial port.
///
/// The receive interrupt keeps filling `rx` during a transfer, so the
/// receiver's `C`/`ACK`/`NAK` bytes arrive through the same path as command
/// text.
pub struct UartBlockIo<'a, S: SerialPort, const N: usize> {
    rx: &'a RingBuffer<N>,
    port: &'a mut S,
}

impl<'a, S: SerialPort, const N: usize> UartBlockIo<'a, S, N> {
    pub fn new(rx: &'a RingBuffer<N>, port: &'a mut S) -> Self {
        UartBlockIo { rx, port }
    }
}

impl<S: SerialPort, const N: usize> BlockIo for UartBlockIo<'_, S, N> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.rx.read_into(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes).map_err(|_| TransportError::Write)
    }

    fn is_inbound_empty(&self) -> bool {
        self.rx.is_empty()
    }

    fn is_outbound_full(&self) -> bool {
        self.port.is_full()
    }
}
