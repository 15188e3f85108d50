//! XMODEM-CRC block transfer for payloads too large for inline records.
//!
//! | Piece | Module |
//! |-------|--------|
//! | Packet layout, CRC-16, verification | [`packet`] |
//! | Link seam (`read`, `write`, `is_inbound_empty`, `is_outbound_full`) | [`io`] |
//! | Byte images (`[u8]`, little-endian `[u16]`) | [`source`] |
//! | Sender state machine | [`transmitter`] |
//!
//! [`transmit`] drives a [`Transmitter`] to completion against any
//! [`BlockIo`] and [`Clock`].

pub mod io;
pub mod packet;
pub mod source;
pub mod transmitter;

pub use io::{BlockIo, UartBlockIo};
pub use packet::{Packet, PacketError};
pub use source::{BlockSource, U16Le};
pub use transmitter::{AbortReason, TransmitState, Transmitter};

use crate::platform::Clock;

/// Send `source` and block until the transfer completes or aborts.
///
/// Termination relies on `clock` advancing: every wait inside the
/// transmitter is bounded by a timeout.
pub fn transmit<B, IO, C>(source: &B, io: &mut IO, clock: &C) -> Result<(), AbortReason>
where
    B: BlockSource + ?Sized,
    IO: BlockIo,
    C: Clock,
{
    let mut tx = Transmitter::new(source);
    loop {
        match tx.process(io, clock.now_ms()) {
            TransmitState::Complete => return Ok(()),
            TransmitState::Aborted(reason) => return Err(reason),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeReceiver, MockClock, ReceiverMode};

    #[test]
    fn transmit_u16_codes() {
        let codes = [0x0102u16; 100];
        let mut rx = FakeReceiver::new(ReceiverMode::Normal);
        assert_eq!(transmit(&U16Le(&codes), &mut rx, &MockClock::new(0, 1)), Ok(()));
        assert_eq!(rx.packets, 2);
        assert_eq!(&rx.received[..4], &[0x02, 0x01, 0x02, 0x01]);
        assert_eq!(rx.received[199], 0x01);
        assert_eq!(rx.received[200], packet::SUB);
    }

    #[test]
    fn transmit_reports_abort() {
        let data = [0u8; 16];
        let mut rx = FakeReceiver::new(ReceiverMode::NeverStart);
        assert_eq!(
            transmit(&data[..], &mut rx, &MockClock::new(0, 1000)),
            Err(AbortReason::StartTimeout)
        );
    }
}
