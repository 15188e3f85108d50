//! XMODEM-CRC sender state machine.
//!
//! ```text
//! Idle ─► WaitingForStart ──'C'──► SendingBlock ─► WaitingForAck ──ACK──┐
//!              │                        ▲               │               │
//!              │ 60 s                   └──NAK / 10 s───┘               │
//!              ▼                                          more blocks ◄─┤
//!          Aborted                                                      ▼
//!                          Complete ◄──ACK── WaitingForEotAck ◄─ SendingEot
//! ```
//!
//! [`Transmitter::process`] never blocks: it performs at most one step and
//! returns. The caller keeps calling it with a fresh millisecond tick until
//! the state is terminal. Every wait is bounded, so a transfer always ends.
//!
//! A block (or the final EOT) is resent on NAK or on the ACK timeout. A link
//! whose outbound side stays full for the ACK timeout aborts the transfer. After
//! [`XMODEM_MAX_RETRIES`] resends of the same item the transfer aborts. A
//! `CAN` from the receiver aborts immediately. Every abort sends `CAN CAN`.

use crate::constants::{
    XMODEM_ACK_TIMEOUT_MS, XMODEM_BLOCK_SIZE, XMODEM_MAX_RETRIES, XMODEM_START_TIMEOUT_MS,
};

use super::io::BlockIo;
use super::packet::{Packet, ACK, CAN, CRC_REQUEST, EOT, NAK};
use super::source::BlockSource;

/// Why a transfer ended without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortReason {
    /// No `C` arrived within the start timeout.
    StartTimeout,
    /// One block or the EOT was NAKed or timed out too often.
    RetriesExhausted,
    /// The receiver sent `CAN`.
    Cancelled,
    /// The link rejected a write.
    WriteFailed,
    /// The outbound side stayed full for the ACK timeout.
    LinkStalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitState {
    Idle,
    WaitingForStart,
    SendingBlock,
    WaitingForAck,
    SendingEot,
    WaitingForEotAck,
    Complete,
    Aborted(AbortReason),
}

impl TransmitState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransmitState::Complete | TransmitState::Aborted(_))
    }
}

/// Sender for one byte image.
pub struct Transmitter<'s, B: BlockSource + ?Sized> {
    source: &'s B,
    state: TransmitState,
    /// Next block to send (0-based).
    block: usize,
    blocks_total: usize,
    /// Resends of the current block or EOT.
    retries: u8,
    /// Tick at which the current wait started.
    since_ms: u32,
}

impl<'s, B: BlockSource + ?Sized> Transmitter<'s, B> {
    pub fn new(source: &'s B) -> Self {
        Transmitter {
            source,
            state: TransmitState::Idle,
            block: 0,
            blocks_total: source.byte_len().div_ceil(XMODEM_BLOCK_SIZE),
            retries: 0,
            since_ms: 0,
        }
    }

    pub fn state(&self) -> TransmitState {
        self.state
    }

    pub fn blocks_total(&self) -> usize {
        self.blocks_total
    }

    /// Blocks acknowledged so far.
    pub fn blocks_acked(&self) -> usize {
        self.block
    }

    /// Advance by one step.
    pub fn process<IO: BlockIo>(&mut self, io: &mut IO, now_ms: u32) -> TransmitState {
        match self.state {
            TransmitState::Idle => {
                self.since_ms = now_ms;
                self.state = TransmitState::WaitingForStart;
            }
            TransmitState::WaitingForStart => self.wait_for_start(io, now_ms),
            TransmitState::SendingBlock => {
                if !io.is_outbound_full() {
                    let packet = Packet::from_source(self.source, self.block);
                    self.send(io, &packet.encode(), TransmitState::WaitingForAck, now_ms);
                } else {
                    self.check_stall(io, now_ms);
                }
            }
            TransmitState::WaitingForAck => self.wait_for_ack(io, now_ms, false),
            TransmitState::SendingEot => {
                if !io.is_outbound_full() {
                    self.send(io, &[EOT], TransmitState::WaitingForEotAck, now_ms);
                } else {
                    self.check_stall(io, now_ms);
                }
            }
            TransmitState::WaitingForEotAck => self.wait_for_ack(io, now_ms, true),
            TransmitState::Complete | TransmitState::Aborted(_) => {}
        }
        self.state
    }

    fn wait_for_start<IO: BlockIo>(&mut self, io: &mut IO, now_ms: u32) {
        while let Some(byte) = next_byte(io) {
            match byte {
                CRC_REQUEST => {
                    self.retries = 0;
                    let next = if self.blocks_total == 0 {
                        TransmitState::SendingEot
                    } else {
                        TransmitState::SendingBlock
                    };
                    self.enter(next, now_ms);
                    return;
                }
                CAN => {
                    self.abort(io, AbortReason::Cancelled);
                    return;
                }
                // Checksum-mode NAKs and line noise
                _ => {}
            }
        }
        if now_ms.wrapping_sub(self.since_ms) >= XMODEM_START_TIMEOUT_MS {
            self.abort(io, AbortReason::StartTimeout);
        }
    }

    fn wait_for_ack<IO: BlockIo>(&mut self, io: &mut IO, now_ms: u32, eot: bool) {
        while let Some(byte) = next_byte(io) {
            match byte {
                ACK => {
                    self.retries = 0;
                    let next = if eot {
                        TransmitState::Complete
                    } else {
                        self.block += 1;
                        if self.block < self.blocks_total {
                            TransmitState::SendingBlock
                        } else {
                            TransmitState::SendingEot
                        }
                    };
                    self.enter(next, now_ms);
                    return;
                }
                NAK => {
                    self.retry(io, eot, now_ms);
                    return;
                }
                CAN => {
                    self.abort(io, AbortReason::Cancelled);
                    return;
                }
                // Late 'C' requests and noise
                _ => {}
            }
        }
        if now_ms.wrapping_sub(self.since_ms) >= XMODEM_ACK_TIMEOUT_MS {
            self.retry(io, eot, now_ms);
        }
    }

    /// Outbound still full; give up once it has been for the ACK timeout.
    fn check_stall<IO: BlockIo>(&mut self, io: &mut IO, now_ms: u32) {
        if now_ms.wrapping_sub(self.since_ms) >= XMODEM_ACK_TIMEOUT_MS {
            self.abort(io, AbortReason::LinkStalled);
        }
    }

    fn retry<IO: BlockIo>(&mut self, io: &mut IO, eot: bool, now_ms: u32) {
        if self.retries >= XMODEM_MAX_RETRIES {
            self.abort(io, AbortReason::RetriesExhausted);
            return;
        }
        self.retries += 1;
        let next = if eot {
            TransmitState::SendingEot
        } else {
            TransmitState::SendingBlock
        };
        self.enter(next, now_ms);
    }

    fn enter(&mut self, state: TransmitState, now_ms: u32) {
        self.since_ms = now_ms;
        self.state = state;
    }

    fn send<IO: BlockIo>(&mut self, io: &mut IO, bytes: &[u8], next: TransmitState, now_ms: u32) {
        match io.write(bytes) {
            Ok(()) => self.enter(next, now_ms),
            Err(_) => self.abort(io, AbortReason::WriteFailed),
        }
    }

    fn abort<IO: BlockIo>(&mut self, io: &mut IO, reason: AbortReason) {
        #[cfg(feature = "defmt")]
        defmt::warn!("xmodem: abort at block {}: {}", self.block, reason);
        // Best effort; the link may be the reason for the abort
        let _ = io.write(&[CAN, CAN]);
        self.state = TransmitState::Aborted(reason);
    }
}

fn next_byte<IO: BlockIo>(io: &mut IO) -> Option<u8> {
    if io.is_inbound_empty() {
        return None;
    }
    let mut byte = [0u8; 1];
    (io.read(&mut byte) == 1).then_some(byte[0])
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::testing::{FakeReceiver, ReceiverMode};
    use crate::xmodem::packet::SUB;

    fn drive<B: BlockSource + ?Sized>(
        tx: &mut Transmitter<'_, B>,
        rx: &mut FakeReceiver,
        step_ms: u32,
    ) -> TransmitState {
        let mut now = 0u32;
        for _ in 0..100_000 {
            let state = tx.process(rx, now);
            if state.is_terminal() {
                return state;
            }
            now = now.wrapping_add(step_ms);
        }
        panic!("transfer did not terminate");
    }

    /// Receiver behind a link whose outbound side can be held full.
    struct StalledLink {
        inner: FakeReceiver,
        full: bool,
    }

    impl BlockIo for StalledLink {
        fn read(&mut self, buf: &mut [u8]) -> usize {
            self.inner.read(buf)
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), crate::error::TransportError> {
            self.inner.write(bytes)
        }

        fn is_inbound_empty(&self) -> bool {
            self.inner.is_inbound_empty()
        }

        fn is_outbound_full(&self) -> bool {
            self.full
        }
    }

    #[test]
    fn multi_block_transfer_reproduces_data() {
        let data: Vec<u8> = (0..300u32).map(|i| (i * 7) as u8).collect();
        let mut rx = FakeReceiver::new(ReceiverMode::Normal);
        let mut tx = Transmitter::new(&data[..]);
        assert_eq!(tx.blocks_total(), 3);

        assert_eq!(drive(&mut tx, &mut rx, 1), TransmitState::Complete);
        assert_eq!(tx.blocks_acked(), 3);
        assert_eq!(rx.received.len(), 384);
        assert_eq!(&rx.received[..300], &data[..]);
        assert!(rx.received[300..].iter().all(|&b| b == SUB));
        assert!(rx.eot_seen);
        assert!(!rx.cancelled);
    }

    #[test]
    fn empty_image_sends_only_eot() {
        let empty: [u8; 0] = [];
        let mut rx = FakeReceiver::new(ReceiverMode::Normal);
        let mut tx = Transmitter::new(&empty[..]);
        assert_eq!(drive(&mut tx, &mut rx, 1), TransmitState::Complete);
        assert_eq!(rx.packets, 0);
        assert!(rx.eot_seen);
    }

    #[test]
    fn nak_only_receiver_exhausts_retries() {
        let data = [1u8; 10];
        let mut rx = FakeReceiver::new(ReceiverMode::NakAll);
        let mut tx = Transmitter::new(&data[..]);
        assert_eq!(
            drive(&mut tx, &mut rx, 1),
            TransmitState::Aborted(AbortReason::RetriesExhausted)
        );
        assert_eq!(rx.packets, 1 + XMODEM_MAX_RETRIES as usize);
        assert!(rx.cancelled);
    }

    #[test]
    fn nak_then_ack_recovers() {
        let data = [9u8; 130];
        let mut rx = FakeReceiver::new(ReceiverMode::NakFirst(3));
        let mut tx = Transmitter::new(&data[..]);
        assert_eq!(drive(&mut tx, &mut rx, 1), TransmitState::Complete);
        assert_eq!(rx.packets, 5);
        assert_eq!(&rx.received[..130], &data[..]);
    }

    #[test]
    fn silent_receiver_hits_start_timeout() {
        let data = [1u8; 10];
        let mut rx = FakeReceiver::new(ReceiverMode::NeverStart);
        let mut tx = Transmitter::new(&data[..]);
        assert_eq!(
            drive(&mut tx, &mut rx, 500),
            TransmitState::Aborted(AbortReason::StartTimeout)
        );
        assert_eq!(rx.packets, 0);
    }

    #[test]
    fn unanswered_blocks_time_out_and_abort() {
        let data = [1u8; 10];
        let mut rx = FakeReceiver::new(ReceiverMode::Mute);
        let mut tx = Transmitter::new(&data[..]);
        assert_eq!(
            drive(&mut tx, &mut rx, 1000),
            TransmitState::Aborted(AbortReason::RetriesExhausted)
        );
        assert_eq!(rx.packets, 1 + XMODEM_MAX_RETRIES as usize);
    }

    #[test]
    fn receiver_cancel_aborts() {
        let data = [1u8; 300];
        let mut rx = FakeReceiver::new(ReceiverMode::CancelAfter(1));
        let mut tx = Transmitter::new(&data[..]);
        assert_eq!(
            drive(&mut tx, &mut rx, 1),
            TransmitState::Aborted(AbortReason::Cancelled)
        );
        assert_eq!(tx.blocks_acked(), 1);
    }

    #[test]
    fn ack_timeout_uses_elapsed_ticks_across_wrap() {
        let data = [1u8; 10];
        let mut rx = FakeReceiver::new(ReceiverMode::Mute);
        let mut tx = Transmitter::new(&data[..]);
        let start = u32::MAX - 5;
        tx.process(&mut rx, start); // Idle -> WaitingForStart
        tx.process(&mut rx, start); // 'C' -> SendingBlock
        tx.process(&mut rx, start); // block sent
        assert_eq!(tx.state(), TransmitState::WaitingForAck);
        tx.process(&mut rx, start.wrapping_add(XMODEM_ACK_TIMEOUT_MS - 1));
        assert_eq!(tx.state(), TransmitState::WaitingForAck);
        tx.process(&mut rx, start.wrapping_add(XMODEM_ACK_TIMEOUT_MS));
        assert_eq!(tx.state(), TransmitState::SendingBlock);
    }

    #[test]
    fn outbound_stuck_full_aborts() {
        let data = [1u8; 10];
        let mut link = StalledLink {
            inner: FakeReceiver::new(ReceiverMode::Normal),
            full: true,
        };
        let mut tx = Transmitter::new(&data[..]);
        let mut now = 0u32;
        let mut state = tx.state();
        for _ in 0..1_000 {
            state = tx.process(&mut link, now);
            if state.is_terminal() {
                break;
            }
            now = now.wrapping_add(1000);
        }
        assert_eq!(state, TransmitState::Aborted(AbortReason::LinkStalled));
        assert_eq!(link.inner.packets, 0);
        assert!(link.inner.cancelled);
    }

    #[test]
    fn stall_timer_starts_when_block_is_due() {
        let data = [2u8; 200];
        let mut link = StalledLink {
            inner: FakeReceiver::new(ReceiverMode::Normal),
            full: false,
        };
        let mut tx = Transmitter::new(&data[..]);
        tx.process(&mut link, 0); // Idle -> WaitingForStart
        tx.process(&mut link, 0); // 'C' -> SendingBlock
        tx.process(&mut link, 0); // block 1 sent
        link.full = true;
        // ACK for block 1 arrives long after the start
        tx.process(&mut link, 50_000);
        assert_eq!(tx.state(), TransmitState::SendingBlock);

        tx.process(&mut link, 50_000 + XMODEM_ACK_TIMEOUT_MS - 1);
        assert_eq!(tx.state(), TransmitState::SendingBlock);

        link.full = false;
        tx.process(&mut link, 50_000 + XMODEM_ACK_TIMEOUT_MS - 1);
        assert_eq!(tx.state(), TransmitState::WaitingForAck);
        assert_eq!(link.inner.packets, 2);
    }

    #[test]
    fn stuck_outbound_before_eot_aborts() {
        let data = [3u8; 5];
        let mut link = StalledLink {
            inner: FakeReceiver::new(ReceiverMode::Normal),
            full: false,
        };
        let mut tx = Transmitter::new(&data[..]);
        while tx.state() != TransmitState::SendingEot {
            tx.process(&mut link, 0);
        }
        link.full = true;
        tx.process(&mut link, XMODEM_ACK_TIMEOUT_MS - 1);
        assert_eq!(tx.state(), TransmitState::SendingEot);
        tx.process(&mut link, XMODEM_ACK_TIMEOUT_MS);
        assert_eq!(tx.state(), TransmitState::Aborted(AbortReason::LinkStalled));
        assert!(!link.inner.eot_seen);
    }
}
