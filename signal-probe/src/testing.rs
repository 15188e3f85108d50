//! Host-side fakes shared by the unit and integration tests.

extern crate std;

use core::cell::Cell;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::constants::XMODEM_PACKET_SIZE;
use crate::error::TransportError;
use crate::platform::{Clock, SerialPort, StatusIndicator};
use crate::xmodem::packet::{Packet, ACK, CAN, CRC_REQUEST, EOT, NAK};
use crate::xmodem::BlockIo;

/// Serial port that records everything written to it.
pub struct MockPort {
    pub output: Vec<u8>,
    limit: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PortClosed;

impl MockPort {
    pub fn new() -> Self {
        MockPort { output: Vec::new(), limit: None }
    }

    /// Port that rejects any write taking the output past `limit` bytes.
    pub fn failing_after(limit: usize) -> Self {
        MockPort { output: Vec::new(), limit: Some(limit) }
    }

    pub fn text(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl SerialPort for MockPort {
    type Error = PortClosed;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), PortClosed> {
        if let Some(limit) = self.limit {
            if self.output.len() + bytes.len() > limit {
                return Err(PortClosed);
            }
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }
}

/// Clock that advances by `step` every time it is read.
pub struct MockClock {
    now: Cell<u32>,
    step: u32,
}

impl MockClock {
    pub fn new(start: u32, step: u32) -> Self {
        MockClock { now: Cell::new(start), step }
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(self.step));
        t
    }
}

/// Indicator that counts its transitions.
#[derive(Default)]
pub struct MockIndicator {
    pub on: bool,
    pub toggles: usize,
}

impl StatusIndicator for MockIndicator {
    fn set(&mut self, on: bool) {
        if on != self.on {
            self.toggles += 1;
        }
        self.on = on;
    }
}

// ── Block-transfer receiver ────────────────────────────────────────────────

/// How a [`FakeReceiver`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverMode {
    /// ACK every valid packet and the EOT.
    Normal,
    /// NAK every packet.
    NakAll,
    /// NAK the first `n` packets, then behave normally.
    NakFirst(usize),
    /// Never send the start request.
    NeverStart,
    /// Request a start, then never answer.
    Mute,
    /// ACK `n` packets, then answer with CAN.
    CancelAfter(usize),
}

/// In-memory XMODEM-CRC receiver.
pub struct FakeReceiver {
    mode: ReceiverMode,
    inbound: VecDeque<u8>,
    expected_id: u8,
    pub received: Vec<u8>,
    pub packets: usize,
    pub acked: usize,
    pub eot_seen: bool,
    pub cancelled: bool,
}

impl FakeReceiver {
    pub fn new(mode: ReceiverMode) -> Self {
        let mut inbound = VecDeque::new();
        if mode != ReceiverMode::NeverStart {
            inbound.push_back(CRC_REQUEST);
        }
        FakeReceiver {
            mode,
            inbound,
            expected_id: 1,
            received: Vec::new(),
            packets: 0,
            acked: 0,
            eot_seen: false,
            cancelled: false,
        }
    }

    fn answer_packet(&mut self, bytes: &[u8]) -> Option<u8> {
        self.packets += 1;
        match self.mode {
            ReceiverMode::Mute => return None,
            ReceiverMode::NakAll => return Some(NAK),
            ReceiverMode::NakFirst(n) if self.packets <= n => return Some(NAK),
            ReceiverMode::CancelAfter(n) if self.acked >= n => return Some(CAN),
            _ => {}
        }
        match Packet::verify(bytes, self.expected_id) {
            Ok(packet) => {
                self.received.extend_from_slice(&packet.data);
                self.expected_id = self.expected_id.wrapping_add(1);
                self.acked += 1;
                Some(ACK)
            }
            Err(_) => Some(NAK),
        }
    }
}

impl BlockIo for FakeReceiver {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let reply = if bytes == [CAN, CAN] {
            self.cancelled = true;
            None
        } else if bytes == [EOT] {
            self.eot_seen = true;
            (self.mode != ReceiverMode::Mute).then_some(ACK)
        } else if bytes.len() == XMODEM_PACKET_SIZE {
            self.answer_packet(bytes)
        } else {
            None
        };
        if let Some(b) = reply {
            self.inbound.push_back(b);
        }
        Ok(())
    }

    fn is_inbound_empty(&self) -> bool {
        self.inbound.is_empty()
    }

    fn is_outbound_full(&self) -> bool {
        false
    }
}
