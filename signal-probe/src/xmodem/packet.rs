//! XMODEM-CRC packet layout.
//!
//! ```text
//! ┌─────┬────┬──────────┬───────────────┬────────┬────────┐
//! │ SOH │ id │ 255 - id │ data[128]     │ crc_hi │ crc_lo │
//! └─────┴────┴──────────┴───────────────┴────────┴────────┘
//! ```
//!
//! The CRC-16/XMODEM covers the data bytes only and is sent MSB first.

use crate::constants::{XMODEM_BLOCK_SIZE, XMODEM_PACKET_SIZE};
use crate::transport::crc::crc16_xmodem;

use super::source::BlockSource;

// ── Control bytes ──────────────────────────────────────────────────────────

pub const SOH: u8 = 0x01;
pub const EOT: u8 = 0x04;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
pub const CAN: u8 = 0x18;
/// Padding of the last block.
pub const SUB: u8 = 0x1A;
/// Receiver's request to start in CRC mode.
pub const CRC_REQUEST: u8 = b'C';

/// Which check a received packet failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Not exactly [`XMODEM_PACKET_SIZE`] bytes.
    Length(usize),
    /// First byte is not [`SOH`].
    Preamble(u8),
    /// Sequence id differs from the expected one.
    Sequence { expected: u8, found: u8 },
    /// Third byte is not `255 - id`.
    Complement,
    /// Trailing CRC does not match the data.
    Crc { received: u16, computed: u16 },
}

/// One 128-byte block with its sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: u8,
    pub data: [u8; XMODEM_BLOCK_SIZE],
}

impl Packet {
    /// Packet carrying `chunk`, padded with [`SUB`] up to the block size.
    /// Bytes past the block size are ignored.
    pub fn new(id: u8, chunk: &[u8]) -> Self {
        let mut data = [SUB; XMODEM_BLOCK_SIZE];
        let n = chunk.len().min(XMODEM_BLOCK_SIZE);
        data[..n].copy_from_slice(&chunk[..n]);
        Packet { id, data }
    }

    /// Block `index` (0-based) of `source`. Ids start at 1 and wrap at 255.
    pub fn from_source<B: BlockSource + ?Sized>(source: &B, index: usize) -> Self {
        let mut data = [SUB; XMODEM_BLOCK_SIZE];
        source.read_at(index * XMODEM_BLOCK_SIZE, &mut data);
        Packet {
            id: sequence_id(index),
            data,
        }
    }

    pub fn crc(&self) -> u16 {
        crc16_xmodem(&self.data)
    }

    pub fn encode(&self) -> [u8; XMODEM_PACKET_SIZE] {
        let mut out = [0u8; XMODEM_PACKET_SIZE];
        out[0] = SOH;
        out[1] = self.id;
        out[2] = 0xFF - self.id;
        out[3..3 + XMODEM_BLOCK_SIZE].copy_from_slice(&self.data);
        let [hi, lo] = self.crc().to_be_bytes();
        out[XMODEM_PACKET_SIZE - 2] = hi;
        out[XMODEM_PACKET_SIZE - 1] = lo;
        out
    }

    /// Check a received packet against `expected_id` and decode it.
    ///
    /// Checks run in wire order: length, preamble, id, complement, CRC.
    pub fn verify(bytes: &[u8], expected_id: u8) -> Result<Packet, PacketError> {
        if bytes.len() != XMODEM_PACKET_SIZE {
            return Err(PacketError::Length(bytes.len()));
        }
        if bytes[0] != SOH {
            return Err(PacketError::Preamble(bytes[0]));
        }
        let id = bytes[1];
        if id != expected_id {
            return Err(PacketError::Sequence { expected: expected_id, found: id });
        }
        if bytes[2] != 0xFF - id {
            return Err(PacketError::Complement);
        }

        let packet = Packet::new(id, &bytes[3..3 + XMODEM_BLOCK_SIZE]);
        let received = u16::from_be_bytes([bytes[XMODEM_PACKET_SIZE - 2], bytes[XMODEM_PACKET_SIZE - 1]]);
        let computed = packet.crc();
        if received != computed {
            return Err(PacketError::Crc { received, computed });
        }
        Ok(packet)
    }
}

/// Sequence id of block `index` (0-based).
pub fn sequence_id(index: usize) -> u8 {
    (index.wrapping_add(1) & 0xFF) as u8
}
