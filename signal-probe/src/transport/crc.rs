//! Checksums used on the wire.
//!
//! | Use | Algorithm | Parameters |
//! |-----|-----------|------------|
//! | Binary payload | CRC-32/ISO-HDLC | reflected 0xEDB88320, init and xorout 0xFFFFFFFF |
//! | Block-transfer packet | CRC-16/XMODEM | poly 0x1021, init 0, MSB first, no xorout |

use core::convert::Infallible;

use crc::{Crc, CRC_16_XMODEM, CRC_32_ISO_HDLC};

use crate::dsp::Samples;

pub const PAYLOAD_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);
pub const BLOCK_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

pub fn crc32(bytes: &[u8]) -> u32 {
    PAYLOAD_CRC.checksum(bytes)
}

/// CRC-32 of the little-endian byte image of `samples`, exactly as the
/// binary payload puts it on the wire.
pub fn samples_crc32(samples: &Samples<'_>) -> u32 {
    let mut digest = PAYLOAD_CRC.digest();
    let _ = samples.for_each_le_bytes::<Infallible>(|bytes| {
        digest.update(bytes);
        Ok(())
    });
    digest.finalize()
}

pub fn crc16_xmodem(bytes: &[u8]) -> u16 {
    BLOCK_CRC.checksum(bytes)
}
