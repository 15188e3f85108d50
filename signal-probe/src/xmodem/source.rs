//! Byte images handed to the transmitter.

/// Random-access byte image of the data being transferred.
pub trait BlockSource {
    /// Total number of bytes.
    fn byte_len(&self) -> usize;

    /// Copy bytes starting at `offset` into the front of `out`.
    ///
    /// Returns how many bytes were copied; fewer than `out.len()` at the end
    /// of the image, zero past it.
    fn read_at(&self, offset: usize, out: &mut [u8]) -> usize;
}

impl BlockSource for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn read_at(&self, offset: usize, out: &mut [u8]) -> usize {
        let Some(rest) = self.get(offset..) else {
            return 0;
        };
        let n = rest.len().min(out.len());
        out[..n].copy_from_slice(&rest[..n]);
        n
    }
}

/// 16-bit samples sent as little-endian byte pairs.
#[derive(Debug, Clone, Copy)]
pub struct U16Le<'a>(pub &'a [u16]);

impl BlockSource for U16Le<'_> {
    fn byte_len(&self) -> usize {
        self.0.len() * 2
    }

    fn read_at(&self, offset: usize, out: &mut [u8]) -> usize {
        let total = self.byte_len();
        if offset >= total {
            return 0;
        }
        let n = (total - offset).min(out.len());
        for (i, byte) in out[..n].iter_mut().enumerate() {
            let pos = offset + i;
            let [lo, hi] = self.0[pos / 2].to_le_bytes();
            *byte = if pos % 2 == 0 { lo } else { hi };
        }
        n
    }
}
