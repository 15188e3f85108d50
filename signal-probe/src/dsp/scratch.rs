//! Shared sample memory with an explicit active representation.
//!
//! One command at a time owns the [`Scratch`] buffer (the instrument lends it
//! out through `&mut`). The buffer keeps one strongly-typed array per sample
//! format and a tag saying which one currently holds the signal. Typed access
//! to any other array fails with [`ScratchError::WrongRepresentation`], so a
//! stage can never read float data as codes by accident.
//!
//! ## Conversions
//!
//! | From → To | Rule |
//! |-----------|------|
//! | `u16` → `f32` | exact |
//! | `Q15` → `f32` | `q / 32768` |
//! | `f32` → `u16` | round to nearest, saturate to `0..=65535` |
//! | `f32` → `Q15` | `round(x · 32768)`, saturate |
//! | `u16` ↔ `Q15` | through the `f32` value |
//!
//! [`convert`](Scratch::convert) moves the signal and the tag.
//! [`view_as`](Scratch::view_as) renders a read-only copy into the target
//! array and leaves the active signal untouched, for sending one signal in a
//! requested wire format while later stages keep working on it.

use crate::constants::MAX_SIG_LEN;
use crate::error::ScratchError;

use super::helpers::{f32_to_q15, f32_to_u16, q15_to_f32};

/// Sample format held by the scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Representation {
    F32,
    U16,
    Q15,
}

impl Representation {
    /// Size of one sample in bytes.
    pub const fn sample_size(self) -> usize {
        match self {
            Representation::F32 => 4,
            Representation::U16 | Representation::Q15 => 2,
        }
    }
}

/// Borrowed samples in one representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Samples<'a> {
    F32(&'a [f32]),
    U16(&'a [u16]),
    Q15(&'a [i16]),
}

impl Samples<'_> {
    pub fn len(&self) -> usize {
        match self {
            Samples::F32(s) => s.len(),
            Samples::U16(s) => s.len(),
            Samples::Q15(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn representation(&self) -> Representation {
        match self {
            Samples::F32(_) => Representation::F32,
            Samples::U16(_) => Representation::U16,
            Samples::Q15(_) => Representation::Q15,
        }
    }

    /// Payload size on the wire.
    pub fn byte_len(&self) -> usize {
        self.len() * self.representation().sample_size()
    }

    /// Call `f` with each sample's little-endian bytes, in order.
    pub fn for_each_le_bytes<E>(
        &self,
        mut f: impl FnMut(&[u8]) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Samples::F32(s) => s.iter().try_for_each(|v| f(&v.to_le_bytes())),
            Samples::U16(s) => s.iter().try_for_each(|v| f(&v.to_le_bytes())),
            Samples::Q15(s) => s.iter().try_for_each(|v| f(&v.to_le_bytes())),
        }
    }
}

/// Process-wide sample memory, lent to one command at a time.
pub struct Scratch {
    f32_buf: [f32; MAX_SIG_LEN],
    u16_buf: [u16; MAX_SIG_LEN],
    q15_buf: [i16; MAX_SIG_LEN],
    /// Secondary float area (FFT magnitudes); not covered by the tag.
    work: [f32; MAX_SIG_LEN],
    active: Representation,
    len: usize,
}

impl Scratch {
    /// Empty buffer tagged `F32`. Usable in `static` initializers.
    pub const fn new() -> Self {
        Scratch {
            f32_buf: [0.0; MAX_SIG_LEN],
            u16_buf: [0; MAX_SIG_LEN],
            q15_buf: [0; MAX_SIG_LEN],
            work: [0.0; MAX_SIG_LEN],
            active: Representation::F32,
            len: 0,
        }
    }

    /// Claim the buffer for a new signal of `len` samples in `repr`.
    pub fn begin(&mut self, repr: Representation, len: usize) -> Result<(), ScratchError> {
        if len > MAX_SIG_LEN {
            return Err(ScratchError::TooLong);
        }
        self.active = repr;
        self.len = len;
        Ok(())
    }

    pub fn representation(&self) -> Representation {
        self.active
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shrink the active signal to its first `len` samples.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    pub fn as_f32(&self) -> Result<&[f32], ScratchError> {
        self.expect(Representation::F32)?;
        Ok(&self.f32_buf[..self.len])
    }

    pub fn as_f32_mut(&mut self) -> Result<&mut [f32], ScratchError> {
        self.expect(Representation::F32)?;
        Ok(&mut self.f32_buf[..self.len])
    }

    pub fn as_u16(&self) -> Result<&[u16], ScratchError> {
        self.expect(Representation::U16)?;
        Ok(&self.u16_buf[..self.len])
    }

    pub fn as_u16_mut(&mut self) -> Result<&mut [u16], ScratchError> {
        self.expect(Representation::U16)?;
        Ok(&mut self.u16_buf[..self.len])
    }

    pub fn as_q15(&self) -> Result<&[i16], ScratchError> {
        self.expect(Representation::Q15)?;
        Ok(&self.q15_buf[..self.len])
    }

    pub fn as_q15_mut(&mut self) -> Result<&mut [i16], ScratchError> {
        self.expect(Representation::Q15)?;
        Ok(&mut self.q15_buf[..self.len])
    }

    /// Active float signal together with the work area.
    pub fn f32_with_work(&mut self) -> Result<(&mut [f32], &mut [f32]), ScratchError> {
        self.expect(Representation::F32)?;
        Ok((&mut self.f32_buf[..self.len], &mut self.work[..]))
    }

    /// Copy the first `len` values of the work area over the active float
    /// signal and make that the new length.
    pub fn load_from_work(&mut self, len: usize) -> Result<(), ScratchError> {
        self.expect(Representation::F32)?;
        if len > MAX_SIG_LEN {
            return Err(ScratchError::TooLong);
        }
        self.f32_buf[..len].copy_from_slice(&self.work[..len]);
        self.len = len;
        Ok(())
    }

    /// The active signal.
    pub fn samples(&self) -> Samples<'_> {
        match self.active {
            Representation::F32 => Samples::F32(&self.f32_buf[..self.len]),
            Representation::U16 => Samples::U16(&self.u16_buf[..self.len]),
            Representation::Q15 => Samples::Q15(&self.q15_buf[..self.len]),
        }
    }

    /// Convert the active signal to `target` and make it active.
    pub fn convert(&mut self, target: Representation) {
        self.render(target);
        self.active = target;
    }

    /// Render the active signal as `target` without changing the active
    /// representation.
    pub fn view_as(&mut self, target: Representation) -> Samples<'_> {
        self.render(target);
        match target {
            Representation::F32 => Samples::F32(&self.f32_buf[..self.len]),
            Representation::U16 => Samples::U16(&self.u16_buf[..self.len]),
            Representation::Q15 => Samples::Q15(&self.q15_buf[..self.len]),
        }
    }

    fn render(&mut self, target: Representation) {
        let n = self.len;
        let (f, u, q) = (&mut self.f32_buf[..n], &mut self.u16_buf[..n], &mut self.q15_buf[..n]);
        match (self.active, target) {
            (Representation::U16, Representation::F32) => {
                for (d, &s) in f.iter_mut().zip(u.iter()) {
                    *d = s as f32;
                }
            }
            (Representation::Q15, Representation::F32) => {
                for (d, &s) in f.iter_mut().zip(q.iter()) {
                    *d = q15_to_f32(s);
                }
            }
            (Representation::F32, Representation::U16) => {
                for (d, &s) in u.iter_mut().zip(f.iter()) {
                    *d = f32_to_u16(s);
                }
            }
            (Representation::F32, Representation::Q15) => {
                for (d, &s) in q.iter_mut().zip(f.iter()) {
                    *d = f32_to_q15(s);
                }
            }
            (Representation::U16, Representation::Q15) => {
                for (d, &s) in q.iter_mut().zip(u.iter()) {
                    *d = f32_to_q15(s as f32);
                }
            }
            (Representation::Q15, Representation::U16) => {
                for (d, &s) in u.iter_mut().zip(q.iter()) {
                    *d = f32_to_u16(q15_to_f32(s));
                }
            }
            (Representation::F32, Representation::F32)
            | (Representation::U16, Representation::U16)
            | (Representation::Q15, Representation::Q15) => {}
        }
    }

    fn expect(&self, repr: Representation) -> Result<(), ScratchError> {
        if self.active == repr {
            Ok(())
        } else {
            Err(ScratchError::WrongRepresentation)
        }
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;

    use super::*;

    fn scratch() -> Box<Scratch> {
        Box::new(Scratch::new())
    }

    #[test]
    fn typed_access_follows_tag() {
        let mut s = scratch();
        s.begin(Representation::U16, 4).unwrap();
        assert_eq!(s.as_u16().unwrap().len(), 4);
        assert_eq!(s.as_f32().err(), Some(ScratchError::WrongRepresentation));
        assert_eq!(s.as_q15_mut().err(), Some(ScratchError::WrongRepresentation));
        assert_eq!(s.f32_with_work().err(), Some(ScratchError::WrongRepresentation));
    }

    #[test]
    fn begin_rejects_oversized_signal() {
        let mut s = scratch();
        assert_eq!(s.begin(Representation::F32, MAX_SIG_LEN + 1), Err(ScratchError::TooLong));
        assert!(s.begin(Representation::F32, MAX_SIG_LEN).is_ok());
    }

    #[test]
    fn codes_convert_to_float() {
        let mut s = scratch();
        s.begin(Representation::U16, 3).unwrap();
        s.as_u16_mut().unwrap().copy_from_slice(&[0, 2048, 4095]);
        s.convert(Representation::F32);
        assert_eq!(s.representation(), Representation::F32);
        assert_eq!(s.as_f32().unwrap(), &[0.0, 2048.0, 4095.0]);
    }

    #[test]
    fn float_converts_to_q15_with_saturation() {
        let mut s = scratch();
        s.begin(Representation::F32, 4).unwrap();
        s.as_f32_mut().unwrap().copy_from_slice(&[0.5, -0.25, 1.5, -2.0]);
        s.convert(Representation::Q15);
        assert_eq!(s.as_q15().unwrap(), &[16384, -8192, 32767, -32768]);
        assert_eq!(s.samples().byte_len(), 8);
    }

    #[test]
    fn view_leaves_active_signal_alone() {
        let mut s = scratch();
        s.begin(Representation::F32, 3).unwrap();
        s.as_f32_mut().unwrap().copy_from_slice(&[1.4, 1.6, -3.0]);

        match s.view_as(Representation::U16) {
            Samples::U16(codes) => assert_eq!(codes, &[1, 2, 0]),
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(s.representation(), Representation::F32);
        assert_eq!(s.as_f32().unwrap(), &[1.4, 1.6, -3.0]);
    }

    #[test]
    fn work_area_round_trip() {
        let mut s = scratch();
        s.begin(Representation::F32, 8).unwrap();
        {
            let (signal, work) = s.f32_with_work().unwrap();
            for (i, w) in work.iter_mut().take(4).enumerate() {
                *w = signal[i] + i as f32;
            }
        }
        s.load_from_work(4).unwrap();
        assert_eq!(s.as_f32().unwrap(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn samples_little_endian_bytes() {
        let mut s = scratch();
        s.begin(Representation::U16, 2).unwrap();
        s.as_u16_mut().unwrap().copy_from_slice(&[0x0102, 0xA0B0]);

        let mut bytes = std::vec::Vec::new();
        s.samples()
            .for_each_le_bytes(|chunk| {
                bytes.extend_from_slice(chunk);
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(bytes, [0x02, 0x01, 0xB0, 0xA0]);
    }
}
