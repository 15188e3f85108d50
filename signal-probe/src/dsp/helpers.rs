//! Block-level `f32` helpers and sample-format conversions.

use super::intrinsics::{saturate16, saturate_u16};

/// Add `k` to every sample.
pub fn offset(block: &mut [f32], k: f32) {
    for sample in block.iter_mut() {
        *sample += k;
    }
}

/// Multiply every sample by `k`.
pub fn scale(block: &mut [f32], k: f32) {
    for sample in block.iter_mut() {
        *sample *= k;
    }
}

/// Convert a fraction in `[-1, 1)` to Q15, rounding to nearest and saturating.
#[inline(always)]
pub fn f32_to_q15(x: f32) -> i16 {
    // Float-to-int casts saturate, so huge inputs stay in i32 range
    saturate16(libm::roundf(x * 32768.0) as i32)
}

#[inline(always)]
pub fn q15_to_f32(q: i16) -> f32 {
    q as f32 / 32768.0
}

/// Round to the nearest integer code, saturating to `0..=65535`.
#[inline(always)]
pub fn f32_to_u16(x: f32) -> u16 {
    saturate_u16(libm::roundf(x) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_scale() {
        let mut block = [2048.0f32, 4095.0, 1.0];
        offset(&mut block, -2048.0);
        scale(&mut block, 1.0 / 2047.0);
        assert_eq!(block[0], 0.0);
        assert!(libm::fabsf(block[1] - 1.0) < 1e-6);
        assert!(libm::fabsf(block[2] + 1.0) < 1e-6);
    }

    #[test]
    fn test_f32_to_q15() {
        assert_eq!(f32_to_q15(0.0), 0);
        assert_eq!(f32_to_q15(0.5), 16384);
        assert_eq!(f32_to_q15(-1.0), -32768);
        assert_eq!(f32_to_q15(1.0), 32767); // saturates
        assert_eq!(f32_to_q15(-3.0), -32768);
        assert_eq!(f32_to_q15(1e20), 32767);
    }

    #[test]
    fn test_q15_to_f32() {
        assert_eq!(q15_to_f32(16384), 0.5);
        assert_eq!(q15_to_f32(-32768), -1.0);
    }

    #[test]
    fn test_f32_to_u16() {
        assert_eq!(f32_to_u16(2047.5), 2048);
        assert_eq!(f32_to_u16(2047.4), 2047);
        assert_eq!(f32_to_u16(-12.0), 0);
        assert_eq!(f32_to_u16(70000.0), 65535);
    }
}
