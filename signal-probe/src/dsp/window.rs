//! Centering, normalization and the Blackman window.

use crate::constants::{ADC_MIDPOINT, ADC_MAX_CODE};

use super::helpers::{offset, scale};

/// Nominal midpoint and half-scale of a signal domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub midpoint: f32,
    pub half_scale: f32,
}

impl Normalization {
    /// 12-bit converter codes: `(2048, 2047)`.
    pub const ADC_CODES: Normalization = Normalization {
        midpoint: ADC_MIDPOINT,
        half_scale: ADC_MAX_CODE as f32 - ADC_MIDPOINT,
    };

    /// Millivolts around `dc_offset`, half-scale `vref / 2`.
    pub fn millivolts(dc_offset_mv: u16, vref_mv: u16) -> Self {
        Normalization {
            midpoint: dc_offset_mv as f32,
            half_scale: vref_mv as f32 / 2.0,
        }
    }

    /// Same domain after a filter with DC gain `gain`.
    pub fn with_dc_gain(self, gain: f32) -> Self {
        Normalization { midpoint: self.midpoint * gain, ..self }
    }
}

/// Subtract the midpoint and divide by the half-scale, giving roughly
/// `[-1, 1]`. A zero half-scale only removes the midpoint.
pub fn center_and_normalize(block: &mut [f32], norm: Normalization) {
    offset(block, -norm.midpoint);
    if norm.half_scale != 0.0 {
        scale(block, 1.0 / norm.half_scale);
    }
}

/// Blackman window coefficient `n` of `len`.
///
/// `w(n) = 0.42 − 0.5·cos(2πn/(N−1)) + 0.08·cos(4πn/(N−1))`
pub fn blackman(n: usize, len: usize) -> f32 {
    if len < 2 {
        return 1.0;
    }
    let x = n as f32 / (len - 1) as f32;
    let two_pi = 2.0 * core::f32::consts::PI;
    0.42 - 0.5 * libm::cosf(two_pi * x) + 0.08 * libm::cosf(2.0 * two_pi * x)
}

/// Multiply `block` by a Blackman window of the same length.
pub fn apply_blackman(block: &mut [f32]) {
    let len = block.len();
    for (n, sample) in block.iter_mut().enumerate() {
        *sample *= blackman(n, len);
    }
}
