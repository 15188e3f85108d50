//! Floating-point composite synthesis.
//!
//! Each tone's phase is computed from the sample index rather than
//! accumulated, using exact integer arithmetic for the cycle fraction
//! `(f · n mod fs) / fs`. Long buffers therefore do not drift.

use nanorand::{Rng, WyRand};

use super::{SineMethod, SynthParams, ToneSet};
use crate::dsp::wavetables::sine_f32;

/// Seeded uniform noise in `[-amplitude, +amplitude]` mV.
pub struct Noise {
    rng: WyRand,
    amplitude_mv: f32,
}

impl Noise {
    pub fn new(seed: u64, amplitude_mv: f32) -> Self {
        Noise {
            rng: WyRand::new_seed(seed),
            amplitude_mv,
        }
    }

    /// Next noise value in mV.
    pub fn sample(&mut self) -> f32 {
        let raw = self.rng.generate::<u32>();
        let unit = (raw & 0xFFFF) as f32 / 32768.0 - 1.0;
        unit * self.amplitude_mv
    }
}

/// Fill `out` with the composite signal in millivolts.
///
/// Values are clamped to `[0, vref]` after noise is added.
pub fn generate_millivolts(
    tones: &ToneSet,
    params: &SynthParams,
    method: SineMethod,
    mut noise: Option<&mut Noise>,
    out: &mut [f32],
) {
    let vref = params.vref_mv as f32;
    for (n, sample) in out.iter_mut().enumerate() {
        let mut v = composite_mv(tones, params, method, n as u64);
        if let Some(noise) = noise.as_deref_mut() {
            v += noise.sample();
        }
        *sample = v.clamp(0.0, vref);
    }
}

/// Fill `out` with converter codes `round(v / vref · adc_max)`.
///
/// Codes are never noisy.
pub fn generate_codes(tones: &ToneSet, params: &SynthParams, method: SineMethod, out: &mut [u16]) {
    let vref = params.vref_mv as f32;
    let adc_max = params.adc_max as f32;
    for (n, code) in out.iter_mut().enumerate() {
        if params.vref_mv == 0 {
            *code = 0;
            continue;
        }
        let v = composite_mv(tones, params, method, n as u64).clamp(0.0, vref);
        let scaled = (v / vref * adc_max + 0.5) as u32;
        *code = scaled.min(params.adc_max as u32) as u16;
    }
}

/// Unclamped sample `n` in mV.
fn composite_mv(tones: &ToneSet, params: &SynthParams, method: SineMethod, n: u64) -> f32 {
    let mut sum = params.dc_offset_mv as f32;
    let fs = params.sampling_rate as u64;
    if fs == 0 {
        return sum;
    }

    for (freq, amp) in tones.iter() {
        // Position inside the current cycle, as a fraction num / fs
        let num = (freq as u64 * n) % fs;
        let s = match method {
            SineMethod::Libm => {
                let angle = 2.0 * core::f32::consts::PI * (num as f32 / fs as f32);
                libm::sinf(angle)
            }
            SineMethod::Table => sine_f32(((num << 32) / fs) as u32),
        };
        sum += amp as f32 * s;
    }
    sum
}
