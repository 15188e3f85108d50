//! Fixed-point composite synthesis with per-tone phase accumulators.
//!
//! One period is 2^16 phase steps. Each tone advances by
//! `(freq << 16) / fs` (truncated) per sample and reads the Q15 wavetable
//! with linear interpolation. Sample 0 is evaluated at phase 0.

use super::{SynthParams, ToneSet};
use crate::constants::MAX_TONES;
use crate::dsp::wavetables::sine_q15;

/// Per-tone oscillator state.
#[derive(Debug, Clone, Copy, Default)]
struct Oscillator {
    phase: u16,
    increment: u16,
    amp_mv: i32,
}

/// Phase increment for `freq_hz` at `sampling_rate`, truncated to 16 bits.
///
/// Frequencies at or above the sampling rate alias.
pub fn phase_increment(freq_hz: u32, sampling_rate: u32) -> u16 {
    (((freq_hz as u64) << 16).checked_div(sampling_rate as u64).unwrap_or(0)) as u16
}

/// Fill `out` with converter codes using integer arithmetic only.
///
/// Each sample is `dc + Σ (sin_q15 · amp) >> 15` in mV, clamped to
/// `[0, vref]` and rescaled with rounding to `[0, adc_max]`.
pub fn generate_codes(tones: &ToneSet, params: &SynthParams, out: &mut [u16]) {
    let mut oscillators = [Oscillator::default(); MAX_TONES];
    let count = tones.len().min(MAX_TONES);
    for (osc, (freq, amp)) in oscillators.iter_mut().zip(tones.iter()) {
        osc.increment = phase_increment(freq, params.sampling_rate);
        osc.amp_mv = amp as i32;
    }
    let oscillators = &mut oscillators[..count];

    let vref = params.vref_mv as u32;
    let adc_max = params.adc_max as u32;

    for code in out.iter_mut() {
        let mut sum_mv = params.dc_offset_mv as i32;
        for osc in oscillators.iter_mut() {
            sum_mv += (sine_q15(osc.phase) as i32 * osc.amp_mv) >> 15;
            osc.phase = osc.phase.wrapping_add(osc.increment);
        }

        let clamped = sum_mv.clamp(0, vref as i32) as u32;
        *code = match vref {
            0 => 0,
            _ => ((clamped * adc_max + vref / 2) / vref) as u16,
        };
    }
}
