//! Multi-tone test signal synthesis.
//!
//! A composite signal is a DC offset plus a sum of sine tones, expressed in
//! millivolts and optionally quantized to converter codes:
//!
//! ```text
//! v[n] = dc + Σ_k amp_k · sin(2π · f_k · n / fs)        (mV)
//! code[n] = round(clamp(v[n], 0, vref) / vref · adc_max)
//! ```
//!
//! | Path | Module | Arithmetic | Output |
//! |------|--------|------------|--------|
//! | Floating | [`float`] | `f32`, `libm` or wavetable sine | mV (`f32`) or codes (`u16`) |
//! | Fixed | [`fixed`] | Q15 wavetable, 16-bit phase accumulators | codes (`u16`) |
//!
//! Both paths are deterministic: identical tones, parameters and noise seed
//! always produce identical samples.

pub mod fixed;
pub mod float;

use heapless::Vec;

use crate::constants::{ADC_MAX_CODE, DEFAULT_DC_OFFSET_MV, DEFAULT_VREF_MV, MAX_TONES};

pub use float::Noise;

/// Frequencies (Hz) and amplitudes (mV) of the tones in one signal.
///
/// Both lists always have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToneSet {
    freqs: Vec<u32, MAX_TONES>,
    amps: Vec<u16, MAX_TONES>,
}

impl ToneSet {
    pub const fn new() -> Self {
        ToneSet {
            freqs: Vec::new(),
            amps: Vec::new(),
        }
    }

    /// Pair up two lists, keeping the first `min(len)` entries of each.
    pub fn from_slices(freqs: &[u32], amps: &[u16]) -> Self {
        let mut tones = ToneSet::new();
        for (&f, &a) in freqs.iter().zip(amps.iter()) {
            if !tones.push(f, a) {
                break;
            }
        }
        tones
    }

    /// Add one tone. Returns `false` when [`MAX_TONES`] are already present.
    pub fn push(&mut self, freq_hz: u32, amp_mv: u16) -> bool {
        if self.freqs.is_full() {
            return false;
        }
        // Both lists have the same length, so neither push can fail
        let _ = self.freqs.push(freq_hz);
        let _ = self.amps.push(amp_mv);
        true
    }

    /// Keep only the first `len` tones.
    pub fn truncate(&mut self, len: usize) {
        self.freqs.truncate(len);
        self.amps.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    pub fn freqs(&self) -> &[u32] {
        &self.freqs
    }

    pub fn amps(&self) -> &[u16] {
        &self.amps
    }

    /// `(frequency, amplitude)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16)> + '_ {
        self.freqs.iter().copied().zip(self.amps.iter().copied())
    }
}

/// Electrical parameters of the simulated acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthParams {
    pub sampling_rate: u32,
    /// Offset added to every sample, in mV.
    pub dc_offset_mv: u16,
    /// Full-scale voltage, in mV. Output is clamped to `[0, vref]`.
    pub vref_mv: u16,
    /// Code produced at `vref`.
    pub adc_max: u16,
}

impl SynthParams {
    /// Default front end (1.65 V offset, 3.3 V reference, 12-bit codes).
    pub const fn with_rate(sampling_rate: u32) -> Self {
        SynthParams {
            sampling_rate,
            dc_offset_mv: DEFAULT_DC_OFFSET_MV,
            vref_mv: DEFAULT_VREF_MV,
            adc_max: ADC_MAX_CODE,
        }
    }
}

/// How the floating path evaluates `sin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SineMethod {
    /// `libm::sinf`.
    #[default]
    Libm,
    /// Interpolated lookup in the Q15 wavetable.
    Table,
}
