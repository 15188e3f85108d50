//! Linear-phase FIR filtering in place.
//!
//! Both designs are 51-tap Hamming-windowed sinc filters with cutoffs given
//! as fractions of the sampling rate, so they track whatever rate the
//! signal was generated at.
//!
//! | Filter | Passband | DC gain |
//! |--------|----------|---------|
//! | [`LOWPASS_TAPS`] | `0 … 0.05·fs` | 1.0 |
//! | [`BANDPASS_TAPS`] | `0.05·fs … 0.15·fs` (unity at `0.1·fs`) | ≈ -0.0035 |

use crate::constants::MAX_FIR_TAPS;

pub const FIR_TAP_COUNT: usize = 51;

const _: () = assert!(FIR_TAP_COUNT <= MAX_FIR_TAPS);

/// Low-pass, cutoff `0.05·fs`, normalized to unity DC gain.
pub static LOWPASS_TAPS: [f32; FIR_TAP_COUNT] = [
    0.0010160234, 0.0010521958, 0.0010548568, 0.0009526654, 0.0006396123,
    0.0, -0.0010569296, -0.0025586955, -0.0044350616, -0.0064949699,
    -0.0084213983, -0.0097881564, -0.0100992192, -0.0088473784, -0.0055853871,
    0.0, 0.0080220963, 0.0183472206, 0.0305752787, 0.0440532964,
    0.0579227190, 0.0711964426, 0.0828570731, 0.0919645190, 0.0977592660,
    0.0997478615, 0.0977592660, 0.0919645190, 0.0828570731, 0.0711964426,
    0.0579227190, 0.0440532964, 0.0305752787, 0.0183472206, 0.0080220963,
    0.0, -0.0055853871, -0.0088473784, -0.0100992192, -0.0097881564,
    -0.0084213983, -0.0064949699, -0.0044350616, -0.0025586955, -0.0010569296,
    0.0, 0.0006396123, 0.0009526654, 0.0010548568, 0.0010521958,
    0.0010160234,
];

/// Band-pass `0.05·fs … 0.15·fs`, normalized to unity gain at `0.1·fs`.
pub static BANDPASS_TAPS: [f32; FIR_TAP_COUNT] = [
    -0.0020300922, -0.0017008510, -0.0006513103, 0.0005882133, 0.0010339191,
    0.0, -0.0017085032, -0.0015798397, 0.0027383824, 0.0104989740,
    0.0168265965, 0.0158223365, 0.0062356572, -0.0054627213, -0.0090286537,
    0.0, 0.0129675398, 0.0113282994, -0.0188783859, -0.0712111711,
    -0.1157340131, -0.1150874616, -0.0511592330, 0.0567825302, 0.1580256732,
    0.1993038400, 0.1580256732, 0.0567825302, -0.0511592330, -0.1150874616,
    -0.1157340131, -0.0712111711, -0.0188783859, 0.0113282994, 0.0129675398,
    0.0, -0.0090286537, -0.0054627213, 0.0062356572, 0.0158223365,
    0.0168265965, 0.0104989740, 0.0027383824, -0.0015798397, -0.0017085032,
    0.0, 0.0010339191, 0.0005882133, -0.0006513103, -0.0017008510,
    -0.0020300922,
];

/// Direct-form FIR over borrowed coefficients.
#[derive(Debug, Clone, Copy)]
pub struct FirFilter<'a> {
    taps: &'a [f32],
}

impl<'a> FirFilter<'a> {
    pub const fn new(taps: &'a [f32]) -> Self {
        FirFilter { taps }
    }

    pub fn taps(&self) -> &'a [f32] {
        self.taps
    }

    /// Gain at 0 Hz (sum of the coefficients).
    pub fn dc_gain(&self) -> f32 {
        self.taps.iter().sum()
    }

    /// Filter `block` in place with zero initial state.
    ///
    /// `y[n] = Σ_k h[k] · x[n − k]`. Outputs are produced from the last
    /// index down, so every input a sample needs is still unmodified.
    pub fn apply_in_place(&self, block: &mut [f32]) {
        for n in (0..block.len()).rev() {
            let mut acc = 0.0f32;
            for (k, &h) in self.taps.iter().enumerate().take(n + 1) {
                acc += h * block[n - k];
            }
            block[n] = acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        libm::fabsf(a - b) < tol
    }

    #[test]
    fn designs_are_symmetric() {
        for taps in [&LOWPASS_TAPS, &BANDPASS_TAPS] {
            for k in 0..FIR_TAP_COUNT {
                assert_eq!(taps[k], taps[FIR_TAP_COUNT - 1 - k]);
            }
        }
    }

    #[test]
    fn dc_gains() {
        assert!(close(FirFilter::new(&LOWPASS_TAPS).dc_gain(), 1.0, 1e-5));
        assert!(close(FirFilter::new(&BANDPASS_TAPS).dc_gain(), -0.0035, 1e-3));
    }

    #[test]
    fn impulse_response_is_the_taps() {
        let mut block = [0.0f32; 64];
        block[0] = 1.0;
        FirFilter::new(&LOWPASS_TAPS).apply_in_place(&mut block);
        assert_eq!(&block[..FIR_TAP_COUNT], &LOWPASS_TAPS[..]);
        assert!(block[FIR_TAP_COUNT..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn step_settles_to_dc_gain() {
        let mut block = [1.0f32; 128];
        FirFilter::new(&LOWPASS_TAPS).apply_in_place(&mut block);
        // Zero initial state: the first output only sees h[0]
        assert_eq!(block[0], LOWPASS_TAPS[0]);
        assert!(close(block[127], 1.0, 1e-5));
    }

    #[test]
    fn lowpass_rejects_high_tone() {
        // Tone at 0.25·fs, well inside the stopband
        let mut block = [0.0f32; 256];
        for (n, v) in block.iter_mut().enumerate() {
            *v = libm::sinf(core::f32::consts::FRAC_PI_2 * n as f32);
        }
        FirFilter::new(&LOWPASS_TAPS).apply_in_place(&mut block);
        let peak = block[FIR_TAP_COUNT..].iter().fold(0.0f32, |m, &v| m.max(libm::fabsf(v)));
        assert!(peak < 0.01, "peak {}", peak);
    }

    #[test]
    fn bandpass_keeps_center_tone() {
        // Tone at 0.1·fs
        let mut block = [0.0f32; 256];
        for (n, v) in block.iter_mut().enumerate() {
            *v = libm::sinf(2.0 * core::f32::consts::PI * 0.1 * n as f32);
        }
        FirFilter::new(&BANDPASS_TAPS).apply_in_place(&mut block);
        // 20 full periods after the transient; a unit sine has mean square 0.5
        let settled = &block[56..];
        let power = settled.iter().map(|v| v * v).sum::<f32>() / settled.len() as f32;
        assert!(close(power, 0.5, 0.02), "power {}", power);
    }
}
