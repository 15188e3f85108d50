//! Real FFT and scaled magnitude spectrum.
//!
//! Transforms run in place through `microfft`, which needs a fixed-size array
//! per length. [`rfft_in_place`] dispatches a runtime length to the matching
//! `rfft_N`. Only powers of two from [`MIN_FFT_LEN`] to [`MAX_FFT_LEN`] are
//! accepted; [`supported_fft_length`] picks the largest one that fits.

use microfft::Complex32;

use crate::constants::{BLACKMAN_COHERENT_GAIN, MAX_FFT_LEN, MIN_FFT_LEN};
use crate::error::FftError;

/// Largest supported length not above `requested` (never below 16).
pub fn supported_fft_length(requested: usize) -> usize {
    if requested < MIN_FFT_LEN {
        return MIN_FFT_LEN;
    }
    let mut len = MIN_FFT_LEN;
    while len * 2 <= requested && len < MAX_FFT_LEN {
        len *= 2;
    }
    len
}

pub fn is_supported_fft_length(len: usize) -> bool {
    len.is_power_of_two() && (MIN_FFT_LEN..=MAX_FFT_LEN).contains(&len)
}

macro_rules! dispatch_rfft {
    ($buf:ident, $($len:literal => $func:ident),+ $(,)?) => {
        match $buf.len() {
            $(
                $len => {
                    let array: &mut [f32; $len] = $buf
                        .try_into()
                        .map_err(|_| FftError::UnsupportedLength($len))?;
                    Ok(&mut microfft::real::$func(array)[..])
                }
            )+
            other => Err(FftError::UnsupportedLength(other)),
        }
    };
}

/// Forward real FFT of `buf`, returning `N / 2` complex bins that alias the
/// input storage.
///
/// Bin 0 carries the DC term in `re` and the Nyquist term in `im`.
pub fn rfft_in_place(buf: &mut [f32]) -> Result<&mut [Complex32], FftError> {
    dispatch_rfft!(buf,
        16 => rfft_16,
        32 => rfft_32,
        64 => rfft_64,
        128 => rfft_128,
        256 => rfft_256,
        512 => rfft_512,
        1024 => rfft_1024,
        2048 => rfft_2048,
        4096 => rfft_4096,
    )
}

/// Transform `buf` and write `N / 2` magnitudes into `out`.
///
/// Magnitudes are scaled by `(1 / 0.42) / (N / 4)` to undo the Blackman
/// coherent gain and the transform size; the packed Nyquist term is dropped
/// from bin 0. `buf` is clobbered. Returns the number of magnitudes written.
pub fn magnitude_spectrum(buf: &mut [f32], out: &mut [f32]) -> Result<usize, FftError> {
    let len = buf.len();
    if out.len() < len / 2 {
        return Err(FftError::OutputTooShort);
    }

    let spectrum = rfft_in_place(buf)?;
    spectrum[0].im = 0.0;

    let gain = (1.0 / BLACKMAN_COHERENT_GAIN) / (len / 4) as f32;
    for (mag, bin) in out.iter_mut().zip(spectrum.iter()) {
        *mag = libm::sqrtf(bin.norm_sqr()) * gain;
    }
    Ok(len / 2)
}
