//! ARM saturation instructions with pure-Rust fallbacks.
//!
//! On `thumbv7em` targets (Cortex-M4/M7 with DSP extension), these compile to
//! single-cycle `SSAT`/`USAT`. On other targets (host tests, Cortex-M0),
//! equivalent pure-Rust implementations are used.

/// Saturate an `i32` to `i16` range (`-32768..=32767`).
///
/// Maps to ARM `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        if val > 32767 {
            32767
        } else if val < -32768 {
            -32768
        } else {
            val as i16
        }
    }
}

/// Saturate an `i32` to `u16` range (`0..=65535`).
///
/// Maps to ARM `USAT #16`.
#[inline(always)]
pub fn saturate_u16(val: i32) -> u16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "usat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out as u16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        if val > 65535 {
            65535
        } else if val < 0 {
            0
        } else {
            val as u16
        }
    }
}
