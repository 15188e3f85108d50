//! Signal processing stages and the shared scratch buffer.
//!
//! ## Pipeline
//!
//! | Stage | Function | Domain |
//! |-------|----------|--------|
//! | FIR filter | [`fir::FirFilter::apply_in_place`] | `f32` |
//! | Center and normalize | [`window::center_and_normalize`] | `f32` |
//! | Blackman window | [`window::apply_blackman`] | `f32` |
//! | Real FFT + magnitude | [`fft::magnitude_spectrum`] | `f32` (feature `dsp`) |
//!
//! Every stage works in place on the [`Scratch`] buffer. Stages only take
//! `&mut [f32]`; moving between codes, Q15 and float goes through
//! [`Scratch::convert`].

pub mod fir;
pub mod helpers;
pub mod intrinsics;
pub mod scratch;
pub mod wavetables;
pub mod window;

#[cfg(feature = "dsp")]
pub mod fft;

pub use fir::FirFilter;
pub use scratch::{Representation, Samples, Scratch};
pub use window::Normalization;
