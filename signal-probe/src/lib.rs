//! # signal-probe
//!
//! A `no_std`, allocation-free core for a command-driven test instrument:
//! a host sends one JSON object per line over a serial link, the instrument
//! synthesizes multi-tone test signals, optionally filters them and computes
//! magnitude spectra, and answers with framed records or an XMODEM-CRC block
//! transfer.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Seams | [`platform`] | `SerialPort`, `Clock` and `StatusIndicator` traits |
//! | Ingestion | [`io`] | ISR ring buffer, line assembly, command queue |
//! | Parsing | [`json`] / [`config`] | Flat JSON reader, lenient and strict request decoding |
//! | Signals | [`synth`] | Float and fixed-point multi-tone synthesis, noise |
//! | DSP | [`dsp`] | FIR filters, windowing, real FFT, shared scratch buffer |
//! | Output | [`transport`] | Headers, ASCII/binary payloads, CRC-32, diagnostics |
//! | Block transfer | [`xmodem`] | XMODEM-CRC sender state machine |
//! | Commands | [`command`] | Registry, dispatch and handlers |
//! | Top level | [`instrument`] | Owned context driving one command per poll |
//!
//! ## Quick start
//!
//! ```ignore
//! use signal_probe::{on_receive, Instrument, InstrumentSettings, RxRingBuffer, Scratch};
//!
//! static RX: RxRingBuffer = RxRingBuffer::new();
//!
//! // UART receive interrupt:
//! on_receive(&RX, &[byte]);
//!
//! // Main:
//! let mut inst = Instrument::new(&RX, scratch, uart_tx, ms_clock, led, InstrumentSettings::default());
//! inst.start()?;
//! loop {
//!     inst.poll();
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `dsp` | yes | Real FFT (`microfft`); `READ_FFT` and `READ_SIG_FFT` |
//! | `embedded-hal` | yes | [`platform::PinIndicator`] over an `OutputPin` |
//! | `defmt` | no | `defmt::Format` on public types and internal logging |
//!
//! ## Limits
//!
//! - **Tones per request:** 16 ([`constants::MAX_TONES`])
//! - **Samples per request:** 4096 ([`constants::MAX_SIG_LEN`])
//! - **Command line:** 511 bytes, 4 queued lines
//! - **FFT lengths:** powers of two from 16 to 4096

#![no_std]

pub mod constants;
pub mod error;
pub mod platform;
pub mod io;
pub mod json;
pub mod config;
pub mod synth;
pub mod dsp;
pub mod transport;
pub mod xmodem;
pub mod command;
pub mod instrument;

#[cfg(test)]
mod testing;

pub use command::Command;
pub use config::{BlockTransferRequest, DataType, FilterType, SignalConfig, TransferMode};
pub use dsp::Scratch;
pub use error::{CommandError, ConfigError, JsonError, TransportError};
pub use instrument::{on_receive, Instrument, InstrumentSettings};
pub use io::RxRingBuffer;
pub use platform::{Clock, SerialPort, StatusIndicator};
