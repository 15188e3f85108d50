//! The instrument: one owned context tying ingestion, dispatch and the
//! signal engine together.
//!
//! ```text
//!  UART RX ISR ──► on_receive ──► RxRingBuffer (static)
//!                                                   │
//!  main loop ──► Instrument::poll ──► LineAssembler ─► CommandQueue
//!                                                   │
//!                                      Context::dispatch ──► SerialPort
//! ```
//!
//! The ring buffer is the only state shared with interrupt context. The
//! command queue, scratch buffer and settings are reachable only through
//! `&mut Instrument`, so exactly one command runs at a time.
//!
//! # Example
//!
//! ```ignore
//! static RX: RxRingBuffer = RxRingBuffer::new();
//! static mut SCRATCH: Scratch = Scratch::new();
//!
//! #[interrupt]
//! fn USART2() {
//!     on_receive(&RX, &[uart.read_byte()]);
//! }
//!
//! let mut inst = Instrument::new(&RX, scratch, uart_tx, tick, led, InstrumentSettings::default());
//! inst.start()?;
//! loop {
//!     inst.poll();
//! }
//! ```

use crate::command::Context;
use crate::constants::{
    ADC_MAX_CODE, DEFAULT_DC_OFFSET_MV, DEFAULT_NOISE_MV, DEFAULT_NOISE_SEED, DEFAULT_VREF_MV,
    FIRMWARE_VERSION, HARDWARE_ID, SERIAL_NUMBER,
};
use crate::dsp::Scratch;
use crate::error::TransportError;
use crate::io::{CommandQueue, LineAssembler, RxRingBuffer};
use crate::platform::{Clock, SerialPort, StatusIndicator};
use crate::synth::{Noise, SineMethod, SynthParams};
use crate::transport;


/// Runtime settings of the simulated front end and device identity.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSettings {
    pub firmware_version: &'static str,
    pub hardware_id: &'static str,
    pub serial_number: &'static str,
    pub dc_offset_mv: u16,
    pub vref_mv: u16,
    pub adc_max: u16,
    /// Noise added to float millivolt signals; `0` disables it.
    pub noise_mv: f32,
    pub noise_seed: u64,
    pub sine_method: SineMethod,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        InstrumentSettings {
            firmware_version: FIRMWARE_VERSION,
            hardware_id: HARDWARE_ID,
            serial_number: SERIAL_NUMBER,
            dc_offset_mv: DEFAULT_DC_OFFSET_MV,
            vref_mv: DEFAULT_VREF_MV,
            adc_max: ADC_MAX_CODE,
            noise_mv: DEFAULT_NOISE_MV,
            noise_seed: DEFAULT_NOISE_SEED,
            sine_method: SineMethod::Libm,
        }
    }
}

impl InstrumentSettings {
    pub fn synth_params(&self, sampling_rate: u32) -> SynthParams {
        SynthParams {
            sampling_rate,
            dc_offset_mv: self.dc_offset_mv,
            vref_mv: self.vref_mv,
            adc_max: self.adc_max,
        }
    }

    /// Fresh generator for one command, so identical commands produce
    /// identical signals.
    pub fn noise(&self) -> Option<Noise> {
        (self.noise_mv > 0.0).then(|| Noise::new(self.noise_seed, self.noise_mv))
    }
}

/// Receive-interrupt entry point. Never blocks; bytes that do not fit are
/// dropped and counted by the ring buffer. Returns how many were stored.
pub fn on_receive(rx: &RxRingBuffer, bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| rx.write(b)).count()
}

/// Owned instrument context.
pub struct Instrument<'r, S: SerialPort, C: Clock, L: StatusIndicator> {
    rx: &'r RxRingBuffer,
    scratch: &'r mut Scratch,
    assembler: LineAssembler,
    queue: CommandQueue,
    port: S,
    clock: C,
    indicator: L,
    settings: InstrumentSettings,
}

impl<'r, S: SerialPort, C: Clock, L: StatusIndicator> Instrument<'r, S, C, L> {
    pub fn new(
        rx: &'r RxRingBuffer,
        scratch: &'r mut Scratch,
        port: S,
        clock: C,
        indicator: L,
        settings: InstrumentSettings,
    ) -> Self {
        Instrument {
            rx,
            scratch,
            assembler: LineAssembler::new(),
            queue: CommandQueue::new(),
            port,
            clock,
            indicator,
            settings,
        }
    }

    /// Print the first prompt.
    pub fn start(&mut self) -> Result<(), TransportError> {
        transport::debug(&mut self.port, format_args!("Enter command:"))
    }

    /// One main-loop iteration: move received lines into the queue, then
    /// run at most one queued command to completion.
    ///
    /// Returns `true` if a command line was processed.
    pub fn poll(&mut self) -> bool {
        self.assembler.drain(self.rx, &mut self.queue);
        let Some(line) = self.queue.pop() else {
            return false;
        };

        let mut ctx = Context {
            port: &mut self.port,
            rx: self.rx,
            clock: &self.clock,
            indicator: &mut self.indicator,
            scratch: &mut *self.scratch,
            settings: &self.settings,
        };
        if let Err(_e) = ctx.dispatch(&line) {
            // Port failure: only the log can report it
            #[cfg(feature = "defmt")]
            defmt::error!("dispatch failed: {}", _e);
        }
        true
    }

    /// Lines dropped because the command queue was full.
    pub fn dropped_lines(&self) -> u32 {
        self.queue.dropped()
    }

    /// Bytes dropped because the ring buffer was full.
    pub fn dropped_bytes(&self) -> u32 {
        self.rx.dropped()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn settings(&self) -> &InstrumentSettings {
        &self.settings
    }

    pub fn port(&self) -> &S {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    /// Release the peripherals.
    pub fn into_parts(self) -> (S, C, L) {
        (self.port, self.clock, self.indicator)
    }
}
