//! Buffer sizes, protocol limits and hard-coded fallbacks.

// ── Ingestion ──────────────────────────────────────────────────────────────

/// Number of slots in the receive ring buffer. Usable capacity is one less.
pub const RING_BUFFER_SIZE: usize = 512;

/// Number of complete command lines that may wait for execution.
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Maximum stored length of one command line, including the terminator slot.
pub const COMMAND_LENGTH: usize = 512;

// ── JSON ───────────────────────────────────────────────────────────────────

/// Maximum number of JSON tokens produced for a single command.
pub const MAX_JSON_TOKENS: usize = 64;

// ── Signal memory ──────────────────────────────────────────────────────────

/// Maximum number of tones in one composite signal.
pub const MAX_TONES: usize = 16;

/// Maximum number of samples held by the scratch buffer.
pub const MAX_SIG_LEN: usize = 4096;

/// Upper bound on FIR filter length.
pub const MAX_FIR_TAPS: usize = 64;

// ── Signal defaults ────────────────────────────────────────────────────────

/// Tone count used when `num_tones` is missing or invalid.
pub const DEFAULT_NUM_TONES: u16 = 1;

/// Sample count used when `len` is missing or invalid.
pub const DEFAULT_NUM_SAMPLES: u16 = 1024;

/// Tone frequency in Hz used when `freqs` is missing or invalid.
pub const DEFAULT_FREQ_HZ: u32 = 10_000;

/// Tone amplitude in mV used when `amps` is missing or invalid.
pub const DEFAULT_AMP_MV: u16 = 1000;

/// Sampling rate in Hz used when `sampl_rate` is missing or invalid.
pub const DEFAULT_SAMPLING_RATE: u32 = 1_024_000;

/// Nominal DC offset of the simulated analog front end, in mV.
pub const DEFAULT_DC_OFFSET_MV: u16 = 1650;

/// Reference voltage of the simulated converter, in mV.
pub const DEFAULT_VREF_MV: u16 = 3300;

/// Full-scale code of the simulated 12-bit converter.
pub const ADC_MAX_CODE: u16 = 4095;

/// Midpoint used to re-center 12-bit converter codes.
pub const ADC_MIDPOINT: f32 = 2048.0;

/// Noise amplitude in mV added to floating-point millivolt output.
pub const DEFAULT_NOISE_MV: f32 = 5.0;

/// Seed of the deterministic noise generator.
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0F_51_6E41;

// ── DSP ────────────────────────────────────────────────────────────────────

/// Smallest supported FFT length.
pub const MIN_FFT_LEN: usize = 16;

/// Largest supported FFT length.
pub const MAX_FFT_LEN: usize = 4096;

/// Coherent gain of the Blackman window.
pub const BLACKMAN_COHERENT_GAIN: f32 = 0.42;

// ── Block transfer ─────────────────────────────────────────────────────────

/// Payload bytes per block-transfer packet.
pub const XMODEM_BLOCK_SIZE: usize = 128;

/// Bytes on the wire per packet: SOH, id, ~id, payload, CRC high, CRC low.
pub const XMODEM_PACKET_SIZE: usize = XMODEM_BLOCK_SIZE + 5;

/// How long the transmitter waits for the receiver's start request, in ms.
pub const XMODEM_START_TIMEOUT_MS: u32 = 60_000;

/// How long the transmitter waits for ACK/NAK after a packet or EOT, in ms.
pub const XMODEM_ACK_TIMEOUT_MS: u32 = 10_000;

/// Resends of a single packet (or EOT) before the transfer is aborted.
pub const XMODEM_MAX_RETRIES: u8 = 10;

// ── Identity ───────────────────────────────────────────────────────────────

/// Reported by `READ_FW`.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reported by `READ_HW`.
pub const HARDWARE_ID: &str = "STM32407DISCOVERY_MB998_C-01";

/// Reported by `READ_SER`.
pub const SERIAL_NUMBER: &str = "STM32407DISCOVERY#001";

/// Sampling rate of block-transfer signals, which carry no `sampl_rate`.
pub const BLOCK_TRANSFER_SAMPLING_RATE: u32 = 1_024_000;
