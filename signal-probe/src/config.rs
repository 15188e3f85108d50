//! Signal configuration extracted from command JSON.
//!
//! Two extraction policies exist:
//!
//! - [`SignalConfig::from_object`] never fails on a single field. Every
//!   missing or invalid value falls back to a hard-coded default and records a
//!   [`ConfigWarning`]; capacity violations are clipped.
//! - [`BlockTransferRequest::from_object`] is strict: any missing or invalid
//!   tone field aborts the command.
//!
//! | Field | Type | Valid | Fallback |
//! |-------|------|-------|----------|
//! | `num_tones` | u16 | any | 1 |
//! | `len` | u16 | ≤ 4096 (clipped) | 1024 |
//! | `freqs` | u32[] | ≤ 16 entries (clipped) | `[10000]` |
//! | `amps` | u16[] | ≤ 16 entries (clipped) | `[1000]` |
//! | `sampl_rate` | u32 | > 0 | 1 024 000 |
//! | `data_type` | code | 0..=2 | 0 (float32) |
//! | `transfer` | code | 0..=1 | 0 (ASCII) |
//! | `filt_type` | code | 0..=3 | 0 (none) |
//! | `sig_source` | code | 0..=1 | 0 (synthetic) |

use core::fmt;

use heapless::Vec;

use crate::constants::{
    DEFAULT_AMP_MV, DEFAULT_FREQ_HZ, DEFAULT_NUM_SAMPLES, DEFAULT_NUM_TONES,
    DEFAULT_SAMPLING_RATE, MAX_SIG_LEN, MAX_TONES,
};
use crate::dsp::fir::{FirFilter, BANDPASS_TAPS, LOWPASS_TAPS};
use crate::dsp::Representation;
use crate::error::{ConfigError, JsonError};
use crate::json::JsonObject;
use crate::synth::ToneSet;

/// Upper bound on warnings recorded for one command.
pub const MAX_CONFIG_WARNINGS: usize = 16;

pub type ConfigWarnings = Vec<ConfigWarning, MAX_CONFIG_WARNINGS>;

// ── Field codes ────────────────────────────────────────────────────────────

/// Requested sample representation on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataType {
    #[default]
    Float32 = 0,
    Uint16 = 1,
    Q15 = 2,
}

impl DataType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(DataType::Float32),
            1 => Some(DataType::Uint16),
            2 => Some(DataType::Q15),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn representation(self) -> Representation {
        match self {
            DataType::Float32 => Representation::F32,
            DataType::Uint16 => Representation::U16,
            DataType::Q15 => Representation::Q15,
        }
    }
}

/// Payload encoding after the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferMode {
    /// `{"data":{"SIG1":[...]}}` text.
    #[default]
    Ascii = 0,
    /// Raw little-endian samples covered by the header CRC.
    Binary = 1,
}

impl TransferMode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(TransferMode::Ascii),
            1 => Some(TransferMode::Binary),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FilterType {
    #[default]
    None = 0,
    LowPass = 1,
    BandPass = 2,
    /// Accepted on the wire; behaves like `None`.
    Reserved = 3,
}

impl FilterType {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(FilterType::None),
            1 => Some(FilterType::LowPass),
            2 => Some(FilterType::BandPass),
            3 => Some(FilterType::Reserved),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Filter to run, if any.
    pub fn filter(self) -> Option<FirFilter<'static>> {
        match self {
            FilterType::LowPass => Some(FirFilter::new(&LOWPASS_TAPS)),
            FilterType::BandPass => Some(FirFilter::new(&BANDPASS_TAPS)),
            FilterType::None | FilterType::Reserved => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SignalSource {
    /// Generated by the synthesis engine.
    #[default]
    Synthetic = 0,
    /// Accepted on the wire; falls back to synthetic.
    Reserved = 1,
}

impl SignalSource {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(SignalSource::Synthetic),
            1 => Some(SignalSource::Reserved),
            _ => None,
        }
    }
}

// ── Warnings ───────────────────────────────────────────────────────────────

/// A fallback or clip applied while extracting a [`SignalConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigWarning {
    NumTonesDefaulted,
    LenDefaulted,
    FreqsDefaulted,
    AmpsDefaulted,
    SamplingRateDefaulted,
    /// An array held more than [`MAX_TONES`] entries.
    TooManyTones { field: &'static str, given: usize },
    /// `num_tones` disagreed with the array lengths.
    ToneMismatch { requested: u16, used: u16 },
    /// `len` exceeded [`MAX_SIG_LEN`].
    LenClipped { requested: u16 },
    DataTypeDefaulted,
    TransferDefaulted,
    FilterDefaulted,
    SourceDefaulted,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigWarning::NumTonesDefaulted => write!(
                f,
                "Warning: 'num_tones' missing/invalid. Defaulting to {}.",
                DEFAULT_NUM_TONES
            ),
            ConfigWarning::LenDefaulted => write!(
                f,
                "Warning: 'len' missing/invalid. Defaulting to {}.",
                DEFAULT_NUM_SAMPLES
            ),
            ConfigWarning::FreqsDefaulted => write!(
                f,
                "Warning: 'freqs' missing/invalid. Defaulting to {}Hz.",
                DEFAULT_FREQ_HZ
            ),
            ConfigWarning::AmpsDefaulted => write!(
                f,
                "Warning: 'amps' missing/invalid. Defaulting to {}mV.",
                DEFAULT_AMP_MV
            ),
            ConfigWarning::SamplingRateDefaulted => write!(
                f,
                "Warning: 'sampl_rate' missing/invalid. Defaulting to {}.",
                DEFAULT_SAMPLING_RATE
            ),
            ConfigWarning::TooManyTones { field, given } => write!(
                f,
                "Warning: '{}' has {} entries, max={}. Clipping.",
                field, given, MAX_TONES
            ),
            ConfigWarning::ToneMismatch { requested, used } => write!(
                f,
                "Warning: 'num_tones'={} and array lengths mismatch. Clipping to {}.",
                requested, used
            ),
            ConfigWarning::LenClipped { requested } => write!(
                f,
                "Warning: 'len'={} exceeds max={}. Clipping.",
                requested, MAX_SIG_LEN
            ),
            ConfigWarning::DataTypeDefaulted => {
                f.write_str("Warning: 'data_type' missing/invalid. Defaulting to float32.")
            }
            ConfigWarning::TransferDefaulted => {
                f.write_str("Warning: 'transfer' missing/invalid. Defaulting to ASCII.")
            }
            ConfigWarning::FilterDefaulted => {
                f.write_str("Warning: 'filt_type' missing/invalid. Defaulting to no filter.")
            }
            ConfigWarning::SourceDefaulted => {
                f.write_str("Warning: 'sig_source' missing/invalid. Defaulting to synthetic.")
            }
        }
    }
}

fn note(warnings: &mut ConfigWarnings, warning: ConfigWarning) {
    #[cfg(feature = "defmt")]
    defmt::warn!("config: {}", warning);
    // Only a handful of distinct warnings exist, so the list never fills
    let _ = warnings.push(warning);
}

fn single<T>(value: T) -> Vec<T, MAX_TONES> {
    let mut v = Vec::new();
    let _ = v.push(value);
    v
}

// ── Lenient configuration ──────────────────────────────────────────────────

/// Parameters of one signal-producing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalConfig {
    pub tones: ToneSet,
    pub num_samples: u16,
    pub sampling_rate: u32,
    pub data_type: DataType,
    pub transfer: TransferMode,
    pub filter: FilterType,
    pub source: SignalSource,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            tones: ToneSet::from_slices(&[DEFAULT_FREQ_HZ], &[DEFAULT_AMP_MV]),
            num_samples: DEFAULT_NUM_SAMPLES,
            sampling_rate: DEFAULT_SAMPLING_RATE,
            data_type: DataType::default(),
            transfer: TransferMode::default(),
            filter: FilterType::default(),
            source: SignalSource::default(),
        }
    }
}

impl SignalConfig {
    /// Parse `text` and extract a configuration.
    ///
    /// Fails only when `text` is not a JSON object.
    pub fn from_json(text: &str) -> Result<(Self, ConfigWarnings), JsonError> {
        let obj = JsonObject::parse(text)?;
        Ok(Self::from_object(&obj))
    }

    /// Extract a configuration, applying fallbacks field by field.
    pub fn from_object(obj: &JsonObject<'_>) -> (Self, ConfigWarnings) {
        let mut warnings = ConfigWarnings::new();

        let num_tones = match obj.get_u16("num_tones") {
            Ok(v) => v,
            Err(_) => {
                note(&mut warnings, ConfigWarning::NumTonesDefaulted);
                DEFAULT_NUM_TONES
            }
        };

        let mut num_samples = match obj.get_u16("len") {
            Ok(v) => v,
            Err(_) => {
                note(&mut warnings, ConfigWarning::LenDefaulted);
                DEFAULT_NUM_SAMPLES
            }
        };

        let freqs = match obj.get_array_u32_clipped::<MAX_TONES>("freqs") {
            Ok((values, given)) => {
                if given > MAX_TONES {
                    note(&mut warnings, ConfigWarning::TooManyTones { field: "freqs", given });
                }
                values
            }
            Err(_) => {
                note(&mut warnings, ConfigWarning::FreqsDefaulted);
                single(DEFAULT_FREQ_HZ)
            }
        };

        let amps = match obj.get_array_u16_clipped::<MAX_TONES>("amps") {
            Ok((values, given)) => {
                if given > MAX_TONES {
                    note(&mut warnings, ConfigWarning::TooManyTones { field: "amps", given });
                }
                values
            }
            Err(_) => {
                note(&mut warnings, ConfigWarning::AmpsDefaulted);
                single(DEFAULT_AMP_MV)
            }
        };

        let sampling_rate = match obj.get_u32("sampl_rate") {
            Ok(v) if v > 0 => v,
            _ => {
                note(&mut warnings, ConfigWarning::SamplingRateDefaulted);
                DEFAULT_SAMPLING_RATE
            }
        };

        let mut tones = ToneSet::from_slices(&freqs, &amps);
        if freqs.len() != num_tones as usize || amps.len() != num_tones as usize {
            let used = freqs.len().min(amps.len());
            note(&mut warnings, ConfigWarning::ToneMismatch {
                requested: num_tones,
                used: used as u16,
            });
            tones.truncate(used);
        }

        if num_samples as usize > MAX_SIG_LEN {
            note(&mut warnings, ConfigWarning::LenClipped { requested: num_samples });
            num_samples = MAX_SIG_LEN as u16;
        }

        let data_type = match obj.get_u32("data_type").ok().and_then(DataType::from_code) {
            Some(v) => v,
            None => {
                note(&mut warnings, ConfigWarning::DataTypeDefaulted);
                DataType::Float32
            }
        };

        let transfer = match obj.get_u32("transfer").ok().and_then(TransferMode::from_code) {
            Some(v) => v,
            None => {
                note(&mut warnings, ConfigWarning::TransferDefaulted);
                TransferMode::Ascii
            }
        };

        let filter = match obj.get_u16("filt_type").ok().and_then(FilterType::from_code) {
            Some(v) => v,
            None => {
                note(&mut warnings, ConfigWarning::FilterDefaulted);
                FilterType::None
            }
        };

        let source = match obj.get_u16("sig_source").ok().and_then(SignalSource::from_code) {
            Some(v) => v,
            None => {
                note(&mut warnings, ConfigWarning::SourceDefaulted);
                SignalSource::Synthetic
            }
        };

        let config = SignalConfig {
            tones,
            num_samples,
            sampling_rate,
            data_type,
            transfer,
            filter,
            source,
        };
        (config, warnings)
    }

    pub fn num_tones(&self) -> usize {
        self.tones.len()
    }
}

// ── Strict block-transfer request ──────────────────────────────────────────

/// Tone parameters for a block transfer; every field is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTransferRequest {
    pub tones: ToneSet,
    pub num_samples: u16,
}

impl BlockTransferRequest {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let obj = JsonObject::parse(text).map_err(ConfigError::InvalidJson)?;
        Self::from_object(&obj)
    }

    /// Require `num_tones`, `len`, `freqs` and `amps`, with both arrays
    /// exactly `num_tones` long and `len` within the scratch buffer.
    pub fn from_object(obj: &JsonObject<'_>) -> Result<Self, ConfigError> {
        let num_tones = obj
            .get_u16("num_tones")
            .map_err(|_| ConfigError::MissingOrInvalid("num_tones"))?;
        let num_samples = obj
            .get_u16("len")
            .map_err(|_| ConfigError::MissingOrInvalid("len"))?;
        let freqs = obj
            .get_array_u32::<MAX_TONES>("freqs")
            .map_err(|_| ConfigError::MissingOrInvalid("freqs"))?;
        let amps = obj
            .get_array_u16::<MAX_TONES>("amps")
            .map_err(|_| ConfigError::MissingOrInvalid("amps"))?;

        if freqs.len() != num_tones as usize || amps.len() != num_tones as usize {
            return Err(ConfigError::ToneMismatch);
        }
        if num_samples as usize > MAX_SIG_LEN {
            return Err(ConfigError::TooManySamples);
        }

        Ok(BlockTransferRequest {
            tones: ToneSet::from_slices(&freqs, &amps),
            num_samples,
        })
    }
}
