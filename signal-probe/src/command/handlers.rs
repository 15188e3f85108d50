//! One function per [`Command`].
//!
//! Handlers re-parse the full command line themselves. Field problems are
//! reported on the diagnostic channel and replaced by fallbacks; only a line
//! that no longer parses as an object earns a `FAIL` record.

use crate::config::{BlockTransferRequest, FilterType, SignalConfig, SignalSource};
use crate::constants::{BLOCK_TRANSFER_SAMPLING_RATE, XMODEM_BLOCK_SIZE};
use crate::dsp::helpers::scale;
use crate::dsp::{Representation, Scratch};
use crate::error::{CommandError, ConfigError, ScratchError};
use crate::platform::{Clock, SerialPort, StatusIndicator};
use crate::synth::{fixed, float};
use crate::transport::{self, Status};
use crate::xmodem::{self, U16Le, UartBlockIo};

use super::{Command, Context};

const INVALID_JSON: &str = r#"{"error":"invalid_json"}"#;
const MISSING_FIELDS: &str = r#"{"error":"missing_or_invalid_fields"}"#;

/// Id used on the wire by the flexible block-transfer command.
const BLOCK_TRANSFER_ID: &str = "READ_GEN_SIG_XMD";

// ── Identity ───────────────────────────────────────────────────────────────

pub(super) fn read_version<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    cmd: Command,
    data: &str,
) -> Result<(), CommandError> {
    transport::send_version(ctx.port, cmd.name(), data)?;
    Ok(())
}

pub(super) fn help<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
) -> Result<(), CommandError> {
    transport::debug(ctx.port, format_args!("Available commands:"))?;
    for &(name, cmd) in Command::TABLE {
        transport::debug(ctx.port, format_args!("  {:<26}{}", name, cmd.summary()))?;
    }
    transport::debug(ctx.port, format_args!("Send one JSON object per line: {{\"cmd\":\"<NAME>\", ...}}"))?;
    Ok(())
}

// ── Block transfer ─────────────────────────────────────────────────────────

/// Send one block holding `1..=10` followed by zeros.
pub(super) fn xmodem_test<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
) -> Result<(), CommandError> {
    let mut block = [0u8; XMODEM_BLOCK_SIZE];
    for (i, b) in block.iter_mut().take(10).enumerate() {
        *b = i as u8 + 1;
    }

    transport::debug(ctx.port, format_args!("Initializing transmitter..."))?;
    transport::debug(ctx.port, format_args!("Begin transmitting..."))?;
    let mut io = UartBlockIo::new(ctx.rx, &mut *ctx.port);
    let outcome = xmodem::transmit(&block[..], &mut io, ctx.clock);

    match outcome {
        Ok(()) => transport::debug(ctx.port, format_args!("Transmission complete."))?,
        Err(_reason) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("XMT_TEST aborted: {}", _reason);
            transport::debug(ctx.port, format_args!("Transmission failed."))?
        }
    }
    Ok(())
}

/// Synthesize codes on the fixed-point path and send them over XMODEM.
pub(super) fn gen_signal_xmodem<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    line: &str,
) -> Result<(), CommandError> {
    let req = match BlockTransferRequest::from_json(line) {
        Ok(req) => req,
        Err(e) => {
            let payload = match e {
                ConfigError::InvalidJson(_) => INVALID_JSON,
                _ => MISSING_FIELDS,
            };
            transport::send_response(ctx.port, BLOCK_TRANSFER_ID, Status::Fail, payload)?;
            return Ok(());
        }
    };

    let params = ctx.settings.synth_params(BLOCK_TRANSFER_SAMPLING_RATE);
    ctx.scratch.begin(Representation::U16, req.num_samples as usize)?;
    fixed::generate_codes(&req.tones, &params, ctx.scratch.as_u16_mut()?);

    transport::send_block_transfer_header(ctx.port, BLOCK_TRANSFER_ID, &req.tones, req.num_samples)?;

    let codes = ctx.scratch.as_u16()?;
    let mut io = UartBlockIo::new(ctx.rx, &mut *ctx.port);
    let outcome = xmodem::transmit(&U16Le(codes), &mut io, ctx.clock);

    match outcome {
        Ok(()) => transport::send_response(ctx.port, BLOCK_TRANSFER_ID, Status::Ok, "DONE")?,
        Err(_reason) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} aborted: {}", BLOCK_TRANSFER_ID, _reason);
            transport::send_response(ctx.port, BLOCK_TRANSFER_ID, Status::Fail, "ABORT")?
        }
    }
    Ok(())
}

// ── Signal records ─────────────────────────────────────────────────────────

/// Float millivolt signal divided by `vref`.
///
/// The result lies in `0..=1`, so `uint16` and `Q15` output views of it are
/// lossy (`uint16` rounds every sample to 0 or 1).
pub(super) fn read_scaled_signal<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    line: &str,
) -> Result<(), CommandError> {
    const CMD: &str = "READ_SCALED_SIG";
    let Some(cfg) = signal_config(ctx, line, CMD)? else {
        return Ok(());
    };

    synthesize_millivolts(ctx, &cfg, cfg.num_samples as usize)?;
    let vref = ctx.settings.vref_mv;
    if vref > 0 {
        scale(ctx.scratch.as_f32_mut()?, 1.0 / vref as f32);
    }
    send_as_requested(ctx, CMD, &cfg)
}

/// Codes → float → filter → center → window → magnitude spectrum.
///
/// Magnitudes are normalized (a full-scale tone reads about 2), so a
/// `uint16` output view keeps little more than 0/1/2 per bin.
#[cfg(feature = "dsp")]
pub(super) fn read_fft<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    line: &str,
) -> Result<(), CommandError> {
    use crate::dsp::Normalization;
    use crate::synth::float::generate_codes;

    const CMD: &str = "READ_FFT";
    let Some(cfg) = signal_config(ctx, line, CMD)? else {
        return Ok(());
    };
    let len = fft_length(ctx, &cfg)?;

    let settings = ctx.settings;
    let params = settings.synth_params(cfg.sampling_rate);
    ctx.scratch.begin(Representation::U16, len)?;
    generate_codes(&cfg.tones, &params, settings.sine_method, ctx.scratch.as_u16_mut()?);
    ctx.scratch.convert(Representation::F32);

    let gain = apply_filter(ctx.scratch, cfg.filter)?;
    if spectrum(ctx, Normalization::ADC_CODES.with_dc_gain(gain), CMD)? {
        send_as_requested(ctx, CMD, &cfg)?;
    }
    Ok(())
}

/// Raw signal, filtered signal and spectrum, as three records.
#[cfg(feature = "dsp")]
pub(super) fn read_sig_fft<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    line: &str,
) -> Result<(), CommandError> {
    use crate::dsp::Normalization;

    const CMD: &str = "READ_SIG_FFT";
    let Some(cfg) = signal_config(ctx, line, CMD)? else {
        return Ok(());
    };
    let len = fft_length(ctx, &cfg)?;

    synthesize_millivolts(ctx, &cfg, len)?;
    send_as_requested(ctx, "SIG_TIME_RAW", &cfg)?;

    let gain = apply_filter(ctx.scratch, cfg.filter)?;
    send_as_requested(ctx, "SIG_TIME", &cfg)?;

    let norm = Normalization::millivolts(ctx.settings.dc_offset_mv, ctx.settings.vref_mv);
    if spectrum(ctx, norm.with_dc_gain(gain), CMD)? {
        send_as_requested(ctx, "SIG_FFT", &cfg)?;
    }
    Ok(())
}

#[cfg(not(feature = "dsp"))]
pub(super) fn read_fft<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    _line: &str,
) -> Result<(), CommandError> {
    transport::send_response(ctx.port, "READ_FFT", Status::Fail, r#"{"error":"fft_unavailable"}"#)?;
    Ok(())
}

#[cfg(not(feature = "dsp"))]
pub(super) fn read_sig_fft<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    _line: &str,
) -> Result<(), CommandError> {
    transport::send_response(ctx.port, "READ_SIG_FFT", Status::Fail, r#"{"error":"fft_unavailable"}"#)?;
    Ok(())
}

// ── Shared steps ───────────────────────────────────────────────────────────

/// Extract the lenient configuration and report every fallback.
///
/// `None` means the line was not a JSON object; the `FAIL` record is already
/// sent.
fn signal_config<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    line: &str,
    cmd: &str,
) -> Result<Option<SignalConfig>, CommandError> {
    let (cfg, warnings) = match SignalConfig::from_json(line) {
        Ok(parsed) => parsed,
        Err(_) => {
            transport::send_response(ctx.port, cmd, Status::Fail, INVALID_JSON)?;
            return Ok(None);
        }
    };
    for warning in &warnings {
        transport::debug(ctx.port, format_args!("{}", warning))?;
    }
    if cfg.filter == FilterType::Reserved {
        transport::debug(ctx.port, format_args!("Filter type 3 is reserved. No filter applied."))?;
    }
    if cfg.source == SignalSource::Reserved {
        transport::debug(ctx.port, format_args!("Signal source 1 is reserved. Using synthetic signal."))?;
    }
    Ok(Some(cfg))
}

/// Fill the scratch buffer with `len` float millivolt samples.
fn synthesize_millivolts<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    cfg: &SignalConfig,
    len: usize,
) -> Result<(), CommandError> {
    let settings = ctx.settings;
    let params = settings.synth_params(cfg.sampling_rate);
    let mut noise = settings.noise();
    ctx.scratch.begin(Representation::F32, len)?;
    float::generate_millivolts(
        &cfg.tones,
        &params,
        settings.sine_method,
        noise.as_mut(),
        ctx.scratch.as_f32_mut()?,
    );
    Ok(())
}

/// Send the active signal in the configured data type and transfer mode.
fn send_as_requested<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    cmd: &str,
    cfg: &SignalConfig,
) -> Result<(), CommandError> {
    let samples = ctx.scratch.view_as(cfg.data_type.representation());
    transport::send_signal(ctx.port, cmd, cfg.num_tones(), &samples, cfg.transfer)?;
    Ok(())
}

/// Run the configured FIR over the float signal; returns its DC gain.
#[cfg_attr(not(feature = "dsp"), allow(dead_code))]
fn apply_filter(scratch: &mut Scratch, filter: FilterType) -> Result<f32, ScratchError> {
    let Some(fir) = filter.filter() else {
        return Ok(1.0);
    };
    fir.apply_in_place(scratch.as_f32_mut()?);
    Ok(fir.dc_gain())
}

#[cfg(feature = "dsp")]
fn fft_length<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    cfg: &SignalConfig,
) -> Result<usize, CommandError> {
    let requested = cfg.num_samples as usize;
    let len = crate::dsp::fft::supported_fft_length(requested);
    if len != requested {
        transport::debug(
            ctx.port,
            format_args!("len={} is not a supported FFT length. Using {}.", requested, len),
        )?;
    }
    Ok(len)
}

/// Center, window and transform the active float signal, replacing it with
/// its `N / 2` magnitudes. Returns `false` after reporting a failed
/// transform.
#[cfg(feature = "dsp")]
fn spectrum<S: SerialPort, C: Clock, L: StatusIndicator>(
    ctx: &mut Context<'_, S, C, L>,
    norm: crate::dsp::Normalization,
    cmd: &str,
) -> Result<bool, CommandError> {
    use crate::dsp::fft::magnitude_spectrum;
    use crate::dsp::window::{apply_blackman, center_and_normalize};

    let (signal, work) = ctx.scratch.f32_with_work()?;
    center_and_normalize(signal, norm);
    apply_blackman(signal);
    match magnitude_spectrum(signal, work) {
        Ok(bins) => {
            ctx.scratch.load_from_work(bins)?;
            Ok(true)
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("{}: {}", cmd, _e);
            transport::send_response(ctx.port, cmd, Status::Fail, r#"{"error":"fft_init_failed"}"#)?;
            Ok(false)
        }
    }
}
