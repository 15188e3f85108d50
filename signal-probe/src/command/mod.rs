//! Command registry and line dispatch.
//!
//! | Wire name | Variant | Response |
//! |-----------|---------|----------|
//! | `READ_FW` / `READ_HW` / `READ_SER` | [`Command::ReadFw`] … | version line |
//! | `XMT_TEST` | [`Command::XmtTest`] | one XMODEM block, `[DBG]` progress |
//! | `READ_GEN_SIG_FLEX_XMODEM` | [`Command::ReadGenSigFlexXmodem`] | header, XMODEM codes, `<RESP:..>` |
//! | `READ_FFT` | [`Command::ReadFft`] | magnitude spectrum |
//! | `READ_SIG_FFT` | [`Command::ReadSigFft`] | raw, filtered and spectrum records |
//! | `READ_SCALED_SIG` | [`Command::ReadScaledSig`] | signal scaled to `vref` |
//! | `HELP` | [`Command::Help`] | command list |
//!
//! A line is dispatched only if it starts with `{`, parses as a JSON object
//! and carries a known `cmd`. Everything else gets usage hints on the
//! diagnostic channel, never an error record.

mod handlers;

use crate::dsp::Scratch;
use crate::error::CommandError;
use crate::instrument::InstrumentSettings;
use crate::io::RxRingBuffer;
use crate::json::JsonObject;
use crate::platform::{Clock, SerialPort, StatusIndicator};
use crate::transport;

/// Every command the instrument understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    ReadFw,
    ReadHw,
    ReadSer,
    XmtTest,
    ReadGenSigFlexXmodem,
    ReadFft,
    ReadSigFft,
    ReadScaledSig,
    Help,
}

impl Command {
    /// Wire name to variant, in `HELP` order.
    pub const TABLE: &'static [(&'static str, Command)] = &[
        ("READ_FW", Command::ReadFw),
        ("READ_SER", Command::ReadSer),
        ("READ_HW", Command::ReadHw),
        ("XMT_TEST", Command::XmtTest),
        ("READ_GEN_SIG_FLEX_XMODEM", Command::ReadGenSigFlexXmodem),
        ("READ_FFT", Command::ReadFft),
        ("READ_SCALED_SIG", Command::ReadScaledSig),
        ("READ_SIG_FFT", Command::ReadSigFft),
        ("HELP", Command::Help),
    ];

    pub fn from_name(name: &str) -> Option<Command> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, cmd)| cmd)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::ReadFw => "READ_FW",
            Command::ReadHw => "READ_HW",
            Command::ReadSer => "READ_SER",
            Command::XmtTest => "XMT_TEST",
            Command::ReadGenSigFlexXmodem => "READ_GEN_SIG_FLEX_XMODEM",
            Command::ReadFft => "READ_FFT",
            Command::ReadSigFft => "READ_SIG_FFT",
            Command::ReadScaledSig => "READ_SCALED_SIG",
            Command::Help => "HELP",
        }
    }

    /// One-line description for `HELP`.
    pub fn summary(self) -> &'static str {
        match self {
            Command::ReadFw => "firmware version",
            Command::ReadHw => "hardware revision",
            Command::ReadSer => "serial number",
            Command::XmtTest => "send one XMODEM test block",
            Command::ReadGenSigFlexXmodem => "num_tones, len, freqs[], amps[] -> codes over XMODEM",
            Command::ReadFft => "signal fields -> magnitude spectrum",
            Command::ReadSigFft => "signal fields -> raw, filtered and spectrum records",
            Command::ReadScaledSig => "signal fields -> signal scaled to vref",
            Command::Help => "this list",
        }
    }
}

/// Everything a handler may touch while it runs.
pub struct Context<'a, S: SerialPort, C: Clock, L: StatusIndicator> {
    pub port: &'a mut S,
    /// Receive path; block transfers read the receiver's replies from it.
    pub rx: &'a RxRingBuffer,
    pub clock: &'a C,
    pub indicator: &'a mut L,
    pub scratch: &'a mut Scratch,
    pub settings: &'a InstrumentSettings,
}

impl<S: SerialPort, C: Clock, L: StatusIndicator> Context<'_, S, C, L> {
    /// Run `cmd` to completion with the full command line.
    pub fn execute(&mut self, cmd: Command, line: &str) -> Result<(), CommandError> {
        let settings = self.settings;
        self.indicator.set(true);
        let result = match cmd {
            Command::ReadFw => handlers::read_version(self, cmd, settings.firmware_version),
            Command::ReadHw => handlers::read_version(self, cmd, settings.hardware_id),
            Command::ReadSer => handlers::read_version(self, cmd, settings.serial_number),
            Command::XmtTest => handlers::xmodem_test(self),
            Command::ReadGenSigFlexXmodem => handlers::gen_signal_xmodem(self, line),
            Command::ReadFft => handlers::read_fft(self, line),
            Command::ReadSigFft => handlers::read_sig_fft(self, line),
            Command::ReadScaledSig => handlers::read_scaled_signal(self, line),
            Command::Help => handlers::help(self),
        };
        self.indicator.set(false);
        result
    }

    /// Handle one received line, then print the prompt.
    pub fn dispatch(&mut self, line: &[u8]) -> Result<(), CommandError> {
        let Ok(text) = core::str::from_utf8(line) else {
            transport::debug(self.port, format_args!("Received {} bytes of non-UTF-8 input.", line.len()))?;
            self.usage_hints("<binary>")?;
            return Ok(transport::prompt(self.port)?);
        };

        transport::debug(self.port, format_args!("Received: {} ", text))?;

        match self.lookup(text)? {
            Some(cmd) => {
                if let Err(e) = self.execute(cmd, text) {
                    #[cfg(feature = "defmt")]
                    defmt::error!("{}: {}", cmd, e);
                    if let CommandError::Scratch(e) = e {
                        transport::debug(self.port, format_args!("[Error] {} failed: {:?}", cmd.name(), e))?;
                    } else {
                        return Err(e);
                    }
                }
            }
            None => self.usage_hints(text)?,
        }
        Ok(transport::prompt(self.port)?)
    }

    fn lookup(&mut self, text: &str) -> Result<Option<Command>, CommandError> {
        if !text.starts_with('{') {
            return Ok(None);
        }
        match JsonObject::parse(text) {
            Ok(obj) => Ok(obj.get_str("cmd").ok().and_then(Command::from_name)),
            Err(e) => {
                transport::debug(self.port, format_args!("[Error] JSON parsing failed: {:?}", e))?;
                Ok(None)
            }
        }
    }

    fn usage_hints(&mut self, text: &str) -> Result<(), CommandError> {
        transport::debug(self.port, format_args!("Command <{}> not recognized.", text))?;
        transport::debug(
            self.port,
            format_args!("Command must be in JSON-Format like <{{\"cmd\": \"READ_SER\"}}\\n>"),
        )?;
        transport::debug(
            self.port,
            format_args!("Enter <{{\"cmd\": \"HELP\"}}\\n> to display a list of commands."),
        )?;
        Ok(())
    }
}
