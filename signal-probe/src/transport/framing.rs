//! Text and binary records written to the serial port.
//!
//! ```text
//! {"cmd":"READ_FFT","status":"OK","args":{"num_tones":2,"len":512,"data_type":"0","transferMode":"1","crc":3735928559}}\r\n
//! <512 × 4 raw little-endian bytes>
//! ```
//!
//! The header and the payload are independent calls. In binary mode the
//! header carries the CRC-32 of exactly the payload bytes that follow; ASCII
//! payloads have no integrity check. Writes are never retried: the first
//! failure ends the record and is returned to the caller.

use core::fmt::{self, Write as _};

use heapless::{String, Vec};

use crate::config::{DataType, TransferMode};
use crate::dsp::{Representation, Samples};
use crate::error::TransportError;
use crate::platform::SerialPort;
use crate::synth::ToneSet;

use super::crc::samples_crc32;

/// Staging size for one rendered ASCII sample. `f32::MAX` at six decimals
/// needs 46 characters.
const SAMPLE_TEXT_LEN: usize = 64;

/// Staging size for raw payload bytes.
const BINARY_CHUNK: usize = 64;

/// Status field of a `<RESP:...>` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    Fail,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Fail => "FAIL",
        }
    }
}

impl From<Representation> for DataType {
    fn from(repr: Representation) -> Self {
        match repr {
            Representation::F32 => DataType::Float32,
            Representation::U16 => DataType::Uint16,
            Representation::Q15 => DataType::Q15,
        }
    }
}

// ── Port writer ────────────────────────────────────────────────────────────

struct PortWriter<'p, S: SerialPort> {
    port: &'p mut S,
    failed: bool,
}

impl<S: SerialPort> fmt::Write for PortWriter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.port.write_all(s.as_bytes()).map_err(|_| {
            self.failed = true;
            fmt::Error
        })
    }
}

/// Format `args` straight onto the port.
pub fn write_fmt<S: SerialPort>(port: &mut S, args: fmt::Arguments<'_>) -> Result<(), TransportError> {
    let mut writer = PortWriter { port, failed: false };
    writer.write_fmt(args).map_err(|_| {
        if writer.failed {
            TransportError::Write
        } else {
            TransportError::Format
        }
    })
}

fn write_bytes<S: SerialPort>(port: &mut S, bytes: &[u8]) -> Result<(), TransportError> {
    port.write_all(bytes).map_err(|_| TransportError::Write)
}

// ── Records ────────────────────────────────────────────────────────────────

/// `<RESP:cmd|status|payload>\r\n`
pub fn send_response<S: SerialPort>(
    port: &mut S,
    cmd: &str,
    status: Status,
    payload: &str,
) -> Result<(), TransportError> {
    write_fmt(port, format_args!("<RESP:{}|{}|{}>\r\n", cmd, status.as_str(), payload))
}

/// `{"cmd":"<cmd>","status":"OK","data":"<data>"}\r\n`
pub fn send_version<S: SerialPort>(port: &mut S, cmd: &str, data: &str) -> Result<(), TransportError> {
    write_fmt(
        port,
        format_args!("{{\"cmd\":\"{}\",\"status\":\"OK\",\"data\":\"{}\"}}\r\n", cmd, data),
    )
}

/// `[DBG] <text>\r\n`
pub fn debug<S: SerialPort>(port: &mut S, args: fmt::Arguments<'_>) -> Result<(), TransportError> {
    write_fmt(port, format_args!("[DBG] {}\r\n", args))
}

/// Prompt printed after every processed line.
pub fn prompt<S: SerialPort>(port: &mut S) -> Result<(), TransportError> {
    write_bytes(port, b"\r\n[DBG]:Enter command:\r\n")
}

/// Signal header line.
///
/// `data_type` is taken from the representation of `samples`; the CRC is only
/// present in binary mode.
pub fn send_header<S: SerialPort>(
    port: &mut S,
    cmd: &str,
    num_tones: usize,
    samples: &Samples<'_>,
    transfer: TransferMode,
) -> Result<(), TransportError> {
    let data_type = DataType::from(samples.representation());
    write_fmt(
        port,
        format_args!(
            "{{\"cmd\":\"{}\",\"status\":\"OK\",\"args\":{{\"num_tones\":{},\"len\":{},\"data_type\":\"{}\",\"transferMode\":\"{}\"",
            cmd,
            num_tones,
            samples.len(),
            data_type.code(),
            transfer.code()
        ),
    )?;
    if transfer == TransferMode::Binary {
        write_fmt(port, format_args!(",\"crc\":{}", samples_crc32(samples)))?;
    }
    write_bytes(port, b"}}\r\n")
}

/// Signal payload following [`send_header`].
pub fn send_payload<S: SerialPort>(
    port: &mut S,
    samples: &Samples<'_>,
    transfer: TransferMode,
) -> Result<(), TransportError> {
    match transfer {
        TransferMode::Ascii => send_ascii_payload(port, samples),
        TransferMode::Binary => send_binary_payload(port, samples),
    }
}

/// Header and payload back to back.
pub fn send_signal<S: SerialPort>(
    port: &mut S,
    cmd: &str,
    num_tones: usize,
    samples: &Samples<'_>,
    transfer: TransferMode,
) -> Result<(), TransportError> {
    send_header(port, cmd, num_tones, samples, transfer)?;
    send_payload(port, samples, transfer)
}

/// Header announcing a block transfer of `num_samples` codes.
pub fn send_block_transfer_header<S: SerialPort>(
    port: &mut S,
    cmd: &str,
    tones: &ToneSet,
    num_samples: u16,
) -> Result<(), TransportError> {
    write_fmt(
        port,
        format_args!(
            "{{\"cmd\":\"{}\",\"status\":\"OK\",\"args\":{{\"num_tones\":{},\"len\":{},\"freqs\":[",
            cmd,
            tones.len(),
            num_samples
        ),
    )?;
    write_list(port, tones.freqs())?;
    write_bytes(port, b"],\"amps\":[")?;
    write_list(port, tones.amps())?;
    write_bytes(port, b"]}}\r\n")
}

fn write_list<S: SerialPort, T: fmt::Display>(port: &mut S, values: &[T]) -> Result<(), TransportError> {
    for (i, v) in values.iter().enumerate() {
        let sep = if i == 0 { "" } else { "," };
        write_fmt(port, format_args!("{}{}", sep, v))?;
    }
    Ok(())
}

fn send_ascii_payload<S: SerialPort>(port: &mut S, samples: &Samples<'_>) -> Result<(), TransportError> {
    write_bytes(port, b"{\"data\":{\"SIG1\":[")?;
    let mut text: String<SAMPLE_TEXT_LEN> = String::new();
    for i in 0..samples.len() {
        text.clear();
        if i > 0 {
            text.push(',').map_err(|_| TransportError::Format)?;
        }
        let rendered = match samples {
            Samples::F32(s) => write!(text, "{:.6}", s[i]),
            Samples::U16(s) => write!(text, "{}", s[i]),
            Samples::Q15(s) => write!(text, "{}", s[i]),
        };
        rendered.map_err(|_| TransportError::Format)?;
        write_bytes(port, text.as_bytes())?;
    }
    write_bytes(port, b"]}}\r\n")
}

fn send_binary_payload<S: SerialPort>(port: &mut S, samples: &Samples<'_>) -> Result<(), TransportError> {
    let mut chunk: Vec<u8, BINARY_CHUNK> = Vec::new();
    samples.for_each_le_bytes(|bytes| {
        if chunk.len() + bytes.len() > BINARY_CHUNK {
            write_bytes(port, &chunk)?;
            chunk.clear();
        }
        chunk.extend_from_slice(bytes).map_err(|_| TransportError::Format)
    })?;
    if !chunk.is_empty() {
        write_bytes(port, &chunk)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::String as StdString;
    use std::vec::Vec as StdVec;

    use super::*;
    use crate::testing::MockPort;
    use crate::transport::crc::crc32;

    #[test]
    fn response_line() {
        let mut port = MockPort::new();
        send_response(&mut port, "READ_GEN_SIG_XMD", Status::Fail, "ABORT").unwrap();
        assert_eq!(port.text(), "<RESP:READ_GEN_SIG_XMD|FAIL|ABORT>\r\n");
    }

    #[test]
    fn version_line() {
        let mut port = MockPort::new();
        send_version(&mut port, "READ_FW", "0.3.1").unwrap();
        assert_eq!(port.text(), "{\"cmd\":\"READ_FW\",\"status\":\"OK\",\"data\":\"0.3.1\"}\r\n");
    }

    #[test]
    fn debug_line() {
        let mut port = MockPort::new();
        debug(&mut port, format_args!("Received: {}", "READ_FW")).unwrap();
        assert_eq!(port.text(), "[DBG] Received: READ_FW\r\n");
    }

    #[test]
    fn ascii_float_signal() {
        let mut port = MockPort::new();
        let samples = Samples::F32(&[1.5, -0.25, 0.0]);
        send_signal(&mut port, "READ_SCALED_SIG", 1, &samples, TransferMode::Ascii).unwrap();
        assert_eq!(
            port.text(),
            "{\"cmd\":\"READ_SCALED_SIG\",\"status\":\"OK\",\"args\":{\"num_tones\":1,\"len\":3,\"data_type\":\"0\",\"transferMode\":\"0\"}}\r\n\
             {\"data\":{\"SIG1\":[1.500000,-0.250000,0.000000]}}\r\n"
        );
    }

    #[test]
    fn ascii_integer_payloads() {
        let mut port = MockPort::new();
        send_payload(&mut port, &Samples::U16(&[0, 4095]), TransferMode::Ascii).unwrap();
        send_payload(&mut port, &Samples::Q15(&[-32768, 7]), TransferMode::Ascii).unwrap();
        send_payload(&mut port, &Samples::U16(&[]), TransferMode::Ascii).unwrap();
        assert_eq!(
            port.text(),
            "{\"data\":{\"SIG1\":[0,4095]}}\r\n{\"data\":{\"SIG1\":[-32768,7]}}\r\n{\"data\":{\"SIG1\":[]}}\r\n"
        );
    }

    #[test]
    fn binary_header_crc_covers_payload() {
        let codes: StdVec<u16> = (0..100u16).map(|i| i * 40).collect();
        let samples = Samples::U16(&codes);

        let mut port = MockPort::new();
        send_header(&mut port, "READ_FFT", 2, &samples, TransferMode::Binary).unwrap();
        let header_len = port.output.len();
        send_payload(&mut port, &samples, TransferMode::Binary).unwrap();

        let header = StdString::from_utf8(port.output[..header_len].to_vec()).unwrap();
        let payload = &port.output[header_len..];
        assert_eq!(payload.len(), 200);
        assert_eq!(&payload[..4], &[0, 0, 40, 0]);

        let expected = std::format!(
            "{{\"cmd\":\"READ_FFT\",\"status\":\"OK\",\"args\":{{\"num_tones\":2,\"len\":100,\"data_type\":\"1\",\"transferMode\":\"1\",\"crc\":{}}}}}\r\n",
            crc32(payload)
        );
        assert_eq!(header, expected);
    }

    #[test]
    fn block_transfer_header() {
        let mut port = MockPort::new();
        let tones = ToneSet::from_slices(&[1000, 5000], &[100, 200]);
        send_block_transfer_header(&mut port, "READ_GEN_SIG_XMD", &tones, 256).unwrap();
        assert_eq!(
            port.text(),
            "{\"cmd\":\"READ_GEN_SIG_XMD\",\"status\":\"OK\",\"args\":{\"num_tones\":2,\"len\":256,\"freqs\":[1000,5000],\"amps\":[100,200]}}\r\n"
        );
    }

    #[test]
    fn write_failure_ends_record() {
        let mut port = MockPort::failing_after(10);
        let samples = Samples::F32(&[0.0; 8]);
        assert_eq!(
            send_signal(&mut port, "READ_SCALED_SIG", 1, &samples, TransferMode::Ascii),
            Err(TransportError::Write)
        );
    }
}
