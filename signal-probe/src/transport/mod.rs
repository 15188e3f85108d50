//! Inline records on the serial link.
//!
//! | Record | Function | Shape |
//! |--------|----------|-------|
//! | Response | [`send_response`] | `<RESP:CMD\|STATUS\|PAYLOAD>` |
//! | Version | [`send_version`] | `{"cmd":..,"status":"OK","data":..}` |
//! | Signal header | [`send_header`] | JSON line, CRC-32 in binary mode |
//! | Signal payload | [`send_payload`] | `{"data":{"SIG1":[..]}}` or raw LE bytes |
//! | Diagnostic | [`debug`] | `[DBG] ...` |
//!
//! Bulk transfers that need acknowledgement use [`crate::xmodem`] instead.

pub mod crc;
pub mod framing;

pub use framing::{
    debug, prompt, send_block_transfer_header, send_header, send_payload, send_response,
    send_signal, send_version, write_fmt, Status,
};
