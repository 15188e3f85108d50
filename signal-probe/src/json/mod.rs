//! Minimal JSON support for flat command objects.
//!
//! - [`tokenizer`]: jsmn-style single-pass tokenizer, no allocation
//! - [`access`]: [`JsonObject`] with typed getters for top-level keys

pub mod access;
pub mod tokenizer;

pub use access::JsonObject;
pub use tokenizer::{tokenize, Token, TokenKind, Tokens};
