//! Single-pass JSON tokenizer with a fixed token budget.
//!
//! The tokenizer does not build a tree or copy any text. It records, for each
//! value, its kind, byte range in the source and the index of its parent
//! token. Object keys are string tokens whose parent is the object; a key's
//! value is the token that follows it and has the key as parent.
//!
//! ```text
//! {"len":8,"freqs":[1,2]}
//! 0 Object   size 2  parent -
//! 1 String   "len"   parent 0
//! 2 Primitive 8      parent 1
//! 3 String   "freqs" parent 0
//! 4 Array    size 2  parent 3
//! 5 Primitive 1      parent 4
//! 6 Primitive 2      parent 4
//! ```

use heapless::Vec;

use crate::constants::MAX_JSON_TOKENS;
use crate::error::JsonError;

/// Token storage for one command.
pub type Tokens = Vec<Token, MAX_JSON_TOKENS>;

/// Marker for a container whose closing bracket has not been seen yet.
const OPEN: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenKind {
    Object,
    Array,
    /// Quoted string; the range excludes the quotes.
    String,
    /// Number, `true`, `false` or `null`.
    Primitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Number of direct children (keys for objects, elements for arrays,
    /// 1 for a key with a value).
    pub size: usize,
    pub parent: Option<usize>,
}

impl Token {
    /// Source text covered by this token.
    pub fn text<'a>(&self, json: &'a str) -> &'a str {
        json.get(self.start..self.end).unwrap_or("")
    }
}

/// Split `json` into tokens.
///
/// # Errors
///
/// - [`JsonError::NoMemory`] if more than [`MAX_JSON_TOKENS`] tokens are needed
/// - [`JsonError::Invalid`] on an unexpected character or mismatched bracket
/// - [`JsonError::Partial`] if the text ends inside a string, primitive or
///   container
pub fn tokenize(json: &str) -> Result<Tokens, JsonError> {
    let bytes = json.as_bytes();
    let mut tokens = Tokens::new();
    let mut toksuper: Option<usize> = None;
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        match c {
            b'{' | b'[' => {
                let kind = if c == b'{' { TokenKind::Object } else { TokenKind::Array };
                if let Some(sup) = toksuper {
                    // Containers cannot be object keys
                    if tokens[sup].kind == TokenKind::Object {
                        return Err(JsonError::Invalid(pos));
                    }
                    tokens[sup].size += 1;
                }
                push(&mut tokens, Token { kind, start: pos, end: OPEN, size: 0, parent: toksuper })?;
                toksuper = Some(tokens.len() - 1);
            }
            b'}' | b']' => {
                let kind = if c == b'}' { TokenKind::Object } else { TokenKind::Array };
                let mut idx = tokens.len().checked_sub(1).ok_or(JsonError::Invalid(pos))?;
                loop {
                    let tok = &mut tokens[idx];
                    if tok.end == OPEN {
                        if tok.kind != kind {
                            return Err(JsonError::Invalid(pos));
                        }
                        tok.end = pos + 1;
                        toksuper = tok.parent;
                        break;
                    }
                    idx = tok.parent.ok_or(JsonError::Invalid(pos))?;
                }
            }
            b'"' => {
                let end = scan_string(bytes, pos)?;
                let parent = toksuper;
                if let Some(sup) = parent {
                    tokens[sup].size += 1;
                }
                push(&mut tokens, Token {
                    kind: TokenKind::String,
                    start: pos + 1,
                    end,
                    size: 0,
                    parent,
                })?;
                pos = end;
            }
            b'\t' | b'\r' | b'\n' | b' ' => {}
            b':' => {
                toksuper = tokens.len().checked_sub(1);
            }
            b',' => {
                if let Some(sup) = toksuper {
                    let kind = tokens[sup].kind;
                    if kind != TokenKind::Array && kind != TokenKind::Object {
                        toksuper = tokens[sup].parent;
                    }
                }
            }
            b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                if let Some(sup) = toksuper {
                    // Primitives cannot be object keys
                    if tokens[sup].kind == TokenKind::Object {
                        return Err(JsonError::Invalid(pos));
                    }
                }
                let end = scan_primitive(bytes, pos)?;
                if let Some(sup) = toksuper {
                    tokens[sup].size += 1;
                }
                push(&mut tokens, Token {
                    kind: TokenKind::Primitive,
                    start: pos,
                    end,
                    size: 0,
                    parent: toksuper,
                })?;
                pos = end - 1;
            }
            _ => return Err(JsonError::Invalid(pos)),
        }
        pos += 1;
    }

    if tokens.iter().any(|t| t.end == OPEN) {
        return Err(JsonError::Partial);
    }

    Ok(tokens)
}

fn push(tokens: &mut Tokens, token: Token) -> Result<(), JsonError> {
    tokens.push(token).map_err(|_| JsonError::NoMemory)
}

/// Returns the offset of the closing quote of the string opened at `open`.
fn scan_string(bytes: &[u8], open: usize) -> Result<usize, JsonError> {
    let mut pos = open + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => return Ok(pos),
            b'\\' => {
                pos += 1;
                match bytes.get(pos) {
                    Some(b'"' | b'/' | b'\\' | b'b' | b'f' | b'r' | b'n' | b't') => {}
                    Some(b'u') => {
                        for _ in 0..4 {
                            pos += 1;
                            match bytes.get(pos) {
                                Some(h) if h.is_ascii_hexdigit() => {}
                                Some(_) => return Err(JsonError::Invalid(pos)),
                                None => return Err(JsonError::Partial),
                            }
                        }
                    }
                    Some(_) => return Err(JsonError::Invalid(pos)),
                    None => return Err(JsonError::Partial),
                }
            }
            _ => {}
        }
        pos += 1;
    }
    Err(JsonError::Partial)
}

/// Returns the offset one past the primitive starting at `start`.
fn scan_primitive(bytes: &[u8], start: usize) -> Result<usize, JsonError> {
    let mut pos = start;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\t' | b'\r' | b'\n' | b' ' | b',' | b']' | b'}' | b':' => return Ok(pos),
            c if !(32..127).contains(&c) => return Err(JsonError::Invalid(pos)),
            _ => pos += 1,
        }
    }
    // A primitive can only end the text when it is the whole document
    Err(JsonError::Partial)
}
