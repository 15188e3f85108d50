//! Typed lookups on a tokenized JSON object.
//!
//! Only top-level keys are visible: a key matches when it is a string token
//! whose parent is the root object. Values are converted as decimal integers
//! through a bounded buffer, so oversized text fails with
//! [`JsonError::ValueTooLong`] instead of being truncated.
//!
//! On failure the caller's variable is left untouched; every getter returns a
//! `Result` and the caller decides on its fallback.

use core::str::FromStr;

use heapless::Vec;

use super::tokenizer::{tokenize, Token, TokenKind, Tokens};
use crate::error::JsonError;

/// Conversion buffer for `u16` values and for every array element.
const SHORT_BUF: usize = 16;
/// Conversion buffer for `u32` values.
const LONG_BUF: usize = 20;

/// A command line parsed as a JSON object.
pub struct JsonObject<'a> {
    text: &'a str,
    tokens: Tokens,
}

impl<'a> JsonObject<'a> {
    /// Tokenize `text` and require the first token to be an object.
    pub fn parse(text: &'a str) -> Result<Self, JsonError> {
        let tokens = tokenize(text)?;
        match tokens.first() {
            Some(tok) if tok.kind == TokenKind::Object => Ok(JsonObject { text, tokens }),
            _ => Err(JsonError::NotAnObject),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether the root object has a key named `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.value_index(key).is_ok()
    }

    /// Raw text of a string value (escape sequences are not decoded).
    pub fn get_str(&self, key: &str) -> Result<&'a str, JsonError> {
        let tok = &self.tokens[self.value_index(key)?];
        if tok.kind != TokenKind::String {
            return Err(JsonError::InvalidFormat);
        }
        Ok(tok.text(self.text))
    }

    pub fn get_u16(&self, key: &str) -> Result<u16, JsonError> {
        let tok = &self.tokens[self.value_index(key)?];
        parse_integer(tok.text(self.text), SHORT_BUF)
    }

    pub fn get_u32(&self, key: &str) -> Result<u32, JsonError> {
        let tok = &self.tokens[self.value_index(key)?];
        parse_integer(tok.text(self.text), LONG_BUF)
    }

    /// Read an array of at most `N` integers.
    ///
    /// Fails with [`JsonError::TooManyElements`] (carrying the actual count)
    /// when the array is longer than `N`.
    pub fn get_array_u16<const N: usize>(&self, key: &str) -> Result<Vec<u16, N>, JsonError> {
        self.get_array(key, false).map(|(values, _)| values)
    }

    pub fn get_array_u32<const N: usize>(&self, key: &str) -> Result<Vec<u32, N>, JsonError> {
        self.get_array(key, false).map(|(values, _)| values)
    }

    /// Read the first `N` elements of an array of any length.
    ///
    /// Returns the values and the element count of the original array.
    pub fn get_array_u16_clipped<const N: usize>(
        &self,
        key: &str,
    ) -> Result<(Vec<u16, N>, usize), JsonError> {
        self.get_array(key, true)
    }

    pub fn get_array_u32_clipped<const N: usize>(
        &self,
        key: &str,
    ) -> Result<(Vec<u32, N>, usize), JsonError> {
        self.get_array(key, true)
    }

    fn get_array<T: FromStr, const N: usize>(
        &self,
        key: &str,
        clip: bool,
    ) -> Result<(Vec<T, N>, usize), JsonError> {
        let index = self.value_index(key)?;
        let array = &self.tokens[index];
        if array.kind != TokenKind::Array {
            return Err(JsonError::NotAnArray);
        }
        if array.size > N && !clip {
            return Err(JsonError::TooManyElements(array.size));
        }

        let mut values = Vec::new();
        let elements = self
            .tokens
            .iter()
            .skip(index + 1)
            .take(array.size.min(N));
        for tok in elements {
            // Nested containers shift the element tokens
            if tok.parent != Some(index) || tok.kind == TokenKind::Array || tok.kind == TokenKind::Object {
                return Err(JsonError::InvalidFormat);
            }
            let value = parse_integer(tok.text(self.text), SHORT_BUF)?;
            values.push(value).map_err(|_| JsonError::TooManyElements(array.size))?;
        }
        Ok((values, array.size))
    }

    /// Index of the value token belonging to the top-level `key`.
    fn value_index(&self, key: &str) -> Result<usize, JsonError> {
        self.tokens
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, tok)| {
                tok.kind == TokenKind::String && tok.parent == Some(0) && tok.text(self.text) == key
            })
            .map(|(i, _)| i + 1)
            .filter(|&v| self.tokens.get(v).is_some_and(|tok| tok.parent == Some(v - 1)))
            .ok_or(JsonError::KeyNotFound)
    }
}

/// Convert decimal text as if copied into a `buf_len`-byte C buffer
/// (one byte reserved for the terminator).
fn parse_integer<T: FromStr>(text: &str, buf_len: usize) -> Result<T, JsonError> {
    if text.len() >= buf_len {
        return Err(JsonError::ValueTooLong);
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) || text.is_empty() {
        return Err(JsonError::InvalidFormat);
    }
    text.parse().map_err(|_| JsonError::InvalidFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_top_level_integers() {
        let obj = JsonObject::parse(r#"{"num_tones":2,"len":8}"#).unwrap();
        assert_eq!(obj.get_u16("num_tones"), Ok(2));
        assert_eq!(obj.get_u16("len"), Ok(8));
        assert_eq!(obj.get_u32("len"), Ok(8));
    }

    #[test]
    fn missing_key_leaves_fallback_to_caller() {
        let obj = JsonObject::parse(r#"{"num_tones":2,"len":8}"#).unwrap();
        let mut sampl_rate = 1_024_000u32;
        if let Ok(v) = obj.get_u32("sampl_rate") {
            sampl_rate = v;
        }
        assert_eq!(obj.get_u32("sampl_rate"), Err(JsonError::KeyNotFound));
        assert_eq!(sampl_rate, 1_024_000);
    }

    #[test]
    fn nested_keys_are_not_visible() {
        let obj = JsonObject::parse(r#"{"args":{"len":8},"x":"len"}"#).unwrap();
        assert_eq!(obj.get_u16("len"), Err(JsonError::KeyNotFound));
        assert!(obj.contains_key("x"));
        assert_eq!(obj.get_str("x"), Ok("len"));
    }

    #[test]
    fn non_numeric_and_out_of_range_values() {
        let obj = JsonObject::parse(r#"{"a":"abc","b":70000,"c":-1,"d":1.5,"e":true}"#).unwrap();
        assert_eq!(obj.get_u16("a"), Err(JsonError::InvalidFormat));
        assert_eq!(obj.get_u16("b"), Err(JsonError::InvalidFormat));
        assert_eq!(obj.get_u32("b"), Ok(70000));
        assert_eq!(obj.get_u16("c"), Err(JsonError::InvalidFormat));
        assert_eq!(obj.get_u16("d"), Err(JsonError::InvalidFormat));
        assert_eq!(obj.get_u16("e"), Err(JsonError::InvalidFormat));
    }

    #[test]
    fn oversized_value_text() {
        let obj = JsonObject::parse(r#"{"a":0000000000000001,"b":1234567890123456789}"#).unwrap();
        // 16 characters do not fit the 16-byte buffer
        assert_eq!(obj.get_u16("a"), Err(JsonError::ValueTooLong));
        // 19 digits fit the 20-byte buffer but overflow u32
        assert_eq!(obj.get_u32("b"), Err(JsonError::InvalidFormat));
    }

    #[test]
    fn reads_arrays() {
        let obj = JsonObject::parse(r#"{"freqs":[1000,250000],"amps":[100,200]}"#).unwrap();
        let freqs: Vec<u32, 4> = obj.get_array_u32("freqs").unwrap();
        assert_eq!(freqs.as_slice(), &[1000, 250_000]);
        let amps: Vec<u16, 4> = obj.get_array_u16("amps").unwrap();
        assert_eq!(amps.as_slice(), &[100, 200]);
    }

    #[test]
    fn array_errors() {
        let obj = JsonObject::parse(r#"{"a":[1,2,3],"b":5,"c":[1,"x"],"d":[[1],2]}"#).unwrap();
        assert_eq!(obj.get_array_u16::<2>("a"), Err(JsonError::TooManyElements(3)));
        assert_eq!(obj.get_array_u16::<4>("b"), Err(JsonError::NotAnArray));
        assert_eq!(obj.get_array_u16::<4>("c"), Err(JsonError::InvalidFormat));
        assert_eq!(obj.get_array_u16::<4>("d"), Err(JsonError::InvalidFormat));
        assert_eq!(obj.get_array_u16::<4>("z"), Err(JsonError::KeyNotFound));
    }

    #[test]
    fn clipped_array_reports_original_length() {
        let obj = JsonObject::parse(r#"{"a":[1,2,3,4,5]}"#).unwrap();
        let (values, count) = obj.get_array_u16_clipped::<3>("a").unwrap();
        assert_eq!(values.as_slice(), &[1, 2, 3]);
        assert_eq!(count, 5);
    }

    #[test]
    fn empty_array() {
        let obj = JsonObject::parse(r#"{"a":[]}"#).unwrap();
        assert!(obj.get_array_u32::<4>("a").unwrap().is_empty());
    }

    #[test]
    fn root_must_be_an_object() {
        assert_eq!(JsonObject::parse("[1,2]").err(), Some(JsonError::NotAnObject));
        assert_eq!(JsonObject::parse("").err(), Some(JsonError::NotAnObject));
        assert_eq!(JsonObject::parse("{\"a\":").err(), Some(JsonError::Partial));
    }

    #[test]
    fn key_without_value_does_not_borrow_the_next_entry() {
        let obj = JsonObject::parse(r#"{"len","num_tones":3}"#).unwrap();
        assert_eq!(obj.get_u16("len"), Err(JsonError::KeyNotFound));
        assert_eq!(obj.get_str("len"), Err(JsonError::KeyNotFound));
        assert_eq!(obj.get_u16("num_tones"), Ok(3));
    }

    #[test]
    fn reads_command_name() {
        let obj = JsonObject::parse(r#"{"cmd":"READ_FFT","len":64}"#).unwrap();
        assert_eq!(obj.get_str("cmd"), Ok("READ_FFT"));
        assert_eq!(obj.get_str("len"), Err(JsonError::InvalidFormat));
    }
}
