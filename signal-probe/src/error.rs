//! Error types shared across the command pipeline.

/// Failures of the JSON tokenizer and typed accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JsonError {
    /// More tokens than [`MAX_JSON_TOKENS`](crate::constants::MAX_JSON_TOKENS).
    NoMemory,
    /// Unexpected character or mismatched bracket at the given byte offset.
    Invalid(usize),
    /// Input ended inside a string, primitive or container.
    Partial,
    /// The first token is not an object.
    NotAnObject,
    /// The requested key is not present in the root object.
    KeyNotFound,
    /// The value text does not fit the fixed conversion buffer.
    ValueTooLong,
    /// The value is not a decimal integer in range for the target type.
    InvalidFormat,
    /// The value token is not an array.
    NotAnArray,
    /// The array holds more elements than the caller can store.
    TooManyElements(usize),
}

/// Failure to write a framed record to the serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The port reported a write error; the record is incomplete.
    Write,
    /// A formatted field did not fit its staging buffer.
    Format,
}

/// Access to the scratch buffer in the wrong representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScratchError {
    /// The buffer currently holds a different representation.
    WrongRepresentation,
    /// Requested length exceeds [`MAX_SIG_LEN`](crate::constants::MAX_SIG_LEN).
    TooLong,
}

/// Reasons the strict block-transfer request parser rejects a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The command text is not a JSON object.
    InvalidJson(JsonError),
    /// A required field is missing or malformed.
    MissingOrInvalid(&'static str),
    /// `freqs`/`amps` lengths do not match `num_tones`.
    ToneMismatch,
    /// `len` exceeds the scratch buffer.
    TooManySamples,
}

/// Rejected transform request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FftError {
    /// Length is not a power of two between 16 and 4096.
    UnsupportedLength(usize),
    /// The magnitude output holds fewer than `N / 2` values.
    OutputTooShort,
}

/// Failure that ends a command handler early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    Transport(TransportError),
    Scratch(ScratchError),
}

impl From<TransportError> for CommandError {
    fn from(e: TransportError) -> Self {
        CommandError::Transport(e)
    }
}

impl From<ScratchError> for CommandError {
    fn from(e: ScratchError) -> Self {
        CommandError::Scratch(e)
    }
}
