use thiserror::Error;

/// Failures raised while encoding or decoding wire values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("readBytes: offset {offset} must be within bytes length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("readBytes returned offset {end}, expected a value in [{start}, {len}]")]
    InvalidReadOffset { start: usize, end: usize, len: usize },
    #[error("insufficient bytes: needed {needed}, {available} available")]
    InsufficientBytes { needed: usize, available: usize },
    #[error("fromBytes: input bytes left over ({consumed} of {total} consumed)")]
    LeftoverBytes { consumed: usize, total: usize },
    #[error("fromBytes: Invalid version byte. Expected {expected}, got {actual}.")]
    VersionMismatch { expected: u8, actual: u8 },
    #[error("int{bits} out of range, got {value}")]
    IntOutOfRange { bits: u32, value: String },
    #[error("uint{bits} out of range, got {value}")]
    UintOutOfRange { bits: u32, value: String },
    #[error("binable integer: invalid start byte {0:#04x}")]
    InvalidStartByte(u8),
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    #[error("unknown variant tag {tag}, expected one of {variants} variants")]
    UnknownTag { tag: u8, variants: u8 },
    #[error("string of {0} bytes does not fit a one-byte length prefix")]
    StringTooLong(usize),
    #[error("string bytes are not valid utf-8")]
    InvalidUtf8,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid base58: {0}")]
    InvalidBase58(String),
    #[error("invalid base58 checksum")]
    InvalidChecksum,
    #[error("invalid base58 version byte. Expected {expected}, got {actual}")]
    Base58VersionMismatch { expected: u8, actual: u8 },
}
