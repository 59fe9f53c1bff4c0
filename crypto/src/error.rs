use protocol_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid length: expected {expected} bytes, found {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("{value} is not a canonical {kind} element")]
    NonCanonical { kind: &'static str, value: String },

    #[error("invalid decimal {kind} string: {input}")]
    InvalidDecimal { kind: &'static str, input: String },

    #[error("point ({x}, {y}) is not on the curve")]
    NotOnCurve { x: String, y: String },

    #[error("point at infinity has no affine form")]
    PointAtInfinity,

    #[error("public key x-coordinate {0} is not a valid group element")]
    InvalidPublicKey(String),

    #[error("invalid key")]
    InvalidKey,

    #[error("sign: derived nonce is 0")]
    ZeroNonce,

    #[error("prefix {prefix:?} is too long: {len} bytes, at most 31 fit in a field element")]
    PrefixTooLong { prefix: String, len: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
