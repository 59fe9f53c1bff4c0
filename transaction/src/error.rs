use protocol_codec::CodecError;
use signer_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid call depth at index {index}: {depth} after {previous:?}")]
    InvalidCallDepth {
        index: usize,
        previous: Option<i64>,
        depth: i64,
    },

    #[error("Invalid authorization kind: Only one of `isProved` and `isSigned` may be true.")]
    ProvedAndSigned,

    #[error("Invalid authorization kind: If `isProved` is false, verification key hash must be {expected}, got {actual}")]
    VerificationKeyHashMismatch { expected: String, actual: String },

    #[error("memo is {0} bytes, at most 32 are allowed")]
    MemoTooLong(usize),

    #[error("invalid memo encoding: {0}")]
    InvalidMemo(String),

    #[error("private key belongs to {actual}, the fee payer is {expected}")]
    SignerMismatch { expected: String, actual: String },

    #[error("token symbol {0:?} is longer than 6 bytes")]
    TokenSymbolTooLong(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
