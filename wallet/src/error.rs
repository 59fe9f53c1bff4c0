use thiserror::Error;

use protocol_codec::CodecError;
use signer_crypto::CryptoError;
use signer_transaction::TransactionError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("cryptography error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("encoding error: {0}")]
    Codec(#[from] CodecError),

    #[error("fee {fee} is below the minimum of {minimum} for this command")]
    FeeTooLow { fee: u64, minimum: u64 },

    #[error("public key not derivable from private key")]
    KeypairMismatch,

    #[error("invalid {kind}: {input}")]
    InvalidInput { kind: &'static str, input: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}
