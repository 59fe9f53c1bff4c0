//! Client-side signing over the Pallas signer: key management, JSON payment and delegation
//! signing, zkApp fee-payer signing with the fee floor, transaction hashes, and conversion of
//! rosetta signed transactions.

pub mod client;
pub mod config;
pub mod error;
pub mod json;
pub mod keys;
pub mod rosetta;

pub use client::{public_key_from_raw, public_key_to_raw, Client};
pub use config::SignerConfig;
pub use error::WalletError;
pub use json::{
    Message, Payment, SignableData, SignatureJson, Signed, SignedData, StakeDelegation,
};
pub use keys::{derive_public_key, gen_keys, verify_keypair, KeypairStrings};
