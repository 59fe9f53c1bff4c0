//! Print this crate's outputs for the inputs in crypto/tests/vectors.json.
//! Run with: cargo run -p signer-crypto --example gen_vectors
//!
//! The expected values in vectors.json come from the reference node; this prints what the
//! crate computes so a mismatch can be located field by field.

use protocol_codec::Base58Check;
use signer_crypto::poseidon::{Poseidon, Sponge};
use signer_crypto::{CryptoError, Field, PrivateKey, PublicKey};

const REFERENCE_PRIVATE_KEY: &str = "EKFKgDtU3rcuFTVSEpmpXSkukjmX4cKefYREi6Sdsk7E7wsT7KRw";
const REFERENCE_ADDRESS: &str = "B62qmfmZrxjfRHfnx1QJLHUyStQxSkqao9civMXPaymkknX5PCiZT7J";

fn main() -> Result<(), CryptoError> {
    for inputs in [[100, 0], [0, 0], [1, 1]] {
        let fields = inputs.map(Field::from_u64);
        println!("poseidon({inputs:?}) = {}", Poseidon::hash(&fields));
    }

    let private_key = PrivateKey::from_base58(REFERENCE_PRIVATE_KEY)?;
    let public_key = private_key.to_public_key()?;
    println!("scalar = {}", private_key.scalar());
    println!("public key = {} (x {}, odd {})", public_key.to_base58()?, public_key.x, public_key.is_odd);

    let decoded = PublicKey::from_base58(REFERENCE_ADDRESS)?;
    println!("{REFERENCE_ADDRESS}: x {}, odd {}", decoded.x, decoded.is_odd);
    println!("empty public key = {}", PublicKey::empty().to_base58()?);
    Ok(())
}
