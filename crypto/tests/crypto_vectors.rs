//! Reference vectors taken from the network's own tooling.
//!
//! `tests/vectors.json` is checked in and never rewritten by the tests: Poseidon outputs of the
//! kimchi sponge, a reference keypair, and a public key decoded by the reference node.

use std::fs;
use std::path::Path;

use hex::encode;
use protocol_codec::{Base58Check, Binable};
use serde::Deserialize;
use signer_crypto::hashes::blake2_256;
use signer_crypto::keys::PUBLIC_KEY_BYTES;
use signer_crypto::poseidon::{Poseidon, Sponge};
use signer_crypto::signature::{
    sign, sign_field_element, sign_string, verify, verify_field_element, verify_string,
};
use signer_crypto::{Field, HashInput, NetworkId, PrivateKey, PublicKey};

#[derive(Deserialize)]
struct PoseidonVector {
    inputs: Vec<String>,
    hash: String,
}

#[derive(Deserialize)]
struct KeypairVector {
    private_key: String,
    scalar: String,
    public_key: String,
    x: String,
    is_odd: bool,
}

#[derive(Deserialize)]
struct PublicKeyVector {
    address: String,
    x: String,
    is_odd: bool,
}

#[derive(Deserialize)]
struct CryptoVectors {
    poseidon: Vec<PoseidonVector>,
    keypair: KeypairVector,
    public_key: PublicKeyVector,
    empty_public_key: String,
    blake2b_256_abc: String,
}

fn load_vectors() -> CryptoVectors {
    let path = Path::new("tests/vectors.json");
    let contents = fs::read_to_string(path).expect("vectors.json readable");
    serde_json::from_str(&contents).expect("valid json vectors")
}

fn field(text: &str) -> Field {
    text.parse().expect("decimal field element")
}

#[test]
fn poseidon_kimchi_vectors() {
    let vectors = load_vectors();
    assert!(!vectors.poseidon.is_empty());
    for vector in &vectors.poseidon {
        let inputs: Vec<Field> = vector.inputs.iter().map(|x| field(x)).collect();
        assert_eq!(
            Poseidon::hash(&inputs).to_string(),
            vector.hash,
            "poseidon({:?})",
            vector.inputs
        );
    }
}

#[test]
fn reference_keypair_derives() {
    let vectors = load_vectors().keypair;
    let private_key = PrivateKey::from_base58(&vectors.private_key).expect("private key decodes");
    assert_eq!(private_key.scalar().to_string(), vectors.scalar);
    assert_eq!(private_key.to_base58().unwrap(), vectors.private_key);

    let public_key = private_key.to_public_key().unwrap();
    assert_eq!(public_key.x, field(&vectors.x));
    assert_eq!(public_key.is_odd, vectors.is_odd);
    assert_eq!(public_key.to_base58().unwrap(), vectors.public_key);
}

#[test]
fn reference_public_key_round_trips() {
    let vectors = load_vectors().public_key;
    let public_key = PublicKey::from_base58(&vectors.address).expect("address decodes");
    assert_eq!(public_key.x, field(&vectors.x));
    assert_eq!(public_key.is_odd, vectors.is_odd);
    assert_eq!(public_key.to_base58().unwrap(), vectors.address);
    assert_eq!(public_key.to_bytes().unwrap().len(), PUBLIC_KEY_BYTES);
    assert!(public_key.to_group().is_ok());
}

#[test]
fn empty_public_key_encoding() {
    let vectors = load_vectors();
    assert_eq!(PublicKey::empty().to_base58().unwrap(), vectors.empty_public_key);
}

#[test]
fn blake2b_256_known_answer() {
    let vectors = load_vectors();
    assert_eq!(encode(blake2_256(b"abc")), vectors.blake2b_256_abc);
}

#[test]
fn reference_key_signs_on_every_network() {
    let vectors = load_vectors().keypair;
    let private_key = PrivateKey::from_base58(&vectors.private_key).unwrap();
    let public_key = PublicKey::from_base58(&vectors.public_key).unwrap();
    let packed = HashInput::from_fields(vec![Field::from_u64(7)])
        .append(HashInput::from_packed(Field::from_u64(1), 1))
        .append(HashInput::from_packed(Field::from_u64(0xdead_beef), 32));

    for network in [NetworkId::Mainnet, NetworkId::Testnet, NetworkId::Custom("zeko".into())] {
        let signature = sign(&packed, &private_key, &network).unwrap();
        assert!(verify(&signature, &packed, &public_key, &network));
        assert_eq!(sign(&packed, &private_key, &network).unwrap(), signature);

        let signature = sign_field_element(Field::from_u64(42), &private_key, &network).unwrap();
        assert!(verify_field_element(&signature, Field::from_u64(42), &public_key, &network));

        let signature = sign_string("hello", &private_key, &network).unwrap();
        assert!(verify_string(&signature, "hello", &public_key, &network));
        assert!(!verify_string(&signature, "hellO", &public_key, &network));
    }
}
