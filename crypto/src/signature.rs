//! Deterministic Schnorr signatures over Pallas with network-scoped domain separation.
//!
//! Two regimes share the same equation and differ in how messages are hashed:
//! the current one packs a [`HashInput`] and hashes with [`Poseidon`], the legacy one flattens a
//! [`HashInputLegacy`] to bits and hashes with [`PoseidonLegacy`].
//!
//! Signing: `k' = nonce(message, key, network)`, `R = k'G`, `k = ±k'` so that `R.y` is even,
//! `e = H(prefix(network), message ++ [pk.x, pk.y, R.x])`, `s = k + e·d`, signature `(R.x, s)`.
//! Verification recomputes `R = sG - e·pk` and accepts iff `R` is finite, `R.y` is even and
//! `R.x = r`.

use protocol_codec::{
    binable_record, bits_to_bytes, bytes_to_bits, version_bytes, Base58Check, Binable, CodecError,
    Versioned,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::Group;
use crate::error::CryptoError;
use crate::field::{Field, Scalar};
use crate::hash_input::{HashInput, HashInputLegacy};
use crate::hashes::blake2_256;
use crate::keys::{PrivateKey, PublicKey, KEY_VERSION};
use crate::network::NetworkId;
use crate::poseidon::{Poseidon, PoseidonLegacy, Sponge};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "field")]
    pub r: Field,
    #[serde(rename = "scalar")]
    pub s: Scalar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SignatureRecord {
    r: Field,
    s: Scalar,
}

binable_record!(SignatureRecord { r, s });

impl Signature {
    /// Placeholder used where a signature slot must be filled before signing.
    pub fn dummy() -> Self {
        Self {
            r: Field::ONE,
            s: Scalar::ONE,
        }
    }
}

impl Binable for Signature {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        Versioned::<_, KEY_VERSION>(SignatureRecord {
            r: self.r,
            s: self.s,
        })
        .write_bytes(out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (Versioned(SignatureRecord { r, s }), end) =
            Versioned::<SignatureRecord, KEY_VERSION>::read_bytes(bytes, offset)?;
        Ok((Self { r, s }, end))
    }
}

impl Base58Check for Signature {
    const VERSION_BYTE: u8 = version_bytes::SIGNATURE;
}

fn scalar_from_digest(mut bytes: [u8; 32]) -> Scalar {
    // q > 2^254, so clearing the top two bits yields a canonical scalar
    bytes[31] &= 0x3f;
    Scalar::from_le_bytes_mod_order(&bytes)
}

/// Nonce for the current regime.
///
/// The message is extended with the public key, the private key read as a base-field element
/// and the network id chunk, packed to fields, serialized as 255 bits per field and hashed with
/// BLAKE2b-256.
pub fn derive_nonce(
    message: &HashInput,
    public_key: &Group,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Scalar {
    let d = Field::from_scalar_mod_order(private_key.scalar());
    let input = message.clone().append(HashInput {
        fields: vec![public_key.x, public_key.y, d],
        packed: vec![network.hash_input()],
    });
    let bits: Vec<bool> = input.pack_to_fields().iter().flat_map(Field::to_bits).collect();
    scalar_from_digest(blake2_256(&bits_to_bytes(&bits)))
}

/// Challenge `e` for the current regime.
pub fn hash_message(
    message: &HashInput,
    public_key: &Group,
    r: Field,
    network: &NetworkId,
) -> Result<Scalar, CryptoError> {
    let input = message.clone().append(HashInput::from_fields(vec![
        public_key.x,
        public_key.y,
        r,
    ]));
    let e = Poseidon::hash_with_prefix(&network.signature_prefix(), &input.pack_to_fields())?;
    Ok(Scalar::from_field(e))
}

fn finish_signature(
    k_prime: Scalar,
    private_key: &PrivateKey,
    challenge: impl FnOnce(Field) -> Result<Scalar, CryptoError>,
) -> Result<Signature, CryptoError> {
    if k_prime.is_zero() {
        return Err(CryptoError::ZeroNonce);
    }
    let r_point = Group::generator().scale(k_prime)?;
    let k = if r_point.y.is_even() { k_prime } else { -k_prime };
    let e = challenge(r_point.x)?;
    Ok(Signature {
        r: r_point.x,
        s: k + e * private_key.scalar(),
    })
}

fn check_equation(
    signature: &Signature,
    public_key: &Group,
    e: Scalar,
) -> Result<bool, CryptoError> {
    let s_g = Group::generator().to_projective()? * signature.s.0;
    let e_pk = public_key.to_projective()? * e.0;
    let r_point = Group::from_projective(&(s_g - e_pk))?;
    Ok(r_point.y.is_even() && r_point.x == signature.r)
}

pub fn sign(
    message: &HashInput,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    let public_key = private_key.to_group()?;
    let k_prime = derive_nonce(message, &public_key, private_key, network);
    let signature = finish_signature(k_prime, private_key, |r| {
        hash_message(message, &public_key, r, network)
    })?;
    debug!(%network, "signed message");
    Ok(signature)
}

/// Returns `false` for any signature that does not verify, including undecompressible public
/// keys and challenges that land on the point at infinity.
pub fn verify(
    signature: &Signature,
    message: &HashInput,
    public_key: &PublicKey,
    network: &NetworkId,
) -> bool {
    let outcome = public_key.to_group().and_then(|pk| {
        let e = hash_message(message, &pk, signature.r, network)?;
        check_equation(signature, &pk, e)
    });
    match outcome {
        Ok(valid) => {
            debug!(%network, valid, "verified signature");
            valid
        }
        Err(err) => {
            debug!(%network, %err, "signature verification failed");
            false
        }
    }
}

/// Sign a single field element, e.g. a transaction commitment.
pub fn sign_field_element(
    message: Field,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    sign(&HashInput::from_fields(vec![message]), private_key, network)
}

pub fn verify_field_element(
    signature: &Signature,
    message: Field,
    public_key: &PublicKey,
    network: &NetworkId,
) -> bool {
    verify(
        signature,
        &HashInput::from_fields(vec![message]),
        public_key,
        network,
    )
}

/// Nonce for the legacy regime: bits of the message, public key, private key and network byte,
/// hashed with BLAKE2b-256.
pub fn derive_nonce_legacy(
    message: &HashInputLegacy,
    public_key: &Group,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Scalar {
    let mut bits = private_key.scalar().to_bits();
    bits.extend(bytes_to_bits(&[network.legacy_id_byte()]));
    let input = message.clone().append(HashInputLegacy {
        fields: vec![public_key.x, public_key.y],
        bits,
    });
    scalar_from_digest(blake2_256(&bits_to_bytes(&input.to_bits())))
}

/// Challenge `e` for the legacy regime.
pub fn hash_message_legacy(
    message: &HashInputLegacy,
    public_key: &Group,
    r: Field,
    network: &NetworkId,
) -> Result<Scalar, CryptoError> {
    let input = message.clone().append(HashInputLegacy::from_fields(vec![
        public_key.x,
        public_key.y,
        r,
    ]));
    let e = PoseidonLegacy::hash_with_prefix(
        &network.signature_prefix(),
        &input.pack_to_fields_legacy(),
    )?;
    Ok(Scalar::from_field(e))
}

pub fn sign_legacy(
    message: &HashInputLegacy,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    let public_key = private_key.to_group()?;
    let k_prime = derive_nonce_legacy(message, &public_key, private_key, network);
    let signature = finish_signature(k_prime, private_key, |r| {
        hash_message_legacy(message, &public_key, r, network)
    })?;
    debug!(%network, "signed legacy message");
    Ok(signature)
}

pub fn verify_legacy(
    signature: &Signature,
    message: &HashInputLegacy,
    public_key: &PublicKey,
    network: &NetworkId,
) -> bool {
    let outcome = public_key.to_group().and_then(|pk| {
        let e = hash_message_legacy(message, &pk, signature.r, network)?;
        check_equation(signature, &pk, e)
    });
    match outcome {
        Ok(valid) => {
            debug!(%network, valid, "verified legacy signature");
            valid
        }
        Err(err) => {
            debug!(%network, %err, "legacy signature verification failed");
            false
        }
    }
}

/// Legacy input for an arbitrary string: each UTF-8 byte, most significant bit first.
pub fn string_to_input(message: &str) -> HashInputLegacy {
    let bits = message
        .as_bytes()
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect();
    HashInputLegacy::from_bits(bits)
}

pub fn sign_string(
    message: &str,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    sign_legacy(&string_to_input(message), private_key, network)
}

pub fn verify_string(
    signature: &Signature,
    message: &str,
    public_key: &PublicKey,
    network: &NetworkId,
) -> bool {
    verify_legacy(signature, &string_to_input(message), public_key, network)
}
