use core::fmt;
use core::sync::atomic::{compiler_fence, Ordering};

use protocol_codec::{
    binable_record, version_bytes, Base58Check, Binable, Checked, CodecError, Validate, Versioned,
};
use rand::{CryptoRng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::curve::Group;
use crate::deterministic::wide_digest;
use crate::error::CryptoError;
use crate::field::{Field, Scalar};
use crate::hash_input::{HashInput, HashInputLegacy, ToInput, ToInputLegacy};

/// Version number carried by the binary encodings of keys and signatures.
pub const KEY_VERSION: u8 = 1;

/// A compressed curve point: the x-coordinate and the parity of y.
///
/// `x = 0` is not on the curve and stands for the empty key. It encodes, but does not decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub x: Field,
    pub is_odd: bool,
}

impl PublicKey {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_zero()
    }

    pub fn from_group(point: &Group) -> Self {
        Self {
            x: point.x,
            is_odd: point.y.is_odd(),
        }
    }

    /// Decompress to a curve point.
    pub fn to_group(&self) -> Result<Group, CryptoError> {
        Group::decompress(self.x, self.is_odd)
    }
}

/// Wire form of a public key: `version | version | x (32 bytes LE) | is_odd`. The
/// x-coordinate carries its own version byte inside the versioned record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CompressedPoint {
    x: Versioned<Field, KEY_VERSION>,
    is_odd: bool,
}

binable_record!(CompressedPoint { x, is_odd });

impl Validate for CompressedPoint {
    fn validate(&self) -> Result<(), CodecError> {
        let Versioned(x) = self.x;
        if Group::curve_rhs(x).sqrt().is_some() {
            Ok(())
        } else {
            Err(CodecError::Validation(format!(
                "PublicKey: {x} is not a valid group element"
            )))
        }
    }
}

type PublicKeyEncoding = Versioned<Checked<CompressedPoint>, KEY_VERSION>;

/// Encoded length of a public key.
pub const PUBLIC_KEY_BYTES: usize = 35;

impl Binable for PublicKey {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let encoding: PublicKeyEncoding = Versioned(Checked(CompressedPoint {
            x: Versioned(self.x),
            is_odd: self.is_odd,
        }));
        encoding.write_bytes(out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (Versioned(Checked(point)), end) = PublicKeyEncoding::read_bytes(bytes, offset)?;
        let Versioned(x) = point.x;
        Ok((
            Self {
                x,
                is_odd: point.is_odd,
            },
            end,
        ))
    }
}

impl Base58Check for PublicKey {
    const VERSION_BYTE: u8 = version_bytes::PUBLIC_KEY;
}

impl ToInput for PublicKey {
    fn to_input(&self) -> HashInput {
        HashInput {
            fields: vec![self.x],
            packed: vec![(Field::from_bool(self.is_odd), 1)],
        }
    }
}

impl ToInputLegacy for PublicKey {
    fn to_input_legacy(&self) -> HashInputLegacy {
        HashInputLegacy {
            fields: vec![self.x],
            bits: vec![self.is_odd],
        }
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_base58().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base58(&text).map_err(de::Error::custom)
    }
}

/// A signing key. Cleared from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    pub fn from_scalar(scalar: Scalar) -> Result<Self, CryptoError> {
        if scalar.is_zero() {
            return Err(CryptoError::InvalidKey);
        }
        Ok(Self(scalar))
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let scalar = Scalar(<pasta_curves::Fq as ff::Field>::random(&mut *rng));
            if !scalar.is_zero() {
                return Self(scalar);
            }
        }
    }

    /// Derive a key from seed material by SHA-256 expansion and reduction modulo `q`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        let wide = wide_digest(b"signer-private-key", seed);
        Self::from_scalar(Scalar::from_le_bytes_mod_order(&wide))
    }

    pub fn scalar(&self) -> Scalar {
        self.0
    }

    pub fn to_group(&self) -> Result<Group, CryptoError> {
        Group::generator().scale(self.0)
    }

    pub fn to_public_key(&self) -> Result<PublicKey, CryptoError> {
        Ok(PublicKey::from_group(&self.to_group()?))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.0 = Scalar::ZERO;
        compiler_fence(Ordering::SeqCst);
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for PrivateKey {}

impl Binable for PrivateKey {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        Versioned::<Scalar, KEY_VERSION>(self.0).write_bytes(out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (Versioned(scalar), end) = Versioned::<Scalar, KEY_VERSION>::read_bytes(bytes, offset)?;
        let key = Self::from_scalar(scalar).map_err(|err| CodecError::Validation(err.to_string()))?;
        Ok((key, end))
    }
}

impl Base58Check for PrivateKey {
    const VERSION_BYTE: u8 = version_bytes::PRIVATE_KEY;
}

/// A private key with its derived public key.
#[derive(Clone, Debug)]
pub struct Keypair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl Keypair {
    pub fn from_private_key(private_key: PrivateKey) -> Result<Self, CryptoError> {
        let public_key = private_key.to_public_key()?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, CryptoError> {
        Self::from_private_key(PrivateKey::random(rng))
    }
}
