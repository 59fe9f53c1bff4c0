//! Canonical residues modulo the Pallas base field `p` ([`Field`]) and scalar field `q`
//! ([`Scalar`]).
//!
//! Both wrap the `pasta_curves` field types. Values are always canonical; parsing and decoding
//! reject anything at or above the modulus.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Add, Mul, Neg, Sub};
use core::str::FromStr;

use ff::{Field as _, PrimeField};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use pasta_curves::{Fp, Fq};
use protocol_codec::{Binable, CodecError, FixedUint};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// Number of bits in the canonical bit decomposition of both fields.
pub const SIZE_IN_BITS: usize = 255;

macro_rules! prime_field {
    ($name:ident, $inner:ty, $kind:literal, $modulus:ident, $codec:ident) => {
        static $modulus: Lazy<BigUint> =
            Lazy::new(|| BigUint::from_bytes_le(&(-<$inner>::ONE).to_repr()) + 1u32);

        static $codec: Lazy<FixedUint> =
            Lazy::new(|| FixedUint::with_modulus(SIZE_IN_BITS as u32, $modulus.clone()));

        #[derive(Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name(pub(crate) $inner);

        impl $name {
            pub const ZERO: Self = Self(<$inner>::ZERO);
            pub const ONE: Self = Self(<$inner>::ONE);

            pub fn modulus() -> &'static BigUint {
                &$modulus
            }

            pub fn from_u64(value: u64) -> Self {
                Self(<$inner>::from(value))
            }

            pub fn from_bool(value: bool) -> Self {
                Self::from_u64(u64::from(value))
            }

            pub fn is_zero(&self) -> bool {
                bool::from(self.0.is_zero())
            }

            pub fn is_odd(&self) -> bool {
                bool::from(self.0.is_odd())
            }

            pub fn is_even(&self) -> bool {
                !self.is_odd()
            }

            pub fn square(&self) -> Self {
                Self(self.0.square())
            }

            pub fn double(&self) -> Self {
                Self(self.0.double())
            }

            pub fn pow(&self, exponent: u64) -> Self {
                Self(self.0.pow_vartime([exponent]))
            }

            /// `2^bits` as a field element.
            pub fn pow2(bits: u32) -> Self {
                Self(<$inner>::from(2u64).pow_vartime([u64::from(bits)]))
            }

            /// Multiplicative inverse; `None` for zero.
            pub fn inverse(&self) -> Option<Self> {
                Option::from(self.0.invert()).map(Self)
            }

            /// Square root; `None` when the value is not a quadratic residue.
            pub fn sqrt(&self) -> Option<Self> {
                Option::from(self.0.sqrt()).map(Self)
            }

            /// 32-byte little-endian canonical representation.
            pub fn to_le_bytes(&self) -> [u8; 32] {
                self.0.to_repr()
            }

            pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
                let repr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                    expected: 32,
                    actual: bytes.len(),
                })?;
                Option::from(<$inner>::from_repr(repr)).map(Self).ok_or_else(|| {
                    CryptoError::NonCanonical {
                        kind: $kind,
                        value: BigUint::from_bytes_le(&repr).to_string(),
                    }
                })
            }

            /// Interpret little-endian bytes of any length as an integer reduced modulo the field
            /// size.
            pub fn from_le_bytes_mod_order(bytes: &[u8]) -> Self {
                let radix = <$inner>::from(256u64);
                Self(bytes.iter().rev().fold(<$inner>::ZERO, |acc, byte| {
                    acc * radix + <$inner>::from(u64::from(*byte))
                }))
            }

            pub fn to_biguint(&self) -> BigUint {
                BigUint::from_bytes_le(&self.to_le_bytes())
            }

            pub fn from_biguint(value: &BigUint) -> Result<Self, CryptoError> {
                if value >= Self::modulus() {
                    return Err(CryptoError::NonCanonical {
                        kind: $kind,
                        value: value.to_string(),
                    });
                }
                let mut bytes = value.to_bytes_le();
                bytes.resize(32, 0);
                Self::from_le_bytes(&bytes)
            }

            /// The 255-bit little-endian decomposition.
            pub fn to_bits(&self) -> Vec<bool> {
                let mut bits = protocol_codec::bytes_to_bits(&self.to_le_bytes());
                bits.truncate(SIZE_IN_BITS);
                bits
            }

            /// Inverse of [`Self::to_bits`]; rejects more than 255 bits or a non-canonical value.
            pub fn from_bits(bits: &[bool]) -> Result<Self, CryptoError> {
                if bits.len() > SIZE_IN_BITS {
                    return Err(CryptoError::InvalidLength {
                        expected: SIZE_IN_BITS,
                        actual: bits.len(),
                    });
                }
                let mut bytes = protocol_codec::bits_to_bytes(bits);
                bytes.resize(32, 0);
                Self::from_le_bytes(&bytes)
            }

            /// Little-endian bits folded into a field element, reducing modulo the field size.
            pub fn from_bits_mod_order(bits: &[bool]) -> Self {
                bits.iter()
                    .rev()
                    .fold(Self::ZERO, |acc, bit| acc.double() + Self::from_bool(*bit))
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self(self.0 * rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.to_le_bytes().hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_biguint())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_biguint())
            }
        }

        impl FromStr for $name {
            type Err = CryptoError;

            /// Parses a decimal string.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| {
                    CryptoError::InvalidDecimal {
                        kind: $kind,
                        input: s.to_string(),
                    }
                })?;
                Self::from_biguint(&value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(de::Error::custom)
            }
        }

        impl Binable for $name {
            fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
                $codec.write(&self.to_biguint(), out)
            }

            fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
                let (value, end) = $codec.read(bytes, offset)?;
                let parsed = Self::from_biguint(&value)
                    .map_err(|err| CodecError::Validation(err.to_string()))?;
                Ok((parsed, end))
            }
        }
    };
}

prime_field!(Field, Fp, "field", FIELD_MODULUS, FIELD_CODEC);
prime_field!(Scalar, Fq, "scalar", SCALAR_MODULUS, SCALAR_CODEC);

impl Scalar {
    /// Reinterpret a base-field element as a scalar. Always succeeds because `p < q`.
    pub fn from_field(field: Field) -> Self {
        Self::from_le_bytes_mod_order(&field.to_le_bytes())
    }
}

impl Field {
    /// Reinterpret a scalar as a base-field element, reducing modulo `p`.
    pub fn from_scalar_mod_order(scalar: Scalar) -> Self {
        Self::from_le_bytes_mod_order(&scalar.to_le_bytes())
    }

    /// Reinterpret a scalar as a base-field element; fails when the scalar is `>= p`.
    pub fn try_from_scalar(scalar: Scalar) -> Result<Self, CryptoError> {
        Self::from_biguint(&scalar.to_biguint())
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u32> for Field {
    fn from(value: u32) -> Self {
        Self::from_u64(u64::from(value))
    }
}
