//! Network identifiers and the domain-separation prefixes derived from them.

use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::poseidon::prefixes;

const CUSTOM_PREFIX_LEN: usize = 20;
const CUSTOM_PREFIX_PADDING: char = '*';

const NETWORK_ID_MAINNET: u8 = 0x01;
const NETWORK_ID_DEVNET: u8 = 0x00;

/// A network label. It never appears in signed payloads; it only selects hashing prefixes.
///
/// Serialized as `"mainnet"`, `"testnet"`, `"devnet"` or `{"custom": "<name>"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
    Custom(String),
}

impl NetworkId {
    pub fn as_str(&self) -> &str {
        match self {
            NetworkId::Mainnet => "mainnet",
            NetworkId::Testnet => "testnet",
            NetworkId::Devnet => "devnet",
            NetworkId::Custom(name) => name,
        }
    }

    /// Prefix for signature challenges.
    ///
    /// Testnet and devnet share a prefix; a custom name `n` uses `n ++ "Signature"` padded with
    /// `*` or truncated to 20 characters.
    pub fn signature_prefix(&self) -> String {
        match self.as_str() {
            "mainnet" => prefixes::SIGNATURE_MAINNET.to_string(),
            "testnet" | "devnet" => prefixes::SIGNATURE_TESTNET.to_string(),
            name => custom_prefix(&format!("{name}Signature")),
        }
    }

    /// Prefix for zkApp account-update body hashes.
    pub fn zkapp_body_prefix(&self) -> String {
        match self.as_str() {
            "mainnet" => prefixes::ZKAPP_BODY_MAINNET.to_string(),
            "testnet" | "devnet" => prefixes::ZKAPP_BODY_TESTNET.to_string(),
            name => custom_prefix(&format!("{name}ZkappBody")),
        }
    }

    /// The packed chunk mixed into nonce derivation.
    ///
    /// A custom name contributes its bytes as a little-endian integer of `8 * len` bits.
    pub fn hash_input(&self) -> (Field, u32) {
        match self.as_str() {
            "mainnet" => (Field::from_u64(u64::from(NETWORK_ID_MAINNET)), 8),
            "testnet" | "devnet" => (Field::from_u64(u64::from(NETWORK_ID_DEVNET)), 8),
            name => (
                Field::from_le_bytes_mod_order(name.as_bytes()),
                8 * name.len() as u32,
            ),
        }
    }

    /// The single byte mixed into legacy nonce derivation.
    ///
    /// For a custom name this is the low byte of the id after it is rounded to the nearest
    /// `f64`, as legacy signers compute it: the first byte for names of up to six bytes, a
    /// rounded or zero byte for longer ones.
    pub fn legacy_id_byte(&self) -> u8 {
        match self.as_str() {
            "mainnet" => NETWORK_ID_MAINNET,
            "testnet" | "devnet" => NETWORK_ID_DEVNET,
            name => low_byte_of_double(&BigUint::from_bytes_le(name.as_bytes())),
        }
    }
}

/// Round to 53 significant bits (ties to even) and return the low byte. Values that round
/// past `f64::MAX` become infinity, whose integer conversion is zero.
fn low_byte_of_double(id: &BigUint) -> u8 {
    const MANTISSA_BITS: u64 = 53;
    let bits = id.bits();
    let rounded = if bits <= MANTISSA_BITS {
        id.clone()
    } else {
        let shift = bits - MANTISSA_BITS;
        let mut mantissa = id >> shift;
        let remainder = id - (&mantissa << shift);
        let half = BigUint::from(1u8) << (shift - 1);
        if remainder > half || (remainder == half && mantissa.bit(0)) {
            mantissa += 1u8;
        }
        mantissa << shift
    };
    if rounded.bits() > 1024 {
        return 0;
    }
    rounded.to_bytes_le()[0]
}

fn custom_prefix(prefix: &str) -> String {
    let mut out: String = prefix.chars().take(CUSTOM_PREFIX_LEN).collect();
    while out.chars().count() < CUSTOM_PREFIX_LEN {
        out.push(CUSTOM_PREFIX_PADDING);
    }
    out
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "mainnet" => NetworkId::Mainnet,
            "testnet" => NetworkId::Testnet,
            "devnet" => NetworkId::Devnet,
            other => NetworkId::Custom(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_prefixes() {
        assert_eq!(NetworkId::Mainnet.signature_prefix(), "MinaSignatureMainnet");
        assert_eq!(NetworkId::Testnet.signature_prefix(), "CodaSignature*******");
        assert_eq!(NetworkId::Devnet.signature_prefix(), "CodaSignature*******");
        assert_eq!(NetworkId::Mainnet.zkapp_body_prefix(), "MainnetZkappBody****");
        assert_eq!(NetworkId::Devnet.zkapp_body_prefix(), "TestnetZkappBody****");
    }

    #[test]
    fn custom_prefixes_are_padded_or_truncated() {
        let short = NetworkId::Custom("zeko".into());
        assert_eq!(short.signature_prefix(), "zekoSignature*******");
        assert_eq!(short.zkapp_body_prefix(), "zekoZkappBody*******");
        let long = NetworkId::Custom("averyveryverylongname".into());
        assert_eq!(long.signature_prefix(), "averyveryverylongnam");
        assert_eq!(long.signature_prefix().len(), 20);
    }

    #[test]
    fn custom_id_is_little_endian_bytes() {
        let (value, bits) = NetworkId::Custom("ab".into()).hash_input();
        assert_eq!(bits, 16);
        assert_eq!(value, Field::from_u64(0x6261));
        assert_eq!(NetworkId::Mainnet.hash_input(), (Field::ONE, 8));
        assert_eq!(NetworkId::Testnet.hash_input(), (Field::ZERO, 8));
        assert_eq!(NetworkId::Custom("ab".into()).legacy_id_byte(), b'a');
    }

    #[test]
    fn legacy_id_byte_follows_double_rounding() {
        let byte = |name: &str| NetworkId::Custom(name.into()).legacy_id_byte();
        assert_eq!(NetworkId::Mainnet.legacy_id_byte(), 1);
        assert_eq!(NetworkId::Devnet.legacy_id_byte(), 0);
        assert_eq!(byte("zeko"), b'z');
        assert_eq!(byte("abcdef"), b'a');
        // 55 significant bits: the two low bits of 'a' (0b01) round away.
        assert_eq!(byte("abcdefg"), 0x60);
        assert_eq!(byte("averyveryverylongname"), 0);
        assert_eq!(byte(&"z".repeat(200)), 0);
        assert_eq!(byte(""), 0);
    }

    #[test]
    fn parses_and_serializes() {
        assert_eq!("devnet".parse::<NetworkId>().unwrap(), NetworkId::Devnet);
        assert_eq!("zeko".parse::<NetworkId>().unwrap(), NetworkId::Custom("zeko".into()));
        assert_eq!(serde_json::to_string(&NetworkId::Testnet).unwrap(), "\"testnet\"");
        assert_eq!(
            serde_json::to_string(&NetworkId::Custom("zeko".into())).unwrap(),
            "{\"custom\":\"zeko\"}"
        );
        let parsed: NetworkId = serde_json::from_str("{\"custom\":\"zeko\"}").unwrap();
        assert_eq!(parsed.to_string(), "zeko");
    }
}
