//! Transaction memos: 34 bytes, `[0x01, len, text..., zero padding]`.

use core::fmt;
use core::str::FromStr;

use protocol_codec::{
    base58, bytes_to_bits, version_bytes, Base58Check, Binable, CodecError, LengthPrefixed,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use signer_crypto::hash_input::{HashInputLegacy, ToInputLegacy};
use signer_crypto::poseidon::{prefixes, Poseidon, Sponge};
use signer_crypto::Field;

use crate::error::TransactionError;

pub const MEMO_SIZE: usize = 34;
pub const MAX_MEMO_TEXT: usize = MEMO_SIZE - 2;
const MEMO_TAG_TEXT: u8 = 0x01;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memo([u8; MEMO_SIZE]);

impl Memo {
    pub fn empty() -> Self {
        let mut bytes = [0u8; MEMO_SIZE];
        bytes[0] = MEMO_TAG_TEXT;
        Self(bytes)
    }

    pub fn from_text(text: &str) -> Result<Self, TransactionError> {
        let len = text.len();
        if len > MAX_MEMO_TEXT {
            return Err(TransactionError::MemoTooLong(len));
        }
        let mut bytes = [0u8; MEMO_SIZE];
        bytes[0] = MEMO_TAG_TEXT;
        bytes[1] = len as u8;
        bytes[2..2 + len].copy_from_slice(text.as_bytes());
        Ok(Self(bytes))
    }

    /// Wrap raw memo bytes. The length byte must not exceed the 32 content bytes.
    pub fn from_raw(bytes: &[u8]) -> Result<Self, TransactionError> {
        let bytes: [u8; MEMO_SIZE] = bytes
            .try_into()
            .map_err(|_| TransactionError::InvalidMemo(format!("expected {MEMO_SIZE} bytes, got {}", bytes.len())))?;
        if usize::from(bytes[1]) > MAX_MEMO_TEXT {
            return Err(TransactionError::InvalidMemo(format!(
                "length byte {} exceeds {MAX_MEMO_TEXT}",
                bytes[1]
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; MEMO_SIZE] {
        &self.0
    }

    /// The text content, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        let len = usize::from(self.0[1]).min(MAX_MEMO_TEXT);
        String::from_utf8_lossy(&self.0[2..2 + len]).into_owned()
    }

    pub fn hash(&self) -> Result<Field, TransactionError> {
        let fields = self.to_input_legacy().pack_to_fields_legacy();
        Ok(Poseidon::hash_with_prefix(prefixes::ZKAPP_MEMO, &fields)?)
    }
}

impl Default for Memo {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memo({:?})", self.text())
    }
}

impl FromStr for Memo {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl ToInputLegacy for Memo {
    fn to_input_legacy(&self) -> HashInputLegacy {
        HashInputLegacy::from_bits(bytes_to_bits(&self.0))
    }
}

impl Binable for Memo {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        LengthPrefixed(self.0.to_vec()).write_bytes(out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (LengthPrefixed(raw), end) = LengthPrefixed::read_bytes(bytes, offset)?;
        let memo = Self::from_raw(&raw).map_err(|err| CodecError::Validation(err.to_string()))?;
        Ok((memo, end))
    }
}

/// The text form carries the raw 34 bytes, without the binary length prefix.
impl Base58Check for Memo {
    const VERSION_BYTE: u8 = version_bytes::USER_COMMAND_MEMO;

    fn to_base58(&self) -> Result<String, CodecError> {
        Ok(base58::encode_check(Self::VERSION_BYTE, &self.0))
    }

    fn from_base58(text: &str) -> Result<Self, CodecError> {
        let raw = base58::decode_check(Self::VERSION_BYTE, text)?;
        Self::from_raw(&raw).map_err(|err| CodecError::Validation(err.to_string()))
    }
}

impl Serialize for Memo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_base58().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Memo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base58(&text).map_err(de::Error::custom)
    }
}
