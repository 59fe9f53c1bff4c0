//! Version-byte-prefixed base58check, as used for keys, signatures, memos and hashes.

use sha2::{Digest, Sha256};

use crate::binable::Binable;
use crate::error::CodecError;

/// Leading version bytes of every base58check payload.
pub mod version_bytes {
    pub const LEDGER_HASH: u8 = 5;
    pub const RECEIPT_CHAIN_HASH: u8 = 12;
    pub const EPOCH_SEED: u8 = 13;
    pub const STATE_HASH: u8 = 16;
    pub const SIGNED_COMMAND_V1: u8 = 19;
    pub const USER_COMMAND_MEMO: u8 = 20;
    pub const TOKEN_ID_KEY: u8 = 28;
    pub const TRANSACTION_HASH: u8 = 29;
    pub const PRIVATE_KEY: u8 = 90;
    pub const SIGNATURE: u8 = 154;
    pub const PUBLIC_KEY: u8 = 203;
}

fn checksum(payload: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

/// Encode `[version] ++ payload ++ checksum` with the bitcoin alphabet.
pub fn encode_check(version: u8, payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(payload.len() + 5);
    bytes.push(version);
    bytes.extend_from_slice(payload);
    let sum = checksum(&bytes);
    bytes.extend_from_slice(&sum);
    bs58::encode(bytes).into_string()
}

/// Decode a base58check string and return the payload after the version byte.
pub fn decode_check(version: u8, text: &str) -> Result<Vec<u8>, CodecError> {
    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|err| CodecError::InvalidBase58(err.to_string()))?;
    if bytes.len() < 5 {
        return Err(CodecError::InvalidBase58(format!(
            "decoded {} bytes, too short for version and checksum",
            bytes.len()
        )));
    }
    let (body, sum) = bytes.split_at(bytes.len() - 4);
    if checksum(body).as_slice() != sum {
        return Err(CodecError::InvalidChecksum);
    }
    if body[0] != version {
        return Err(CodecError::Base58VersionMismatch {
            expected: version,
            actual: body[0],
        });
    }
    Ok(body[1..].to_vec())
}

/// Base58check text form of a binable value.
pub trait Base58Check: Binable {
    const VERSION_BYTE: u8;

    fn to_base58(&self) -> Result<String, CodecError> {
        Ok(encode_check(Self::VERSION_BYTE, &self.to_bytes()?))
    }

    fn from_base58(text: &str) -> Result<Self, CodecError> {
        let payload = decode_check(Self::VERSION_BYTE, text)?;
        Self::from_bytes(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_and_version_are_enforced() {
        let text = encode_check(version_bytes::TRANSACTION_HASH, &[1, 2, 3]);
        assert_eq!(decode_check(version_bytes::TRANSACTION_HASH, &text).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            decode_check(version_bytes::SIGNATURE, &text).unwrap_err(),
            CodecError::Base58VersionMismatch {
                expected: version_bytes::SIGNATURE,
                actual: version_bytes::TRANSACTION_HASH,
            }
        );

        let mut raw = bs58::decode(&text).into_vec().unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 1;
        let tampered = bs58::encode(raw).into_string();
        assert_eq!(
            decode_check(version_bytes::TRANSACTION_HASH, &tampered).unwrap_err(),
            CodecError::InvalidChecksum
        );
    }

    #[test]
    fn rejects_non_alphabet_input() {
        assert!(matches!(
            decode_check(version_bytes::PUBLIC_KEY, "0OIl"),
            Err(CodecError::InvalidBase58(_))
        ));
    }

    #[test]
    fn payload_uses_sha256d_checksum() {
        let text = encode_check(0, &[]);
        let raw = bs58::decode(&text).into_vec().unwrap();
        let digest = Sha256::digest(Sha256::digest([0u8]));
        assert_eq!(raw[0], 0);
        assert_eq!(&raw[1..], &digest[..4]);
    }
}
