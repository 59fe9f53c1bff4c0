use protocol_codec::Base58Check;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use signer_crypto::{Keypair, NetworkId, PrivateKey, PublicKey};
use signer_transaction::{
    sign_zkapp_command, verify_zkapp_command_signature, FeePayer, FeePayerBody, Memo, ZkappCommand,
};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;
use crate::json::parse_public_key;

/// A keypair in its base58 form. The private key string is wiped on drop.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeypairStrings {
    pub private_key: String,
    pub public_key: String,
}

impl KeypairStrings {
    pub fn from_keypair(keypair: &Keypair) -> Result<Self, WalletError> {
        Ok(Self {
            private_key: keypair.private_key.to_base58()?,
            public_key: keypair.public_key.to_base58()?,
        })
    }
}

pub(crate) fn parse_private_key(text: &str) -> Result<PrivateKey, WalletError> {
    // The input is secret; keep it out of the error.
    PrivateKey::from_base58(text).map_err(|err| WalletError::InvalidInput {
        kind: "private key",
        input: err.to_string(),
    })
}

pub fn gen_keys<R: RngCore + CryptoRng>(rng: &mut R) -> Result<KeypairStrings, WalletError> {
    KeypairStrings::from_keypair(&Keypair::random(rng)?)
}

pub fn derive_public_key(private_key: &str) -> Result<String, WalletError> {
    let private_key = parse_private_key(private_key)?;
    Ok(private_key.to_public_key()?.to_base58()?)
}

/// The public key must be derivable from the private key, and the private key must produce a
/// fee payer signature that verifies under the public key.
pub fn check_keypair(keypair: &KeypairStrings, network: &NetworkId) -> Result<(), WalletError> {
    let private_key = parse_private_key(&keypair.private_key)?;
    let public_key = parse_public_key(&keypair.public_key)?;
    if private_key.to_public_key()? != public_key {
        return Err(WalletError::KeypairMismatch);
    }
    let dummy = dummy_command(public_key);
    let signed = sign_zkapp_command(&dummy, &private_key, network)?;
    if !verify_zkapp_command_signature(&signed, &public_key, network) {
        return Err(WalletError::KeypairMismatch);
    }
    Ok(())
}

pub fn verify_keypair(keypair: &KeypairStrings, network: &NetworkId) -> bool {
    match check_keypair(keypair, network) {
        Ok(()) => true,
        Err(err) => {
            debug!(%network, %err, "keypair rejected");
            false
        }
    }
}

fn dummy_command(public_key: PublicKey) -> ZkappCommand {
    ZkappCommand {
        fee_payer: FeePayer::new(FeePayerBody {
            public_key,
            fee: 0,
            valid_until: None,
            nonce: 0,
        }),
        account_updates: Vec::new(),
        memo: Memo::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_keys_verify() {
        let mut rng = StdRng::seed_from_u64(7);
        let keys = gen_keys(&mut rng).unwrap();
        assert!(keys.private_key.starts_with("EK"));
        assert!(keys.public_key.starts_with("B62q"));
        assert!(verify_keypair(&keys, &NetworkId::Mainnet));
        assert_eq!(derive_public_key(&keys.private_key).unwrap(), keys.public_key);
    }

    #[test]
    fn mismatched_keys_are_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        let a = gen_keys(&mut rng).unwrap();
        let b = gen_keys(&mut rng).unwrap();
        let mixed = KeypairStrings {
            private_key: a.private_key.clone(),
            public_key: b.public_key.clone(),
        };
        assert!(matches!(
            check_keypair(&mixed, &NetworkId::Testnet),
            Err(WalletError::KeypairMismatch)
        ));
        assert!(!verify_keypair(&mixed, &NetworkId::Testnet));
    }

    #[test]
    fn malformed_private_key_does_not_leak() {
        let err = derive_public_key("EKnotakey").unwrap_err();
        assert!(!err.to_string().contains("EKnotakey"));
    }
}
