//! The signing client: every operation bound to one network and one set of defaults.

use protocol_codec::Base58Check;
use rand::rngs::OsRng;
use signer_crypto::signature::{
    sign_field_element, sign_string, verify_field_element, verify_string,
};
use signer_crypto::{Field, NetworkId, PublicKey};
use signer_transaction::user_command::{
    sign_payment, sign_stake_delegation, verify_payment, verify_stake_delegation,
};
use signer_transaction::{hash_payment, hash_stake_delegation, ZkappCommand};
use tracing::{debug, warn};

use crate::config::SignerConfig;
use crate::error::WalletError;
use crate::json::{
    parse_public_key, Message, Payment, SignableData, SignatureJson, Signed, SignedData,
    StakeDelegation,
};
use crate::keys::{self, parse_private_key, KeypairStrings};
use crate::rosetta::{self, RosettaSignedTransaction};

#[derive(Clone, Debug, Default)]
pub struct Client {
    config: SignerConfig,
}

impl Client {
    pub fn new(config: SignerConfig) -> Self {
        Self { config }
    }

    pub fn for_network(network: NetworkId) -> Self {
        Self::new(SignerConfig::for_network(network))
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn network(&self) -> &NetworkId {
        &self.config.network
    }

    pub fn gen_keys(&self) -> Result<KeypairStrings, WalletError> {
        keys::gen_keys(&mut OsRng)
    }

    pub fn verify_keypair(&self, keypair: &KeypairStrings) -> bool {
        keys::verify_keypair(keypair, self.network())
    }

    pub fn derive_public_key(&self, private_key: &str) -> Result<String, WalletError> {
        keys::derive_public_key(private_key)
    }

    pub fn sign_message(
        &self,
        message: &str,
        keypair: &KeypairStrings,
    ) -> Result<Signed<Message>, WalletError> {
        let private_key = parse_private_key(&keypair.private_key)?;
        let signer = parse_public_key(&keypair.public_key)?;
        let signature = sign_string(message, &private_key, self.network())?;
        Ok(Signed {
            signature: SignatureJson::new(&signature, &signer)?,
            data: Message {
                public_key: keypair.public_key.clone(),
                message: message.to_string(),
            },
        })
    }

    pub fn verify_message(&self, signed: &Signed<Message>) -> bool {
        let network = self.network();
        let outcome = signed.signature.signature().and_then(|signature| {
            let public_key = parse_public_key(&signed.data.public_key)?;
            Ok(verify_string(&signature, &signed.data.message, &public_key, network))
        });
        settle(outcome, network, "message")
    }

    pub fn sign_payment(
        &self,
        payment: &Payment,
        private_key: &str,
    ) -> Result<Signed<Payment>, WalletError> {
        let data = payment.normalized(self.config.default_valid_until);
        let command = data.to_payment(self.config.default_valid_until)?;
        let private_key = parse_private_key(private_key)?;
        let signature = sign_payment(&command, &private_key, self.network())?;
        Ok(Signed {
            signature: SignatureJson::new(&signature, &command.from)?,
            data,
        })
    }

    /// Checks the signature against `signature.signer`.
    pub fn verify_payment(&self, signed: &Signed<Payment>) -> bool {
        let network = self.network();
        let outcome = self.signed_payment(signed).and_then(|(command, signature)| {
            let signer = signed.signature.signer()?;
            Ok(signer == command.from && verify_payment(&signature, &command, network))
        });
        settle(outcome, network, "payment")
    }

    pub fn sign_stake_delegation(
        &self,
        delegation: &StakeDelegation,
        private_key: &str,
    ) -> Result<Signed<StakeDelegation>, WalletError> {
        let data = delegation.normalized(self.config.default_valid_until);
        let command = data.to_stake_delegation(self.config.default_valid_until)?;
        let private_key = parse_private_key(private_key)?;
        let signature = sign_stake_delegation(&command, &private_key, self.network())?;
        Ok(Signed {
            signature: SignatureJson::new(&signature, &command.from)?,
            data,
        })
    }

    pub fn verify_stake_delegation(&self, signed: &Signed<StakeDelegation>) -> bool {
        let network = self.network();
        let outcome = self.signed_delegation(signed).and_then(|(command, signature)| {
            let signer = signed.signature.signer()?;
            Ok(signer == command.from && verify_stake_delegation(&signature, &command, network))
        });
        settle(outcome, network, "stake delegation")
    }

    /// Sign whichever command `payload` holds. A message is signed for its `public_key`.
    pub fn sign_transaction(
        &self,
        payload: &SignableData,
        private_key: &str,
    ) -> Result<SignedData, WalletError> {
        match payload {
            SignableData::Message(message) => {
                let keypair = KeypairStrings {
                    private_key: private_key.to_string(),
                    public_key: message.public_key.clone(),
                };
                let signed = self.sign_message(&message.message, &keypair)?;
                if !self.verify_message(&signed) {
                    return Err(WalletError::KeypairMismatch);
                }
                Ok(SignedData::Message(signed))
            }
            SignableData::Payment(payment) => {
                Ok(SignedData::Payment(self.sign_payment(payment, private_key)?))
            }
            SignableData::StakeDelegation(delegation) => Ok(SignedData::StakeDelegation(
                self.sign_stake_delegation(delegation, private_key)?,
            )),
            SignableData::ZkappCommand(command) => Ok(SignedData::ZkappCommand(
                self.sign_zkapp_command(command, private_key)?,
            )),
        }
    }

    /// Convert a signed rosetta transaction to signed-command JSON, returned as
    /// `{"data": <command>}`.
    pub fn signed_rosetta_transaction_to_signed_command(
        &self,
        signed_rosetta_transaction: &str,
    ) -> Result<String, WalletError> {
        let transaction: RosettaSignedTransaction =
            serde_json::from_str(signed_rosetta_transaction)?;
        let command = rosetta::to_signed_command(&transaction, self.config.default_valid_until)?;
        debug!(signature = %command.signature, "converted rosetta transaction");
        Ok(serde_json::to_string(&serde_json::json!({ "data": command }))?)
    }

    /// `berkeley` defaults to the configured hash layout.
    pub fn hash_payment(
        &self,
        signed: &Signed<Payment>,
        berkeley: Option<bool>,
    ) -> Result<String, WalletError> {
        let (command, signature) = self.signed_payment(signed)?;
        let berkeley = berkeley.unwrap_or(self.config.berkeley_hashes);
        Ok(hash_payment(&command, signature, berkeley)?)
    }

    pub fn hash_stake_delegation(
        &self,
        signed: &Signed<StakeDelegation>,
        berkeley: Option<bool>,
    ) -> Result<String, WalletError> {
        let (command, signature) = self.signed_delegation(signed)?;
        let berkeley = berkeley.unwrap_or(self.config.berkeley_hashes);
        Ok(hash_stake_delegation(&command, signature, berkeley)?)
    }

    /// Smallest fee accepted for a command with `account_updates` updates.
    pub fn minimum_fee(&self, account_updates: usize) -> u64 {
        self.config
            .account_update_fee
            .saturating_mul(account_updates as u64)
    }

    pub fn sign_zkapp_command(
        &self,
        command: &ZkappCommand,
        fee_payer_private_key: &str,
    ) -> Result<ZkappCommand, WalletError> {
        let fee = command.fee_payer.body.fee;
        let minimum = self.minimum_fee(command.account_updates.len());
        if fee < minimum {
            warn!(fee, minimum, "zkapp command fee below minimum");
            return Err(WalletError::FeeTooLow { fee, minimum });
        }
        let private_key = parse_private_key(fee_payer_private_key)?;
        let mut command = command.clone();
        if command.fee_payer.body.valid_until.is_none() {
            command.fee_payer.body.valid_until = Some(self.config.default_valid_until);
        }
        Ok(signer_transaction::sign_zkapp_command(
            &command,
            &private_key,
            self.network(),
        )?)
    }

    pub fn verify_zkapp_command(&self, command: &ZkappCommand, public_key: &str) -> bool {
        let network = self.network();
        let outcome = parse_public_key(public_key).map(|public_key| {
            signer_transaction::verify_zkapp_command_signature(command, &public_key, network)
        });
        settle(outcome, network, "zkapp command")
    }

    pub fn sign_field_element(
        &self,
        field: Field,
        private_key: &str,
    ) -> Result<Signed<Field>, WalletError> {
        let private_key = parse_private_key(private_key)?;
        let signer = private_key.to_public_key()?;
        let signature = sign_field_element(field, &private_key, self.network())?;
        Ok(Signed {
            signature: SignatureJson::new(&signature, &signer)?,
            data: field,
        })
    }

    pub fn verify_field_element(&self, signed: &Signed<Field>) -> bool {
        let network = self.network();
        let outcome = signed.signature.signature().and_then(|signature| {
            let signer = signed.signature.signer()?;
            Ok(verify_field_element(&signature, signed.data, &signer, network))
        });
        settle(outcome, network, "field element")
    }

    pub fn public_key_to_raw(&self, public_key: &str) -> Result<String, WalletError> {
        Ok(public_key_to_raw(&parse_public_key(public_key)?))
    }

    fn signed_payment(
        &self,
        signed: &Signed<Payment>,
    ) -> Result<(signer_transaction::Payment, signer_crypto::Signature), WalletError> {
        let command = signed.data.to_payment(self.config.default_valid_until)?;
        Ok((command, signed.signature.signature()?))
    }

    fn signed_delegation(
        &self,
        signed: &Signed<StakeDelegation>,
    ) -> Result<(signer_transaction::StakeDelegation, signer_crypto::Signature), WalletError> {
        let command = signed.data.to_stake_delegation(self.config.default_valid_until)?;
        Ok((command, signed.signature.signature()?))
    }
}

fn settle(outcome: Result<bool, WalletError>, network: &NetworkId, what: &str) -> bool {
    match outcome {
        Ok(valid) => {
            debug!(%network, what, valid, "verified");
            valid
        }
        Err(err) => {
            debug!(%network, what, %err, "rejected malformed input");
            false
        }
    }
}

/// Hex of `bytes` with each byte written low nibble first.
pub(crate) fn to_raw_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| hex::encode([byte.rotate_left(4)]))
        .collect()
}

/// Inverse of [`to_raw_hex`], expecting `len` bytes.
pub(crate) fn from_raw_hex(raw: &str, kind: &'static str, len: usize) -> Result<Vec<u8>, WalletError> {
    let mut bytes = hex::decode(raw).map_err(|err| WalletError::InvalidInput {
        kind,
        input: format!("{raw}: {err}"),
    })?;
    if bytes.len() != len {
        return Err(WalletError::InvalidInput {
            kind,
            input: format!("expected {len} bytes, got {}", bytes.len()),
        });
    }
    for byte in bytes.iter_mut() {
        *byte = byte.rotate_left(4);
    }
    Ok(bytes)
}

/// Little-endian bytes of `x` with the parity in the top bit, each byte low nibble first.
pub fn public_key_to_raw(public_key: &PublicKey) -> String {
    let mut bytes = public_key.x.to_le_bytes();
    bytes[31] |= u8::from(public_key.is_odd) << 7;
    to_raw_hex(&bytes)
}

/// Inverse of [`public_key_to_raw`].
pub fn public_key_from_raw(raw: &str) -> Result<PublicKey, WalletError> {
    let mut bytes = from_raw_hex(raw, "raw public key", 32)?;
    let is_odd = bytes[31] & 0x80 != 0;
    bytes[31] &= 0x7f;
    let public_key = PublicKey {
        x: Field::from_le_bytes(&bytes)?,
        is_odd,
    };
    public_key.to_group()?;
    Ok(public_key)
}
