//! Payments and stake delegations, signed in the legacy regime.

use serde::{Deserialize, Serialize};
use signer_crypto::hash_input::{HashInputLegacy, ToInputLegacy};
use signer_crypto::signature::{sign_legacy, verify_legacy};
use signer_crypto::{CryptoError, NetworkId, PrivateKey, PublicKey, Signature};
use tracing::debug;

use crate::memo::Memo;

/// Token id of MINA as seen by the legacy layout.
pub const LEGACY_TOKEN_ID: u64 = 1;

/// `valid_until` when the sender does not bound the slot.
pub const DEFAULT_VALID_UNTIL: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Common {
    pub fee: u64,
    pub fee_payer: PublicKey,
    pub nonce: u32,
    pub valid_until: u32,
    pub memo: Memo,
}

impl ToInputLegacy for Common {
    fn to_input_legacy(&self) -> HashInputLegacy {
        let mut input = HashInputLegacy::empty();
        input.push(&self.fee);
        input.push(&LEGACY_TOKEN_ID);
        input.push(&self.fee_payer);
        input.push(&self.nonce);
        input.push(&self.valid_until);
        input.push(&self.memo);
        input
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Body {
    #[serde(rename_all = "camelCase")]
    Payment {
        source: PublicKey,
        receiver: PublicKey,
        amount: u64,
    },
    #[serde(rename_all = "camelCase")]
    StakeDelegation {
        delegator: PublicKey,
        new_delegate: PublicKey,
    },
}

impl Body {
    pub fn tag(&self) -> u8 {
        match self {
            Body::Payment { .. } => 0,
            Body::StakeDelegation { .. } => 1,
        }
    }
}

impl ToInputLegacy for Body {
    fn to_input_legacy(&self) -> HashInputLegacy {
        let (source, receiver, amount) = match *self {
            Body::Payment {
                source,
                receiver,
                amount,
            } => (source, receiver, amount),
            Body::StakeDelegation {
                delegator,
                new_delegate,
            } => (delegator, new_delegate, 0),
        };
        let tag = self.tag();
        let mut input = HashInputLegacy::from_bits(vec![tag & 4 != 0, tag & 2 != 0, tag & 1 != 0]);
        input.push(&source);
        input.push(&receiver);
        input.push(&LEGACY_TOKEN_ID);
        input.push(&amount);
        // token_locked
        input.push(&false);
        input
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCommand {
    pub common: Common,
    pub body: Body,
}

impl ToInputLegacy for UserCommand {
    fn to_input_legacy(&self) -> HashInputLegacy {
        self.common
            .to_input_legacy()
            .append(self.body.to_input_legacy())
    }
}

/// A user command with the key that signed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCommand {
    pub payload: UserCommand,
    pub signer: PublicKey,
    pub signature: Signature,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub from: PublicKey,
    pub to: PublicKey,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u32,
    #[serde(default)]
    pub memo: Memo,
    #[serde(default = "default_valid_until")]
    pub valid_until: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeDelegation {
    pub from: PublicKey,
    pub to: PublicKey,
    pub fee: u64,
    pub nonce: u32,
    #[serde(default)]
    pub memo: Memo,
    #[serde(default = "default_valid_until")]
    pub valid_until: u32,
}

fn default_valid_until() -> u32 {
    DEFAULT_VALID_UNTIL
}

impl Payment {
    pub fn to_user_command(&self) -> UserCommand {
        UserCommand {
            common: Common {
                fee: self.fee,
                fee_payer: self.from,
                nonce: self.nonce,
                valid_until: self.valid_until,
                memo: self.memo,
            },
            body: Body::Payment {
                source: self.from,
                receiver: self.to,
                amount: self.amount,
            },
        }
    }

    pub fn into_signed_command(self, signature: Signature) -> SignedCommand {
        SignedCommand {
            payload: self.to_user_command(),
            signer: self.from,
            signature,
        }
    }
}

impl StakeDelegation {
    pub fn to_user_command(&self) -> UserCommand {
        UserCommand {
            common: Common {
                fee: self.fee,
                fee_payer: self.from,
                nonce: self.nonce,
                valid_until: self.valid_until,
                memo: self.memo,
            },
            body: Body::StakeDelegation {
                delegator: self.from,
                new_delegate: self.to,
            },
        }
    }

    pub fn into_signed_command(self, signature: Signature) -> SignedCommand {
        SignedCommand {
            payload: self.to_user_command(),
            signer: self.from,
            signature,
        }
    }
}

pub fn sign_user_command(
    command: &UserCommand,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    sign_legacy(&command.to_input_legacy(), private_key, network)
}

pub fn verify_user_command(
    signature: &Signature,
    command: &UserCommand,
    public_key: &PublicKey,
    network: &NetworkId,
) -> bool {
    verify_legacy(signature, &command.to_input_legacy(), public_key, network)
}

pub fn sign_payment(
    payment: &Payment,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    debug!(%network, nonce = payment.nonce, "signing payment");
    sign_user_command(&payment.to_user_command(), private_key, network)
}

/// Verify against the sender's key.
pub fn verify_payment(signature: &Signature, payment: &Payment, network: &NetworkId) -> bool {
    verify_user_command(signature, &payment.to_user_command(), &payment.from, network)
}

pub fn sign_stake_delegation(
    delegation: &StakeDelegation,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<Signature, CryptoError> {
    debug!(%network, nonce = delegation.nonce, "signing stake delegation");
    sign_user_command(&delegation.to_user_command(), private_key, network)
}

pub fn verify_stake_delegation(
    signature: &Signature,
    delegation: &StakeDelegation,
    network: &NetworkId,
) -> bool {
    verify_user_command(signature, &delegation.to_user_command(), &delegation.from, network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_codec::Base58Check;
    use signer_crypto::hash_input::LEGACY_BITS_PER_FIELD;

    fn keys() -> (PrivateKey, PublicKey, PublicKey) {
        let sender = PrivateKey::from_seed(b"sender").unwrap();
        let receiver = PrivateKey::from_seed(b"receiver").unwrap().to_public_key().unwrap();
        let from = sender.to_public_key().unwrap();
        (sender, from, receiver)
    }

    fn payment() -> Payment {
        let (_, from, to) = keys();
        Payment {
            from,
            to,
            amount: 5,
            fee: 1,
            nonce: 0,
            memo: Memo::from_text("test").unwrap(),
            valid_until: DEFAULT_VALID_UNTIL,
        }
    }

    #[test]
    fn legacy_layout_sizes() {
        let input = payment().to_user_command().to_input_legacy();
        // fee payer, source, receiver
        assert_eq!(input.fields.len(), 3);
        let common_bits = 64 + 64 + 1 + 32 + 32 + 34 * 8;
        let body_bits = 3 + 1 + 1 + 64 + 64 + 1;
        assert_eq!(input.bits.len(), common_bits + body_bits);
        assert!(input.bits.len() > LEGACY_BITS_PER_FIELD);
    }

    #[test]
    fn tag_bits_distinguish_kinds() {
        let (_, from, to) = keys();
        let payment = Body::Payment { source: from, receiver: to, amount: 0 }.to_input_legacy();
        let delegation = Body::StakeDelegation { delegator: from, new_delegate: to }.to_input_legacy();
        assert_eq!(&payment.bits[..3], &[false, false, false]);
        assert_eq!(&delegation.bits[..3], &[false, false, true]);
        assert_eq!(payment.fields, delegation.fields);
    }

    #[test]
    fn payment_signature_is_network_scoped() {
        let (sender, _, _) = keys();
        let payment = payment();
        let signature = sign_payment(&payment, &sender, &NetworkId::Testnet).unwrap();
        assert!(verify_payment(&signature, &payment, &NetworkId::Testnet));
        assert!(verify_payment(&signature, &payment, &NetworkId::Devnet));
        assert!(!verify_payment(&signature, &payment, &NetworkId::Mainnet));
        let mut changed = payment;
        changed.amount += 1;
        assert!(!verify_payment(&signature, &changed, &NetworkId::Testnet));
    }

    #[test]
    fn delegation_signature_round_trip() {
        let (sender, from, to) = keys();
        let delegation = StakeDelegation {
            from,
            to,
            fee: 10,
            nonce: 3,
            memo: Memo::empty(),
            valid_until: DEFAULT_VALID_UNTIL,
        };
        let signature = sign_stake_delegation(&delegation, &sender, &NetworkId::Mainnet).unwrap();
        assert!(verify_stake_delegation(&signature, &delegation, &NetworkId::Mainnet));
        let as_payment = Payment {
            from,
            to,
            amount: 0,
            fee: 10,
            nonce: 3,
            memo: Memo::empty(),
            valid_until: DEFAULT_VALID_UNTIL,
        };
        assert!(!verify_payment(&signature, &as_payment, &NetworkId::Mainnet));
    }

    #[test]
    fn payment_json_defaults() {
        let (_, from, to) = keys();
        let json = format!(
            r#"{{"from":"{}","to":"{}","amount":5,"fee":1,"nonce":0}}"#,
            from.to_base58().unwrap(),
            to.to_base58().unwrap()
        );
        let parsed: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.valid_until, DEFAULT_VALID_UNTIL);
        assert_eq!(parsed.memo, Memo::empty());
    }
}
