//! Signed transactions from the rosetta construction API, converted to the signed-command JSON
//! the node's GraphQL endpoint takes.
//!
//! Rosetta carries the signature as raw hex (`r` then `s`, each 32 little-endian bytes written
//! low nibble first) and the command fields in snake case.

use protocol_codec::Base58Check;
use serde::{Deserialize, Serialize};
use signer_crypto::{Field, Scalar, Signature};

use crate::client::{from_raw_hex, to_raw_hex};
use crate::error::WalletError;
use crate::json::{decimal, Payment, StakeDelegation};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RosettaPayment {
    pub to: String,
    pub from: String,
    #[serde(with = "decimal")]
    pub fee: u64,
    #[serde(with = "decimal")]
    pub amount: u64,
    #[serde(with = "decimal")]
    pub nonce: u32,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default, with = "decimal::option")]
    pub valid_until: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RosettaDelegation {
    pub delegator: String,
    pub new_delegate: String,
    #[serde(with = "decimal")]
    pub fee: u64,
    #[serde(with = "decimal")]
    pub nonce: u32,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default, with = "decimal::option")]
    pub valid_until: Option<u32>,
}

/// Exactly one of `payment` and `stake_delegation` is set.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RosettaSignedTransaction {
    pub signature: String,
    #[serde(default)]
    pub payment: Option<RosettaPayment>,
    #[serde(default)]
    pub stake_delegation: Option<RosettaDelegation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCommandJson {
    /// Base58 signature.
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake_delegation: Option<StakeDelegation>,
}

/// `signature` as the rosetta hex form.
pub fn signature_to_raw(signature: &Signature) -> String {
    let mut raw = to_raw_hex(&signature.r.to_le_bytes());
    raw.push_str(&to_raw_hex(&signature.s.to_le_bytes()));
    raw
}

/// Inverse of [`signature_to_raw`].
pub fn signature_from_raw(raw: &str) -> Result<Signature, WalletError> {
    let bytes = from_raw_hex(raw, "raw signature", 64)?;
    Ok(Signature {
        r: Field::from_le_bytes(&bytes[..32])?,
        s: Scalar::from_le_bytes(&bytes[32..])?,
    })
}

/// Convert a rosetta signed transaction, filling unset fields with `default_valid_until` and
/// an empty memo.
pub fn to_signed_command(
    transaction: &RosettaSignedTransaction,
    default_valid_until: u32,
) -> Result<SignedCommandJson, WalletError> {
    let signature = signature_from_raw(&transaction.signature)?.to_base58()?;
    match (&transaction.payment, &transaction.stake_delegation) {
        (Some(payment), None) => {
            let payment = Payment {
                to: payment.to.clone(),
                from: payment.from.clone(),
                amount: payment.amount,
                fee: payment.fee,
                nonce: payment.nonce,
                memo: payment.memo.clone(),
                valid_until: payment.valid_until,
            };
            // reject commands that could not have been signed
            payment.to_payment(default_valid_until)?;
            Ok(SignedCommandJson {
                signature,
                payment: Some(payment.normalized(default_valid_until)),
                stake_delegation: None,
            })
        }
        (None, Some(delegation)) => {
            let delegation = StakeDelegation {
                to: delegation.new_delegate.clone(),
                from: delegation.delegator.clone(),
                fee: delegation.fee,
                nonce: delegation.nonce,
                memo: delegation.memo.clone(),
                valid_until: delegation.valid_until,
            };
            delegation.to_stake_delegation(default_valid_until)?;
            Ok(SignedCommandJson {
                signature,
                payment: None,
                stake_delegation: Some(delegation.normalized(default_valid_until)),
            })
        }
        _ => Err(WalletError::InvalidInput {
            kind: "rosetta transaction",
            input: "expected exactly one of payment and stake_delegation".into(),
        }),
    }
}
