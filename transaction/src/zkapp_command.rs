//! zkApp commands: commitments, signing and signature checks.
//!
//! The commitment covers the account-update forest. The full commitment additionally covers the
//! memo and the fee payer, and is what the fee payer signs:
//! `full = H(cons_prefix, [memo_hash, fee_payer_hash, commitment])`.

use serde::{Deserialize, Serialize};
use signer_crypto::poseidon::{prefixes, Poseidon, Sponge};
use signer_crypto::signature::{sign_field_element, verify_field_element};
use signer_crypto::{Field, NetworkId, PrivateKey, PublicKey, Signature};
use tracing::{debug, warn};

use crate::account_update::{
    account_update_hash, AccountUpdate, AccountUpdateBody, AuthorizationKind, Control,
};
use crate::call_forest::call_forest_hash;
use crate::error::TransactionError;
use crate::memo::Memo;
use crate::primitives::{BalanceChange, ClosedInterval, OrIgnore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePayerBody {
    pub public_key: PublicKey,
    pub fee: u64,
    #[serde(default)]
    pub valid_until: Option<u32>,
    pub nonce: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayer {
    pub body: FeePayerBody,
    /// Placeholder until the command is signed.
    #[serde(default = "Signature::dummy")]
    pub authorization: Signature,
}

impl FeePayer {
    pub fn new(body: FeePayerBody) -> Self {
        Self {
            body,
            authorization: Signature::dummy(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkappCommand {
    pub fee_payer: FeePayer,
    #[serde(default)]
    pub account_updates: Vec<AccountUpdate>,
    #[serde(default)]
    pub memo: Memo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionCommitments {
    pub commitment: Field,
    pub full_commitment: Field,
}

impl TransactionCommitments {
    /// The commitment an update signs, per its `use_full_commitment` flag.
    pub fn for_update(&self, body: &AccountUpdateBody) -> Field {
        if body.use_full_commitment {
            self.full_commitment
        } else {
            self.commitment
        }
    }
}

/// The fee payer seen as an account update: it pays `fee`, bumps its nonce, pins the nonce and
/// the slot window, and is signed against the full commitment.
pub fn account_update_from_fee_payer(fee_payer: &FeePayer) -> AccountUpdate {
    let FeePayerBody {
        public_key,
        fee,
        valid_until,
        nonce,
    } = fee_payer.body;
    let mut body = AccountUpdateBody {
        public_key,
        balance_change: BalanceChange::negative(fee),
        increment_nonce: true,
        use_full_commitment: true,
        implicit_account_creation_fee: true,
        authorization_kind: AuthorizationKind::signature(),
        ..AccountUpdateBody::default()
    };
    body.preconditions.network.global_slot_since_genesis = OrIgnore::some(ClosedInterval {
        lower: 0,
        upper: valid_until.unwrap_or(u32::MAX),
    });
    body.preconditions.account.nonce = OrIgnore::some(ClosedInterval::exactly(nonce));
    AccountUpdate {
        body,
        authorization: Control {
            signature: Some(fee_payer.authorization),
            proof: None,
        },
    }
}

pub fn fee_payer_hash(fee_payer: &FeePayer, network: &NetworkId) -> Result<Field, TransactionError> {
    account_update_hash(&account_update_from_fee_payer(fee_payer), network)
}

/// Fails on invalid call depths and on any update with an invalid authorization kind.
pub fn transaction_commitments(
    command: &ZkappCommand,
    network: &NetworkId,
) -> Result<TransactionCommitments, TransactionError> {
    let commitment = call_forest_hash(&command.account_updates, network)?;
    let memo_hash = command.memo.hash()?;
    let fee_payer_digest = fee_payer_hash(&command.fee_payer, network)?;
    let full_commitment = Poseidon::hash_with_prefix(
        prefixes::ACCOUNT_UPDATE_CONS,
        &[memo_hash, fee_payer_digest, commitment],
    )?;
    debug!(
        %network,
        updates = command.account_updates.len(),
        %commitment,
        %full_commitment,
        "computed transaction commitments"
    );
    Ok(TransactionCommitments {
        commitment,
        full_commitment,
    })
}

/// Sign the fee payer and every signed-kind update owned by the fee payer's key.
///
/// The private key must belong to the fee payer.
pub fn sign_zkapp_command(
    command: &ZkappCommand,
    private_key: &PrivateKey,
    network: &NetworkId,
) -> Result<ZkappCommand, TransactionError> {
    let signer = private_key.to_public_key()?;
    let fee_payer = command.fee_payer.body.public_key;
    if signer != fee_payer {
        warn!(%network, "private key does not belong to the fee payer");
        return Err(TransactionError::SignerMismatch {
            expected: fee_payer.x.to_string(),
            actual: signer.x.to_string(),
        });
    }
    let commitments = transaction_commitments(command, network)?;
    let mut signed = command.clone();
    signed.fee_payer.authorization =
        sign_field_element(commitments.full_commitment, private_key, network)?;

    let mut count = 0usize;
    for update in signed.account_updates.iter_mut() {
        if !update.body.authorization_kind.is_signed || update.body.public_key != signer {
            continue;
        }
        let message = commitments.for_update(&update.body);
        update.authorization.signature = Some(sign_field_element(message, private_key, network)?);
        count += 1;
    }
    debug!(%network, signed_updates = count, "signed zkapp command");
    Ok(signed)
}

/// Check one update's signature against the commitment it selects. A missing signature fails.
pub fn verify_account_update_signature(
    update: &AccountUpdate,
    commitments: &TransactionCommitments,
    network: &NetworkId,
) -> bool {
    let Some(signature) = update.authorization.signature else {
        return false;
    };
    let message = commitments.for_update(&update.body);
    verify_field_element(&signature, message, &update.body.public_key, network)
}

/// Check the fee payer signature and every signed-kind update belonging to `public_key`.
pub fn verify_zkapp_command_signature(
    command: &ZkappCommand,
    public_key: &PublicKey,
    network: &NetworkId,
) -> bool {
    if command.fee_payer.body.public_key != *public_key {
        debug!(%network, "fee payer key differs from the verifying key");
        return false;
    }
    let commitments = match transaction_commitments(command, network) {
        Ok(commitments) => commitments,
        Err(err) => {
            debug!(%network, %err, "cannot compute commitments");
            return false;
        }
    };
    if !verify_field_element(
        &command.fee_payer.authorization,
        commitments.full_commitment,
        public_key,
        network,
    ) {
        return false;
    }
    command
        .account_updates
        .iter()
        .filter(|update| update.body.authorization_kind.is_signed)
        .filter(|update| update.body.public_key == *public_key)
        .all(|update| verify_account_update_signature(update, &commitments, network))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::dummy_verification_key_hash;

    fn fee_payer_key() -> PrivateKey {
        PrivateKey::from_seed(b"fee payer").unwrap()
    }

    fn command(updates: Vec<AccountUpdate>) -> ZkappCommand {
        ZkappCommand {
            fee_payer: FeePayer::new(FeePayerBody {
                public_key: fee_payer_key().to_public_key().unwrap(),
                fee: 100_000_000,
                valid_until: None,
                nonce: 4,
            }),
            account_updates: updates,
            memo: Memo::from_text("zkapp").unwrap(),
        }
    }

    fn signed_update(public_key: PublicKey, use_full_commitment: bool, call_depth: u32) -> AccountUpdate {
        AccountUpdate::new(AccountUpdateBody {
            public_key,
            use_full_commitment,
            call_depth,
            authorization_kind: AuthorizationKind::signature(),
            ..Default::default()
        })
    }

    #[test]
    fn fee_payer_update_shape() {
        let cmd = command(Vec::new());
        let update = account_update_from_fee_payer(&cmd.fee_payer);
        let body = &update.body;
        assert_eq!(body.balance_change, BalanceChange::negative(100_000_000));
        assert!(body.increment_nonce && body.use_full_commitment && body.implicit_account_creation_fee);
        assert_eq!(body.preconditions.account.nonce, OrIgnore::some(ClosedInterval::exactly(4)));
        assert_eq!(
            body.preconditions.network.global_slot_since_genesis.value,
            ClosedInterval { lower: 0, upper: u32::MAX }
        );
        assert_eq!(body.authorization_kind.verification_key_hash, dummy_verification_key_hash());
        assert_eq!(update.authorization.signature, Some(Signature::dummy()));
    }

    #[test]
    fn empty_command_commitment_is_zero() {
        let commitments = transaction_commitments(&command(Vec::new()), &NetworkId::Testnet).unwrap();
        assert_eq!(commitments.commitment, Field::ZERO);
        assert_ne!(commitments.full_commitment, Field::ZERO);
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let key = fee_payer_key();
        let pk = key.to_public_key().unwrap();
        let other = PrivateKey::from_seed(b"other").unwrap().to_public_key().unwrap();
        let cmd = command(vec![
            signed_update(pk, true, 0),
            signed_update(pk, false, 1),
            signed_update(other, false, 0),
        ]);
        let network = NetworkId::Testnet;
        let signed = sign_zkapp_command(&cmd, &key, &network).unwrap();
        assert!(signed.account_updates[0].authorization.signature.is_some());
        assert!(signed.account_updates[1].authorization.signature.is_some());
        assert!(signed.account_updates[2].authorization.signature.is_none());
        assert!(verify_zkapp_command_signature(&signed, &pk, &network));
        assert!(!verify_zkapp_command_signature(&signed, &pk, &NetworkId::Mainnet));
        assert!(!verify_zkapp_command_signature(&signed, &other, &network));

        let commitments = transaction_commitments(&signed, &network).unwrap();
        assert!(verify_account_update_signature(&signed.account_updates[1], &commitments, &network));
        assert!(!verify_account_update_signature(&signed.account_updates[2], &commitments, &network));
    }

    #[test]
    fn signing_does_not_change_commitments() {
        let key = fee_payer_key();
        let pk = key.to_public_key().unwrap();
        let cmd = command(vec![signed_update(pk, false, 0)]);
        let network = NetworkId::Mainnet;
        let before = transaction_commitments(&cmd, &network).unwrap();
        let signed = sign_zkapp_command(&cmd, &key, &network).unwrap();
        assert_eq!(transaction_commitments(&signed, &network).unwrap(), before);
    }

    #[test]
    fn missing_update_signature_fails_verification() {
        let key = fee_payer_key();
        let pk = key.to_public_key().unwrap();
        let network = NetworkId::Testnet;
        let mut signed = sign_zkapp_command(&command(vec![signed_update(pk, true, 0)]), &key, &network).unwrap();
        signed.account_updates[0].authorization.signature = None;
        assert!(!verify_zkapp_command_signature(&signed, &pk, &network));
    }

    #[test]
    fn memo_and_fee_are_bound_by_the_full_commitment() {
        let key = fee_payer_key();
        let pk = key.to_public_key().unwrap();
        let network = NetworkId::Testnet;
        let signed = sign_zkapp_command(&command(Vec::new()), &key, &network).unwrap();
        let mut tampered = signed.clone();
        tampered.memo = Memo::from_text("other").unwrap();
        assert!(!verify_zkapp_command_signature(&tampered, &pk, &network));
        let mut tampered = signed;
        tampered.fee_payer.body.fee += 1;
        assert!(!verify_zkapp_command_signature(&tampered, &pk, &network));
    }

    #[test]
    fn wrong_key_or_depths_are_rejected() {
        let cmd = command(Vec::new());
        let stranger = PrivateKey::from_seed(b"stranger").unwrap();
        assert!(matches!(
            sign_zkapp_command(&cmd, &stranger, &NetworkId::Testnet),
            Err(TransactionError::SignerMismatch { .. })
        ));
        let pk = fee_payer_key().to_public_key().unwrap();
        let bad = command(vec![signed_update(pk, false, 1)]);
        assert!(matches!(
            transaction_commitments(&bad, &NetworkId::Testnet),
            Err(TransactionError::InvalidCallDepth { index: 0, .. })
        ));
        assert!(!verify_zkapp_command_signature(&bad, &pk, &NetworkId::Testnet));
    }
}
