//! The account-update body and its hashed layout.
//!
//! Field order in every `to_input` below is the protocol layout; reordering changes every hash.

use serde::{Deserialize, Serialize};
use signer_crypto::hash_input::{HashInput, ToInput};
use signer_crypto::poseidon::{Poseidon, Sponge};
use signer_crypto::{Field, NetworkId, PublicKey, Signature};
use tracing::trace;

use crate::error::TransactionError;
use crate::primitives::{
    default_token_id, dummy_verification_key_hash, ActionState, Actions, AuthRequired,
    BalanceChange, ClosedInterval, Events, OrIgnore, SetOrKeep, TokenSymbol,
    VerificationKeyWithHash, ZkappUri,
};

pub const APP_STATE_LENGTH: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationKeyPermission {
    pub auth: AuthRequired,
    pub txn_version: u32,
}

impl ToInput for VerificationKeyPermission {
    fn to_input(&self) -> HashInput {
        self.auth.to_input().append(self.txn_version.to_input())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub edit_state: AuthRequired,
    pub access: AuthRequired,
    pub send: AuthRequired,
    pub receive: AuthRequired,
    pub set_delegate: AuthRequired,
    pub set_permissions: AuthRequired,
    pub set_verification_key: VerificationKeyPermission,
    pub set_zkapp_uri: AuthRequired,
    pub edit_action_state: AuthRequired,
    pub set_token_symbol: AuthRequired,
    pub increment_nonce: AuthRequired,
    pub set_voting_for: AuthRequired,
    pub set_timing: AuthRequired,
}

impl ToInput for Permissions {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.edit_state);
        input.push(&self.access);
        input.push(&self.send);
        input.push(&self.receive);
        input.push(&self.set_delegate);
        input.push(&self.set_permissions);
        input.push(&self.set_verification_key);
        input.push(&self.set_zkapp_uri);
        input.push(&self.edit_action_state);
        input.push(&self.set_token_symbol);
        input.push(&self.increment_nonce);
        input.push(&self.set_voting_for);
        input.push(&self.set_timing);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub initial_minimum_balance: u64,
    pub cliff_time: u32,
    pub cliff_amount: u64,
    pub vesting_period: u32,
    pub vesting_increment: u64,
}

impl ToInput for Timing {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.initial_minimum_balance);
        input.push(&self.cliff_time);
        input.push(&self.cliff_amount);
        input.push(&self.vesting_period);
        input.push(&self.vesting_increment);
        input
    }
}

/// Account fields an update may overwrite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Update {
    pub app_state: [SetOrKeep<Field>; APP_STATE_LENGTH],
    pub delegate: SetOrKeep<PublicKey>,
    pub verification_key: SetOrKeep<VerificationKeyWithHash>,
    pub permissions: SetOrKeep<Permissions>,
    pub zkapp_uri: SetOrKeep<ZkappUri>,
    pub token_symbol: SetOrKeep<TokenSymbol>,
    pub timing: SetOrKeep<Timing>,
    pub voting_for: SetOrKeep<Field>,
}

impl ToInput for Update {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.app_state);
        input.push(&self.delegate);
        input.push(&self.verification_key);
        input.push(&self.permissions);
        input.push(&self.zkapp_uri);
        input.push(&self.token_symbol);
        input.push(&self.timing);
        input.push(&self.voting_for);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpochLedgerPrecondition {
    pub hash: OrIgnore<Field>,
    pub total_currency: OrIgnore<ClosedInterval<u64>>,
}

impl ToInput for EpochLedgerPrecondition {
    fn to_input(&self) -> HashInput {
        self.hash.to_input().append(self.total_currency.to_input())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpochDataPrecondition {
    pub ledger: EpochLedgerPrecondition,
    pub seed: OrIgnore<Field>,
    pub start_checkpoint: OrIgnore<Field>,
    pub lock_checkpoint: OrIgnore<Field>,
    pub epoch_length: OrIgnore<ClosedInterval<u32>>,
}

impl ToInput for EpochDataPrecondition {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.ledger);
        input.push(&self.seed);
        input.push(&self.start_checkpoint);
        input.push(&self.lock_checkpoint);
        input.push(&self.epoch_length);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkPrecondition {
    pub snarked_ledger_hash: OrIgnore<Field>,
    pub blockchain_length: OrIgnore<ClosedInterval<u32>>,
    pub min_window_density: OrIgnore<ClosedInterval<u32>>,
    pub total_currency: OrIgnore<ClosedInterval<u64>>,
    pub global_slot_since_genesis: OrIgnore<ClosedInterval<u32>>,
    pub staking_epoch_data: EpochDataPrecondition,
    pub next_epoch_data: EpochDataPrecondition,
}

impl ToInput for NetworkPrecondition {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.snarked_ledger_hash);
        input.push(&self.blockchain_length);
        input.push(&self.min_window_density);
        input.push(&self.total_currency);
        input.push(&self.global_slot_since_genesis);
        input.push(&self.staking_epoch_data);
        input.push(&self.next_epoch_data);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountPrecondition {
    pub balance: OrIgnore<ClosedInterval<u64>>,
    pub nonce: OrIgnore<ClosedInterval<u32>>,
    pub receipt_chain_hash: OrIgnore<Field>,
    pub delegate: OrIgnore<PublicKey>,
    pub state: [OrIgnore<Field>; APP_STATE_LENGTH],
    pub action_state: OrIgnore<ActionState>,
    pub proved_state: OrIgnore<bool>,
    pub is_new: OrIgnore<bool>,
}

impl ToInput for AccountPrecondition {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.balance);
        input.push(&self.nonce);
        input.push(&self.receipt_chain_hash);
        input.push(&self.delegate);
        input.push(&self.state);
        input.push(&self.action_state);
        input.push(&self.proved_state);
        input.push(&self.is_new);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preconditions {
    pub network: NetworkPrecondition,
    pub account: AccountPrecondition,
    pub valid_while: OrIgnore<ClosedInterval<u32>>,
}

impl ToInput for Preconditions {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.network);
        input.push(&self.account);
        input.push(&self.valid_while);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MayUseToken {
    pub parents_own_token: bool,
    pub inherit_from_parent: bool,
}

impl ToInput for MayUseToken {
    fn to_input(&self) -> HashInput {
        self.parents_own_token
            .to_input()
            .append(self.inherit_from_parent.to_input())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationKind {
    pub is_signed: bool,
    pub is_proved: bool,
    pub verification_key_hash: Field,
}

impl AuthorizationKind {
    pub fn none_given() -> Self {
        Self {
            is_signed: false,
            is_proved: false,
            verification_key_hash: dummy_verification_key_hash(),
        }
    }

    pub fn signature() -> Self {
        Self {
            is_signed: true,
            ..Self::none_given()
        }
    }

    pub fn proof(verification_key_hash: Field) -> Self {
        Self {
            is_signed: false,
            is_proved: true,
            verification_key_hash,
        }
    }
}

impl Default for AuthorizationKind {
    fn default() -> Self {
        Self::none_given()
    }
}

impl ToInput for AuthorizationKind {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.is_signed);
        input.push(&self.is_proved);
        input.push(&self.verification_key_hash);
        input
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountUpdateBody {
    pub public_key: PublicKey,
    pub token_id: Field,
    pub update: Update,
    pub balance_change: BalanceChange,
    pub increment_nonce: bool,
    pub events: Events,
    pub actions: Actions,
    pub call_data: Field,
    /// Position in the call forest. Not hashed.
    pub call_depth: u32,
    pub preconditions: Preconditions,
    pub use_full_commitment: bool,
    pub implicit_account_creation_fee: bool,
    pub may_use_token: MayUseToken,
    pub authorization_kind: AuthorizationKind,
}

impl Default for AccountUpdateBody {
    fn default() -> Self {
        Self {
            public_key: PublicKey::empty(),
            token_id: default_token_id(),
            update: Update::default(),
            balance_change: BalanceChange::default(),
            increment_nonce: false,
            events: Events::empty(),
            actions: Actions::empty(),
            call_data: Field::ZERO,
            call_depth: 0,
            preconditions: Preconditions::default(),
            use_full_commitment: false,
            implicit_account_creation_fee: false,
            may_use_token: MayUseToken::default(),
            authorization_kind: AuthorizationKind::default(),
        }
    }
}

impl ToInput for AccountUpdateBody {
    fn to_input(&self) -> HashInput {
        let mut input = HashInput::empty();
        input.push(&self.public_key);
        input.push(&self.token_id);
        input.push(&self.update);
        input.push(&self.balance_change);
        input.push(&self.increment_nonce);
        input.push(&self.events);
        input.push(&self.actions);
        input.push(&self.call_data);
        input.push(&self.preconditions);
        input.push(&self.use_full_commitment);
        input.push(&self.implicit_account_creation_fee);
        input.push(&self.may_use_token);
        input.push(&self.authorization_kind);
        input
    }
}

/// Authorization attached to an account update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub signature: Option<Signature>,
    /// Serialized proof, opaque to this crate.
    pub proof: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub body: AccountUpdateBody,
    #[serde(default)]
    pub authorization: Control,
}

impl AccountUpdate {
    pub fn new(body: AccountUpdateBody) -> Self {
        Self {
            body,
            authorization: Control::default(),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.body.public_key
    }

    pub fn call_depth(&self) -> u32 {
        self.body.call_depth
    }
}

pub fn assert_authorization_kind_valid(kind: &AuthorizationKind) -> Result<(), TransactionError> {
    if kind.is_proved && kind.is_signed {
        return Err(TransactionError::ProvedAndSigned);
    }
    let expected = dummy_verification_key_hash();
    if !kind.is_proved && kind.verification_key_hash != expected {
        return Err(TransactionError::VerificationKeyHashMismatch {
            expected: expected.to_string(),
            actual: kind.verification_key_hash.to_string(),
        });
    }
    Ok(())
}

/// Hash of one account update under the network's zkApp-body prefix.
pub fn account_update_hash(
    update: &AccountUpdate,
    network: &NetworkId,
) -> Result<Field, TransactionError> {
    assert_authorization_kind_valid(&update.body.authorization_kind)?;
    let fields = update.body.to_input().pack_to_fields();
    let hash = Poseidon::hash_with_prefix(&network.zkapp_body_prefix(), &fields)?;
    trace!(%network, inputs = fields.len(), "hashed account update");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signer_crypto::PrivateKey;

    fn key(seed: &[u8]) -> PublicKey {
        PrivateKey::from_seed(seed).unwrap().to_public_key().unwrap()
    }

    #[test]
    fn empty_body_layout_size() {
        // public key, token id, app state, delegate, vk hash, uri hash, voting for,
        // events + actions + call data, network (ledger hash + 2 epochs of 4), account, vk hash
        let input = AccountUpdateBody::default().to_input();
        assert_eq!(input.fields.len(), 1 + 1 + 8 + 1 + 1 + 1 + 1 + 3 + 9 + 11 + 1);
    }

    #[test]
    fn call_depth_is_not_hashed() {
        let mut update = AccountUpdate::new(AccountUpdateBody {
            public_key: key(b"depth"),
            ..Default::default()
        });
        let before = account_update_hash(&update, &NetworkId::Testnet).unwrap();
        update.body.call_depth = 3;
        assert_eq!(account_update_hash(&update, &NetworkId::Testnet).unwrap(), before);
    }

    #[test]
    fn every_body_field_is_bound() {
        let base = AccountUpdate::new(AccountUpdateBody::default());
        let network = NetworkId::Mainnet;
        let hash = account_update_hash(&base, &network).unwrap();
        let mut mutated = base.clone();
        mutated.body.preconditions.account.is_new = OrIgnore::some(true);
        assert_ne!(account_update_hash(&mutated, &network).unwrap(), hash);
        let mut mutated = base.clone();
        mutated.body.update.permissions = SetOrKeep::some(Permissions::default());
        assert_ne!(account_update_hash(&mutated, &network).unwrap(), hash);
        let mut mutated = base;
        mutated.body.may_use_token.inherit_from_parent = true;
        assert_ne!(account_update_hash(&mutated, &network).unwrap(), hash);
    }

    #[test]
    fn hash_depends_on_network() {
        let update = AccountUpdate::new(AccountUpdateBody::default());
        let mainnet = account_update_hash(&update, &NetworkId::Mainnet).unwrap();
        assert_ne!(account_update_hash(&update, &NetworkId::Testnet).unwrap(), mainnet);
        assert_eq!(
            account_update_hash(&update, &NetworkId::Testnet).unwrap(),
            account_update_hash(&update, &NetworkId::Devnet).unwrap()
        );
    }

    #[test]
    fn proved_and_signed_is_rejected() {
        let kind = AuthorizationKind {
            is_signed: true,
            is_proved: true,
            verification_key_hash: dummy_verification_key_hash(),
        };
        assert_eq!(
            assert_authorization_kind_valid(&kind).unwrap_err(),
            TransactionError::ProvedAndSigned
        );
        let update = AccountUpdate::new(AccountUpdateBody {
            authorization_kind: kind,
            ..Default::default()
        });
        assert!(account_update_hash(&update, &NetworkId::Mainnet).is_err());
    }

    #[test]
    fn unproved_update_needs_dummy_key_hash() {
        let kind = AuthorizationKind {
            verification_key_hash: Field::from_u64(42),
            ..AuthorizationKind::signature()
        };
        assert!(matches!(
            assert_authorization_kind_valid(&kind),
            Err(TransactionError::VerificationKeyHashMismatch { .. })
        ));
        assert!(assert_authorization_kind_valid(&AuthorizationKind::proof(Field::from_u64(42))).is_ok());
        assert!(assert_authorization_kind_valid(&AuthorizationKind::signature()).is_ok());
    }

    #[test]
    fn body_json_uses_camel_case_and_defaults() {
        let body: AccountUpdateBody =
            serde_json::from_str(r#"{"callDepth":2,"incrementNonce":true}"#).unwrap();
        assert_eq!(body.call_depth, 2);
        assert!(body.increment_nonce);
        assert_eq!(body.token_id, Field::ONE);
        assert_eq!(body.authorization_kind, AuthorizationKind::none_given());
    }
}
