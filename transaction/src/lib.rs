//! Transactions over the signer primitives: zkApp account updates and their call forest,
//! transaction commitments and signing, memos, legacy user commands, and transaction hashes.

pub mod account_update;
pub mod call_forest;
pub mod error;
pub mod memo;
pub mod primitives;
pub mod proof;
pub mod transaction_hash;
pub mod user_command;
pub mod zkapp_command;

pub use account_update::{
    account_update_hash, assert_authorization_kind_valid, AccountUpdate, AccountUpdateBody,
    AuthorizationKind, Control,
};
pub use call_forest::{call_forest_hash, is_call_depth_valid, CallForest};
pub use error::TransactionError;
pub use memo::Memo;
pub use proof::{verify_account_update_authorization, ProofVerifier, RejectProofs};
pub use transaction_hash::{
    hash_payment, hash_signed_command, hash_signed_command_v1, hash_stake_delegation,
    hash_user_command,
};
pub use user_command::{Payment, SignedCommand, StakeDelegation, UserCommand};
pub use zkapp_command::{
    sign_zkapp_command, transaction_commitments, verify_account_update_signature,
    verify_zkapp_command_signature, FeePayer, FeePayerBody, TransactionCommitments, ZkappCommand,
};
