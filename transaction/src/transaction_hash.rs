//! Transaction hashes of signed user commands.
//!
//! The current layout serializes the signed command and hashes the bytes. The v1 layout is a
//! frozen wrapper table kept only so that hashes of old commands can be reproduced: the command
//! is serialized with that table, base58-encoded, and the ASCII of the base58 string is hashed.

use protocol_codec::{
    base58, binable_record, read_tag, version_bytes, write_tag, Binable, CodecError, Versioned,
};
use signer_crypto::hashes::blake2_256;
use signer_crypto::{PublicKey, Signature};
use tracing::debug;

use crate::error::TransactionError;
use crate::memo::Memo;
use crate::user_command::{
    Body, Common, Payment, SignedCommand, StakeDelegation, LEGACY_TOKEN_ID,
};

/// Length prefix of the digest inside a transaction hash.
const DIGEST_LENGTH_PREFIX: u8 = 32;

fn encode_digest(bytes: &[u8]) -> String {
    let digest = blake2_256(bytes);
    let mut payload = Vec::with_capacity(digest.len() + 1);
    payload.push(DIGEST_LENGTH_PREFIX);
    payload.extend_from_slice(&digest);
    base58::encode_check(version_bytes::TRANSACTION_HASH, &payload)
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CommonRecord {
    fee: u64,
    fee_payer: PublicKey,
    nonce: u32,
    valid_until: u32,
    memo: Memo,
}

binable_record!(CommonRecord {
    fee,
    fee_payer,
    nonce,
    valid_until,
    memo
});

#[derive(Clone, Debug, PartialEq, Eq)]
struct PaymentRecord {
    receiver: PublicKey,
    amount: u64,
}

binable_record!(PaymentRecord { receiver, amount });

#[derive(Clone, Debug, PartialEq, Eq)]
struct SetDelegateRecord {
    new_delegate: PublicKey,
}

binable_record!(SetDelegateRecord { new_delegate });

#[derive(Clone, Debug, PartialEq, Eq)]
enum DelegationRecord {
    SetDelegate(SetDelegateRecord),
}

impl Binable for DelegationRecord {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            DelegationRecord::SetDelegate(record) => {
                write_tag(out, 0);
                record.write_bytes(out)
            }
        }
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (_, offset) = read_tag(bytes, offset, 1)?;
        let (record, offset) = SetDelegateRecord::read_bytes(bytes, offset)?;
        Ok((DelegationRecord::SetDelegate(record), offset))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum BodyRecord {
    Payment(PaymentRecord),
    StakeDelegation(DelegationRecord),
}

impl Binable for BodyRecord {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            BodyRecord::Payment(record) => {
                write_tag(out, 0);
                record.write_bytes(out)
            }
            BodyRecord::StakeDelegation(record) => {
                write_tag(out, 1);
                record.write_bytes(out)
            }
        }
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (tag, offset) = read_tag(bytes, offset, 2)?;
        if tag == 0 {
            let (record, offset) = PaymentRecord::read_bytes(bytes, offset)?;
            Ok((BodyRecord::Payment(record), offset))
        } else {
            let (record, offset) = DelegationRecord::read_bytes(bytes, offset)?;
            Ok((BodyRecord::StakeDelegation(record), offset))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PayloadRecord {
    common: CommonRecord,
    body: BodyRecord,
}

binable_record!(PayloadRecord { common, body });

#[derive(Clone, Debug, PartialEq, Eq)]
struct SignedCommandRecord {
    payload: PayloadRecord,
    signer: PublicKey,
    signature: Signature,
}

binable_record!(SignedCommandRecord {
    payload,
    signer,
    signature
});

impl From<&SignedCommand> for SignedCommandRecord {
    fn from(command: &SignedCommand) -> Self {
        let Common {
            fee,
            fee_payer,
            nonce,
            valid_until,
            memo,
        } = command.payload.common;
        let body = match command.payload.body {
            Body::Payment {
                receiver, amount, ..
            } => BodyRecord::Payment(PaymentRecord { receiver, amount }),
            Body::StakeDelegation { new_delegate, .. } => {
                BodyRecord::StakeDelegation(DelegationRecord::SetDelegate(SetDelegateRecord {
                    new_delegate,
                }))
            }
        };
        Self {
            payload: PayloadRecord {
                common: CommonRecord {
                    fee,
                    fee_payer,
                    nonce,
                    valid_until,
                    memo,
                },
                body,
            },
            signer: command.signer,
            signature: command.signature,
        }
    }
}

/// Binary encoding of a signed command in the current layout.
pub fn signed_command_bytes(command: &SignedCommand) -> Result<Vec<u8>, TransactionError> {
    Ok(SignedCommandRecord::from(command).to_bytes()?)
}

/// `base58(29, [32] ++ blake2b-256(bytes))` of the current encoding.
pub fn hash_signed_command(command: &SignedCommand) -> Result<String, TransactionError> {
    let hash = encode_digest(&signed_command_bytes(command)?);
    debug!(%hash, "hashed signed command");
    Ok(hash)
}

// Frozen v1 wrapper table. Each alias is one row; the nesting of `Versioned` is the layout.
type With1<T> = Versioned<T, 1>;
type Uint64V1 = With1<With1<u64>>;
type Uint32V1 = With1<With1<u32>>;
type AmountV1 = With1<Uint64V1>;
type CommonV1 = With1<With1<CommonRecordV1>>;
type PaymentV1 = With1<With1<PaymentRecordV1>>;
type DelegationV1 = With1<DelegationRecordV1>;
type BodyV1 = With1<BodyRecordV1>;
type UserCommandV1 = With1<UserCommandRecordV1>;
type SignedCommandV1 = With1<With1<SignedCommandRecordV1>>;

fn v1_u64(value: u64) -> AmountV1 {
    Versioned(Versioned(Versioned(value)))
}

fn v1_u32(value: u32) -> Uint32V1 {
    Versioned(Versioned(value))
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CommonRecordV1 {
    fee: AmountV1,
    fee_token: AmountV1,
    fee_payer_pk: PublicKey,
    nonce: Uint32V1,
    valid_until: Uint32V1,
    memo: With1<Memo>,
}

binable_record!(CommonRecordV1 {
    fee,
    fee_token,
    fee_payer_pk,
    nonce,
    valid_until,
    memo
});

#[derive(Clone, Debug, PartialEq, Eq)]
struct PaymentRecordV1 {
    source: PublicKey,
    receiver: PublicKey,
    token_id: AmountV1,
    amount: AmountV1,
}

binable_record!(PaymentRecordV1 {
    source,
    receiver,
    token_id,
    amount
});

#[derive(Clone, Debug, PartialEq, Eq)]
struct SetDelegateRecordV1 {
    delegator: PublicKey,
    new_delegate: PublicKey,
}

binable_record!(SetDelegateRecordV1 {
    delegator,
    new_delegate
});

#[derive(Clone, Debug, PartialEq, Eq)]
enum DelegationRecordV1 {
    SetDelegate(SetDelegateRecordV1),
}

impl Binable for DelegationRecordV1 {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            DelegationRecordV1::SetDelegate(record) => {
                write_tag(out, 0);
                record.write_bytes(out)
            }
        }
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (_, offset) = read_tag(bytes, offset, 1)?;
        let (record, offset) = SetDelegateRecordV1::read_bytes(bytes, offset)?;
        Ok((DelegationRecordV1::SetDelegate(record), offset))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum BodyRecordV1 {
    Payment(PaymentV1),
    StakeDelegation(DelegationV1),
}

impl Binable for BodyRecordV1 {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            BodyRecordV1::Payment(record) => {
                write_tag(out, 0);
                record.write_bytes(out)
            }
            BodyRecordV1::StakeDelegation(record) => {
                write_tag(out, 1);
                record.write_bytes(out)
            }
        }
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (tag, offset) = read_tag(bytes, offset, 2)?;
        if tag == 0 {
            let (record, offset) = PaymentV1::read_bytes(bytes, offset)?;
            Ok((BodyRecordV1::Payment(record), offset))
        } else {
            let (record, offset) = DelegationV1::read_bytes(bytes, offset)?;
            Ok((BodyRecordV1::StakeDelegation(record), offset))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct UserCommandRecordV1 {
    common: CommonV1,
    body: BodyV1,
}

binable_record!(UserCommandRecordV1 { common, body });

#[derive(Clone, Debug, PartialEq, Eq)]
struct SignedCommandRecordV1 {
    payload: UserCommandV1,
    signer: With1<PublicKey>,
    signature: With1<Signature>,
}

binable_record!(SignedCommandRecordV1 {
    payload,
    signer,
    signature
});

fn to_v1(command: &SignedCommand) -> SignedCommandV1 {
    let common = &command.payload.common;
    let body = match command.payload.body {
        Body::Payment {
            source,
            receiver,
            amount,
        } => BodyRecordV1::Payment(Versioned(Versioned(PaymentRecordV1 {
            source,
            receiver,
            token_id: v1_u64(LEGACY_TOKEN_ID),
            amount: v1_u64(amount),
        }))),
        Body::StakeDelegation {
            delegator,
            new_delegate,
        } => BodyRecordV1::StakeDelegation(Versioned(DelegationRecordV1::SetDelegate(
            SetDelegateRecordV1 {
                delegator,
                new_delegate,
            },
        ))),
    };
    Versioned(Versioned(SignedCommandRecordV1 {
        payload: Versioned(UserCommandRecordV1 {
            common: Versioned(Versioned(CommonRecordV1 {
                fee: v1_u64(common.fee),
                fee_token: v1_u64(LEGACY_TOKEN_ID),
                fee_payer_pk: common.fee_payer,
                nonce: v1_u32(common.nonce),
                valid_until: v1_u32(common.valid_until),
                memo: Versioned(common.memo),
            })),
            body: Versioned(body),
        }),
        signer: Versioned(command.signer),
        signature: Versioned(command.signature),
    }))
}

/// Base58 (version 19) of the v1 encoding of a signed command.
pub fn signed_command_v1_base58(command: &SignedCommand) -> Result<String, TransactionError> {
    let bytes = to_v1(command).to_bytes()?;
    Ok(base58::encode_check(version_bytes::SIGNED_COMMAND_V1, &bytes))
}

/// `base58(29, [32] ++ blake2b-256(ascii(v1 base58)))`.
pub fn hash_signed_command_v1(command: &SignedCommand) -> Result<String, TransactionError> {
    let encoded = signed_command_v1_base58(command)?;
    let hash = encode_digest(encoded.as_bytes());
    debug!(%hash, "hashed v1 signed command");
    Ok(hash)
}

/// Hash in the current layout when `berkeley` is set, otherwise in the v1 layout.
pub fn hash_user_command(command: &SignedCommand, berkeley: bool) -> Result<String, TransactionError> {
    if berkeley {
        hash_signed_command(command)
    } else {
        hash_signed_command_v1(command)
    }
}

pub fn hash_payment(
    payment: &Payment,
    signature: Signature,
    berkeley: bool,
) -> Result<String, TransactionError> {
    hash_user_command(&payment.into_signed_command(signature), berkeley)
}

pub fn hash_stake_delegation(
    delegation: &StakeDelegation,
    signature: Signature,
    berkeley: bool,
) -> Result<String, TransactionError> {
    hash_user_command(&delegation.into_signed_command(signature), berkeley)
}
