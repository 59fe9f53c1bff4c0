//! JSON shapes accepted and returned by the client.
//!
//! Keys stay base58 strings and numbers may arrive as decimal strings, so a malformed value
//! surfaces when the shape is converted, not when it is parsed.

use protocol_codec::Base58Check;
use serde::{Deserialize, Serialize};
use signer_crypto::{Field, PublicKey, Scalar, Signature};
use signer_transaction::{user_command, Memo, ZkappCommand};

use crate::error::WalletError;

/// Integers that accept either a JSON number or a decimal string, and serialize as a string.
pub(crate) mod decimal {
    use core::fmt::Display;
    use core::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    fn convert<T, E>(raw: Raw) -> Result<T, E>
    where
        T: FromStr + TryFrom<u64>,
        E: de::Error,
    {
        match raw {
            Raw::Number(n) => T::try_from(n).map_err(|_| E::custom(format!("{n} is out of range"))),
            Raw::Text(text) => text
                .parse()
                .map_err(|_| E::custom(format!("invalid decimal string {text:?}"))),
        }
    }

    pub fn serialize<S: Serializer, T: Display>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + TryFrom<u64>,
    {
        convert(Raw::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer, T: Display>(
            value: &Option<T>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(value),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            D: Deserializer<'de>,
            T: FromStr + TryFrom<u64>,
        {
            Option::<Raw>::deserialize(deserializer)?
                .map(convert)
                .transpose()
        }
    }
}

pub(crate) fn parse_public_key(text: &str) -> Result<PublicKey, WalletError> {
    PublicKey::from_base58(text).map_err(|err| WalletError::InvalidInput {
        kind: "public key",
        input: format!("{text}: {err}"),
    })
}

/// A signature as the client exchanges it: decimal components plus the signer's address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureJson {
    pub field: String,
    pub scalar: String,
    pub signer: String,
}

impl SignatureJson {
    pub fn new(signature: &Signature, signer: &PublicKey) -> Result<Self, WalletError> {
        Ok(Self {
            field: signature.r.to_string(),
            scalar: signature.s.to_string(),
            signer: signer.to_base58()?,
        })
    }

    pub fn signature(&self) -> Result<Signature, WalletError> {
        Ok(Signature {
            r: self.field.parse::<Field>()?,
            s: self.scalar.parse::<Scalar>()?,
        })
    }

    pub fn signer(&self) -> Result<PublicKey, WalletError> {
        parse_public_key(&self.signer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    pub signature: SignatureJson,
    pub data: T,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub public_key: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub to: String,
    pub from: String,
    #[serde(with = "decimal")]
    pub amount: u64,
    #[serde(with = "decimal")]
    pub fee: u64,
    #[serde(with = "decimal")]
    pub nonce: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeDelegation {
    pub to: String,
    pub from: String,
    #[serde(with = "decimal")]
    pub fee: u64,
    #[serde(with = "decimal")]
    pub nonce: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<u32>,
}

/// Anything [`Client::sign_transaction`](crate::Client::sign_transaction) accepts. Untagged: the
/// variant is recognized by its fields, a payment by its `amount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignableData {
    Message(Message),
    Payment(Payment),
    StakeDelegation(StakeDelegation),
    ZkappCommand(ZkappCommand),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignedData {
    Message(Signed<Message>),
    Payment(Signed<Payment>),
    StakeDelegation(Signed<StakeDelegation>),
    /// The fee payer's authorization carries the signature.
    ZkappCommand(ZkappCommand),
}

impl Payment {
    /// Fill in the optional fields the way they are signed.
    pub fn normalized(&self, default_valid_until: u32) -> Self {
        Self {
            memo: Some(self.memo.clone().unwrap_or_default()),
            valid_until: Some(self.valid_until.unwrap_or(default_valid_until)),
            ..self.clone()
        }
    }

    pub fn to_payment(&self, default_valid_until: u32) -> Result<user_command::Payment, WalletError> {
        Ok(user_command::Payment {
            from: parse_public_key(&self.from)?,
            to: parse_public_key(&self.to)?,
            amount: self.amount,
            fee: self.fee,
            nonce: self.nonce,
            memo: Memo::from_text(self.memo.as_deref().unwrap_or_default())?,
            valid_until: self.valid_until.unwrap_or(default_valid_until),
        })
    }
}

impl StakeDelegation {
    pub fn normalized(&self, default_valid_until: u32) -> Self {
        Self {
            memo: Some(self.memo.clone().unwrap_or_default()),
            valid_until: Some(self.valid_until.unwrap_or(default_valid_until)),
            ..self.clone()
        }
    }

    pub fn to_stake_delegation(
        &self,
        default_valid_until: u32,
    ) -> Result<user_command::StakeDelegation, WalletError> {
        Ok(user_command::StakeDelegation {
            from: parse_public_key(&self.from)?,
            to: parse_public_key(&self.to)?,
            fee: self.fee,
            nonce: self.nonce,
            memo: Memo::from_text(self.memo.as_deref().unwrap_or_default())?,
            valid_until: self.valid_until.unwrap_or(default_valid_until),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_decimal_strings_both_parse() {
        let from_numbers: Payment = serde_json::from_str(
            r#"{"to":"a","from":"b","amount":5,"fee":1,"nonce":0}"#,
        )
        .unwrap();
        let from_strings: Payment = serde_json::from_str(
            r#"{"to":"a","from":"b","amount":"5","fee":"1","nonce":"0"}"#,
        )
        .unwrap();
        assert_eq!(from_numbers, from_strings);
        assert_eq!(from_numbers.memo, None);
        assert_eq!(from_numbers.valid_until, None);
    }

    #[test]
    fn amounts_serialize_as_strings() {
        let payment = Payment {
            to: "a".into(),
            from: "b".into(),
            amount: u64::MAX,
            fee: 2,
            nonce: 7,
            memo: None,
            valid_until: Some(10),
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["amount"], "18446744073709551615");
        assert_eq!(json["nonce"], "7");
        assert_eq!(json["validUntil"], "10");
        assert!(json.get("memo").is_none());
    }

    #[test]
    fn out_of_range_nonce_is_rejected() {
        let result: Result<StakeDelegation, _> = serde_json::from_str(
            r#"{"to":"a","from":"b","fee":1,"nonce":4294967296}"#,
        );
        assert!(result.is_err());
        let result: Result<StakeDelegation, _> =
            serde_json::from_str(r#"{"to":"a","from":"b","fee":"1.5","nonce":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn signable_data_is_recognized_by_shape() {
        let message: SignableData =
            serde_json::from_str(r#"{"publicKey":"a","message":"hi"}"#).unwrap();
        assert!(matches!(message, SignableData::Message(_)));

        let payment: SignableData = serde_json::from_str(
            r#"{"to":"a","from":"b","amount":"5","fee":"1","nonce":"0"}"#,
        )
        .unwrap();
        assert!(matches!(payment, SignableData::Payment(ref p) if p.amount == 5));

        let delegation: SignableData =
            serde_json::from_str(r#"{"to":"a","from":"b","fee":"1","nonce":"0"}"#).unwrap();
        assert!(matches!(delegation, SignableData::StakeDelegation(_)));

        assert!(serde_json::from_str::<SignableData>(r#"{"unexpected":true}"#).is_err());
    }

    #[test]
    fn normalization_fills_defaults() {
        let delegation = StakeDelegation {
            to: "a".into(),
            from: "b".into(),
            fee: 1,
            nonce: 0,
            memo: None,
            valid_until: None,
        };
        let normalized = delegation.normalized(99);
        assert_eq!(normalized.memo.as_deref(), Some(""));
        assert_eq!(normalized.valid_until, Some(99));
    }

    #[test]
    fn malformed_signature_components_fail_on_conversion() {
        let json = SignatureJson {
            field: "12x".into(),
            scalar: "1".into(),
            signer: "B62".into(),
        };
        assert!(json.signature().is_err());
        assert!(json.signer().is_err());
    }
}
