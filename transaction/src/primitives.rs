//! Leaf types of the account-update layout and how each contributes to a [`HashInput`].
//!
//! Every type here has an "empty" value given by its [`Default`] impl. Optional slots
//! ([`SetOrKeep`], [`OrIgnore`]) still hash their value when unset, so these defaults are part of
//! the hashed layout and must not change.

use core::marker::PhantomData;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use signer_crypto::hash_input::{HashInput, ToInput};
use signer_crypto::poseidon::{prefixes, Poseidon, Sponge};
use signer_crypto::Field;

use crate::error::TransactionError;

/// Hash of the dummy verification key; the required value whenever an update is not proved.
pub const DUMMY_VERIFICATION_KEY_HASH: &str =
    "3392518251768960475377392625298437850623664973002200885669375116181514017494";

pub const MAX_TOKEN_SYMBOL_LENGTH: usize = 6;
const TOKEN_SYMBOL_BITS: u32 = 48;

static DUMMY_VK_HASH: Lazy<Field> = Lazy::new(|| {
    DUMMY_VERIFICATION_KEY_HASH
        .parse()
        .expect("dummy verification key hash is a canonical field element")
});

static EMPTY_ZKAPP_URI_HASH: Lazy<Field> = Lazy::new(|| {
    hash_zkapp_uri("").expect("zkapp uri prefix fits in a field element")
});

static EMPTY_EVENTS_HASH: Lazy<Field> = Lazy::new(|| {
    Poseidon::empty_hash_with_prefix(prefixes::EVENTS_EMPTY)
        .expect("events salt fits in a field element")
});

static EMPTY_ACTIONS_HASH: Lazy<Field> = Lazy::new(|| {
    Poseidon::empty_hash_with_prefix(prefixes::ACTIONS_EMPTY)
        .expect("actions salt fits in a field element")
});

static EMPTY_ACTION_STATE: Lazy<Field> = Lazy::new(|| {
    Poseidon::empty_hash_with_prefix(prefixes::ACTION_STATE_EMPTY)
        .expect("action state salt fits in a field element")
});

pub fn dummy_verification_key_hash() -> Field {
    *DUMMY_VK_HASH
}

/// The token id of MINA itself.
pub fn default_token_id() -> Field {
    Field::ONE
}

/// A value together with a presence flag.
///
/// The flag is packed first, then the value's own input. An absent value still hashes, using
/// whatever `value` holds (the type's empty value unless built otherwise).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Flagged<T> {
    pub is_some: bool,
    pub value: T,
}

/// An update slot: set to `value`, or keep the current account state.
pub type SetOrKeep<T> = Flagged<T>;

/// A precondition slot: check against `value`, or ignore.
pub type OrIgnore<T> = Flagged<T>;

impl<T> Flagged<T> {
    pub fn some(value: T) -> Self {
        Self {
            is_some: true,
            value,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        self.is_some.then_some(&self.value)
    }
}

impl<T: Default> Flagged<T> {
    pub fn none() -> Self {
        Self::default()
    }
}

impl<T: Default> From<Option<T>> for Flagged<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::some(value),
            None => Self::none(),
        }
    }
}

impl<T: ToInput> ToInput for Flagged<T> {
    fn to_input(&self) -> HashInput {
        let value = self.value.to_input();
        let mut packed = Vec::with_capacity(value.packed.len() + 1);
        packed.push((Field::from_bool(self.is_some), 1));
        packed.extend(value.packed);
        HashInput {
            fields: value.fields,
            packed,
        }
    }
}

impl<T: Serialize> Serialize for Flagged<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Flagged<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// An inclusive range. The empty value is the full range of the type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClosedInterval<T> {
    pub lower: T,
    pub upper: T,
}

impl<T: Copy> ClosedInterval<T> {
    pub fn exactly(value: T) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }
}

impl<T: PartialOrd> ClosedInterval<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.lower <= *value && *value <= self.upper
    }
}

impl Default for ClosedInterval<u32> {
    fn default() -> Self {
        Self {
            lower: 0,
            upper: u32::MAX,
        }
    }
}

impl Default for ClosedInterval<u64> {
    fn default() -> Self {
        Self {
            lower: 0,
            upper: u64::MAX,
        }
    }
}

impl<T: ToInput> ToInput for ClosedInterval<T> {
    fn to_input(&self) -> HashInput {
        self.lower.to_input().append(self.upper.to_input())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl ToInput for Sign {
    fn to_input(&self) -> HashInput {
        HashInput::from_packed(Field::from_bool(*self == Sign::Positive), 1)
    }
}

/// A signed amount in nanomina.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceChange {
    pub magnitude: u64,
    pub sgn: Sign,
}

impl BalanceChange {
    pub fn negative(magnitude: u64) -> Self {
        Self {
            magnitude,
            sgn: Sign::Negative,
        }
    }
}

impl ToInput for BalanceChange {
    fn to_input(&self) -> HashInput {
        self.magnitude.to_input().append(self.sgn.to_input())
    }
}

/// Who may perform an action on an account, as three flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequired {
    pub constant: bool,
    pub signature_necessary: bool,
    pub signature_sufficient: bool,
}

impl AuthRequired {
    const fn new(constant: bool, signature_necessary: bool, signature_sufficient: bool) -> Self {
        Self {
            constant,
            signature_necessary,
            signature_sufficient,
        }
    }

    pub const fn none() -> Self {
        Self::new(true, false, true)
    }

    pub const fn impossible() -> Self {
        Self::new(true, true, false)
    }

    pub const fn proof() -> Self {
        Self::new(false, false, false)
    }

    pub const fn signature() -> Self {
        Self::new(false, true, true)
    }

    pub const fn either() -> Self {
        Self::new(false, false, true)
    }
}

impl ToInput for AuthRequired {
    fn to_input(&self) -> HashInput {
        HashInput {
            fields: Vec::new(),
            packed: vec![
                (Field::from_bool(self.constant), 1),
                (Field::from_bool(self.signature_necessary), 1),
                (Field::from_bool(self.signature_sufficient), 1),
            ],
        }
    }
}

/// A token symbol of at most six bytes, hashed as a 48-bit chunk of its little-endian bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenSymbol {
    symbol: String,
    field: Field,
}

impl TokenSymbol {
    pub fn new(symbol: &str) -> Result<Self, TransactionError> {
        if symbol.len() > MAX_TOKEN_SYMBOL_LENGTH {
            return Err(TransactionError::TokenSymbolTooLong(symbol.to_string()));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            field: Field::from_le_bytes_mod_order(symbol.as_bytes()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.symbol
    }

    pub fn field(&self) -> Field {
        self.field
    }
}

impl ToInput for TokenSymbol {
    fn to_input(&self) -> HashInput {
        HashInput::from_packed(self.field, TOKEN_SYMBOL_BITS)
    }
}

impl Serialize for TokenSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.symbol)
    }
}

impl<'de> Deserialize<'de> for TokenSymbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Self::new(&symbol).map_err(serde::de::Error::custom)
    }
}

/// Hash of a zkApp URI: its bits, least significant first within each byte, followed by a
/// terminating `1`, each bit packed as its own chunk. The empty URI hashes two zero fields.
pub fn hash_zkapp_uri(uri: &str) -> Result<Field, TransactionError> {
    let packed = if uri.is_empty() {
        vec![Field::ZERO, Field::ZERO]
    } else {
        let mut bits = protocol_codec::bytes_to_bits(uri.as_bytes());
        bits.push(true);
        HashInput {
            fields: Vec::new(),
            packed: bits.into_iter().map(|bit| (Field::from_bool(bit), 1)).collect(),
        }
        .pack_to_fields()
    };
    Ok(Poseidon::hash_with_prefix(prefixes::ZKAPP_URI, &packed)?)
}

/// A URI stored next to its hash; only the hash is part of the layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZkappUri {
    data: String,
    hash: Field,
}

impl ZkappUri {
    pub fn new(uri: &str) -> Result<Self, TransactionError> {
        Ok(Self {
            data: uri.to_string(),
            hash: hash_zkapp_uri(uri)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn hash(&self) -> Field {
        self.hash
    }
}

impl Default for ZkappUri {
    fn default() -> Self {
        Self {
            data: String::new(),
            hash: *EMPTY_ZKAPP_URI_HASH,
        }
    }
}

impl ToInput for ZkappUri {
    fn to_input(&self) -> HashInput {
        self.hash.to_input()
    }
}

impl Serialize for ZkappUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data)
    }
}

impl<'de> Deserialize<'de> for ZkappUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        Self::new(&uri).map_err(serde::de::Error::custom)
    }
}

/// Serialized verification key and its hash; only the hash is part of the layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationKeyWithHash {
    pub data: String,
    pub hash: Field,
}

impl Default for VerificationKeyWithHash {
    fn default() -> Self {
        Self {
            data: String::new(),
            hash: dummy_verification_key_hash(),
        }
    }
}

impl ToInput for VerificationKeyWithHash {
    fn to_input(&self) -> HashInput {
        self.hash.to_input()
    }
}

/// An action-state precondition value. Its empty value is the empty action-state element,
/// not zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionState(pub Field);

impl ActionState {
    pub fn empty() -> Self {
        Self(*EMPTY_ACTION_STATE)
    }

    /// Fold one account update's actions into the running state.
    pub fn push_actions(&self, actions: &Actions) -> Result<Self, TransactionError> {
        let next = Poseidon::hash_with_prefix(prefixes::SEQUENCE_EVENTS, &[self.0, actions.hash()])?;
        Ok(Self(next))
    }
}

impl Default for ActionState {
    fn default() -> Self {
        Self::empty()
    }
}

impl ToInput for ActionState {
    fn to_input(&self) -> HashInput {
        self.0.to_input()
    }
}

/// Selects the prefixes of an [`EventList`].
pub trait EventKind {
    /// Prefix for combining the list hash with a new element hash.
    const LIST_PREFIX: &'static str;

    fn empty_hash() -> Field;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventsKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionsKind;

impl EventKind for EventsKind {
    const LIST_PREFIX: &'static str = prefixes::EVENTS;

    fn empty_hash() -> Field {
        *EMPTY_EVENTS_HASH
    }
}

impl EventKind for ActionsKind {
    const LIST_PREFIX: &'static str = prefixes::SEQUENCE_EVENTS;

    fn empty_hash() -> Field {
        *EMPTY_ACTIONS_HASH
    }
}

/// A list of events (or actions), newest first, with its running hash.
///
/// `hash(push(list, e)) = H(list_prefix, [hash(list), H(event_prefix, e)])`, starting from the
/// kind's empty salt.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventList<K> {
    data: Vec<Vec<Field>>,
    hash: Field,
    kind: PhantomData<K>,
}

pub type Events = EventList<EventsKind>;
pub type Actions = EventList<ActionsKind>;

impl<K: EventKind> EventList<K> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            hash: K::empty_hash(),
            kind: PhantomData,
        }
    }

    /// Build from a newest-first list.
    pub fn from_list(data: Vec<Vec<Field>>) -> Result<Self, TransactionError> {
        let mut list = Self::empty();
        for event in data.into_iter().rev() {
            list = list.push(event)?;
        }
        Ok(list)
    }

    pub fn push(mut self, event: Vec<Field>) -> Result<Self, TransactionError> {
        let event_hash = Poseidon::hash_with_prefix(prefixes::EVENT, &event)?;
        self.hash = Poseidon::hash_with_prefix(K::LIST_PREFIX, &[self.hash, event_hash])?;
        self.data.insert(0, event);
        Ok(self)
    }

    pub fn data(&self) -> &[Vec<Field>] {
        &self.data
    }

    pub fn hash(&self) -> Field {
        self.hash
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: EventKind> Default for EventList<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K> ToInput for EventList<K> {
    fn to_input(&self) -> HashInput {
        self.hash.to_input()
    }
}

impl<K> Serialize for EventList<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl<'de, K: EventKind> Deserialize<'de> for EventList<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = Vec::<Vec<Field>>::deserialize(deserializer)?;
        Self::from_list(data).map_err(serde::de::Error::custom)
    }
}
