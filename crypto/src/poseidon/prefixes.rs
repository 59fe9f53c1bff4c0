//! Domain-separation prefixes. Each is absorbed as a single field element before the payload.

pub const EVENT: &str = "MinaZkappEvent******";
pub const EVENTS: &str = "MinaZkappEvents*****";
pub const SEQUENCE_EVENTS: &str = "MinaZkappSeqEvents**";
pub const ZKAPP_BODY: &str = "MinaZkappBody*******";
pub const ACCOUNT_UPDATE_CONS: &str = "MinaAcctUpdateCons**";
pub const ACCOUNT_UPDATE_NODE: &str = "MinaAcctUpdateNode**";
pub const ACCOUNT: &str = "MinaAccount*********";
pub const ZKAPP_MEMO: &str = "MinaZkappMemo*******";
pub const ZKAPP_URI: &str = "MinaZkappUri********";
pub const DERIVE_TOKEN_ID: &str = "MinaDeriveTokenId***";

pub const SIGNATURE_MAINNET: &str = "MinaSignatureMainnet";
pub const SIGNATURE_TESTNET: &str = "CodaSignature*******";
pub const ZKAPP_BODY_MAINNET: &str = "MainnetZkappBody****";
pub const ZKAPP_BODY_TESTNET: &str = "TestnetZkappBody****";

// Salts whose sponge output stands for an empty collection.
pub const EVENTS_EMPTY: &str = "MinaZkappEventsEmpty";
pub const ACTIONS_EMPTY: &str = "MinaZkappActionsEmpty";
pub const ACTION_STATE_EMPTY: &str = "MinaZkappActionStateEmptyElt";
