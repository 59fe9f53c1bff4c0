//! Field, curve, sponge and signature primitives for signing Mina-style transactions on Pallas.

pub mod curve;
pub mod deterministic;
pub mod error;
pub mod field;
pub mod hash_input;
pub mod hashes;
pub mod keys;
pub mod network;
pub mod poseidon;
pub mod signature;

pub use curve::Group;
pub use error::CryptoError;
pub use field::{Field, Scalar};
pub use hash_input::{HashInput, HashInputLegacy, ToInput, ToInputLegacy};
pub use keys::{Keypair, PrivateKey, PublicKey};
pub use network::NetworkId;
pub use poseidon::{Poseidon, PoseidonLegacy, Sponge};
pub use signature::Signature;
