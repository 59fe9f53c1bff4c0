//! The boundary to a proof system. Proofs are opaque bytes here; checking them is delegated.

use signer_crypto::NetworkId;
use tracing::debug;

use crate::account_update::{assert_authorization_kind_valid, AccountUpdate};
use crate::zkapp_command::{verify_account_update_signature, TransactionCommitments};

pub trait ProofVerifier {
    fn verify(&self, proof: &[u8], verification_key: &[u8]) -> bool;
}

/// A verifier for environments without a proving backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectProofs;

impl ProofVerifier for RejectProofs {
    fn verify(&self, _proof: &[u8], _verification_key: &[u8]) -> bool {
        false
    }
}

/// Check an update's authorization against what its authorization kind declares.
///
/// Signed updates need a valid signature, proved updates a proof accepted by `verifier`, and
/// updates declaring neither must carry neither.
pub fn verify_account_update_authorization<V: ProofVerifier + ?Sized>(
    update: &AccountUpdate,
    commitments: &TransactionCommitments,
    network: &NetworkId,
    verifier: &V,
    verification_key: &[u8],
) -> bool {
    let kind = &update.body.authorization_kind;
    if let Err(err) = assert_authorization_kind_valid(kind) {
        debug!(%err, "invalid authorization kind");
        return false;
    }
    let control = &update.authorization;
    if kind.is_signed {
        verify_account_update_signature(update, commitments, network)
    } else if kind.is_proved {
        match &control.proof {
            Some(proof) => verifier.verify(proof, verification_key),
            None => false,
        }
    } else {
        control.signature.is_none() && control.proof.is_none()
    }
}
