//! Call-depth validation and forest hashing over whole commands.

use proptest::prelude::*;
use signer_crypto::{Field, NetworkId};
use signer_transaction::account_update::{AccountUpdate, AccountUpdateBody};
use signer_transaction::call_forest::validate_call_depths;
use signer_transaction::{call_forest_hash, is_call_depth_valid, CallForest, TransactionError};

fn updates(depths: &[u32]) -> Vec<AccountUpdate> {
    depths
        .iter()
        .enumerate()
        .map(|(i, &call_depth)| {
            AccountUpdate::new(AccountUpdateBody {
                call_data: Field::from_u64(i as u64 + 1),
                call_depth,
                ..Default::default()
            })
        })
        .collect()
}

/// Depth sequences that start at zero and never rise by more than one.
fn valid_depths() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<bool>(), 0..24).prop_flat_map(|rises| {
        let len = rises.len();
        prop::collection::vec(0u32..4, len).prop_map(move |drops| {
            let mut depths = Vec::with_capacity(len);
            let mut current = 0u32;
            for (i, (&rise, &drop)) in rises.iter().zip(&drops).enumerate() {
                if i > 0 {
                    current = if rise { current + 1 } else { current.saturating_sub(drop) };
                }
                depths.push(current);
            }
            depths
        })
    })
}

#[test]
fn rejected_depth_sequences() {
    assert!(is_call_depth_valid(&[]));
    assert!(is_call_depth_valid(&[0, 1, 2, 0, 1, 1, 0]));
    assert!(!is_call_depth_valid(&[1]));
    assert!(!is_call_depth_valid(&[0, 2]));
    assert!(!is_call_depth_valid(&[0, -1]));
    assert!(matches!(
        validate_call_depths(&[0, 1, 3]),
        Err(TransactionError::InvalidCallDepth { index: 2, depth: 3, .. })
    ));
    assert!(CallForest::from_updates(&updates(&[0, 2])).is_err());
    assert!(call_forest_hash(&updates(&[1]), &NetworkId::Mainnet).is_err());
}

#[test]
fn empty_forest_hashes_to_zero() {
    assert_eq!(call_forest_hash(&[], &NetworkId::Mainnet).unwrap(), Field::ZERO);
}

#[test]
fn moving_a_subtree_changes_the_hash() {
    let network = NetworkId::Testnet;
    let nested = updates(&[0, 1, 1]);
    let mut flat = nested.clone();
    flat[2].body.call_depth = 0;
    assert_ne!(
        call_forest_hash(&nested, &network).unwrap(),
        call_forest_hash(&flat, &network).unwrap()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn generated_sequences_build_forests(depths in valid_depths()) {
        let signed: Vec<i64> = depths.iter().map(|&d| i64::from(d)).collect();
        prop_assert!(is_call_depth_valid(&signed));
        let list = updates(&depths);
        let forest = CallForest::from_updates(&list).expect("valid depths");
        let flattened: Vec<u32> = forest.flatten().into_iter().map(|(_, depth)| depth).collect();
        prop_assert_eq!(flattened, depths);
        let roots = forest.roots().count();
        prop_assert_eq!(roots, list.iter().filter(|u| u.body.call_depth == 0).count());
    }
}
