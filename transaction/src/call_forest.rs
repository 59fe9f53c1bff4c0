//! The call forest: account updates arranged as trees by their call depths.
//!
//! Updates arrive as a pre-order list. [`CallForest`] keeps them in place and records, for each
//! index, where its subtree ends; roots and children are then walks over that table.

use core::iter;

use signer_crypto::poseidon::{prefixes, Poseidon, Sponge};
use signer_crypto::{Field, NetworkId};
use tracing::trace;

use crate::account_update::{account_update_hash, AccountUpdate};
use crate::error::TransactionError;

/// Check a pre-order depth list: it starts at 0, never goes negative and rises by at most one.
pub fn validate_call_depths(depths: &[i64]) -> Result<(), TransactionError> {
    let mut previous: Option<i64> = None;
    for (index, &depth) in depths.iter().enumerate() {
        let valid = match previous {
            None => depth == 0,
            Some(previous) => depth >= 0 && depth - previous <= 1,
        };
        if !valid {
            return Err(TransactionError::InvalidCallDepth {
                index,
                previous,
                depth,
            });
        }
        previous = Some(depth);
    }
    Ok(())
}

pub fn is_call_depth_valid(depths: &[i64]) -> bool {
    validate_call_depths(depths).is_ok()
}

/// Nested view of one tree, for callers that want owned structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallTree<'a> {
    pub update: &'a AccountUpdate,
    pub children: Vec<CallTree<'a>>,
}

#[derive(Clone, Debug)]
pub struct CallForest<'a> {
    updates: &'a [AccountUpdate],
    subtree_end: Vec<usize>,
}

impl<'a> CallForest<'a> {
    pub fn from_updates(updates: &'a [AccountUpdate]) -> Result<Self, TransactionError> {
        let depths: Vec<i64> = updates.iter().map(|u| i64::from(u.call_depth())).collect();
        validate_call_depths(&depths)?;

        let mut subtree_end = vec![updates.len(); updates.len()];
        let mut open: Vec<usize> = Vec::new();
        for (index, &depth) in depths.iter().enumerate() {
            while let Some(&top) = open.last() {
                if depths[top] < depth {
                    break;
                }
                subtree_end[top] = index;
                open.pop();
            }
            open.push(index);
        }
        Ok(Self {
            updates,
            subtree_end,
        })
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn update(&self, index: usize) -> &'a AccountUpdate {
        &self.updates[index]
    }

    /// Indices of the top-level updates, in order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.updates.len();
        iter::successors(Some(0), move |&i| Some(self.subtree_end[i])).take_while(move |&i| i < len)
    }

    /// Indices of the direct children of `index`, in order.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let end = self.subtree_end[index];
        iter::successors(Some(index + 1), move |&i| Some(self.subtree_end[i]))
            .take_while(move |&i| i < end)
    }

    pub fn trees(&self) -> Vec<CallTree<'a>> {
        self.roots().map(|root| self.tree(root)).collect()
    }

    fn tree(&self, index: usize) -> CallTree<'a> {
        CallTree {
            update: &self.updates[index],
            children: self.children(index).map(|child| self.tree(child)).collect(),
        }
    }

    /// Walk the forest depth-first and return `(update, depth)` in visiting order.
    pub fn flatten(&self) -> Vec<(&'a AccountUpdate, u32)> {
        let mut out = Vec::with_capacity(self.updates.len());
        let mut stack: Vec<(usize, u32)> = self.roots().map(|i| (i, 0)).collect();
        stack.reverse();
        while let Some((index, depth)) = stack.pop() {
            out.push((&self.updates[index], depth));
            let children: Vec<usize> = self.children(index).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
        out
    }

    /// Fold the forest into one field element.
    ///
    /// Siblings are consumed last to first: `node = H(node_prefix, [node_hash(update),
    /// hash(children)])`, `stack = H(cons_prefix, [node, stack])`, with the empty forest at zero.
    pub fn hash_with<F>(&self, mut node_hash: F) -> Result<Field, TransactionError>
    where
        F: FnMut(&AccountUpdate) -> Result<Field, TransactionError>,
    {
        let roots: Vec<usize> = self.roots().collect();
        self.hash_siblings(&roots, &mut node_hash)
    }

    fn hash_siblings<F>(&self, siblings: &[usize], node_hash: &mut F) -> Result<Field, TransactionError>
    where
        F: FnMut(&AccountUpdate) -> Result<Field, TransactionError>,
    {
        let mut stack = Field::ZERO;
        for &index in siblings.iter().rev() {
            let children: Vec<usize> = self.children(index).collect();
            let calls = self.hash_siblings(&children, node_hash)?;
            let tree = node_hash(&self.updates[index])?;
            let node = Poseidon::hash_with_prefix(prefixes::ACCOUNT_UPDATE_NODE, &[tree, calls])?;
            stack = Poseidon::hash_with_prefix(prefixes::ACCOUNT_UPDATE_CONS, &[node, stack])?;
            trace!(index, children = children.len(), "hashed call tree");
        }
        Ok(stack)
    }
}

/// Commitment to a list of account updates: the call-forest hash with account-update hashes
/// as node hashes.
pub fn call_forest_hash(
    updates: &[AccountUpdate],
    network: &NetworkId,
) -> Result<Field, TransactionError> {
    CallForest::from_updates(updates)?.hash_with(|update| account_update_hash(update, network))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_update::AccountUpdateBody;
    use proptest::prelude::*;

    fn updates(depths: &[u32]) -> Vec<AccountUpdate> {
        depths
            .iter()
            .enumerate()
            .map(|(i, &call_depth)| {
                AccountUpdate::new(AccountUpdateBody {
                    call_data: Field::from_u64(i as u64),
                    call_depth,
                    ..Default::default()
                })
            })
            .collect()
    }

    #[test]
    fn depth_rules() {
        assert!(is_call_depth_valid(&[]));
        assert!(is_call_depth_valid(&[0, 1, 2, 1, 0, 1]));
        assert!(is_call_depth_valid(&[0, 1, 2, 0]));
        assert_eq!(
            validate_call_depths(&[1]).unwrap_err(),
            TransactionError::InvalidCallDepth { index: 0, previous: None, depth: 1 }
        );
        assert_eq!(
            validate_call_depths(&[0, 2]).unwrap_err(),
            TransactionError::InvalidCallDepth { index: 1, previous: Some(0), depth: 2 }
        );
        assert!(!is_call_depth_valid(&[0, -1]));
    }

    #[test]
    fn invalid_depths_are_rejected_before_hashing() {
        let list = updates(&[0, 2]);
        let mut calls = 0;
        let result = CallForest::from_updates(&list).and_then(|forest| {
            forest.hash_with(|_| {
                calls += 1;
                Ok(Field::ZERO)
            })
        });
        assert!(matches!(result, Err(TransactionError::InvalidCallDepth { index: 1, .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn structure_follows_depths() {
        let list = updates(&[0, 1, 2, 1, 0]);
        let forest = CallForest::from_updates(&list).unwrap();
        assert_eq!(forest.roots().collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(forest.children(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(forest.children(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(forest.children(4).count(), 0);
        let trees = forest.trees();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].children[0].children[0].update, &list[2]);
    }

    #[test]
    fn empty_forest_hashes_to_zero() {
        let forest = CallForest::from_updates(&[]).unwrap();
        assert!(forest.is_empty());
        assert_eq!(forest.hash_with(|_| Ok(Field::ONE)).unwrap(), Field::ZERO);
    }

    #[test]
    fn single_node_hash_matches_definition() {
        let list = updates(&[0]);
        let forest = CallForest::from_updates(&list).unwrap();
        let leaf = Field::from_u64(77);
        let node = Poseidon::hash_with_prefix(prefixes::ACCOUNT_UPDATE_NODE, &[leaf, Field::ZERO]).unwrap();
        let expected =
            Poseidon::hash_with_prefix(prefixes::ACCOUNT_UPDATE_CONS, &[node, Field::ZERO]).unwrap();
        assert_eq!(forest.hash_with(|_| Ok(leaf)).unwrap(), expected);
    }

    #[test]
    fn nesting_changes_the_commitment() {
        let network = NetworkId::Testnet;
        let flat = call_forest_hash(&updates(&[0, 0]), &network).unwrap();
        let nested = call_forest_hash(&updates(&[0, 1]), &network).unwrap();
        assert_ne!(flat, nested);
    }

    fn depth_list() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(0u32..3, 0..12).prop_map(|steps| {
            let mut depths = Vec::with_capacity(steps.len());
            let mut current = 0u32;
            for (i, step) in steps.into_iter().enumerate() {
                current = match (i, step) {
                    (0, _) => 0,
                    (_, 0) => current + 1,
                    (_, 1) => current,
                    _ => current.saturating_sub(1),
                };
                depths.push(current);
            }
            depths
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn flatten_reproduces_the_input(depths in depth_list()) {
            let list = updates(&depths);
            let forest = CallForest::from_updates(&list).unwrap();
            let flat = forest.flatten();
            prop_assert_eq!(flat.len(), list.len());
            for ((update, depth), original) in flat.into_iter().zip(&list) {
                prop_assert_eq!(update, original);
                prop_assert_eq!(depth, original.call_depth());
            }
        }
    }
}
