//! Association set difference.
//!
//! # Invariants
//! - `to_remove` and `to_add` never overlap.
//! - `(persisted − to_remove) ∪ to_add == requested`.
//! - An empty requested set removes every persisted link.

use crate::model::EntityId;
use std::collections::BTreeSet;

/// Link mutations needed to turn the persisted set into the requested one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDelta<T = EntityId> {
    /// Persisted but no longer requested.
    pub to_remove: BTreeSet<T>,
    /// Requested but not yet persisted.
    pub to_add: BTreeSet<T>,
}

impl<T: Ord + Clone> AssociationDelta<T> {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Applies the delta to a persisted set.
    pub fn apply(&self, persisted: &BTreeSet<T>) -> BTreeSet<T> {
        persisted
            .difference(&self.to_remove)
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }
}

/// Computes `(persisted − requested, requested − persisted)`.
pub fn diff<T: Ord + Clone>(persisted: &BTreeSet<T>, requested: &BTreeSet<T>) -> AssociationDelta<T> {
    AssociationDelta {
        to_remove: persisted.difference(requested).cloned().collect(),
        to_add: requested.difference(persisted).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::diff;
    use std::collections::BTreeSet;

    fn set(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn swap_one_member() {
        let delta = diff(&set(&[1, 2]), &set(&[2, 3]));
        assert_eq!(delta.to_remove, set(&[1]));
        assert_eq!(delta.to_add, set(&[3]));
    }

    #[test]
    fn empty_request_clears_everything() {
        let persisted = set(&[4, 5, 6]);
        let delta = diff(&persisted, &BTreeSet::new());
        assert_eq!(delta.to_remove, persisted);
        assert!(delta.to_add.is_empty());
    }

    #[test]
    fn identical_sets_produce_no_work() {
        let delta = diff(&set(&[7, 8]), &set(&[7, 8]));
        assert!(delta.is_empty());
    }

    #[test]
    fn applying_delta_yields_requested_and_outputs_are_disjoint() {
        let cases = [
            (set(&[]), set(&[1, 2])),
            (set(&[1, 2, 3]), set(&[])),
            (set(&[1, 2, 3]), set(&[3, 4, 5])),
            (set(&[9]), set(&[9])),
        ];
        for (persisted, requested) in cases {
            let delta = diff(&persisted, &requested);
            assert!(delta.to_remove.is_disjoint(&delta.to_add));
            assert_eq!(delta.apply(&persisted), requested);
        }
    }
}
