//! Single-level diff between two ordered sequences.
//!
//! Elements are matched by [`UniqueIdentity`]. Unmatched elements are added
//! or removed; matched pairs are classified as moved, updated or unchanged.
//! Moves are resolved against a live copy of the old ordering: each move is
//! applied before the next pair is examined, so a single displaced element
//! does not cause every element it jumped over to be reported as moved.

use std::hash::Hash;

use reconcile_types::MoveDetection;
use tracing::trace;

use crate::collection::IndexedCollection;
use crate::identity::UniqueIdentity;

/// An element present only in the new sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Added<T, I> {
    pub identifier: I,
    pub new_index: usize,
    pub new: T,
}

/// An element present only in the old sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Removed<T, I> {
    pub identifier: I,
    pub old_index: usize,
    pub old: T,
}

/// An element present in both sequences.
///
/// Used for moved, updated and unchanged elements alike; the list it is
/// stored in determines the category.
#[derive(Clone, Debug, PartialEq)]
pub struct Matched<T, I> {
    pub identifier: I,
    pub old_index: usize,
    pub new_index: usize,
    pub old: T,
    pub new: T,
}

/// The categorized changes between two sequences.
///
/// Every old element appears in exactly one of `removed`, `moved`, `updated`
/// or `no_change`; every new element in exactly one of `added`, `moved`,
/// `updated` or `no_change`.
///
/// Ordering: `added` ascending by new index, `removed` descending by old
/// index, `moved` descending by new index, `updated` and `no_change`
/// ascending by new index.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayDiff<T, I> {
    pub added: Vec<Added<T, I>>,
    pub removed: Vec<Removed<T, I>>,
    pub moved: Vec<Matched<T, I>>,
    pub updated: Vec<Matched<T, I>>,
    pub no_change: Vec<Matched<T, I>>,
    /// `added + removed + moved + updated`.
    pub change_count: usize,
    /// Whether the identity-only fast path produced this diff.
    pub used_fast_path: bool,
    old_count: usize,
    new_count: usize,
}

impl<T: Clone, I: Hash + Eq + Clone> ArrayDiff<T, I> {
    /// Diff `old` against `new`.
    ///
    /// - `identifier`: the caller's identity for an element; need not be unique.
    /// - `moved_hint`: flags pairs that should win repositioning when several
    ///   resolutions are possible, and restricts moves under
    ///   [`MoveDetection::OnlyHinted`].
    /// - `updated`: whether a matched pair's content changed.
    pub fn new<F, H, U>(
        old: &[T],
        new: &[T],
        move_detection: MoveDetection,
        identifier: F,
        moved_hint: H,
        updated: U,
    ) -> Self
    where
        F: Fn(&T) -> I,
        H: Fn(&T, &T) -> bool,
        U: Fn(&T, &T) -> bool,
    {
        if let Some(diff) = Self::fast_path(old, new, &identifier, &updated) {
            trace!(
                count = new.len(),
                updated = diff.updated.len(),
                "array diff took fast path"
            );
            return diff;
        }

        let mut old_set = IndexedCollection::new(old, &identifier);
        let mut new_set = IndexedCollection::new(new, &identifier);

        // Both differences are taken against the unpruned collections.
        let added_containers = new_set.difference(&old_set);
        let removed_containers = old_set.difference(&new_set);
        new_set.remove(&added_containers);
        old_set.remove(&removed_containers);

        let mut added: Vec<Added<T, I>> = added_containers
            .into_iter()
            .map(|c| Added {
                identifier: c.identity.into_base(),
                new_index: c.index,
                new: c.value,
            })
            .collect();

        let mut removed: Vec<Removed<T, I>> = removed_containers
            .into_iter()
            .map(|c| Removed {
                identifier: c.identity.into_base(),
                old_index: c.index,
                old: c.value,
            })
            .collect();

        let pairs = Pair::pairs(&mut old_set, &mut new_set, &moved_hint, &updated);

        let (mut hinted, mut not_hinted): (Vec<Pair<I>>, Vec<Pair<I>>) =
            pairs.into_iter().partition(|p| p.move_hinted);
        hinted.sort_by(|a, b| b.distance.cmp(&a.distance));
        not_hinted.sort_by(|a, b| b.distance.cmp(&a.distance));

        let mut moved = Vec::new();
        let mut updated_pairs = Vec::new();
        let mut no_change = Vec::new();

        // Hinted pairs go first so their moves take effect before an
        // unhinted pair could absorb the displacement.
        for pair in hinted.into_iter().chain(not_hinted) {
            let from = old_set.index_of(&pair.identity);
            let to = new_set.index_of(&pair.identity);

            let old_container = old_set.container(&pair.identity);
            let new_container = new_set.container(&pair.identity);

            let matched = Matched {
                identifier: pair.identity.base().clone(),
                old_index: old_container.index,
                new_index: new_container.index,
                old: old_container.value.clone(),
                new: new_container.value.clone(),
            };

            if move_detection.is_move(pair.move_hinted, from != to) {
                old_set.move_container(from, to);
                moved.push(matched);
            } else if pair.updated {
                updated_pairs.push(matched);
            } else {
                no_change.push(matched);
            }
        }

        added.sort_by(|a, b| a.new_index.cmp(&b.new_index));
        removed.sort_by(|a, b| b.old_index.cmp(&a.old_index));
        moved.sort_by(|a, b| b.new_index.cmp(&a.new_index));
        updated_pairs.sort_by(|a, b| a.new_index.cmp(&b.new_index));
        no_change.sort_by(|a, b| a.new_index.cmp(&b.new_index));

        let change_count = added.len() + removed.len() + moved.len() + updated_pairs.len();

        trace!(
            added = added.len(),
            removed = removed.len(),
            moved = moved.len(),
            updated = updated_pairs.len(),
            no_change = no_change.len(),
            "array diff computed"
        );

        Self {
            added,
            removed,
            moved,
            updated: updated_pairs,
            no_change,
            change_count,
            used_fast_path: false,
            old_count: old.len(),
            new_count: new.len(),
        }
    }

    /// If both sequences carry the same identities in the same order, only
    /// updates are possible and the collection machinery can be skipped.
    fn fast_path<F, U>(old: &[T], new: &[T], identifier: &F, updated: &U) -> Option<Self>
    where
        F: Fn(&T) -> I,
        U: Fn(&T, &T) -> bool,
    {
        if old.len() != new.len() {
            return None;
        }

        let mut updates = Vec::new();
        let mut no_change = Vec::new();

        for (index, (old_value, new_value)) in old.iter().zip(new).enumerate() {
            let id = identifier(new_value);
            if identifier(old_value) != id {
                return None;
            }

            let matched = Matched {
                identifier: id,
                old_index: index,
                new_index: index,
                old: old_value.clone(),
                new: new_value.clone(),
            };

            if updated(old_value, new_value) {
                updates.push(matched);
            } else {
                no_change.push(matched);
            }
        }

        Some(Self {
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
            change_count: updates.len(),
            updated: updates,
            no_change,
            used_fast_path: true,
            old_count: old.len(),
            new_count: new.len(),
        })
    }
}

impl<T, I> ArrayDiff<T, I> {
    /// Number of elements in the old sequence.
    pub fn old_count(&self) -> usize {
        self.old_count
    }

    /// Number of elements in the new sequence.
    pub fn new_count(&self) -> usize {
        self.new_count
    }

    /// Returns `true` if nothing was added, removed, moved or updated.
    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }
}

/// An element matched across both collections, awaiting classification.
struct Pair<I> {
    identity: UniqueIdentity<I>,
    distance: usize,
    move_hinted: bool,
    updated: bool,
}

impl<I: Hash + Eq + Clone> Pair<I> {
    /// One pair per element of the pruned `new` collection, which holds
    /// exactly the identities shared with the pruned `old` collection.
    fn pairs<T: Clone>(
        old: &mut IndexedCollection<T, I>,
        new: &mut IndexedCollection<T, I>,
        moved_hint: &impl Fn(&T, &T) -> bool,
        updated: &impl Fn(&T, &T) -> bool,
    ) -> Vec<Self> {
        let identities: Vec<UniqueIdentity<I>> =
            new.containers().map(|c| c.identity.clone()).collect();

        identities
            .into_iter()
            .map(|identity| {
                let distance = new.index_of(&identity).abs_diff(old.index_of(&identity));

                let old_value = &old.container(&identity).value;
                let new_value = &new.container(&identity).value;

                Pair {
                    move_hinted: moved_hint(old_value, new_value),
                    updated: updated(old_value, new_value),
                    identity,
                    distance,
                }
            })
            .collect()
    }
}
