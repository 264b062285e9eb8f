//! Identity-keyed ordered working set used while computing a diff.
//!
//! Containers live in a flat arena that is never reordered; the current
//! order is a separate list of arena slots. Moves and removals only touch the
//! order list, so a container's snapshot index and value stay valid for the
//! lifetime of the collection.

use std::collections::HashMap;
use std::hash::Hash;

use crate::identity::{IdentityFactory, UniqueIdentity};

/// One snapshot element bound to its snapshot position and unique identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Container<T, I> {
    /// The element.
    pub value: T,
    /// The element's index in the snapshot the collection was built from.
    pub index: usize,
    /// The element's identity, disambiguated within the snapshot.
    pub identity: UniqueIdentity<I>,
}

/// An ordered sequence of [`Container`]s with O(1) lookup by identity.
///
/// Index lookups go through a lazily built position table that every
/// mutation invalidates.
#[derive(Debug)]
pub struct IndexedCollection<T, I> {
    slots: Vec<Container<T, I>>,
    order: Vec<usize>,
    by_identity: HashMap<UniqueIdentity<I>, usize>,
    positions: Option<Vec<usize>>,
}

impl<T: Clone, I: Hash + Eq + Clone> IndexedCollection<T, I> {
    /// Build a collection from a snapshot, using one fresh [`IdentityFactory`].
    ///
    /// # Panics
    ///
    /// Panics if two elements end up with the same unique identity, which the
    /// factory's occurrence counting rules out.
    pub fn new(elements: &[T], identity_of: impl Fn(&T) -> I) -> Self {
        let mut factory = IdentityFactory::with_capacity(elements.len());

        let slots: Vec<Container<T, I>> = elements
            .iter()
            .enumerate()
            .map(|(index, value)| Container {
                identity: factory.identity(identity_of(value)),
                value: value.clone(),
                index,
            })
            .collect();

        let mut by_identity = HashMap::with_capacity(slots.len());
        for (slot, container) in slots.iter().enumerate() {
            if by_identity.insert(container.identity.clone(), slot).is_some() {
                panic!(
                    "duplicate unique identity at index {} (occurrence {})",
                    container.index,
                    container.identity.occurrence()
                );
            }
        }

        Self {
            order: (0..slots.len()).collect(),
            slots,
            by_identity,
            positions: None,
        }
    }

    /// Number of containers currently in the collection.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the collection holds no containers.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Containers in their current order.
    pub fn containers(&self) -> impl Iterator<Item = &Container<T, I>> + '_ {
        self.order.iter().map(move |&slot| &self.slots[slot])
    }

    /// Returns `true` if a container with this identity is present.
    pub fn contains(&self, identity: &UniqueIdentity<I>) -> bool {
        self.by_identity.contains_key(identity)
    }

    /// The container with the given identity.
    ///
    /// # Panics
    ///
    /// Panics if the identity is not present.
    pub fn container(&self, identity: &UniqueIdentity<I>) -> &Container<T, I> {
        &self.slots[self.slot_of(identity)]
    }

    /// Current position of the container with the given identity.
    ///
    /// # Panics
    ///
    /// Panics if the identity is not present.
    pub fn index_of(&mut self, identity: &UniqueIdentity<I>) -> usize {
        let slot = self.slot_of(identity);
        self.positions()[slot]
    }

    /// Containers of `self` whose identity is absent from `other`, in `self`'s order.
    pub fn difference(&self, other: &Self) -> Vec<Container<T, I>> {
        self.containers()
            .filter(|c| !other.contains(&c.identity))
            .cloned()
            .collect()
    }

    /// Like [`difference`](Self::difference), but also removes the returned
    /// containers from `self`.
    pub fn subtract_difference(&mut self, other: &Self) -> Vec<Container<T, I>> {
        let difference = self.difference(other);
        self.remove(&difference);
        difference
    }

    /// Move the container at position `from` to position `to`.
    pub fn move_container(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }

        let slot = self.order.remove(from);
        self.order.insert(to, slot);
        self.positions = None;
    }

    /// Remove a batch of containers, matched by identity.
    ///
    /// Positions are resolved up front and removed highest first, so no
    /// removal shifts a position that is still pending.
    pub fn remove(&mut self, containers: &[Container<T, I>]) {
        if containers.is_empty() {
            return;
        }

        let mut indexes: Vec<usize> = containers
            .iter()
            .map(|c| self.index_of(&c.identity))
            .collect();

        for container in containers {
            self.by_identity.remove(&container.identity);
        }

        indexes.sort_unstable_by(|a, b| b.cmp(a));
        for index in indexes {
            self.order.remove(index);
        }

        self.positions = None;
    }

    fn slot_of(&self, identity: &UniqueIdentity<I>) -> usize {
        match self.by_identity.get(identity) {
            Some(&slot) => slot,
            None => panic!(
                "identity (occurrence {}) is not present in the collection",
                identity.occurrence()
            ),
        }
    }

    fn positions(&mut self) -> &[usize] {
        let order = &self.order;
        let slot_count = self.slots.len();

        self.positions.get_or_insert_with(|| {
            let mut positions = vec![usize::MAX; slot_count];
            for (index, &slot) in order.iter().enumerate() {
                positions[slot] = index;
            }
            positions
        })
    }
}
