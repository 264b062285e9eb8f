//! Disambiguation of caller-supplied identities.
//!
//! Identities are not required to be unique within a snapshot. The factory
//! pairs each raw identity with its occurrence number, so the second `X` in a
//! snapshot becomes `(X, 2)` and can only ever match the second `X` of the
//! other snapshot.

use std::collections::HashMap;
use std::hash::Hash;

/// A raw identity plus its 1-based occurrence count within one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniqueIdentity<I> {
    base: I,
    occurrence: usize,
}

impl<I> UniqueIdentity<I> {
    /// The caller-supplied identity.
    pub fn base(&self) -> &I {
        &self.base
    }

    /// How many times `base` had been seen in the snapshot, including this one.
    pub fn occurrence(&self) -> usize {
        self.occurrence
    }

    /// Consume the unique identity, returning the caller-supplied identity.
    pub fn into_base(self) -> I {
        self.base
    }
}

/// Produces [`UniqueIdentity`] values for one snapshot.
///
/// A factory must not be shared between snapshots: the occurrence counters
/// are only meaningful within a single pass over a single sequence.
#[derive(Debug)]
pub struct IdentityFactory<I> {
    counts: HashMap<I, usize>,
}

impl<I: Hash + Eq + Clone> IdentityFactory<I> {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a factory sized for a snapshot of `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    /// Return the next unique identity for `base`.
    pub fn identity(&mut self, base: I) -> UniqueIdentity<I> {
        let count = self.counts.entry(base.clone()).or_insert(1);
        let occurrence = *count;
        *count += 1;
        UniqueIdentity { base, occurrence }
    }
}

impl<I: Hash + Eq + Clone> Default for IdentityFactory<I> {
    fn default() -> Self {
        Self::new()
    }
}
