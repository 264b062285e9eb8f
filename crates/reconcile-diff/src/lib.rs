//! Ordered-collection reconciliation engine.
//!
//! Given two snapshots of ordered content, computes a categorized edit script
//! (added, removed, moved, updated, unchanged) that turns the old snapshot
//! into the new one, and applies that script to any structure kept parallel
//! to the old snapshot.
//!
//! # Key Types
//!
//! - [`UniqueIdentity`] / [`IdentityFactory`] -- Collision-free identities for duplicated keys
//! - [`IndexedCollection`] -- Identity-keyed ordered working set used during a diff
//! - [`ArrayDiff`] -- Single-level diff between two sequences
//! - [`SectionedDiff`] / [`SectionChanges`] / [`ItemChanges`] -- Two-level diff over sections of items
//! - [`AggregatedChanges`] -- All section and item changes of a sectioned diff, flattened
//! - [`Transformer`] / [`SectionTransformer`] -- Callbacks for applying a diff to a parallel structure

pub mod aggregated;
pub mod array_diff;
pub mod collection;
pub mod error;
pub mod identity;
pub mod sectioned_diff;
pub mod transform;

pub use aggregated::AggregatedChanges;
pub use array_diff::{Added, ArrayDiff, Matched, Removed};
pub use collection::{Container, IndexedCollection};
pub use error::{DiffError, DiffResult};
pub use identity::{IdentityFactory, UniqueIdentity};
pub use reconcile_types::{IndexPath, MoveDetection};
pub use sectioned_diff::{
    ItemAdded, ItemChanges, ItemPair, ItemProviders, ItemRemoved, SectionAdded, SectionChanges,
    SectionPair, SectionProviders, SectionRemoved, SectionedConfig, SectionedDiff,
};
pub use transform::{SectionTransformer, Transformer};
