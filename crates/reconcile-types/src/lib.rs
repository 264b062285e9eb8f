//! Foundation types for reconcile.
//!
//! Shared by the differ and the diff queue.
//!
//! # Key Types
//!
//! - [`IndexPath`] -- Position of an item inside a sectioned snapshot
//! - [`MoveDetection`] -- Which index changes the differ reports as moves
//! - [`TypeError`] -- Parsing failures for the types above

pub mod error;
pub mod index_path;
pub mod move_detection;

pub use error::TypeError;
pub use index_path::IndexPath;
pub use move_detection::MoveDetection;
