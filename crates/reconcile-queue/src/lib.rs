//! Off-thread diff computation.
//!
//! Diffing is a pure function of two snapshots, so it can run on any thread.
//! What must be serialized is the stream of snapshots: a diff may only be
//! taken against a snapshot once the previous diff producing it is done.
//! [`DiffQueue`] runs one stream's diffs strictly in submission order on
//! tokio's blocking pool; [`calculate`] runs a single, independent diff.
//!
//! There is no cancellation. Dropping a pending request discards its result
//! once computed.

pub mod config;
pub mod error;
pub mod queue;

pub use config::QueueConfig;
pub use error::{QueueError, QueueResult};
pub use queue::{calculate, DiffQueue};
