//! Error types for the diff crate.

/// Errors that can occur while applying a diff to a parallel structure.
///
/// Computing a diff never fails; a violated internal invariant panics
/// instead, since it indicates a broken identity or predicate function.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// The parallel structure does not have one entry per old element.
    #[error("parallel structure has {actual} entries, diff expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A section of the parallel structure has a different item count than
    /// the old snapshot's section at the same index.
    #[error("section {section} has {actual} items in the parallel structure, diff expects {expected}")]
    SectionShapeMismatch {
        section: usize,
        expected: usize,
        actual: usize,
    },
}

/// Convenience alias for diff results.
///
/// This is the outcome of applying a diff. The categorized edit script
/// itself is [`ArrayDiff`](crate::ArrayDiff) or
/// [`SectionChanges`](crate::SectionChanges).
pub type DiffResult<T> = Result<T, DiffError>;
