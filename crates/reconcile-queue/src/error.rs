//! Error types for the diff queue.

/// Errors that can occur when requesting a diff.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The queue's worker has stopped and accepts no more requests.
    #[error("diff queue is closed")]
    Closed,

    /// The diff computation panicked, typically on a violated precondition
    /// in a caller-supplied identity or predicate function.
    #[error("diff worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Convenience alias for queue results.
pub type QueueResult<T> = Result<T, QueueError>;
