use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown move detection mode: {0}")]
    UnknownMoveDetection(String),
}
