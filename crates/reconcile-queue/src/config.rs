use serde::{Deserialize, Serialize};

/// Configuration for a [`DiffQueue`](crate::DiffQueue).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of requests waiting for the worker. Submitting beyond
    /// this waits for space. Zero is treated as one.
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 32 }
    }
}
