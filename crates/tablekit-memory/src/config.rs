//! Memory engine configuration.

use std::env;

/// Tuning knobs of a [`MemoryStore`](crate::store::MemoryStore).
///
/// The capacities simulate a backend under pressure: a batch call processes
/// at most that many entries and reports the rest as unprocessed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    /// Keys a single batch read serves; `None` serves all.
    pub batch_get_capacity: Option<usize>,
    /// Writes a single batch write applies; `None` applies all.
    pub batch_write_capacity: Option<usize>,
}

impl MemoryStoreConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            batch_get_capacity: env_usize("TABLEKIT_MEMORY_BATCH_GET_CAPACITY"),
            batch_write_capacity: env_usize("TABLEKIT_MEMORY_BATCH_WRITE_CAPACITY"),
        }
    }

    /// Serve at most `capacity` keys per batch read.
    #[must_use]
    pub fn with_batch_get_capacity(mut self, capacity: usize) -> Self {
        self.batch_get_capacity = Some(capacity);
        self
    }

    /// Apply at most `capacity` writes per batch write.
    #[must_use]
    pub fn with_batch_write_capacity(mut self, capacity: usize) -> Self {
        self.batch_write_capacity = Some(capacity);
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
