//! Client configuration.
//!
//! Everything is driven by environment variables with sensible defaults for
//! local development.

use std::env;
use std::time::Duration;

/// Physical attribute names of the table's composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    /// Partition key attribute name.
    pub partition_key: String,
    /// Sort key attribute name.
    pub sort_key: String,
}

impl KeySchema {
    /// Create a schema from the two attribute names.
    #[must_use]
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self::new("pk", "sk")
    }
}

/// Configuration of a [`StoreClient`](crate::client::StoreClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Table every request targets.
    pub table_name: String,
    /// Key attribute names.
    pub key_schema: KeySchema,
    /// Attribute stamped with the Unix time on every update.
    pub last_updated_attribute: String,
    /// Deadline applied to each backend call; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            table_name: "tablekit".to_owned(),
            key_schema: KeySchema::default(),
            last_updated_attribute: "lastUpdated".to_owned(),
            request_timeout: Some(Duration::from_millis(3000)),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// A `TABLEKIT_TIMEOUT_MS` of `0` disables the deadline.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("TABLEKIT_TABLE_NAME") {
            config.table_name = v;
        }
        if let Ok(v) = env::var("TABLEKIT_PARTITION_KEY") {
            config.key_schema.partition_key = v;
        }
        if let Ok(v) = env::var("TABLEKIT_SORT_KEY") {
            config.key_schema.sort_key = v;
        }
        if let Ok(v) = env::var("TABLEKIT_LAST_UPDATED_ATTRIBUTE") {
            config.last_updated_attribute = v;
        }
        if let Some(ms) = env_u64("TABLEKIT_TIMEOUT_MS") {
            config.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        config
    }

    /// Same configuration targeting another table.
    #[must_use]
    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Same configuration with another deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Parse an integer environment variable; unset or malformed yields `None`.
fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
