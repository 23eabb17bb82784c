//! The composite record key.

use serde::{Deserialize, Serialize};
use tablekit_model::AttributeValue;
use tablekit_model::types::KeyAttributes;

use crate::config::KeySchema;
use crate::error::{StoreError, StoreResult};

/// Identifies exactly one record: a partition plus a position inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Partition key value.
    pub partition_key: String,
    /// Sort key value.
    pub sort_key: String,
}

impl Key {
    /// Create a key from its two components.
    #[must_use]
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Both components are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.partition_key.is_empty() && !self.sort_key.is_empty()
    }

    /// Fail with `Encoding` unless both components are present.
    pub fn require_complete(&self) -> StoreResult<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(StoreError::Encoding(format!(
                "key requires both partition and sort key, got ({:?}, {:?})",
                self.partition_key, self.sort_key
            )))
        }
    }

    /// Native key attributes under the schema's attribute names.
    #[must_use]
    pub fn to_attributes(&self, schema: &KeySchema) -> KeyAttributes {
        KeyAttributes::from([
            (
                schema.partition_key.clone(),
                AttributeValue::S(self.partition_key.clone()),
            ),
            (
                schema.sort_key.clone(),
                AttributeValue::S(self.sort_key.clone()),
            ),
        ])
    }

    /// Read a key back from native key attributes.
    pub fn from_attributes(schema: &KeySchema, attributes: &KeyAttributes) -> StoreResult<Self> {
        let component = |name: &str| {
            attributes
                .get(name)
                .and_then(AttributeValue::as_s)
                .map(str::to_owned)
                .ok_or_else(|| {
                    StoreError::Decoding(format!("key attribute '{name}' missing or not a string"))
                })
        };
        Ok(Self {
            partition_key: component(&schema.partition_key)?,
            sort_key: component(&schema.sort_key)?,
        })
    }
}
