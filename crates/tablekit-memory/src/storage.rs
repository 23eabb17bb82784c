//! Partitioned item storage for one table.
//!
//! ```text
//! DashMap<partition value, BTreeMap<SortKey, Item>>
//! ```
//!
//! Different partitions are accessed concurrently; within a partition items
//! are kept in sort-key order so a query reads them ascending.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bytes::Bytes;
use dashmap::DashMap;
use tablekit_core::KeySchema;
use tablekit_model::AttributeValue;
use tablekit_model::types::Item;
use tracing::debug;

use crate::error::StorageError;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// A sort-key value ordered the way the store orders keys.
///
/// Strings compare bytewise, numbers numerically, binaries bytewise.
#[derive(Debug, Clone)]
pub enum SortKey {
    /// String sort key.
    S(String),
    /// Number sort key in its original decimal form.
    N(String),
    /// Binary sort key.
    B(Bytes),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::S(_) => 0,
            Self::N(_) => 1,
            Self::B(_) => 2,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::S(a), Self::S(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::N(a), Self::N(b)) => {
                let a = a.parse::<f64>().unwrap_or(f64::NAN);
                let b = b.parse::<f64>().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
            (Self::B(a), Self::B(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// The full primary key of a stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    /// Partition key value.
    pub partition: AttributeValue,
    /// Sort key value.
    pub sort: SortKey,
}

impl PrimaryKey {
    /// Extract the primary key from an item or a key map.
    ///
    /// # Errors
    ///
    /// `StorageError` if either key attribute is missing or not S, N or B.
    pub fn extract(schema: &KeySchema, attributes: &Item) -> Result<Self, StorageError> {
        let partition = key_attribute(&schema.partition_key, attributes)?;
        let sort = match key_attribute(&schema.sort_key, attributes)? {
            AttributeValue::S(s) => SortKey::S(s),
            AttributeValue::N(n) => SortKey::N(n),
            AttributeValue::B(b) => SortKey::B(b),
            other => {
                return Err(StorageError::InvalidKeyType {
                    attribute: schema.sort_key.clone(),
                    actual: other.type_descriptor(),
                });
            }
        };
        Ok(Self { partition, sort })
    }
}

fn key_attribute(name: &str, attributes: &Item) -> Result<AttributeValue, StorageError> {
    match attributes.get(name) {
        Some(value @ (AttributeValue::S(_) | AttributeValue::N(_) | AttributeValue::B(_))) => {
            Ok(value.clone())
        }
        Some(other) => Err(StorageError::InvalidKeyType {
            attribute: name.to_owned(),
            actual: other.type_descriptor(),
        }),
        None => Err(StorageError::MissingKeyAttribute {
            attribute: name.to_owned(),
        }),
    }
}

// ---------------------------------------------------------------------------
// TableStorage
// ---------------------------------------------------------------------------

/// Items of one table.
#[derive(Debug)]
pub struct TableStorage {
    schema: KeySchema,
    partitions: DashMap<AttributeValue, BTreeMap<SortKey, Item>>,
}

impl TableStorage {
    /// Empty storage for the given key schema.
    #[must_use]
    pub fn new(schema: KeySchema) -> Self {
        Self {
            schema,
            partitions: DashMap::new(),
        }
    }

    /// The table's key schema.
    #[must_use]
    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|partition| partition.len()).sum()
    }

    /// Whether the table holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extract the primary key of `attributes` under this table's schema.
    pub fn key_of(&self, attributes: &Item) -> Result<PrimaryKey, StorageError> {
        PrimaryKey::extract(&self.schema, attributes)
    }

    /// Store an item, returning the one it replaced.
    pub fn put(&self, item: Item) -> Result<Option<Item>, StorageError> {
        let PrimaryKey { partition, sort } = self.key_of(&item)?;
        let previous = self.partitions.entry(partition).or_default().insert(sort, item);
        debug!(replaced = previous.is_some(), "stored item");
        Ok(previous)
    }

    /// Fetch a copy of the item stored under `key`.
    #[must_use]
    pub fn get(&self, key: &PrimaryKey) -> Option<Item> {
        self.partitions
            .get(&key.partition)
            .and_then(|partition| partition.get(&key.sort).cloned())
    }

    /// Remove the item stored under `key`, returning it.
    pub fn delete(&self, key: &PrimaryKey) -> Option<Item> {
        let removed = self
            .partitions
            .get_mut(&key.partition)
            .and_then(|mut partition| partition.remove(&key.sort));
        self.partitions
            .remove_if(&key.partition, |_, partition| partition.is_empty());
        if removed.is_some() {
            debug!("deleted item");
        }
        removed
    }

    /// Every item of one partition in ascending sort-key order.
    #[must_use]
    pub fn partition(&self, partition: &AttributeValue) -> Vec<Item> {
        self.partitions
            .get(partition)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }
}
