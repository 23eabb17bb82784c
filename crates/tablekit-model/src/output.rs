//! Response shapes for the eight store primitives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Item, KeysAndAttributes, WriteRequest};

/// Output for `GetItem`. `item` is `None` when the key does not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemOutput {
    /// The item, if found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

/// Output for `PutItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemOutput {
    /// Returned attributes, when requested.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: Item,
}

/// Output for `UpdateItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemOutput {
    /// Returned attributes, when requested.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: Item,
}

/// Output for `DeleteItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemOutput {
    /// Returned attributes, when requested.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: Item,
}

/// Output for `Query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryOutput {
    /// Matching items after the filter, in sort-key order.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Number of returned items.
    pub count: i32,
    /// Number of items read before the filter was applied.
    pub scanned_count: i32,
}

/// Output for `BatchGetItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetItemOutput {
    /// Retrieved items by table.
    #[serde(default)]
    pub responses: HashMap<String, Vec<Item>>,
    /// Keys the backend did not get to, by table.
    #[serde(default)]
    pub unprocessed_keys: HashMap<String, KeysAndAttributes>,
}

/// Output for `BatchWriteItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchWriteItemOutput {
    /// Writes the backend did not get to, by table.
    #[serde(default)]
    pub unprocessed_items: HashMap<String, Vec<WriteRequest>>,
}

/// Output for `TransactWriteItems`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactWriteItemsOutput {}
