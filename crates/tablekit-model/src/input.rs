//! Request shapes for the eight store primitives.
//!
//! Field names follow the store's `PascalCase` JSON protocol. Optional fields
//! are omitted when `None` and empty maps and lists are omitted, which keeps
//! logged payloads minimal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    ExpressionAttributeNames, ExpressionAttributeValues, Item, KeyAttributes, KeysAndAttributes,
    ReturnValue, TransactWriteItem, WriteRequest,
};

// ---------------------------------------------------------------------------
// Single-item operations
// ---------------------------------------------------------------------------

/// Input for `GetItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    /// Table holding the item.
    pub table_name: String,
    /// Key of the item.
    pub key: KeyAttributes,
    /// Strongly consistent read when `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
}

/// Input for `PutItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    /// Target table.
    pub table_name: String,
    /// The full item, key attributes included.
    pub item: Item,
    /// Condition that must hold for the write to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// Input for `UpdateItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// Target table.
    pub table_name: String,
    /// Key of the item to update (created when absent).
    pub key: KeyAttributes,
    /// `SET ... REMOVE ...` expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_expression: Option<String>,
    /// Condition that must hold for the update to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
    /// Which attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}

/// Input for `DeleteItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// Target table.
    pub table_name: String,
    /// Key of the item to delete.
    pub key: KeyAttributes,
    /// Condition that must hold for the delete to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Input for `Query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput {
    /// Table to read.
    pub table_name: String,
    /// Partition-key equality, optionally with a sort-key predicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,
    /// Predicate applied after the key condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
    /// Strongly consistent read when `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

// ---------------------------------------------------------------------------
// Batch and transactional operations
// ---------------------------------------------------------------------------

/// Input for `BatchGetItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetItemInput {
    /// Keys to fetch, grouped by table.
    pub request_items: HashMap<String, KeysAndAttributes>,
}

/// Input for `BatchWriteItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchWriteItemInput {
    /// Writes grouped by table.
    pub request_items: HashMap<String, Vec<WriteRequest>>,
}

/// Input for `TransactWriteItems`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactWriteItemsInput {
    /// Writes that commit together or not at all.
    pub transact_items: Vec<TransactWriteItem>,
}
