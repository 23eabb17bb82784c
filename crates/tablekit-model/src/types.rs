//! Shared structs used inside inputs and outputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// A stored record as a map of attribute names to values.
pub type Item = HashMap<String, AttributeValue>;

/// The key attributes identifying one item.
pub type KeyAttributes = HashMap<String, AttributeValue>;

/// `#name` placeholders to attribute names.
pub type ExpressionAttributeNames = HashMap<String, String>;

/// `:value` placeholders to attribute values.
pub type ExpressionAttributeValues = HashMap<String, AttributeValue>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which attributes a write returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReturnValue {
    /// Nothing is returned.
    #[default]
    #[serde(rename = "NONE")]
    None,
    /// The item as it was before the write.
    #[serde(rename = "ALL_OLD")]
    AllOld,
    /// The item as it is after the write.
    #[serde(rename = "ALL_NEW")]
    AllNew,
}

impl ReturnValue {
    /// Returns the wire-format string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::AllOld => "ALL_OLD",
            Self::AllNew => "ALL_NEW",
        }
    }
}

impl std::fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Batch operations
// ---------------------------------------------------------------------------

/// Keys to fetch from one table in a `BatchGetItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeysAndAttributes {
    /// The keys of the items to retrieve.
    pub keys: Vec<KeyAttributes>,
    /// Attributes to retrieve; all attributes when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders used by `projection_expression`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Whether to use a strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

/// One entry of a `BatchWriteItem` call. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteRequest {
    /// Put an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put_request: Option<PutRequest>,
    /// Delete an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_request: Option<DeleteRequest>,
}

impl WriteRequest {
    /// A put entry.
    #[must_use]
    pub fn put(item: Item) -> Self {
        Self {
            put_request: Some(PutRequest { item }),
            delete_request: None,
        }
    }
}

/// Put an item within a batch write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRequest {
    /// The item to write.
    pub item: Item,
}

/// Delete an item within a batch write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteRequest {
    /// The key of the item to delete.
    pub key: KeyAttributes,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// One entry of a `TransactWriteItems` call. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactWriteItem {
    /// Conditionally insert an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<TransactPut>,
    /// Apply an update expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<TransactUpdate>,
    /// Delete an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<TransactDelete>,
}

/// Put inside a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactPut {
    /// Target table.
    pub table_name: String,
    /// The item to write.
    pub item: Item,
    /// Condition that must hold for the whole transaction to commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// Update inside a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactUpdate {
    /// Target table.
    pub table_name: String,
    /// Key of the item to update.
    pub key: KeyAttributes,
    /// The update expression.
    pub update_expression: String,
    /// Condition that must hold for the whole transaction to commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// Delete inside a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactDelete {
    /// Target table.
    pub table_name: String,
    /// Key of the item to delete.
    pub key: KeyAttributes,
    /// Condition that must hold for the whole transaction to commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// Why one item of a cancelled transaction did not commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancellationReason {
    /// `None` when this item was fine, otherwise e.g. `ConditionalCheckFailed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Free-form detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reason code the backend reports for an item whose condition failed.
pub const CONDITIONAL_CHECK_FAILED_REASON: &str = "ConditionalCheckFailed";

impl CancellationReason {
    /// The item itself did not cause the cancellation.
    #[must_use]
    pub fn none() -> Self {
        Self::with_code("None")
    }

    /// A reason with the given code and no message.
    #[must_use]
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: None,
        }
    }

    /// The item's condition evaluated to false.
    #[must_use]
    pub fn conditional_check_failed(message: impl Into<String>) -> Self {
        Self {
            code: Some(CONDITIONAL_CHECK_FAILED_REASON.to_owned()),
            message: Some(message.into()),
        }
    }

    /// Whether this reason reports a failed condition.
    #[must_use]
    pub fn is_conditional_check_failed(&self) -> bool {
        self.code.as_deref() == Some(CONDITIONAL_CHECK_FAILED_REASON)
    }
}
