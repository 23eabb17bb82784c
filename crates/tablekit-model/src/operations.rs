//! The primitives a transport must provide.

use std::fmt;

/// Every backend call tablekit issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Fetch one item by key.
    GetItem,
    /// Insert an item.
    PutItem,
    /// Apply an update expression to one item.
    UpdateItem,
    /// Remove one item by key.
    DeleteItem,
    /// Read a partition with a key condition.
    Query,
    /// Fetch many items by key.
    BatchGetItem,
    /// Write many items without atomicity.
    BatchWriteItem,
    /// Write many items atomically.
    TransactWriteItems,
}

impl StoreOperation {
    /// Returns the operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetItem => "GetItem",
            Self::PutItem => "PutItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::Query => "Query",
            Self::BatchGetItem => "BatchGetItem",
            Self::BatchWriteItem => "BatchWriteItem",
            Self::TransactWriteItems => "TransactWriteItems",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
