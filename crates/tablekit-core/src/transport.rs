//! The boundary between the typed client and a store backend.
//!
//! A transport executes native requests and reports failures as
//! [`BackendError`]s; it does not interpret them. The trait is object safe so
//! clients hold `Arc<dyn Transport>` and stay cheap to clone.

use tablekit_model::BackendError;
use tablekit_model::input::{
    BatchGetItemInput, BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput,
    QueryInput, TransactWriteItemsInput, UpdateItemInput,
};
use tablekit_model::output::{
    BatchGetItemOutput, BatchWriteItemOutput, DeleteItemOutput, GetItemOutput, PutItemOutput,
    QueryOutput, TransactWriteItemsOutput, UpdateItemOutput,
};

/// Result of one backend call.
pub type BackendResult<T> = Result<T, BackendError>;

/// Executes native store requests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Fetch one item.
    async fn get_item(&self, input: GetItemInput) -> BackendResult<GetItemOutput>;

    /// Write one item.
    async fn put_item(&self, input: PutItemInput) -> BackendResult<PutItemOutput>;

    /// Update one item.
    async fn update_item(&self, input: UpdateItemInput) -> BackendResult<UpdateItemOutput>;

    /// Delete one item.
    async fn delete_item(&self, input: DeleteItemInput) -> BackendResult<DeleteItemOutput>;

    /// Read a partition.
    async fn query(&self, input: QueryInput) -> BackendResult<QueryOutput>;

    /// Fetch many items; may leave keys unprocessed.
    async fn batch_get_item(&self, input: BatchGetItemInput) -> BackendResult<BatchGetItemOutput>;

    /// Write many items; may leave writes unprocessed.
    async fn batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> BackendResult<BatchWriteItemOutput>;

    /// Write many items atomically.
    async fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> BackendResult<TransactWriteItemsOutput>;
}
