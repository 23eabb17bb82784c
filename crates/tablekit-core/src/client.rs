//! Typed store client.
//!
//! [`StoreClient`] translates parameter objects, executes them through a
//! [`Transport`] and decodes the answers. It keeps no per-call state: clones
//! share the transport and may be used from any number of tasks.
//!
//! Every call is one backend round trip. A configured deadline bounds the
//! wait; dropping the returned future abandons the call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tablekit_model::{BackendError, Item, StoreOperation};
use tracing::{Instrument, debug, debug_span, warn};

use crate::codec;
use crate::config::ClientConfig;
use crate::error::{StoreResult, classify};
use crate::request::{
    DeleteItemParams, GetItemParams, QueryParams, RequestTranslator, UpdateItemParams,
};
use crate::transport::{BackendResult, Transport};

/// Rows returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// Matching records in sort-key order.
    pub items: Vec<T>,
    /// Number of matching records.
    pub count: usize,
}

/// Typed access to one table.
#[derive(Debug, Clone)]
pub struct StoreClient {
    transport: Arc<dyn Transport>,
    translator: RequestTranslator,
    timeout: Option<Duration>,
}

impl StoreClient {
    /// Create a client over `transport` for the table in `config`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            translator: RequestTranslator::new(config),
            timeout: config.request_timeout,
        }
    }

    /// A handle on the same transport with another deadline.
    #[must_use]
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Table this client targets.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.translator.table_name()
    }

    /// The translator used to build requests.
    #[must_use]
    pub fn translator(&self) -> &RequestTranslator {
        &self.translator
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Run one backend call under the deadline and classify its failure.
    pub(crate) async fn call<T, F>(&self, operation: StoreOperation, request: F) -> StoreResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        let request_id = uuid::Uuid::new_v4();
        let span = debug_span!(
            "store_call",
            %operation,
            table = %self.table_name(),
            %request_id,
        );

        async move {
            debug!("sending request");
            let answer = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .unwrap_or_else(|_| {
                        Err(BackendError::transport(format!(
                            "no answer within {} ms",
                            limit.as_millis()
                        )))
                    }),
                None => request.await,
            };

            answer.map_err(|e| {
                let err = classify(operation, e);
                if err.is_conditional_check_failed() {
                    debug!(error = %err, "precondition rejected the write");
                } else {
                    warn!(error = %err, "backend call failed");
                }
                err
            })
        }
        .instrument(span)
        .await
    }

    // -----------------------------------------------------------------------
    // Single-item operations
    // -----------------------------------------------------------------------

    /// Read one record as an attribute map. A missing key yields an empty map.
    pub async fn get_item_raw(&self, params: &GetItemParams) -> StoreResult<Item> {
        let input = self.translator.get_item(params);
        let output = self
            .call(StoreOperation::GetItem, self.transport.get_item(input))
            .await?;
        Ok(output.item.unwrap_or_default())
    }

    /// Read one record. A missing key yields `T::default()`.
    ///
    /// # Errors
    ///
    /// `Decoding` when the stored item does not fit `T`, otherwise any
    /// backend failure.
    pub async fn get_item<T>(&self, params: &GetItemParams) -> StoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let item = self.get_item_raw(params).await?;
        if item.is_empty() {
            return Ok(T::default());
        }
        codec::decode(item)
    }

    /// Insert a record. Fails with `ConditionalCheckFailed` when its key
    /// already exists.
    pub async fn put_item<T: Serialize + ?Sized>(&self, record: &T) -> StoreResult<()> {
        self.put_item_raw(codec::encode(record)?).await
    }

    /// Insert an attribute map. Fails with `ConditionalCheckFailed` when its
    /// key already exists.
    pub async fn put_item_raw(&self, item: Item) -> StoreResult<()> {
        let input = self.translator.put_item(item);
        self.call(StoreOperation::PutItem, self.transport.put_item(input))
            .await?;
        Ok(())
    }

    /// Apply an update and return the record as it is afterwards.
    pub async fn update_item_raw(&self, params: &UpdateItemParams) -> StoreResult<Item> {
        let input = self
            .translator
            .update_item(params, chrono::Utc::now().timestamp())?;
        let output = self
            .call(StoreOperation::UpdateItem, self.transport.update_item(input))
            .await?;
        Ok(output.attributes)
    }

    /// Apply an update and decode the record as it is afterwards.
    pub async fn update_item<T: DeserializeOwned>(
        &self,
        params: &UpdateItemParams,
    ) -> StoreResult<T> {
        codec::decode(self.update_item_raw(params).await?)
    }

    /// Delete one record. Deleting a missing key succeeds.
    pub async fn delete_item(&self, params: &DeleteItemParams) -> StoreResult<()> {
        let input = self.translator.delete_item(params)?;
        self.call(StoreOperation::DeleteItem, self.transport.delete_item(input))
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Query a partition, returning attribute maps. No match is not an error.
    pub async fn query_raw(&self, params: &QueryParams) -> StoreResult<QueryResult<Item>> {
        let input = self.translator.query(params)?;
        let output = self
            .call(StoreOperation::Query, self.transport.query(input))
            .await?;
        debug!(
            count = output.count,
            scanned = output.scanned_count,
            "query answered"
        );
        Ok(QueryResult {
            count: output.items.len(),
            items: output.items,
        })
    }

    /// Query a partition and decode every row.
    pub async fn query<T: DeserializeOwned>(
        &self,
        params: &QueryParams,
    ) -> StoreResult<QueryResult<T>> {
        let raw = self.query_raw(params).await?;
        Ok(QueryResult {
            items: codec::decode_list(raw.items)?,
            count: raw.count,
        })
    }
}
