//! Batch and transactional operations.
//!
//! The two batch primitives handle partial results differently. A batch read
//! fails closed: any unprocessed key fails the whole call and no items are
//! returned. A batch write succeeds and hands back the unprocessed records
//! for the caller to retry. A transaction is submitted once and commits
//! entirely or not at all.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tablekit_model::{Item, StoreOperation};
use tracing::{debug, warn};

use crate::client::StoreClient;
use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::request::{BatchGetItemParams, TransactItem};

impl StoreClient {
    /// Read many records as attribute maps.
    ///
    /// # Errors
    ///
    /// `PartialBatchFailure` carrying the unprocessed keys when the backend
    /// did not process every key; the items it did return are discarded.
    pub async fn batch_get_item_raw(&self, params: &BatchGetItemParams) -> StoreResult<Vec<Item>> {
        if params.keys.is_empty() {
            return Ok(Vec::new());
        }

        let input = self.translator().batch_get_item(params);
        let mut output = self
            .call(
                StoreOperation::BatchGetItem,
                self.transport().batch_get_item(input),
            )
            .await?;

        let unprocessed_keys = output
            .unprocessed_keys
            .values()
            .flat_map(|pending| pending.keys.iter())
            .map(|attributes| Key::from_attributes(self.translator().schema(), attributes))
            .collect::<StoreResult<Vec<_>>>()?;
        if !unprocessed_keys.is_empty() {
            warn!(
                requested = params.keys.len(),
                unprocessed = unprocessed_keys.len(),
                "batch read left keys unprocessed"
            );
            return Err(StoreError::PartialBatchFailure { unprocessed_keys });
        }

        let items = output
            .responses
            .remove(self.table_name())
            .unwrap_or_default();
        debug!(requested = params.keys.len(), found = items.len(), "batch read complete");
        Ok(items)
    }

    /// Read many records and decode them.
    pub async fn batch_get_item<T: DeserializeOwned>(
        &self,
        params: &BatchGetItemParams,
    ) -> StoreResult<Vec<T>> {
        codec::decode_list(self.batch_get_item_raw(params).await?)
    }

    /// Write many attribute maps without atomicity.
    ///
    /// Returns the items the backend did not process; the caller decides
    /// whether to resubmit them.
    pub async fn batch_put_item_raw(&self, items: Vec<Item>) -> StoreResult<Vec<Item>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let submitted = items.len();
        let input = self.translator().batch_write_item(items);
        let output = self
            .call(
                StoreOperation::BatchWriteItem,
                self.transport().batch_write_item(input),
            )
            .await?;

        let retry: Vec<Item> = output
            .unprocessed_items
            .into_values()
            .flatten()
            .filter_map(|write| write.put_request.map(|put| put.item))
            .collect();
        if retry.is_empty() {
            debug!(submitted, "batch write complete");
        } else {
            warn!(
                submitted,
                unprocessed = retry.len(),
                "batch write left items unprocessed"
            );
        }
        Ok(retry)
    }

    /// Write many records without atomicity.
    ///
    /// Returns the records the backend did not process, decoded back into
    /// `T`.
    pub async fn batch_put_item<T>(&self, records: &[T]) -> StoreResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let items = codec::encode_list(records)?;
        codec::decode_list(self.batch_put_item_raw(items).await?)
    }

    /// Submit writes that commit together or not at all.
    ///
    /// A failed precondition on any item fails the whole transaction with
    /// `ConditionalCheckFailed`; nothing is retried.
    pub async fn transact_write_items(&self, items: &[TransactItem]) -> StoreResult<()> {
        let input = self
            .translator()
            .transact_write_items(items, chrono::Utc::now().timestamp())?;
        if input.transact_items.is_empty() {
            debug!("transaction has no writes, nothing to submit");
            return Ok(());
        }

        let writes = input.transact_items.len();
        self.call(
            StoreOperation::TransactWriteItems,
            self.transport().transact_write_items(input),
        )
        .await?;
        debug!(writes, "transaction committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;
    use tablekit_model::BackendErrorCode;
    use tablekit_model::output::{BatchGetItemOutput, BatchWriteItemOutput};
    use tablekit_model::types::{KeysAndAttributes, WriteRequest};

    use super::*;
    use crate::client::tests::{ScriptedTransport, client_over};
    use crate::config::KeySchema;
    use crate::expression::UpdateSpec;
    use crate::request::UpdateItemParams;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Line {
        pk: String,
        sk: String,
        qty: u32,
    }

    fn line(sk: &str) -> Line {
        Line {
            pk: "cart#1".to_owned(),
            sk: sk.to_owned(),
            qty: 1,
        }
    }

    #[tokio::test]
    async fn test_should_fail_closed_on_unprocessed_keys() {
        let schema = KeySchema::default();
        let transport = ScriptedTransport::default();
        *transport.batch_get.lock().unwrap() = BatchGetItemOutput {
            responses: HashMap::from([(
                "t".to_owned(),
                vec![codec::encode(&line("a")).unwrap()],
            )]),
            unprocessed_keys: HashMap::from([(
                "t".to_owned(),
                KeysAndAttributes {
                    keys: vec![Key::new("cart#1", "b").to_attributes(&schema)],
                    ..KeysAndAttributes::default()
                },
            )]),
        };
        let (client, _) = client_over(transport);

        let params = BatchGetItemParams::new(vec![Key::new("cart#1", "a"), Key::new("cart#1", "b")]);
        let err = client.batch_get_item::<Line>(&params).await.unwrap_err();
        let StoreError::PartialBatchFailure { unprocessed_keys } = err else {
            panic!("expected partial batch failure, got {err:?}");
        };
        assert_eq!(unprocessed_keys, vec![Key::new("cart#1", "b")]);
    }

    #[tokio::test]
    async fn test_should_return_every_item_when_fully_processed() {
        let transport = ScriptedTransport::default();
        *transport.batch_get.lock().unwrap() = BatchGetItemOutput {
            responses: HashMap::from([(
                "t".to_owned(),
                codec::encode_list(&[line("a"), line("b")]).unwrap(),
            )]),
            unprocessed_keys: HashMap::new(),
        };
        let (client, _) = client_over(transport);

        let params = BatchGetItemParams::new(vec![Key::new("cart#1", "a"), Key::new("cart#1", "b")]);
        let lines: Vec<Line> = client.batch_get_item(&params).await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_should_return_unprocessed_puts_as_records() {
        let transport = ScriptedTransport::default();
        *transport.batch_write.lock().unwrap() = BatchWriteItemOutput {
            unprocessed_items: HashMap::from([(
                "t".to_owned(),
                vec![WriteRequest::put(codec::encode(&line("c")).unwrap())],
            )]),
        };
        let (client, _) = client_over(transport);

        let retry = client
            .batch_put_item(&[line("a"), line("b"), line("c")])
            .await
            .unwrap();
        assert_eq!(retry, vec![line("c")]);
    }

    #[tokio::test]
    async fn test_should_skip_backend_for_empty_batches() {
        let (client, transport) = client_over(ScriptedTransport::default());
        assert!(client.batch_put_item::<Line>(&[]).await.unwrap().is_empty());
        assert!(
            client
                .batch_get_item_raw(&BatchGetItemParams::default())
                .await
                .unwrap()
                .is_empty()
        );
        client
            .transact_write_items(&[TransactItem::Update(UpdateItemParams::new(
                Key::new("a", "1"),
                UpdateSpec::new(),
            ))])
            .await
            .unwrap();
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_should_submit_transaction_once() {
        let (client, transport) = client_over(ScriptedTransport::default());
        client
            .transact_write_items(&[
                TransactItem::put(&line("a")).unwrap(),
                TransactItem::Delete(Key::new("cart#1", "b")),
            ])
            .await
            .unwrap();
        assert_eq!(
            *transport.calls.lock().unwrap(),
            vec![StoreOperation::TransactWriteItems]
        );
        let submitted = transport.last_transaction.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.transact_items.len(), 2);
    }

    #[tokio::test]
    async fn test_should_surface_condition_failure_for_whole_transaction() {
        let transport = ScriptedTransport::default();
        *transport.fail_with.lock().unwrap() =
            Some(BackendErrorCode::ConditionalCheckFailedException);
        let (client, _) = client_over(transport);
        let err = client
            .transact_write_items(&[TransactItem::put(&line("a")).unwrap()])
            .await
            .unwrap_err();
        assert!(err.is_conditional_check_failed());
    }
}
