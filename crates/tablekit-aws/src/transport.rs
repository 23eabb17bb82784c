//! [`Transport`] backed by the AWS SDK's DynamoDB client.

use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use tablekit_core::{BackendResult, Transport};
use tablekit_model::input::{
    BatchGetItemInput, BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput,
    QueryInput, TransactWriteItemsInput, UpdateItemInput,
};
use tablekit_model::output::{
    BatchGetItemOutput, BatchWriteItemOutput, DeleteItemOutput, GetItemOutput, PutItemOutput,
    QueryOutput, TransactWriteItemsOutput, UpdateItemOutput,
};
use tablekit_model::{BackendError, BackendErrorCode};
use tracing::debug;

use crate::config::AwsTransportConfig;
use crate::convert::{
    self, cancellation_reasons_from_sdk, item_from_sdk, item_to_sdk, items_from_sdk, non_empty,
    values_to_sdk,
};

/// Executes requests against DynamoDB or a compatible endpoint.
#[derive(Clone)]
pub struct SdkTransport {
    client: Client,
}

impl std::fmt::Debug for SdkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkTransport").finish_non_exhaustive()
    }
}

impl SdkTransport {
    /// Wrap an existing SDK client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Load SDK configuration and build a client from it.
    ///
    /// Retries with exponential backoff and the operation timeout are
    /// handled by the SDK; an exhausted budget surfaces as a
    /// `TransportFailure`.
    pub async fn connect(config: &AwsTransportConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(
                RetryConfig::standard()
                    .with_max_attempts(config.max_retry_attempts)
                    .with_max_backoff(config.max_retry_backoff),
            );
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        if let Some(credentials) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                credentials.session_token.clone(),
                None,
                "tablekit",
            ));
        }
        if let Some(timeout) = config.operation_timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }

        let sdk_config = loader.load().await;
        debug!(
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "AWS transport configured"
        );
        Self::from_client(Client::new(&sdk_config))
    }

    /// The underlying SDK client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map an SDK failure onto a backend error.
///
/// Service answers keep their error code; anything that failed before an
/// answer arrived (timeouts, dispatch and construction failures) becomes a
/// `TransportFailure`.
fn backend_error<E>(err: SdkError<E, HttpResponse>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = match &err {
        SdkError::ServiceError(_) => err
            .code()
            .map_or(BackendErrorCode::Unknown, BackendErrorCode::from_code),
        _ => BackendErrorCode::TransportFailure,
    };
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), ToOwned::to_owned);
    debug!(code = %code, message = %message, "DynamoDB request failed");
    BackendError::with_message(code, message).with_source(err)
}

#[async_trait::async_trait]
impl Transport for SdkTransport {
    async fn get_item(&self, input: GetItemInput) -> BackendResult<GetItemOutput> {
        let output = self
            .client
            .get_item()
            .table_name(input.table_name)
            .set_key(Some(item_to_sdk(input.key)))
            .set_consistent_read(input.consistent_read)
            .set_projection_expression(input.projection_expression)
            .set_expression_attribute_names(non_empty(input.expression_attribute_names))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(GetItemOutput {
            item: output.item.map(item_from_sdk).transpose()?,
        })
    }

    async fn put_item(&self, input: PutItemInput) -> BackendResult<PutItemOutput> {
        let output = self
            .client
            .put_item()
            .table_name(input.table_name)
            .set_item(Some(item_to_sdk(input.item)))
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(non_empty(input.expression_attribute_names))
            .set_expression_attribute_values(values_to_sdk(input.expression_attribute_values))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(PutItemOutput {
            attributes: output
                .attributes
                .map(item_from_sdk)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    async fn update_item(&self, input: UpdateItemInput) -> BackendResult<UpdateItemOutput> {
        let output = self
            .client
            .update_item()
            .table_name(input.table_name)
            .set_key(Some(item_to_sdk(input.key)))
            .set_update_expression(input.update_expression)
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(non_empty(input.expression_attribute_names))
            .set_expression_attribute_values(values_to_sdk(input.expression_attribute_values))
            .set_return_values(input.return_values.map(convert::return_value_to_sdk))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(UpdateItemOutput {
            attributes: output
                .attributes
                .map(item_from_sdk)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    async fn delete_item(&self, input: DeleteItemInput) -> BackendResult<DeleteItemOutput> {
        let output = self
            .client
            .delete_item()
            .table_name(input.table_name)
            .set_key(Some(item_to_sdk(input.key)))
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(non_empty(input.expression_attribute_names))
            .set_expression_attribute_values(values_to_sdk(input.expression_attribute_values))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(DeleteItemOutput {
            attributes: output
                .attributes
                .map(item_from_sdk)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    async fn query(&self, input: QueryInput) -> BackendResult<QueryOutput> {
        let output = self
            .client
            .query()
            .table_name(input.table_name)
            .set_key_condition_expression(input.key_condition_expression)
            .set_filter_expression(input.filter_expression)
            .set_projection_expression(input.projection_expression)
            .set_expression_attribute_names(non_empty(input.expression_attribute_names))
            .set_expression_attribute_values(values_to_sdk(input.expression_attribute_values))
            .set_consistent_read(input.consistent_read)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(QueryOutput {
            items: items_from_sdk(output.items.unwrap_or_default())?,
            count: output.count,
            scanned_count: output.scanned_count,
        })
    }

    async fn batch_get_item(&self, input: BatchGetItemInput) -> BackendResult<BatchGetItemOutput> {
        let request_items = input
            .request_items
            .into_iter()
            .map(|(table, keys)| convert::keys_and_attributes_to_sdk(keys).map(|k| (table, k)))
            .collect::<BackendResult<_>>()?;
        let output = self
            .client
            .batch_get_item()
            .set_request_items(Some(request_items))
            .send()
            .await
            .map_err(backend_error)?;

        let responses = output
            .responses
            .unwrap_or_default()
            .into_iter()
            .map(|(table, items)| items_from_sdk(items).map(|items| (table, items)))
            .collect::<BackendResult<_>>()?;
        let unprocessed_keys = output
            .unprocessed_keys
            .unwrap_or_default()
            .into_iter()
            .map(|(table, keys)| convert::keys_and_attributes_from_sdk(keys).map(|k| (table, k)))
            .collect::<BackendResult<_>>()?;
        Ok(BatchGetItemOutput {
            responses,
            unprocessed_keys,
        })
    }

    async fn batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> BackendResult<BatchWriteItemOutput> {
        let request_items = input
            .request_items
            .into_iter()
            .map(|(table, writes)| {
                writes
                    .into_iter()
                    .map(convert::write_request_to_sdk)
                    .collect::<BackendResult<Vec<_>>>()
                    .map(|writes| (table, writes))
            })
            .collect::<BackendResult<_>>()?;
        let output = self
            .client
            .batch_write_item()
            .set_request_items(Some(request_items))
            .send()
            .await
            .map_err(backend_error)?;

        let unprocessed_items = output
            .unprocessed_items
            .unwrap_or_default()
            .into_iter()
            .map(|(table, writes)| {
                writes
                    .into_iter()
                    .map(convert::write_request_from_sdk)
                    .collect::<BackendResult<Vec<_>>>()
                    .map(|writes| (table, writes))
            })
            .collect::<BackendResult<_>>()?;
        Ok(BatchWriteItemOutput { unprocessed_items })
    }

    async fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> BackendResult<TransactWriteItemsOutput> {
        let transact_items = input
            .transact_items
            .into_iter()
            .map(convert::transact_item_to_sdk)
            .collect::<BackendResult<Vec<_>>>()?;
        self.client
            .transact_write_items()
            .set_transact_items(Some(transact_items))
            .send()
            .await
            .map_err(|err| {
                let reasons = match err.as_service_error() {
                    Some(TransactWriteItemsError::TransactionCanceledException(cancelled)) => {
                        cancellation_reasons_from_sdk(cancelled.cancellation_reasons())
                    }
                    _ => Vec::new(),
                };
                backend_error(err).with_cancellation_reasons(reasons)
            })?;
        Ok(TransactWriteItemsOutput {})
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::operation::get_item::GetItemError;

    use super::*;

    #[test]
    fn test_should_map_timeouts_to_transport_failure() {
        let err: SdkError<GetItemError, HttpResponse> =
            SdkError::timeout_error("operation timed out");
        let backend = backend_error(err);
        assert_eq!(backend.code, BackendErrorCode::TransportFailure);
        assert!(backend.source.is_some());
    }

    #[test]
    fn test_should_map_construction_failures_to_transport_failure() {
        let err: SdkError<TransactWriteItemsError, HttpResponse> =
            SdkError::construction_failure("missing table name");
        let backend = backend_error(err);
        assert_eq!(backend.code, BackendErrorCode::TransportFailure);
        assert!(backend.cancellation_reasons.is_empty());
    }

    #[tokio::test]
    async fn test_should_connect_without_network() {
        let transport =
            SdkTransport::connect(&AwsTransportConfig::local("http://localhost:4566")).await;
        assert_eq!(format!("{transport:?}"), "SdkTransport { .. }");
        assert!(transport.client().config().region().is_some());
    }
}
