//! Conversions between tablekit's native shapes and the AWS SDK's types.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types as sdk;
use bytes::Bytes;
use tablekit_model::types::{
    CancellationReason, DeleteRequest, KeysAndAttributes, PutRequest, ReturnValue,
    TransactWriteItem, WriteRequest,
};
use tablekit_model::{AttributeValue, BackendError, BackendErrorCode, Item};

/// Attribute map as the SDK represents it.
pub type SdkItem = HashMap<String, sdk::AttributeValue>;

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// Convert a native attribute value into the SDK's representation.
#[must_use]
pub fn value_to_sdk(value: AttributeValue) -> sdk::AttributeValue {
    match value {
        AttributeValue::S(s) => sdk::AttributeValue::S(s),
        AttributeValue::N(n) => sdk::AttributeValue::N(n),
        AttributeValue::B(b) => sdk::AttributeValue::B(Blob::new(b.to_vec())),
        AttributeValue::Ss(ss) => sdk::AttributeValue::Ss(ss),
        AttributeValue::Ns(ns) => sdk::AttributeValue::Ns(ns),
        AttributeValue::Bs(bs) => {
            sdk::AttributeValue::Bs(bs.into_iter().map(|b| Blob::new(b.to_vec())).collect())
        }
        AttributeValue::Bool(b) => sdk::AttributeValue::Bool(b),
        AttributeValue::Null(n) => sdk::AttributeValue::Null(n),
        AttributeValue::L(list) => {
            sdk::AttributeValue::L(list.into_iter().map(value_to_sdk).collect())
        }
        AttributeValue::M(map) => sdk::AttributeValue::M(item_to_sdk(map)),
    }
}

/// Convert an SDK attribute value into the native representation.
///
/// # Errors
///
/// Fails on value types this SDK version does not model.
pub fn value_from_sdk(value: sdk::AttributeValue) -> Result<AttributeValue, BackendError> {
    Ok(match value {
        sdk::AttributeValue::S(s) => AttributeValue::S(s),
        sdk::AttributeValue::N(n) => AttributeValue::N(n),
        sdk::AttributeValue::B(b) => AttributeValue::B(Bytes::from(b.into_inner())),
        sdk::AttributeValue::Ss(ss) => AttributeValue::Ss(ss),
        sdk::AttributeValue::Ns(ns) => AttributeValue::Ns(ns),
        sdk::AttributeValue::Bs(bs) => AttributeValue::Bs(
            bs.into_iter()
                .map(|b| Bytes::from(b.into_inner()))
                .collect(),
        ),
        sdk::AttributeValue::Bool(b) => AttributeValue::Bool(b),
        sdk::AttributeValue::Null(n) => AttributeValue::Null(n),
        sdk::AttributeValue::L(list) => AttributeValue::L(
            list.into_iter()
                .map(value_from_sdk)
                .collect::<Result<_, _>>()?,
        ),
        sdk::AttributeValue::M(map) => AttributeValue::M(item_from_sdk(map)?),
        other => {
            return Err(BackendError::with_message(
                BackendErrorCode::Unknown,
                format!("unsupported attribute value in response: {other:?}"),
            ));
        }
    })
}

/// Convert a native attribute map.
#[must_use]
pub fn item_to_sdk(item: Item) -> SdkItem {
    item.into_iter()
        .map(|(name, value)| (name, value_to_sdk(value)))
        .collect()
}

/// Convert an SDK attribute map.
///
/// # Errors
///
/// Fails when any nested value cannot be converted.
pub fn item_from_sdk(item: SdkItem) -> Result<Item, BackendError> {
    item.into_iter()
        .map(|(name, value)| value_from_sdk(value).map(|v| (name, v)))
        .collect()
}

/// Convert a list of SDK attribute maps.
///
/// # Errors
///
/// Fails when any item cannot be converted.
pub fn items_from_sdk(items: Vec<SdkItem>) -> Result<Vec<Item>, BackendError> {
    items.into_iter().map(item_from_sdk).collect()
}

/// Expression maps are rejected by the service when present but empty.
#[must_use]
pub fn non_empty<V>(map: HashMap<String, V>) -> Option<HashMap<String, V>> {
    (!map.is_empty()).then_some(map)
}

/// Placeholder values converted and dropped when empty.
#[must_use]
pub fn values_to_sdk(values: Item) -> Option<SdkItem> {
    non_empty(item_to_sdk(values))
}

/// Map the write return mode.
#[must_use]
pub fn return_value_to_sdk(value: ReturnValue) -> sdk::ReturnValue {
    match value {
        ReturnValue::None => sdk::ReturnValue::None,
        ReturnValue::AllOld => sdk::ReturnValue::AllOld,
        ReturnValue::AllNew => sdk::ReturnValue::AllNew,
    }
}

// ---------------------------------------------------------------------------
// Batch and transaction entries
// ---------------------------------------------------------------------------

fn build_error(err: BuildError) -> BackendError {
    BackendError::validation(format!("invalid request: {err}")).with_source(err)
}

/// Convert the keys requested from one table.
///
/// # Errors
///
/// Fails when the SDK builder rejects the entry.
pub fn keys_and_attributes_to_sdk(
    request: KeysAndAttributes,
) -> Result<sdk::KeysAndAttributes, BackendError> {
    sdk::KeysAndAttributes::builder()
        .set_keys(Some(request.keys.into_iter().map(item_to_sdk).collect()))
        .set_projection_expression(request.projection_expression)
        .set_expression_attribute_names(non_empty(request.expression_attribute_names))
        .set_consistent_read(request.consistent_read)
        .build()
        .map_err(build_error)
}

/// Convert unprocessed keys reported by the service.
///
/// # Errors
///
/// Fails when a key cannot be converted.
pub fn keys_and_attributes_from_sdk(
    request: sdk::KeysAndAttributes,
) -> Result<KeysAndAttributes, BackendError> {
    Ok(KeysAndAttributes {
        keys: items_from_sdk(request.keys)?,
        projection_expression: request.projection_expression,
        expression_attribute_names: request.expression_attribute_names.unwrap_or_default(),
        consistent_read: request.consistent_read,
    })
}

/// Convert one batch write entry.
///
/// # Errors
///
/// Fails when the SDK builder rejects the entry.
pub fn write_request_to_sdk(request: WriteRequest) -> Result<sdk::WriteRequest, BackendError> {
    let put_request = request
        .put_request
        .map(|put| {
            sdk::PutRequest::builder()
                .set_item(Some(item_to_sdk(put.item)))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let delete_request = request
        .delete_request
        .map(|delete| {
            sdk::DeleteRequest::builder()
                .set_key(Some(item_to_sdk(delete.key)))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    Ok(sdk::WriteRequest::builder()
        .set_put_request(put_request)
        .set_delete_request(delete_request)
        .build())
}

/// Convert an unprocessed batch write entry.
///
/// # Errors
///
/// Fails when an item or key cannot be converted.
pub fn write_request_from_sdk(request: sdk::WriteRequest) -> Result<WriteRequest, BackendError> {
    Ok(WriteRequest {
        put_request: request
            .put_request
            .map(|put| item_from_sdk(put.item).map(|item| PutRequest { item }))
            .transpose()?,
        delete_request: request
            .delete_request
            .map(|delete| item_from_sdk(delete.key).map(|key| DeleteRequest { key }))
            .transpose()?,
    })
}

/// Convert one transaction entry.
///
/// # Errors
///
/// Fails when the SDK builder rejects one of the branches.
pub fn transact_item_to_sdk(item: TransactWriteItem) -> Result<sdk::TransactWriteItem, BackendError> {
    let put = item
        .put
        .map(|put| {
            sdk::Put::builder()
                .table_name(put.table_name)
                .set_item(Some(item_to_sdk(put.item)))
                .set_condition_expression(put.condition_expression)
                .set_expression_attribute_names(non_empty(put.expression_attribute_names))
                .set_expression_attribute_values(values_to_sdk(put.expression_attribute_values))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let update = item
        .update
        .map(|update| {
            sdk::Update::builder()
                .table_name(update.table_name)
                .set_key(Some(item_to_sdk(update.key)))
                .update_expression(update.update_expression)
                .set_condition_expression(update.condition_expression)
                .set_expression_attribute_names(non_empty(update.expression_attribute_names))
                .set_expression_attribute_values(values_to_sdk(
                    update.expression_attribute_values,
                ))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let delete = item
        .delete
        .map(|delete| {
            sdk::Delete::builder()
                .table_name(delete.table_name)
                .set_key(Some(item_to_sdk(delete.key)))
                .set_condition_expression(delete.condition_expression)
                .set_expression_attribute_names(non_empty(delete.expression_attribute_names))
                .set_expression_attribute_values(values_to_sdk(
                    delete.expression_attribute_values,
                ))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    Ok(sdk::TransactWriteItem::builder()
        .set_put(put)
        .set_update(update)
        .set_delete(delete)
        .build())
}

/// Per-item reasons reported with a cancelled transaction.
#[must_use]
pub fn cancellation_reasons_from_sdk(reasons: &[sdk::CancellationReason]) -> Vec<CancellationReason> {
    reasons
        .iter()
        .map(|reason| CancellationReason {
            code: reason.code().map(ToOwned::to_owned),
            message: reason.message().map(ToOwned::to_owned),
        })
        .collect()
}
