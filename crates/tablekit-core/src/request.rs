//! Request translation.
//!
//! Turns caller parameter objects into native store inputs. Translation is
//! pure: it builds expressions and key attributes but never calls the backend,
//! so every build failure surfaces before a request is sent.

use std::collections::HashMap;

use serde::Serialize;
use tablekit_model::Item;
use tablekit_model::input::{
    BatchGetItemInput, BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput,
    QueryInput, TransactWriteItemsInput, UpdateItemInput,
};
use tablekit_model::types::{
    KeysAndAttributes, ReturnValue, TransactDelete, TransactPut, TransactUpdate,
    TransactWriteItem, WriteRequest,
};
use tracing::debug;

use crate::codec;
use crate::config::{ClientConfig, KeySchema};
use crate::error::StoreResult;
use crate::expression::{
    Condition, ConditionList, ExpressionBuilder, Mutation, ProjectionSpec, UpdateSpec, all_of,
    attributes_absent, key_condition,
};
use crate::key::Key;

// ---------------------------------------------------------------------------
// Parameter objects
// ---------------------------------------------------------------------------

/// Parameters of a single-item read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetItemParams {
    /// Record to read.
    pub key: Key,
    /// Strongly consistent read.
    pub consistent_read: bool,
    /// Attributes to return; empty for all.
    pub projection: ProjectionSpec,
}

impl GetItemParams {
    /// Eventually consistent read of the whole record.
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }
}

/// Parameters of a single-item update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateItemParams {
    /// Record to update; created when absent.
    pub key: Key,
    /// Field mutations.
    pub update: UpdateSpec,
    /// Preconditions, AND-ed.
    pub conditions: ConditionList,
}

impl UpdateItemParams {
    /// An unconditional update.
    #[must_use]
    pub fn new(key: Key, update: UpdateSpec) -> Self {
        Self {
            key,
            update,
            conditions: Vec::new(),
        }
    }

    /// Add a precondition.
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// Parameters of a single-item delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteItemParams {
    /// Record to delete.
    pub key: Key,
}

/// Parameters of a partition query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// Partition to read.
    pub partition_key: String,
    /// Optional predicate on the sort key (`Equal` or `BeginsWith`).
    pub sort_condition: Option<Condition>,
    /// Post-read filters, AND-ed.
    pub filters: ConditionList,
    /// Attributes to return; empty for all.
    pub projection: ProjectionSpec,
    /// Strongly consistent read.
    pub consistent_read: bool,
}

impl QueryParams {
    /// Read a whole partition.
    #[must_use]
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            ..Self::default()
        }
    }

    /// Restrict the sort key.
    #[must_use]
    pub fn sort(mut self, condition: Condition) -> Self {
        self.sort_condition = Some(condition);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }
}

/// Parameters of a batch read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetItemParams {
    /// Records to read.
    pub keys: Vec<Key>,
    /// Attributes to return; empty for all.
    pub projection: ProjectionSpec,
    /// Strongly consistent read.
    pub consistent_read: bool,
}

impl BatchGetItemParams {
    /// Read whole records for `keys`.
    #[must_use]
    pub fn new(keys: Vec<Key>) -> Self {
        Self {
            keys,
            ..Self::default()
        }
    }
}

/// One write of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactItem {
    /// Insert, failing the transaction if the key exists.
    Put(Item),
    /// Update with optional preconditions.
    Update(UpdateItemParams),
    /// Unconditional delete.
    Delete(Key),
}

impl TransactItem {
    /// Encode `record` into an insert.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` when the record does not encode to a map.
    pub fn put<T: Serialize + ?Sized>(record: &T) -> StoreResult<Self> {
        codec::encode(record).map(Self::Put)
    }
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Builds native inputs for one table.
#[derive(Debug, Clone)]
pub struct RequestTranslator {
    table_name: String,
    schema: KeySchema,
    last_updated_attribute: String,
}

impl RequestTranslator {
    /// Translator for the table and schema of `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            table_name: config.table_name.clone(),
            schema: config.key_schema.clone(),
            last_updated_attribute: config.last_updated_attribute.clone(),
        }
    }

    /// Target table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Key attribute names.
    #[must_use]
    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Key read with optional projection.
    #[must_use]
    pub fn get_item(&self, params: &GetItemParams) -> GetItemInput {
        let expr = ExpressionBuilder::new()
            .projection(params.projection.clone())
            .build();
        GetItemInput {
            table_name: self.table_name.clone(),
            key: params.key.to_attributes(&self.schema),
            consistent_read: Some(params.consistent_read),
            projection_expression: expr.projection,
            expression_attribute_names: expr.names,
        }
    }

    /// Insert that fails when the partition key is already taken.
    #[must_use]
    pub fn put_item(&self, item: Item) -> PutItemInput {
        let expr = ExpressionBuilder::new()
            .condition(attributes_absent(&[&self.schema.partition_key]))
            .build();
        PutItemInput {
            table_name: self.table_name.clone(),
            item,
            condition_expression: expr.condition,
            expression_attribute_names: expr.names,
            expression_attribute_values: expr.values,
        }
    }

    /// Update returning the full post-update record.
    ///
    /// `now` (Unix seconds) is written to the last-updated attribute,
    /// replacing any caller mutation of it.
    pub fn update_item(&self, params: &UpdateItemParams, now: i64) -> StoreResult<UpdateItemInput> {
        let condition = all_of(&params.conditions, "update condition")?;
        let expr = ExpressionBuilder::new()
            .condition(condition)
            .update(self.stamped(&params.update, now))
            .build();
        Ok(UpdateItemInput {
            table_name: self.table_name.clone(),
            key: params.key.to_attributes(&self.schema),
            update_expression: expr.update,
            condition_expression: expr.condition,
            expression_attribute_names: expr.names,
            expression_attribute_values: expr.values,
            return_values: Some(ReturnValue::AllNew),
        })
    }

    /// Unconditional delete.
    pub fn delete_item(&self, params: &DeleteItemParams) -> StoreResult<DeleteItemInput> {
        params.key.require_complete()?;
        Ok(DeleteItemInput {
            table_name: self.table_name.clone(),
            key: params.key.to_attributes(&self.schema),
            ..DeleteItemInput::default()
        })
    }

    /// Partition query with optional sort predicate, filters and projection.
    pub fn query(&self, params: &QueryParams) -> StoreResult<QueryInput> {
        let key = key_condition(
            &self.schema,
            &params.partition_key,
            params.sort_condition.as_ref(),
        )?;
        let filter = all_of(&params.filters, "filter")?;
        let expr = ExpressionBuilder::new()
            .key_condition(key)
            .filter(filter)
            .projection(params.projection.clone())
            .build();
        Ok(QueryInput {
            table_name: self.table_name.clone(),
            key_condition_expression: expr.key_condition,
            filter_expression: expr.filter,
            projection_expression: expr.projection,
            expression_attribute_names: expr.names,
            expression_attribute_values: expr.values,
            consistent_read: Some(params.consistent_read),
        })
    }

    /// Batch read of every key under this table.
    #[must_use]
    pub fn batch_get_item(&self, params: &BatchGetItemParams) -> BatchGetItemInput {
        let expr = ExpressionBuilder::new()
            .projection(params.projection.clone())
            .build();
        let keys_and_attributes = KeysAndAttributes {
            keys: params
                .keys
                .iter()
                .map(|k| k.to_attributes(&self.schema))
                .collect(),
            projection_expression: expr.projection,
            expression_attribute_names: expr.names,
            consistent_read: Some(params.consistent_read),
        };
        BatchGetItemInput {
            request_items: HashMap::from([(self.table_name.clone(), keys_and_attributes)]),
        }
    }

    /// One put-request per item.
    #[must_use]
    pub fn batch_write_item(&self, items: Vec<Item>) -> BatchWriteItemInput {
        let writes = items.into_iter().map(WriteRequest::put).collect();
        BatchWriteItemInput {
            request_items: HashMap::from([(self.table_name.clone(), writes)]),
        }
    }

    /// One sub-request per item, in order.
    ///
    /// Puts require both key attributes to be absent, updates carry their own
    /// preconditions, deletes have none. Updates without mutations are
    /// skipped.
    pub fn transact_write_items(
        &self,
        items: &[TransactItem],
        now: i64,
    ) -> StoreResult<TransactWriteItemsInput> {
        let mut transact_items = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item {
                TransactItem::Put(record) => {
                    let expr = ExpressionBuilder::new()
                        .condition(attributes_absent(&[
                            &self.schema.partition_key,
                            &self.schema.sort_key,
                        ]))
                        .build();
                    transact_items.push(TransactWriteItem {
                        put: Some(TransactPut {
                            table_name: self.table_name.clone(),
                            item: record.clone(),
                            condition_expression: expr.condition,
                            expression_attribute_names: expr.names,
                            expression_attribute_values: expr.values,
                        }),
                        ..TransactWriteItem::default()
                    });
                }
                TransactItem::Update(params) if params.update.is_empty() => {
                    debug!(index, key = ?params.key, "skipping transactional update without mutations");
                }
                TransactItem::Update(params) => {
                    let update = self.update_item(params, now)?;
                    transact_items.push(TransactWriteItem {
                        update: Some(TransactUpdate {
                            table_name: update.table_name,
                            key: update.key,
                            update_expression: update.update_expression.unwrap_or_default(),
                            condition_expression: update.condition_expression,
                            expression_attribute_names: update.expression_attribute_names,
                            expression_attribute_values: update.expression_attribute_values,
                        }),
                        ..TransactWriteItem::default()
                    });
                }
                TransactItem::Delete(key) => {
                    key.require_complete()?;
                    transact_items.push(TransactWriteItem {
                        delete: Some(TransactDelete {
                            table_name: self.table_name.clone(),
                            key: key.to_attributes(&self.schema),
                            ..TransactDelete::default()
                        }),
                        ..TransactWriteItem::default()
                    });
                }
            }
        }
        Ok(TransactWriteItemsInput { transact_items })
    }

    fn stamped(&self, update: &UpdateSpec, now: i64) -> UpdateSpec {
        let mut update = update.clone();
        update.insert(
            self.last_updated_attribute.clone(),
            Mutation::Set(now.into()),
        );
        update
    }
}
