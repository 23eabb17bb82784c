//! The in-process store: tables, request handlers and the [`Transport`] impl.
//!
//! Reads go straight to partition storage. Every write that evaluates a
//! condition, and every transaction, runs under one engine-wide write lock so
//! the check and the write are atomic with respect to other writers.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use tablekit_core::{BackendResult, KeySchema, Transport};
use tablekit_model::input::{
    BatchGetItemInput, BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput,
    QueryInput, TransactWriteItemsInput, UpdateItemInput,
};
use tablekit_model::output::{
    BatchGetItemOutput, BatchWriteItemOutput, DeleteItemOutput, GetItemOutput, PutItemOutput,
    QueryOutput, TransactWriteItemsOutput, UpdateItemOutput,
};
use tablekit_model::types::{
    CancellationReason, ExpressionAttributeNames, ExpressionAttributeValues, Item,
    KeysAndAttributes, ReturnValue, TransactWriteItem, WriteRequest,
};
use tablekit_model::{AttributeValue, BackendError, backend_error};
use tracing::debug;

use crate::config::MemoryStoreConfig;
use crate::error::StorageError;
use crate::expression::ast::{CompareOp, Operand, PathElement};
use crate::expression::{EvalContext, Expr, parse_condition, parse_projection, parse_update};
use crate::storage::{PrimaryKey, TableStorage};

/// Keys one batch read may request.
pub const MAX_BATCH_GET_KEYS: usize = 100;

/// Writes one batch write may carry.
pub const MAX_BATCH_WRITES: usize = 25;

/// Items one transaction may carry.
pub const MAX_TRANSACT_ITEMS: usize = 100;

const CONDITION_FAILED: &str = "The conditional request failed";

/// An in-process store engine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, Arc<TableStorage>>,
    write_lock: Mutex<()>,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    /// Create an empty engine.
    #[must_use]
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            tables: DashMap::new(),
            write_lock: Mutex::new(()),
            config,
        }
    }

    /// Create a table keyed by `schema`.
    ///
    /// # Errors
    ///
    /// `ValidationException` if a table with that name already exists.
    pub fn create_table(&self, name: impl Into<String>, schema: KeySchema) -> BackendResult<()> {
        match self.tables.entry(name.into()) {
            Entry::Occupied(e) => Err(backend_error!(
                ValidationException,
                format!("table already exists: {}", e.key())
            )),
            Entry::Vacant(e) => {
                debug!(table = %e.key(), "created table");
                e.insert(Arc::new(TableStorage::new(schema)));
                Ok(())
            }
        }
    }

    /// Number of items in a table, `None` if the table does not exist.
    #[must_use]
    pub fn item_count(&self, table: &str) -> Option<usize> {
        self.tables.get(table).map(|storage| storage.len())
    }

    fn require_table(&self, name: &str) -> BackendResult<Arc<TableStorage>> {
        self.tables
            .get(name)
            .map(|storage| Arc::clone(storage.value()))
            .ok_or_else(|| {
                backend_error!(
                    ResourceNotFoundException,
                    format!("requested resource not found: table {name}")
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Single-item operations
// ---------------------------------------------------------------------------

impl MemoryStore {
    /// Handle `GetItem`.
    pub fn handle_get_item(&self, input: &GetItemInput) -> BackendResult<GetItemOutput> {
        let table = self.require_table(&input.table_name)?;
        let key = table.key_of(&input.key)?;
        let item = table
            .get(&key)
            .map(|item| {
                project(
                    item,
                    input.projection_expression.as_deref(),
                    &input.expression_attribute_names,
                )
            })
            .transpose()?;
        debug!(table = %input.table_name, found = item.is_some(), "get item");
        Ok(GetItemOutput { item })
    }

    /// Handle `PutItem`.
    pub fn handle_put_item(&self, input: PutItemInput) -> BackendResult<PutItemOutput> {
        let table = self.require_table(&input.table_name)?;
        let key = table.key_of(&input.item)?;

        let _guard = self.write_lock.lock();
        let existing = table.get(&key);
        let holds = condition_holds(
            input.condition_expression.as_deref(),
            existing.as_ref(),
            &input.expression_attribute_names,
            &input.expression_attribute_values,
        )?;
        if !holds {
            return Err(BackendError::conditional_check_failed(CONDITION_FAILED));
        }
        table.put(input.item)?;
        Ok(PutItemOutput::default())
    }

    /// Handle `UpdateItem`; a missing item is created from its key.
    pub fn handle_update_item(&self, input: &UpdateItemInput) -> BackendResult<UpdateItemOutput> {
        let table = self.require_table(&input.table_name)?;
        let key = table.key_of(&input.key)?;

        let _guard = self.write_lock.lock();
        let existing = table.get(&key);
        let holds = condition_holds(
            input.condition_expression.as_deref(),
            existing.as_ref(),
            &input.expression_attribute_names,
            &input.expression_attribute_values,
        )?;
        if !holds {
            return Err(BackendError::conditional_check_failed(CONDITION_FAILED));
        }
        let updated = updated_item(
            table.schema(),
            &input.key,
            existing.as_ref(),
            input.update_expression.as_deref(),
            &input.expression_attribute_names,
            &input.expression_attribute_values,
        )?;
        table.put(updated.clone())?;

        let attributes = match input.return_values {
            Some(ReturnValue::AllNew) => updated,
            Some(ReturnValue::AllOld) => existing.unwrap_or_default(),
            Some(ReturnValue::None) | None => Item::new(),
        };
        Ok(UpdateItemOutput { attributes })
    }

    /// Handle `DeleteItem`; deleting an absent item succeeds.
    pub fn handle_delete_item(&self, input: &DeleteItemInput) -> BackendResult<DeleteItemOutput> {
        let table = self.require_table(&input.table_name)?;
        let key = table.key_of(&input.key)?;

        let _guard = self.write_lock.lock();
        let existing = table.get(&key);
        let holds = condition_holds(
            input.condition_expression.as_deref(),
            existing.as_ref(),
            &input.expression_attribute_names,
            &input.expression_attribute_values,
        )?;
        if !holds {
            return Err(BackendError::conditional_check_failed(CONDITION_FAILED));
        }
        table.delete(&key);
        Ok(DeleteItemOutput::default())
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

impl MemoryStore {
    /// Handle `Query`.
    ///
    /// The key condition must pin the partition key with `=`; the whole key
    /// condition, then the filter, is evaluated against each item of that
    /// partition in sort-key order.
    pub fn handle_query(&self, input: &QueryInput) -> BackendResult<QueryOutput> {
        let table = self.require_table(&input.table_name)?;
        let names = &input.expression_attribute_names;
        let values = &input.expression_attribute_values;

        let key_condition = input
            .key_condition_expression
            .as_deref()
            .ok_or_else(|| BackendError::validation("a query needs a key condition expression"))?;
        let key_condition = parse_condition(key_condition)?;
        let filter = input
            .filter_expression
            .as_deref()
            .map(parse_condition)
            .transpose()?;
        let projection = input
            .projection_expression
            .as_deref()
            .map(parse_projection)
            .transpose()?;

        let empty = Item::new();
        let partition = partition_value(
            &key_condition,
            &EvalContext {
                item: &empty,
                names,
                values,
            },
            &table.schema().partition_key,
        )?;

        let mut scanned = 0_usize;
        let mut items = Vec::new();
        for item in table.partition(&partition) {
            let ctx = EvalContext {
                item: &item,
                names,
                values,
            };
            if !ctx.evaluate(&key_condition)? {
                continue;
            }
            scanned += 1;
            if let Some(filter) = &filter {
                if !ctx.evaluate(filter)? {
                    continue;
                }
            }
            items.push(match &projection {
                Some(paths) => ctx.apply_projection(paths)?,
                None => item.clone(),
            });
        }

        debug!(table = %input.table_name, scanned, matched = items.len(), "query");
        Ok(QueryOutput {
            count: saturating_i32(items.len()),
            scanned_count: saturating_i32(scanned),
            items,
        })
    }
}

/// Find the value the key condition binds the partition key to.
fn partition_value(
    key_condition: &Expr,
    ctx: &EvalContext<'_>,
    partition_key: &str,
) -> BackendResult<AttributeValue> {
    for conjunct in key_condition.conjuncts() {
        let Expr::Compare {
            left,
            op: CompareOp::Eq,
            right,
        } = conjunct
        else {
            continue;
        };
        let ((Operand::Path(path), value @ Operand::Value(_))
        | (value @ Operand::Value(_), Operand::Path(path))) = (left, right)
        else {
            continue;
        };
        let [PathElement::Attribute(name)] = path.elements.as_slice()
        else {
            continue;
        };
        if ctx.resolve_name(name)? == partition_key {
            if let Some(bound) = ctx.resolve_operand(value)? {
                return Ok(bound.clone());
            }
        }
    }
    Err(BackendError::validation(format!(
        "the key condition must bind the partition key {partition_key} with '='"
    )))
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

impl MemoryStore {
    /// Handle `BatchGetItem`.
    ///
    /// Keys beyond the configured capacity come back in `unprocessed_keys`.
    pub fn handle_batch_get_item(
        &self,
        input: &BatchGetItemInput,
    ) -> BackendResult<BatchGetItemOutput> {
        let requested: usize = input.request_items.values().map(|r| r.keys.len()).sum();
        if requested > MAX_BATCH_GET_KEYS {
            return Err(BackendError::validation(format!(
                "too many items requested for the BatchGetItem call: {requested} exceeds \
                 {MAX_BATCH_GET_KEYS}"
            )));
        }

        let capacity = self.config.batch_get_capacity.unwrap_or(usize::MAX);
        let mut served = 0_usize;
        let mut output = BatchGetItemOutput::default();

        for (table_name, request) in &input.request_items {
            let table = self.require_table(table_name)?;
            let mut found = Vec::new();
            let mut pending = Vec::new();

            for key_attributes in &request.keys {
                let key = table.key_of(key_attributes)?;
                if served >= capacity {
                    pending.push(key_attributes.clone());
                    continue;
                }
                served += 1;
                if let Some(item) = table.get(&key) {
                    found.push(project(
                        item,
                        request.projection_expression.as_deref(),
                        &request.expression_attribute_names,
                    )?);
                }
            }

            output.responses.insert(table_name.clone(), found);
            if !pending.is_empty() {
                debug!(table = %table_name, unprocessed = pending.len(), "batch read over capacity");
                output.unprocessed_keys.insert(
                    table_name.clone(),
                    KeysAndAttributes {
                        keys: pending,
                        ..request.clone()
                    },
                );
            }
        }
        Ok(output)
    }

    /// Handle `BatchWriteItem`.
    ///
    /// Every entry is validated before any is applied; entries beyond the
    /// configured capacity come back in `unprocessed_items`.
    pub fn handle_batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> BackendResult<BatchWriteItemOutput> {
        let submitted: usize = input.request_items.values().map(Vec::len).sum();
        if submitted > MAX_BATCH_WRITES {
            return Err(BackendError::validation(format!(
                "too many items in the BatchWriteItem request: {submitted} exceeds \
                 {MAX_BATCH_WRITES}"
            )));
        }

        let mut planned = Vec::with_capacity(submitted);
        for (table_name, writes) in input.request_items {
            let table = self.require_table(&table_name)?;
            for write in writes {
                let key = match (&write.put_request, &write.delete_request) {
                    (Some(put), None) => table.key_of(&put.item)?,
                    (None, Some(delete)) => table.key_of(&delete.key)?,
                    _ => {
                        return Err(BackendError::validation(
                            "a write request needs exactly one of a put or a delete",
                        ));
                    }
                };
                planned.push((table_name.clone(), Arc::clone(&table), key, write));
            }
        }

        let capacity = self.config.batch_write_capacity.unwrap_or(usize::MAX);
        let mut unprocessed: HashMap<String, Vec<WriteRequest>> = HashMap::new();
        let _guard = self.write_lock.lock();
        for (written, (table_name, table, key, write)) in planned.into_iter().enumerate() {
            if written >= capacity {
                unprocessed.entry(table_name).or_default().push(write);
                continue;
            }
            match write.put_request {
                Some(put) => {
                    table.put(put.item)?;
                }
                None => {
                    table.delete(&key);
                }
            }
        }

        if !unprocessed.is_empty() {
            debug!(
                unprocessed = unprocessed.values().map(Vec::len).sum::<usize>(),
                "batch write over capacity"
            );
        }
        Ok(BatchWriteItemOutput {
            unprocessed_items: unprocessed,
        })
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// What a validated transaction item will do.
#[derive(Debug)]
enum Planned {
    Put(Item),
    Delete,
}

impl MemoryStore {
    /// Handle `TransactWriteItems`.
    ///
    /// Every condition is checked before anything is written. If any fails
    /// the transaction is cancelled with one reason per item, in request
    /// order, and no item changes.
    pub fn handle_transact_write_items(
        &self,
        input: &TransactWriteItemsInput,
    ) -> BackendResult<TransactWriteItemsOutput> {
        let count = input.transact_items.len();
        if count == 0 || count > MAX_TRANSACT_ITEMS {
            return Err(BackendError::validation(format!(
                "a transaction carries between 1 and {MAX_TRANSACT_ITEMS} items, got {count}"
            )));
        }

        let _guard = self.write_lock.lock();
        let mut plan: Vec<(Arc<TableStorage>, PrimaryKey, Planned)> = Vec::with_capacity(count);
        let mut reasons = Vec::with_capacity(count);
        let mut cancelled = false;

        for write in &input.transact_items {
            let (table, key, planned, holds) = self.plan_transact_item(write)?;
            if plan
                .iter()
                .any(|(seen, seen_key, _)| Arc::ptr_eq(seen, &table) && seen_key == &key)
            {
                return Err(BackendError::validation(
                    "transaction request cannot include multiple operations on one item",
                ));
            }
            if holds {
                reasons.push(CancellationReason::none());
            } else {
                cancelled = true;
                reasons.push(CancellationReason::conditional_check_failed(CONDITION_FAILED));
            }
            plan.push((table, key, planned));
        }

        if cancelled {
            let codes: Vec<&str> = reasons
                .iter()
                .map(|reason| reason.code.as_deref().unwrap_or("None"))
                .collect();
            debug!(items = count, "transaction cancelled");
            return Err(backend_error!(
                TransactionCanceledException,
                format!(
                    "transaction cancelled, please refer cancellation reasons for specific \
                     reasons [{}]",
                    codes.join(", ")
                )
            )
            .with_cancellation_reasons(reasons));
        }

        for (table, key, planned) in plan {
            match planned {
                Planned::Put(item) => {
                    table.put(item)?;
                }
                Planned::Delete => {
                    table.delete(&key);
                }
            }
        }
        debug!(items = count, "transaction committed");
        Ok(TransactWriteItemsOutput::default())
    }

    /// Resolve one transaction item and evaluate its condition.
    fn plan_transact_item(
        &self,
        write: &TransactWriteItem,
    ) -> BackendResult<(Arc<TableStorage>, PrimaryKey, Planned, bool)> {
        match (&write.put, &write.update, &write.delete) {
            (Some(put), None, None) => {
                let table = self.require_table(&put.table_name)?;
                let key = table.key_of(&put.item)?;
                let holds = condition_holds(
                    put.condition_expression.as_deref(),
                    table.get(&key).as_ref(),
                    &put.expression_attribute_names,
                    &put.expression_attribute_values,
                )?;
                Ok((table, key, Planned::Put(put.item.clone()), holds))
            }
            (None, Some(update), None) => {
                let table = self.require_table(&update.table_name)?;
                let key = table.key_of(&update.key)?;
                let existing = table.get(&key);
                let holds = condition_holds(
                    update.condition_expression.as_deref(),
                    existing.as_ref(),
                    &update.expression_attribute_names,
                    &update.expression_attribute_values,
                )?;
                let updated = updated_item(
                    table.schema(),
                    &update.key,
                    existing.as_ref(),
                    Some(&update.update_expression),
                    &update.expression_attribute_names,
                    &update.expression_attribute_values,
                )?;
                Ok((table, key, Planned::Put(updated), holds))
            }
            (None, None, Some(delete)) => {
                let table = self.require_table(&delete.table_name)?;
                let key = table.key_of(&delete.key)?;
                let holds = condition_holds(
                    delete.condition_expression.as_deref(),
                    table.get(&key).as_ref(),
                    &delete.expression_attribute_names,
                    &delete.expression_attribute_values,
                )?;
                Ok((table, key, Planned::Delete, holds))
            }
            _ => Err(BackendError::validation(
                "a transaction item needs exactly one of a put, an update or a delete",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared evaluation helpers
// ---------------------------------------------------------------------------

/// Evaluate an optional condition against the stored item, or an empty one.
fn condition_holds(
    condition: Option<&str>,
    current: Option<&Item>,
    names: &ExpressionAttributeNames,
    values: &ExpressionAttributeValues,
) -> BackendResult<bool> {
    let Some(condition) = condition else {
        return Ok(true);
    };
    let expr = parse_condition(condition)?;
    let empty = Item::new();
    let ctx = EvalContext {
        item: current.unwrap_or(&empty),
        names,
        values,
    };
    Ok(ctx.evaluate(&expr)?)
}

/// Apply an update expression to the stored item, or to a fresh item made of
/// the key attributes. Key attributes must come out unchanged.
fn updated_item(
    schema: &KeySchema,
    key: &Item,
    existing: Option<&Item>,
    update_expression: Option<&str>,
    names: &ExpressionAttributeNames,
    values: &ExpressionAttributeValues,
) -> BackendResult<Item> {
    let base = existing.cloned().unwrap_or_else(|| key.clone());
    let Some(update_expression) = update_expression else {
        return Ok(base);
    };
    let update = parse_update(update_expression)?;
    let updated = EvalContext {
        item: &base,
        names,
        values,
    }
    .apply_update(&update)?;

    for attribute in [&schema.partition_key, &schema.sort_key] {
        if updated.get(attribute) != base.get(attribute) {
            return Err(StorageError::KeyAttributeUpdated {
                attribute: attribute.clone(),
            }
            .into());
        }
    }
    Ok(updated)
}

fn project(
    item: Item,
    projection: Option<&str>,
    names: &ExpressionAttributeNames,
) -> BackendResult<Item> {
    let Some(projection) = projection else {
        return Ok(item);
    };
    let paths = parse_projection(projection)?;
    let values = ExpressionAttributeValues::new();
    let ctx = EvalContext {
        item: &item,
        names,
        values: &values,
    };
    Ok(ctx.apply_projection(&paths)?)
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl Transport for MemoryStore {
    async fn get_item(&self, input: GetItemInput) -> BackendResult<GetItemOutput> {
        self.handle_get_item(&input)
    }

    async fn put_item(&self, input: PutItemInput) -> BackendResult<PutItemOutput> {
        self.handle_put_item(input)
    }

    async fn update_item(&self, input: UpdateItemInput) -> BackendResult<UpdateItemOutput> {
        self.handle_update_item(&input)
    }

    async fn delete_item(&self, input: DeleteItemInput) -> BackendResult<DeleteItemOutput> {
        self.handle_delete_item(&input)
    }

    async fn query(&self, input: QueryInput) -> BackendResult<QueryOutput> {
        self.handle_query(&input)
    }

    async fn batch_get_item(&self, input: BatchGetItemInput) -> BackendResult<BatchGetItemOutput> {
        self.handle_batch_get_item(&input)
    }

    async fn batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> BackendResult<BatchWriteItemOutput> {
        self.handle_batch_write_item(input)
    }

    async fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> BackendResult<TransactWriteItemsOutput> {
        self.handle_transact_write_items(&input)
    }
}
