//! Typed access to a partition/sort-key wide-column store.
//!
//! Callers describe reads and writes with parameter objects (keys, conditions,
//! update mutations, projections). The [`request`] layer renders them into
//! the store's expression language, [`StoreClient`] executes them through a
//! [`Transport`], and the [`codec`] turns stored attribute maps back into
//! typed records.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod batch;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod expression;
pub mod key;
pub mod request;
pub mod transport;

pub use client::{QueryResult, StoreClient};
pub use config::{ClientConfig, KeySchema};
pub use error::{StoreError, StoreResult, classify};
pub use expression::{Condition, ConditionList, Mutation, Operator, ProjectionSpec, UpdateSpec};
pub use key::Key;
pub use request::{
    BatchGetItemParams, DeleteItemParams, GetItemParams, QueryParams, RequestTranslator,
    TransactItem, UpdateItemParams,
};
pub use transport::{BackendResult, Transport};
