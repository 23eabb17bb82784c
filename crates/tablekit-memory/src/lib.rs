//! An in-process store engine for tablekit.
//!
//! [`MemoryStore`] implements [`tablekit_core::Transport`] by parsing and
//! evaluating the same expressions a remote store would receive, over
//! partitioned in-memory tables. It backs unit and integration tests and
//! local development; batch capacities in [`MemoryStoreConfig`] simulate a
//! throttled backend.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod expression;
pub mod storage;
pub mod store;

pub use config::MemoryStoreConfig;
pub use error::{ExpressionError, StorageError};
pub use store::MemoryStore;
