//! End-to-end scenarios for tablekit.
//!
//! Most scenarios run a [`StoreClient`] over the in-process [`MemoryStore`].
//! The `test_aws` scenarios need a DynamoDB-compatible endpoint at
//! `localhost:4566` (override with `TABLEKIT_ENDPOINT_URL`) and are marked
//! `#[ignore]`. Run them with:
//! ```text
//! cargo test -p tablekit-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use serde::{Deserialize, Serialize};
use tablekit_aws::{AwsTransportConfig, SdkTransport};
use tablekit_core::{ClientConfig, Key, KeySchema, StoreClient};
use tablekit_memory::{MemoryStore, MemoryStoreConfig};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for live scenarios.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("TABLEKIT_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// A client over a fresh in-memory table with the default key schema.
#[must_use]
pub fn memory_client(prefix: &str, config: MemoryStoreConfig) -> (StoreClient, Arc<MemoryStore>) {
    init_tracing();

    let table = test_table_name(prefix);
    let store = Arc::new(MemoryStore::new(config));
    store
        .create_table(&table, KeySchema::default())
        .unwrap_or_else(|e| panic!("failed to create table {table}: {e}"));
    let client = StoreClient::new(store.clone(), &ClientConfig::default().with_table(table));
    (client, store)
}

/// A client over the live endpoint for `table`.
pub async fn aws_client(table: &str) -> (StoreClient, SdkTransport) {
    init_tracing();

    let transport = SdkTransport::connect(&AwsTransportConfig::local(endpoint_url())).await;
    let client = StoreClient::new(
        Arc::new(transport.clone()),
        &ClientConfig::default().with_table(table),
    );
    (client, transport)
}

/// A cart line as the scenarios store it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Partition key.
    pub pk: String,
    /// Sort key.
    pub sk: String,
    /// Item quantity.
    #[serde(default)]
    pub qty: i64,
    /// Stamped by every update.
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<i64>,
}

impl CartLine {
    /// A line with quantity `qty`.
    #[must_use]
    pub fn new(pk: &str, sk: &str, qty: i64) -> Self {
        Self {
            pk: pk.to_owned(),
            sk: sk.to_owned(),
            qty,
            last_updated: None,
        }
    }

    /// The line's key.
    #[must_use]
    pub fn key(&self) -> Key {
        Key::new(&self.pk, &self.sk)
    }
}

mod test_aws;
mod test_batch;
mod test_cart;
mod test_query;
mod test_single_item;
mod test_transaction;
