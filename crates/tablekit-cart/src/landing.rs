//! Where a cart session started.

use tablekit_core::{Key, StoreClient, StoreResult, UpdateItemParams, UpdateSpec};
use tracing::debug;

use crate::registry::{CartLandingSource, EntryPointType};

/// Attribute the entry-point cache write stores the entry point under.
pub const ENTRY_POINT_ATTRIBUTE: &str = "entryPointType";

/// Landing source of a cart and the entry points that led to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingSourceDetails {
    landing_source: CartLandingSource,
    entry_points: Vec<EntryPoint>,
}

impl LandingSourceDetails {
    /// Details with an unspecified landing source and no entry points.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Details for a known landing source.
    #[must_use]
    pub fn new(landing_source: CartLandingSource, entry_points: Vec<EntryPoint>) -> Self {
        Self {
            landing_source,
            entry_points,
        }
    }

    /// `true` when the landing source is unspecified, whatever the entry
    /// points are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landing_source == CartLandingSource::Unspecified
    }

    /// The landing source.
    #[must_use]
    pub fn landing_source(&self) -> CartLandingSource {
        self.landing_source
    }

    /// Entry points, in the order they were recorded.
    #[must_use]
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// The landing source of optional details, unspecified when absent.
    #[must_use]
    pub fn landing_source_of(details: Option<&Self>) -> CartLandingSource {
        details.map_or(CartLandingSource::Unspecified, Self::landing_source)
    }
}

/// One entry point into the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    entry_point_type: EntryPointType,
}

impl EntryPoint {
    /// An unspecified entry point.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An entry point of the given type.
    #[must_use]
    pub fn new(entry_point_type: EntryPointType) -> Self {
        Self { entry_point_type }
    }

    /// The entry point's type.
    #[must_use]
    pub fn entry_point_type(&self) -> EntryPointType {
        self.entry_point_type
    }

    /// `true` for an unspecified entry point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_point_type == EntryPointType::Unspecified
    }

    /// Record this entry point on the cache record identified by `key`.
    ///
    /// An unspecified entry point writes nothing. Other attributes of the
    /// record are left untouched.
    ///
    /// # Errors
    ///
    /// Propagates the client's error for the underlying update.
    pub async fn save(&self, client: &StoreClient, key: Key) -> StoreResult<()> {
        if self.is_empty() {
            debug!(
                partition_key = %key.partition_key,
                "entry point unspecified, skipping cache write"
            );
            return Ok(());
        }

        let update =
            UpdateSpec::new().set(ENTRY_POINT_ATTRIBUTE, self.entry_point_type.as_str());
        client
            .update_item_raw(&UpdateItemParams::new(key, update))
            .await?;
        debug!(entry_point = %self.entry_point_type, "entry point cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tablekit_core::{ClientConfig, GetItemParams, KeySchema};
    use tablekit_memory::{MemoryStore, MemoryStoreConfig};

    use super::*;

    fn memory_client() -> (StoreClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
        store.create_table("carts", KeySchema::default()).unwrap();
        let config = ClientConfig::default().with_table("carts");
        (StoreClient::new(store.clone(), &config), store)
    }

    #[test]
    fn test_should_treat_unspecified_source_as_empty() {
        assert!(LandingSourceDetails::empty().is_empty());
        let details = LandingSourceDetails::new(
            CartLandingSource::Express,
            vec![EntryPoint::new(EntryPointType::SearchLargeOrderBanner)],
        );
        assert!(!details.is_empty());
        assert_eq!(details.entry_points().len(), 1);
        assert_eq!(
            LandingSourceDetails::landing_source_of(None),
            CartLandingSource::Unspecified
        );
        assert_eq!(
            LandingSourceDetails::landing_source_of(Some(&details)),
            CartLandingSource::Express
        );
    }

    #[test]
    fn test_should_clone_entry_points_independently() {
        let original = LandingSourceDetails::new(
            CartLandingSource::Menu,
            vec![EntryPoint::new(EntryPointType::SearchLargeOrderBanner)],
        );
        let mut copy = original.clone();
        copy.entry_points.clear();
        assert_eq!(original.entry_points().len(), 1);
    }

    #[tokio::test]
    async fn test_should_cache_entry_point_on_record() {
        let (client, _) = memory_client();
        let key = Key::new("user#1", "landing");
        EntryPoint::new(EntryPointType::SearchLargeOrderBanner)
            .save(&client, key.clone())
            .await
            .unwrap();

        let item = client.get_item_raw(&GetItemParams::new(key)).await.unwrap();
        assert_eq!(
            item.get(ENTRY_POINT_ATTRIBUTE).and_then(|v| v.as_s()),
            Some("searchLargeOrderBanner")
        );
    }

    #[tokio::test]
    async fn test_should_skip_write_for_empty_entry_point() {
        let (client, store) = memory_client();
        EntryPoint::empty()
            .save(&client, Key::new("user#1", "landing"))
            .await
            .unwrap();
        assert_eq!(store.item_count("carts"), Some(0));
    }
}
