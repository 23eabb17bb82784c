//! Cart vocabulary persisted through the client.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};
    use tablekit_cart::registry::{CartLandingSource, CartPhase, CartType, EntryPointType};
    use tablekit_cart::{EntryPoint, LandingSourceDetails};
    use tablekit_core::{GetItemParams, Key, StoreError};
    use tablekit_memory::MemoryStoreConfig;

    use crate::memory_client;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct CartSession {
        pk: String,
        sk: String,
        cart_type: CartType,
        phase: CartPhase,
        landing_source: CartLandingSource,
        #[serde(default)]
        entry_point_type: EntryPointType,
    }

    #[tokio::test]
    async fn test_should_round_trip_registry_values_through_store() {
        let (client, _) = memory_client("cart-session", MemoryStoreConfig::default());
        let session = CartSession {
            pk: "user#1".to_owned(),
            sk: "session".to_owned(),
            cart_type: CartType::Delivery,
            phase: CartPhase::Build,
            landing_source: CartLandingSource::IntercityMenu,
            entry_point_type: EntryPointType::Unspecified,
        };
        client.put_item(&session).await.unwrap();

        let key = Key::new("user#1", "session");
        let details = LandingSourceDetails::new(
            session.landing_source,
            vec![EntryPoint::new(EntryPointType::SearchLargeOrderBanner)],
        );
        for entry_point in details.entry_points() {
            entry_point.save(&client, key.clone()).await.unwrap();
        }

        let stored: CartSession = client.get_item(&GetItemParams::new(key)).await.unwrap();
        assert_eq!(stored.cart_type, CartType::Delivery);
        assert_eq!(stored.entry_point_type, EntryPointType::SearchLargeOrderBanner);
    }

    #[tokio::test]
    async fn test_should_fail_decoding_unknown_registry_value() {
        let (client, _) = memory_client("cart-unknown", MemoryStoreConfig::default());
        client
            .put_item(&raw_session("PICKUP"))
            .await
            .unwrap();

        let err = client
            .get_item::<CartSession>(&GetItemParams::new(Key::new("user#2", "session")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decoding(_)), "got {err:?}");
    }

    fn raw_session(cart_type: &str) -> HashMap<&'static str, String> {
        HashMap::from([
            ("pk", "user#2".to_owned()),
            ("sk", "session".to_owned()),
            ("cartType", cart_type.to_owned()),
            ("phase", "Build".to_owned()),
            ("landingSource", "Menu".to_owned()),
        ])
    }
}
