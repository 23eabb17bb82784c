//! Single-item scenarios over the in-memory store.

#[cfg(test)]
mod tests {
    use tablekit_core::{
        Condition, DeleteItemParams, GetItemParams, Key, ProjectionSpec, StoreError,
        UpdateItemParams, UpdateSpec,
    };
    use tablekit_memory::MemoryStoreConfig;

    use crate::{CartLine, memory_client};

    #[tokio::test]
    async fn test_should_reject_second_put_of_same_key() {
        let (client, _) = memory_client("put", MemoryStoreConfig::default());
        let line = CartLine::new("cart#1", "item#1", 1);

        client.put_item(&line).await.unwrap();
        let err = client
            .put_item(&CartLine::new("cart#1", "item#1", 5))
            .await
            .unwrap_err();
        assert!(err.is_conditional_check_failed(), "got {err:?}");

        let stored: CartLine = client.get_item(&GetItemParams::new(line.key())).await.unwrap();
        assert_eq!(stored.qty, 1);
    }

    #[tokio::test]
    async fn test_should_return_default_for_missing_key() {
        let (client, _) = memory_client("missing", MemoryStoreConfig::default());
        let line: CartLine = client
            .get_item(&GetItemParams::new(Key::new("cart#1", "nope")))
            .await
            .unwrap();
        assert_eq!(line, CartLine::default());
    }

    #[tokio::test]
    async fn test_should_increment_from_zero_and_stamp_last_updated() {
        let (client, _) = memory_client("incr", MemoryStoreConfig::default());
        let params = UpdateItemParams::new(
            Key::new("cart#1", "item#1"),
            UpdateSpec::new().increment("qty"),
        );

        client.update_item::<CartLine>(&params).await.unwrap();
        let line: CartLine = client.update_item(&params).await.unwrap();
        assert_eq!(line.qty, 2);
        assert!(line.last_updated.is_some_and(|ts| ts > 0));
    }

    #[tokio::test]
    async fn test_should_apply_update_only_when_condition_holds() {
        let (client, _) = memory_client("cond", MemoryStoreConfig::default());
        client
            .put_item(&CartLine::new("cart#1", "item#1", 3))
            .await
            .unwrap();

        let stale = UpdateItemParams::new(
            Key::new("cart#1", "item#1"),
            UpdateSpec::new().set("qty", 10_i64),
        )
        .when(Condition::equal("qty", 2_i64));
        let err = client.update_item_raw(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::ConditionalCheckFailed { .. }));

        let fresh = UpdateItemParams::new(
            Key::new("cart#1", "item#1"),
            UpdateSpec::new().set("qty", 10_i64),
        )
        .when(Condition::greater_than_equal("qty", 3_i64));
        let line: CartLine = client.update_item(&fresh).await.unwrap();
        assert_eq!(line.qty, 10);
    }

    #[tokio::test]
    async fn test_should_remove_and_append_fields() {
        let (client, _) = memory_client("mutations", MemoryStoreConfig::default());
        let key = Key::new("cart#1", "meta");
        client
            .update_item_raw(&UpdateItemParams::new(
                key.clone(),
                UpdateSpec::new().set("note", "gift").append("tags", "veg"),
            ))
            .await
            .unwrap();
        let item = client
            .update_item_raw(&UpdateItemParams::new(
                key,
                UpdateSpec::new().remove("note").append("tags", "spicy"),
            ))
            .await
            .unwrap();

        assert!(!item.contains_key("note"));
        let tags = item.get("tags").and_then(|v| v.as_l()).unwrap();
        assert_eq!(tags.len(), 2);
    }

    #[tokio::test]
    async fn test_should_project_requested_fields_only() {
        let (client, _) = memory_client("projection", MemoryStoreConfig::default());
        let line = CartLine::new("cart#1", "item#1", 4);
        client.put_item(&line).await.unwrap();

        let params = GetItemParams {
            projection: ProjectionSpec::new(["qty"]),
            ..GetItemParams::new(line.key())
        };
        let item = client.get_item_raw(&params).await.unwrap();
        assert_eq!(item.len(), 1);
        assert!(item.contains_key("qty"));
    }

    #[tokio::test]
    async fn test_should_delete_and_tolerate_missing_key() {
        let (client, store) = memory_client("delete", MemoryStoreConfig::default());
        let line = CartLine::new("cart#1", "item#1", 1);
        client.put_item(&line).await.unwrap();

        let params = DeleteItemParams { key: line.key() };
        client.delete_item(&params).await.unwrap();
        client.delete_item(&params).await.unwrap();
        assert_eq!(store.item_count(client.table_name()), Some(0));
    }

    #[tokio::test]
    async fn test_should_reject_incomplete_delete_key_before_calling() {
        let (client, _) = memory_client("delete-key", MemoryStoreConfig::default());
        let err = client
            .delete_item(&DeleteItemParams {
                key: Key::new("cart#1", ""),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Encoding(_)));
    }
}
