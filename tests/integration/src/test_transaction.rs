//! Transactions over the in-memory store.

#[cfg(test)]
mod tests {
    use tablekit_core::{
        Condition, GetItemParams, Key, StoreError, TransactItem, UpdateItemParams, UpdateSpec,
    };
    use tablekit_memory::MemoryStoreConfig;

    use crate::{CartLine, memory_client};

    #[tokio::test]
    async fn test_should_commit_every_write_together() {
        let (client, store) = memory_client("tx-commit", MemoryStoreConfig::default());
        client.put_item(&CartLine::new("cart#1", "old", 1)).await.unwrap();

        client
            .transact_write_items(&[
                TransactItem::put(&CartLine::new("cart#1", "new", 2)).unwrap(),
                TransactItem::Update(UpdateItemParams::new(
                    Key::new("cart#1", "summary"),
                    UpdateSpec::new().increment("qty"),
                )),
                TransactItem::Delete(Key::new("cart#1", "old")),
            ])
            .await
            .unwrap();

        assert_eq!(store.item_count(client.table_name()), Some(2));
        let summary: CartLine = client
            .get_item(&GetItemParams::new(Key::new("cart#1", "summary")))
            .await
            .unwrap();
        assert_eq!(summary.qty, 1);
        assert!(summary.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_should_roll_back_when_any_put_collides() {
        let (client, _) = memory_client("tx-rollback", MemoryStoreConfig::default());
        client.put_item(&CartLine::new("cart#1", "taken", 1)).await.unwrap();

        let err = client
            .transact_write_items(&[
                TransactItem::Update(UpdateItemParams::new(
                    Key::new("cart#1", "counter"),
                    UpdateSpec::new().increment("qty"),
                )),
                TransactItem::put(&CartLine::new("cart#1", "taken", 5)).unwrap(),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionalCheckFailed { .. }), "got {err:?}");

        let counter: CartLine = client
            .get_item(&GetItemParams::new(Key::new("cart#1", "counter")))
            .await
            .unwrap();
        assert_eq!(counter, CartLine::default());
        let taken: CartLine = client
            .get_item(&GetItemParams::new(Key::new("cart#1", "taken")))
            .await
            .unwrap();
        assert_eq!(taken.qty, 1);
    }

    #[tokio::test]
    async fn test_should_hide_put_when_update_condition_reads_absent_field() {
        let (client, store) = memory_client("tx-absent", MemoryStoreConfig::default());

        let err = client
            .transact_write_items(&[
                TransactItem::put(&CartLine::new("cart#1", "meta", 1)).unwrap(),
                TransactItem::Update(
                    UpdateItemParams::new(
                        Key::new("cart#1", "summary"),
                        UpdateSpec::new().increment("itemCount"),
                    )
                    .when(Condition::equal("status", "open")),
                ),
            ])
            .await
            .unwrap_err();
        assert!(err.is_conditional_check_failed(), "got {err:?}");
        assert_eq!(store.item_count(client.table_name()), Some(0));
    }

    #[tokio::test]
    async fn test_should_reject_incomplete_delete_key_in_transaction() {
        let (client, store) = memory_client("tx-key", MemoryStoreConfig::default());
        let err = client
            .transact_write_items(&[
                TransactItem::put(&CartLine::new("cart#1", "a", 1)).unwrap(),
                TransactItem::Delete(Key::new("", "a")),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Encoding(_)));
        assert_eq!(store.item_count(client.table_name()), Some(0));
    }
}
