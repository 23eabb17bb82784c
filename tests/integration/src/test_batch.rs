//! Batch reads and writes over the in-memory store.

#[cfg(test)]
mod tests {
    use tablekit_core::{BatchGetItemParams, Key, QueryParams, StoreError};
    use tablekit_memory::MemoryStoreConfig;

    use crate::{CartLine, memory_client};

    fn lines(count: i64) -> Vec<CartLine> {
        (1..=count)
            .map(|n| CartLine::new("cart#1", &format!("item#{n}"), n))
            .collect()
    }

    #[tokio::test]
    async fn test_should_read_every_key_in_one_batch() {
        let (client, _) = memory_client("batch-get", MemoryStoreConfig::default());
        let written = lines(3);
        assert!(client.batch_put_item(&written).await.unwrap().is_empty());

        let keys = written.iter().map(CartLine::key).collect();
        let mut read: Vec<CartLine> = client
            .batch_get_item(&BatchGetItemParams::new(keys))
            .await
            .unwrap();
        read.sort_by(|a, b| a.sk.cmp(&b.sk));
        assert_eq!(read, written);
    }

    #[tokio::test]
    async fn test_should_fail_whole_read_when_keys_left_unprocessed() {
        let (client, _) = memory_client(
            "batch-partial",
            MemoryStoreConfig::default().with_batch_get_capacity(2),
        );
        client.batch_put_item(&lines(3)).await.unwrap();

        let keys = vec![
            Key::new("cart#1", "item#1"),
            Key::new("cart#1", "item#2"),
            Key::new("cart#1", "item#3"),
        ];
        let err = client
            .batch_get_item::<CartLine>(&BatchGetItemParams::new(keys))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        let StoreError::PartialBatchFailure { unprocessed_keys } = err else {
            panic!("expected partial batch failure, got {err:?}");
        };
        assert_eq!(unprocessed_keys, vec![Key::new("cart#1", "item#3")]);
    }

    #[tokio::test]
    async fn test_should_hand_back_unprocessed_writes_for_retry() {
        let (client, store) = memory_client(
            "batch-write",
            MemoryStoreConfig::default().with_batch_write_capacity(2),
        );
        let written = lines(5);

        let mut pending = client.batch_put_item(&written).await.unwrap();
        assert_eq!(pending.len(), 3);
        let mut rounds = 1;
        while !pending.is_empty() {
            pending = client.batch_put_item(&pending).await.unwrap();
            rounds += 1;
        }
        assert_eq!(rounds, 3);
        assert_eq!(store.item_count(client.table_name()), Some(5));

        let all = client
            .query::<CartLine>(&QueryParams::partition("cart#1"))
            .await
            .unwrap();
        assert_eq!(all.count, 5);
    }

    #[tokio::test]
    async fn test_should_overwrite_existing_items_in_batch_put() {
        let (client, _) = memory_client("batch-overwrite", MemoryStoreConfig::default());
        client.put_item(&CartLine::new("cart#1", "item#1", 1)).await.unwrap();
        client
            .batch_put_item(&[CartLine::new("cart#1", "item#1", 9)])
            .await
            .unwrap();

        let read: Vec<CartLine> = client
            .batch_get_item(&BatchGetItemParams::new(vec![Key::new("cart#1", "item#1")]))
            .await
            .unwrap();
        assert_eq!(read[0].qty, 9);
    }
}
