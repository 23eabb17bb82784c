//! Partition queries over the in-memory store.

#[cfg(test)]
mod tests {
    use tablekit_core::{Condition, ProjectionSpec, QueryParams, StoreError};
    use tablekit_memory::MemoryStoreConfig;

    use crate::{CartLine, memory_client};

    async fn seeded(prefix: &str) -> tablekit_core::StoreClient {
        let (client, _) = memory_client(prefix, MemoryStoreConfig::default());
        for line in [
            CartLine::new("cart#1", "item#3", 3),
            CartLine::new("cart#1", "item#1", 1),
            CartLine::new("cart#1", "offer#1", 0),
            CartLine::new("cart#1", "item#2", 2),
            CartLine::new("cart#2", "item#1", 7),
        ] {
            client.put_item(&line).await.unwrap();
        }
        client
    }

    #[tokio::test]
    async fn test_should_return_partition_in_sort_key_order() {
        let client = seeded("query-all").await;
        let result = client
            .query::<CartLine>(&QueryParams::partition("cart#1"))
            .await
            .unwrap();
        let sort_keys: Vec<_> = result.items.iter().map(|l| l.sk.as_str()).collect();
        assert_eq!(sort_keys, vec!["item#1", "item#2", "item#3", "offer#1"]);
        assert_eq!(result.count, 4);
    }

    #[tokio::test]
    async fn test_should_narrow_by_sort_key_prefix_and_filter() {
        let client = seeded("query-prefix").await;
        let params = QueryParams::partition("cart#1")
            .sort(Condition::begins_with("sk", "item#"))
            .filter(Condition::greater_than_equal("qty", 2_i64));
        let result = client.query::<CartLine>(&params).await.unwrap();
        assert_eq!(result.count, 2);
        assert!(result.items.iter().all(|l| l.qty >= 2));
    }

    #[tokio::test]
    async fn test_should_answer_empty_partition_with_no_rows() {
        let client = seeded("query-empty").await;
        let result = client
            .query::<CartLine>(&QueryParams::partition("cart#404"))
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.count, 0);
    }

    #[tokio::test]
    async fn test_should_project_query_rows() {
        let client = seeded("query-projection").await;
        let params = QueryParams {
            projection: ProjectionSpec::new(["sk"]),
            ..QueryParams::partition("cart#2")
        };
        let result = client.query_raw(&params).await.unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].len(), 1);
    }

    #[tokio::test]
    async fn test_should_reject_range_operator_on_sort_key() {
        let client = seeded("query-operator").await;
        let params =
            QueryParams::partition("cart#1").sort(Condition::greater_than_equal("sk", "item#2"));
        let err = client.query_raw(&params).await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedOperator { .. }));
    }
}
