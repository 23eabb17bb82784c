//! Scenarios against a live DynamoDB-compatible endpoint.

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
    };
    use tablekit_aws::SdkTransport;
    use tablekit_core::{
        BatchGetItemParams, Key, QueryParams, TransactItem, UpdateItemParams, UpdateSpec,
    };

    use crate::{CartLine, aws_client, test_table_name};

    async fn create_table(transport: &SdkTransport, table: &str) -> anyhow::Result<()> {
        let mut request = transport
            .client()
            .create_table()
            .table_name(table)
            .billing_mode(BillingMode::PayPerRequest);
        for (name, key_type) in [("pk", KeyType::Hash), ("sk", KeyType::Range)] {
            request = request
                .key_schema(
                    KeySchemaElement::builder()
                        .attribute_name(name)
                        .key_type(key_type)
                        .build()?,
                )
                .attribute_definitions(
                    AttributeDefinition::builder()
                        .attribute_name(name)
                        .attribute_type(ScalarAttributeType::S)
                        .build()?,
                );
        }
        request.send().await?;
        Ok(())
    }

    async fn drop_table(transport: &SdkTransport, table: &str) {
        let _ = transport.client().delete_table().table_name(table).send().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_enforce_conditional_put_on_live_endpoint() -> anyhow::Result<()> {
        let table = test_table_name("aws-put");
        let (client, transport) = aws_client(&table).await;
        create_table(&transport, &table).await?;

        client.put_item(&CartLine::new("cart#1", "item#1", 1)).await?;
        let err = client
            .put_item(&CartLine::new("cart#1", "item#1", 2))
            .await
            .unwrap_err();
        assert!(err.is_conditional_check_failed(), "got {err:?}");

        drop_table(&transport, &table).await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_increment_and_query_on_live_endpoint() -> anyhow::Result<()> {
        let table = test_table_name("aws-incr");
        let (client, transport) = aws_client(&table).await;
        create_table(&transport, &table).await?;

        let params = UpdateItemParams::new(
            Key::new("cart#1", "summary"),
            UpdateSpec::new().increment("qty"),
        );
        client.update_item_raw(&params).await?;
        let line: CartLine = client.update_item(&params).await?;
        assert_eq!(line.qty, 2);
        assert!(line.last_updated.is_some());

        let empty = client
            .query::<CartLine>(&QueryParams::partition("cart#404"))
            .await?;
        assert_eq!(empty.count, 0);

        let read: Vec<CartLine> = client
            .batch_get_item(&BatchGetItemParams::new(vec![Key::new("cart#1", "summary")]))
            .await?;
        assert_eq!(read.len(), 1);

        drop_table(&transport, &table).await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_roll_back_transaction_on_live_endpoint() -> anyhow::Result<()> {
        let table = test_table_name("aws-tx");
        let (client, transport) = aws_client(&table).await;
        create_table(&transport, &table).await?;

        client.put_item(&CartLine::new("cart#1", "taken", 1)).await?;
        let err = client
            .transact_write_items(&[
                TransactItem::Update(UpdateItemParams::new(
                    Key::new("cart#1", "counter"),
                    UpdateSpec::new().increment("qty"),
                )),
                TransactItem::put(&CartLine::new("cart#1", "taken", 2))?,
            ])
            .await
            .unwrap_err();
        assert!(err.is_conditional_check_failed(), "got {err:?}");

        let all = client
            .query::<CartLine>(&QueryParams::partition("cart#1"))
            .await?;
        assert_eq!(all.count, 1);

        drop_table(&transport, &table).await;
        Ok(())
    }
}
