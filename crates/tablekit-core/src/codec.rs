//! Record codec: typed records to attribute maps and back.
//!
//! Serialization is delegated to `serde_dynamo`; this module only converts
//! between its attribute values and [`AttributeValue`] at the edges. Numbers
//! become `N` with their exact textual form, strings `S`, booleans `BOOL`,
//! unit and `None` become `NULL`, sequences `L` and maps or structs `M`.
//! Byte buffers that serialize as bytes (e.g. `bytes::Bytes`) become `B`.
//! On the way back the set types decode to sequences, so `Vec<String>` reads
//! an `SS`.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_dynamo::AttributeValue as DynamoValue;
use tablekit_model::{AttributeValue, Item};

use crate::error::{StoreError, StoreResult};

/// Encode a record into an attribute map.
///
/// # Errors
///
/// Returns `Encoding` when serialization fails or the record is not
/// map-shaped (a bare string, number or list cannot be stored as an item).
pub fn encode<T: Serialize + ?Sized>(record: &T) -> StoreResult<Item> {
    let fields: HashMap<String, DynamoValue> =
        serde_dynamo::to_item(record).map_err(|e| StoreError::Encoding(e.to_string()))?;
    Ok(fields
        .into_iter()
        .map(|(name, value)| (name, from_dynamo(value)))
        .collect())
}

/// Encode a single value, e.g. a condition operand or an update value.
///
/// # Errors
///
/// Returns `Encoding` when serialization fails.
pub fn to_attribute_value<T: Serialize + ?Sized>(value: &T) -> StoreResult<AttributeValue> {
    serde_dynamo::to_attribute_value::<_, DynamoValue>(value)
        .map(from_dynamo)
        .map_err(|e| StoreError::Encoding(e.to_string()))
}

/// Decode an attribute map into a record.
///
/// # Errors
///
/// Returns `Decoding` when a number does not parse into the target type or
/// the map does not fit the shape of `T`.
pub fn decode<T: DeserializeOwned>(item: Item) -> StoreResult<T> {
    let fields: HashMap<String, DynamoValue> = item
        .into_iter()
        .map(|(name, value)| (name, into_dynamo(value)))
        .collect();
    serde_dynamo::from_item(fields).map_err(|e| StoreError::Decoding(e.to_string()))
}

/// Encode records element-wise, preserving order. Fails on the first error.
///
/// # Errors
///
/// Returns the first element's `Encoding` error; no partial result is kept.
pub fn encode_list<T: Serialize>(records: &[T]) -> StoreResult<Vec<Item>> {
    records.iter().map(encode).collect()
}

/// Decode items element-wise, preserving order. Fails on the first error.
///
/// # Errors
///
/// Returns the first element's `Decoding` error; no partial result is kept.
pub fn decode_list<T: DeserializeOwned>(items: Vec<Item>) -> StoreResult<Vec<T>> {
    items.into_iter().map(decode).collect()
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

fn from_dynamo(value: DynamoValue) -> AttributeValue {
    match value {
        DynamoValue::S(s) => AttributeValue::S(s),
        DynamoValue::N(n) => AttributeValue::N(n),
        DynamoValue::B(b) => AttributeValue::B(Bytes::from(b)),
        DynamoValue::Ss(strings) => AttributeValue::Ss(strings),
        DynamoValue::Ns(numbers) => AttributeValue::Ns(numbers),
        DynamoValue::Bs(blobs) => AttributeValue::Bs(blobs.into_iter().map(Bytes::from).collect()),
        DynamoValue::Bool(b) => AttributeValue::Bool(b),
        DynamoValue::Null(n) => AttributeValue::Null(n),
        DynamoValue::L(elements) => {
            AttributeValue::L(elements.into_iter().map(from_dynamo).collect())
        }
        DynamoValue::M(fields) => AttributeValue::M(
            fields
                .into_iter()
                .map(|(name, value)| (name, from_dynamo(value)))
                .collect(),
        ),
    }
}

fn into_dynamo(value: AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::S(s) => DynamoValue::S(s),
        AttributeValue::N(n) => DynamoValue::N(n),
        AttributeValue::B(b) => DynamoValue::B(b.to_vec()),
        AttributeValue::Ss(strings) => DynamoValue::Ss(strings),
        AttributeValue::Ns(numbers) => DynamoValue::Ns(numbers),
        AttributeValue::Bs(blobs) => DynamoValue::Bs(blobs.iter().map(|b| b.to_vec()).collect()),
        AttributeValue::Bool(b) => DynamoValue::Bool(b),
        AttributeValue::Null(n) => DynamoValue::Null(n),
        AttributeValue::L(elements) => {
            DynamoValue::L(elements.into_iter().map(into_dynamo).collect())
        }
        AttributeValue::M(fields) => DynamoValue::M(
            fields
                .into_iter()
                .map(|(name, value)| (name, into_dynamo(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Cart {
        pk: String,
        sk: String,
        item_count: u32,
        total: f64,
        coupon: Option<String>,
        tags: Vec<String>,
        meta: BTreeMap<String, bool>,
    }

    fn cart() -> Cart {
        Cart {
            pk: "user#1".to_owned(),
            sk: "cart".to_owned(),
            item_count: 3,
            total: 12.5,
            coupon: None,
            tags: vec!["veg".to_owned()],
            meta: BTreeMap::from([("express".to_owned(), true)]),
        }
    }

    #[test]
    fn test_should_encode_record_fields_by_type() {
        let item = encode(&cart()).unwrap();
        assert_eq!(item.get("pk"), Some(&AttributeValue::from("user#1")));
        assert_eq!(item.get("itemCount"), Some(&AttributeValue::number(3)));
        assert_eq!(item.get("total"), Some(&AttributeValue::N("12.5".to_owned())));
        assert_eq!(item.get("coupon"), Some(&AttributeValue::null()));
        assert_eq!(
            item.get("tags"),
            Some(&AttributeValue::L(vec![AttributeValue::from("veg")]))
        );
        assert!(matches!(item.get("meta"), Some(AttributeValue::M(m)) if m.len() == 1));
    }

    #[test]
    fn test_should_decode_encoded_record() {
        let decoded: Cart = decode(encode(&cart()).unwrap()).unwrap();
        assert_eq!(decoded, cart());
    }

    #[test]
    fn test_should_reject_non_map_record() {
        assert!(matches!(encode(&"just a string"), Err(StoreError::Encoding(_))));
        assert!(matches!(encode(&vec![1, 2]), Err(StoreError::Encoding(_))));
    }

    #[test]
    fn test_should_reject_non_string_map_keys() {
        let record = std::collections::HashMap::from([(vec![1_u8], 1)]);
        assert!(matches!(encode(&record), Err(StoreError::Encoding(_))));
    }

    #[test]
    fn test_should_report_shape_mismatch_as_decoding_error() {
        let item = Item::from([
            ("pk".to_owned(), AttributeValue::from(true)),
            ("sk".to_owned(), AttributeValue::from("cart")),
        ]);
        assert!(matches!(decode::<Cart>(item), Err(StoreError::Decoding(_))));
    }

    #[test]
    fn test_should_decode_sets_as_sequences_and_binary_as_bytes() {
        #[derive(Deserialize)]
        struct Sets {
            names: Vec<String>,
            scores: Vec<i64>,
            blob: Bytes,
        }

        let item = Item::from([
            (
                "names".to_owned(),
                AttributeValue::Ss(vec!["a".to_owned(), "b".to_owned()]),
            ),
            (
                "scores".to_owned(),
                AttributeValue::Ns(vec!["1".to_owned(), "-2".to_owned()]),
            ),
            (
                "blob".to_owned(),
                AttributeValue::B(bytes::Bytes::from_static(b"hi")),
            ),
        ]);
        let sets: Sets = decode(item).unwrap();
        assert_eq!(sets.names, ["a", "b"]);
        assert_eq!(sets.scores, [1, -2]);
        assert_eq!(sets.blob, Bytes::from_static(b"hi"));
    }

    #[test]
    fn test_should_keep_large_unsigned_numbers_exact() {
        #[derive(Deserialize)]
        struct Counter {
            value: u64,
        }

        let item = Item::from([("value".to_owned(), AttributeValue::number(u64::MAX))]);
        assert_eq!(decode::<Counter>(item).unwrap().value, u64::MAX);
    }

    #[test]
    fn test_should_reject_invalid_number() {
        #[derive(Debug, Deserialize)]
        struct Price {
            #[allow(dead_code)]
            n: f64,
        }

        let item = Item::from([("n".to_owned(), AttributeValue::N("1e".to_owned()))]);
        assert!(matches!(decode::<Price>(item), Err(StoreError::Decoding(_))));
    }

    #[test]
    fn test_should_encode_byte_fields_as_binary() {
        #[derive(Serialize)]
        struct Attachment {
            name: String,
            body: Bytes,
            parts: Vec<Bytes>,
        }

        let item = encode(&Attachment {
            name: "receipt".to_owned(),
            body: Bytes::from_static(&[0, 159, 255]),
            parts: vec![Bytes::from_static(b"a")],
        })
        .unwrap();
        assert_eq!(
            item.get("body"),
            Some(&AttributeValue::B(Bytes::from_static(&[0, 159, 255])))
        );
        assert_eq!(
            item.get("parts"),
            Some(&AttributeValue::L(vec![AttributeValue::B(Bytes::from_static(
                b"a"
            ))]))
        );
    }

    #[test]
    fn test_should_keep_high_precision_numbers_unchanged() {
        let raw = "0.10000000000000000001";
        let original = AttributeValue::M(HashMap::from([
            ("price".to_owned(), AttributeValue::N(raw.to_owned())),
            (
                "history".to_owned(),
                AttributeValue::Ns(vec![raw.to_owned(), "1e400".to_owned()]),
            ),
        ]));
        assert_eq!(from_dynamo(into_dynamo(original.clone())), original);
    }

    #[test]
    fn test_should_encode_extreme_integers_exactly() {
        #[derive(Serialize)]
        struct Bounds {
            low: i64,
            high: u64,
        }

        let item = encode(&Bounds {
            low: i64::MIN,
            high: u64::MAX,
        })
        .unwrap();
        assert_eq!(item.get("low"), Some(&AttributeValue::N(i64::MIN.to_string())));
        assert_eq!(item.get("high"), Some(&AttributeValue::N(u64::MAX.to_string())));
    }

    #[test]
    fn test_should_fail_list_decoding_atomically() {
        let good = encode(&cart()).unwrap();
        let bad = Item::from([("pk".to_owned(), AttributeValue::from(true))]);
        let result = decode_list::<Cart>(vec![good.clone(), bad, good]);
        assert!(matches!(result, Err(StoreError::Decoding(_))));
    }

    #[test]
    fn test_should_preserve_list_order() {
        let mut first = cart();
        first.sk = "a".to_owned();
        let mut second = cart();
        second.sk = "b".to_owned();
        let decoded: Vec<Cart> = decode_list(encode_list(&[first, second]).unwrap()).unwrap();
        assert_eq!(decoded[0].sk, "a");
        assert_eq!(decoded[1].sk, "b");
    }
}
