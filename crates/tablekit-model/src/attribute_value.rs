//! The `AttributeValue` union with its single-key JSON wire format.
//!
//! On the wire a value is an object with exactly one type key, e.g.
//! `{"S": "hello"}` or `{"N": "42"}`. Numbers stay string-encoded so no
//! precision is lost between the codec and the backend.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single attribute value as stored by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, kept in its decimal string form.
    N(String),
    /// Binary blob (base64 on the wire).
    B(bytes::Bytes),
    /// String set.
    Ss(Vec<String>),
    /// Number set.
    Ns(Vec<String>),
    /// Binary set.
    Bs(Vec<bytes::Bytes>),
    /// Boolean.
    Bool(bool),
    /// Null marker.
    Null(bool),
    /// Ordered list.
    L(Vec<AttributeValue>),
    /// Nested map.
    M(HashMap<String, AttributeValue>),
}

const TYPE_KEYS: &[&str] = &["S", "N", "B", "SS", "NS", "BS", "BOOL", "NULL", "L", "M"];

impl AttributeValue {
    /// Build a number value from anything that renders as a decimal.
    #[must_use]
    pub fn number(value: impl fmt::Display) -> Self {
        Self::N(value.to_string())
    }

    /// The null value.
    #[must_use]
    pub fn null() -> Self {
        Self::Null(true)
    }

    /// Returns the string if this is an `S` value.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the decimal string if this is an `N` value.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `BOOL` value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is an `L` value.
    #[must_use]
    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::L(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the entries if this is an `M` value.
    #[must_use]
    pub fn as_m(&self) -> Option<&HashMap<String, AttributeValue>> {
        match self {
            Self::M(m) => Some(m),
            _ => None,
        }
    }

    /// Returns `true` for `NULL: true`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(true))
    }

    /// The wire type key of this value (`"S"`, `"N"`, `"BOOL"`, ...).
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }
}

impl Eq for AttributeValue {}

impl std::hash::Hash for AttributeValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::S(s) | Self::N(s) => s.hash(state),
            Self::B(b) => b.hash(state),
            Self::Bool(b) | Self::Null(b) => b.hash(state),
            Self::Ss(v) | Self::Ns(v) => v.hash(state),
            Self::Bs(v) => v.iter().for_each(|b| b.hash(state)),
            Self::L(v) => v.hash(state),
            Self::M(m) => {
                // HashMap iteration order is unstable.
                let mut entries: Vec<_> = m.iter().collect();
                entries.sort_by_key(|(k, _)| *k);
                for (k, v) in entries {
                    k.hash(state);
                    v.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) => write!(f, "S({s})"),
            Self::N(n) => write!(f, "N({n})"),
            Self::B(b) => write!(f, "B({} bytes)", b.len()),
            Self::Ss(v) => write!(f, "SS({v:?})"),
            Self::Ns(v) => write!(f, "NS({v:?})"),
            Self::Bs(v) => write!(f, "BS({} items)", v.len()),
            Self::Bool(b) => write!(f, "BOOL({b})"),
            Self::Null(b) => write!(f, "NULL({b})"),
            Self::L(v) => write!(f, "L({} items)", v.len()),
            Self::M(m) => write!(f, "M({} keys)", m.len()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::number(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::number(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        Self::L(value)
    }
}

impl From<HashMap<String, AttributeValue>> for AttributeValue {
    fn from(value: HashMap<String, AttributeValue>) -> Self {
        Self::M(value)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let key = self.type_descriptor();
        match self {
            Self::S(s) | Self::N(s) => map.serialize_entry(key, s)?,
            Self::B(b) => map.serialize_entry(key, &BASE64.encode(b))?,
            Self::Ss(v) | Self::Ns(v) => map.serialize_entry(key, v)?,
            Self::Bs(v) => {
                let encoded: Vec<String> = v.iter().map(|b| BASE64.encode(b)).collect();
                map.serialize_entry(key, &encoded)?;
            }
            Self::Bool(b) | Self::Null(b) => map.serialize_entry(key, b)?,
            Self::L(list) => map.serialize_entry(key, list)?,
            Self::M(m) => map.serialize_entry(key, m)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TaggedValueVisitor)
    }
}

struct TaggedValueVisitor;

fn decode_blob<E: de::Error>(encoded: &str) -> Result<bytes::Bytes, E> {
    BASE64
        .decode(encoded)
        .map(bytes::Bytes::from)
        .map_err(E::custom)
}

impl<'de> Visitor<'de> for TaggedValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object with exactly one attribute type key")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let Some(key) = map.next_key::<String>()? else {
            return Err(de::Error::custom("attribute value has no type key"));
        };

        let value = match key.as_str() {
            "S" => AttributeValue::S(map.next_value()?),
            "N" => AttributeValue::N(map.next_value()?),
            "B" => AttributeValue::B(decode_blob(&map.next_value::<String>()?)?),
            "SS" => AttributeValue::Ss(map.next_value()?),
            "NS" => AttributeValue::Ns(map.next_value()?),
            "BS" => {
                let encoded: Vec<String> = map.next_value()?;
                let blobs = encoded
                    .iter()
                    .map(|e| decode_blob(e))
                    .collect::<Result<Vec<_>, M::Error>>()?;
                AttributeValue::Bs(blobs)
            }
            "BOOL" => AttributeValue::Bool(map.next_value()?),
            "NULL" => AttributeValue::Null(map.next_value()?),
            "L" => AttributeValue::L(map.next_value()?),
            "M" => AttributeValue::M(map.next_value()?),
            other => return Err(de::Error::unknown_field(other, TYPE_KEYS)),
        };

        if map.next_key::<String>()?.is_some() {
            return Err(de::Error::custom(
                "attribute value must have exactly one type key",
            ));
        }

        Ok(value)
    }
}
