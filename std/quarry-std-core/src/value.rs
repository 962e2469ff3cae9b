//!
//! Host Values
//!
//! `Item` is the value type exchanged between the host and a module. Records
//! are insertion-ordered maps so that a row keeps the column order of the
//! statement that produced it.
//!
//! JSON conversion:
//! - `Binary` is rendered as standard base64 text
//! - non-finite doubles have no JSON form and become `null`
//! - JSON numbers that fit an `i64` become `Integer`, everything else `Double`
//!

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use serde_json::Value as Json;

/// Structured record: field name to value, in insertion order.
pub type Record = IndexMap<String, Item>;

/// Runtime kind of an `Item`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Null,
    Boolean,
    Integer,
    Double,
    String,
    Binary,
    Object,
    Array,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Null => "null",
            ItemKind::Boolean => "boolean",
            ItemKind::Integer => "integer",
            ItemKind::Double => "double",
            ItemKind::String => "string",
            ItemKind::Binary => "binary",
            ItemKind::Object => "object",
            ItemKind::Array => "array",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Object(Record),
    Array(Vec<Item>),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Null => ItemKind::Null,
            Item::Boolean(_) => ItemKind::Boolean,
            Item::Integer(_) => ItemKind::Integer,
            Item::Double(_) => ItemKind::Double,
            Item::String(_) => ItemKind::String,
            Item::Binary(_) => ItemKind::Binary,
            Item::Object(_) => ItemKind::Object,
            Item::Array(_) => ItemKind::Array,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Item::Object(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    pub fn to_json(&self) -> Json {
        match self {
            Item::Null => Json::Null,
            Item::Boolean(b) => Json::Bool(*b),
            Item::Integer(i) => Json::from(*i),
            Item::Double(d) => serde_json::Number::from_f64(*d)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Item::String(s) => Json::String(s.clone()),
            Item::Binary(b) => Json::String(BASE64.encode(b)),
            Item::Object(r) => record_to_json(r),
            Item::Array(items) => Json::Array(items.iter().map(Item::to_json).collect()),
        }
    }
}

pub fn record_to_json(record: &Record) -> Json {
    let map = record
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect::<serde_json::Map<_, _>>();
    Json::Object(map)
}

impl From<&Json> for Item {
    fn from(value: &Json) -> Self {
        match value {
            Json::Null => Item::Null,
            Json::Bool(b) => Item::Boolean(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Item::Integer(i),
                None => Item::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Item::String(s.clone()),
            Json::Array(items) => Item::Array(items.iter().map(Item::from).collect()),
            Json::Object(map) => Item::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Item::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Boolean(b)
    }
}

impl From<i64> for Item {
    fn from(i: i64) -> Self {
        Item::Integer(i)
    }
}

impl From<f64> for Item {
    fn from(d: f64) -> Self {
        Item::Double(d)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::String(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::String(s)
    }
}

impl From<Record> for Item {
    fn from(r: Record) -> Self {
        Item::Object(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_kinds() {
        assert_eq!(Item::Null.kind(), ItemKind::Null);
        assert_eq!(Item::from(true).kind(), ItemKind::Boolean);
        assert_eq!(Item::from(3_i64).kind(), ItemKind::Integer);
        assert_eq!(Item::from(1.5).kind(), ItemKind::Double);
        assert_eq!(Item::from("x").kind(), ItemKind::String);
        assert_eq!(Item::Binary(vec![1]).kind(), ItemKind::Binary);
        assert_eq!(ItemKind::Object.to_string(), "object");
    }

    #[test]
    fn test_json_numbers() {
        assert_eq!(Item::from(&json!(42)), Item::Integer(42));
        assert_eq!(Item::from(&json!(2.5)), Item::Double(2.5));
        assert_eq!(Item::from(&json!(null)), Item::Null);
    }

    #[test]
    fn test_json_object_keeps_fields() {
        let item = Item::from(&json!({"open-create": false, "open-read-only": true}));
        let record = item.as_record().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("open-create"), Some(&Item::Boolean(false)));
    }

    #[test]
    fn test_binary_renders_as_base64() {
        let item = Item::Binary(b"hi".to_vec());
        assert_eq!(item.to_json(), json!("aGk="));
    }

    #[test]
    fn test_record_preserves_column_order() {
        let mut record = Record::new();
        record.insert("z".to_string(), Item::Integer(1));
        record.insert("a".to_string(), Item::Null);
        let rendered = serde_json::to_string(&record_to_json(&record)).unwrap();
        assert!(rendered.find("\"z\"").unwrap() < rendered.find("\"a\"").unwrap());
    }

    #[test]
    fn test_non_finite_double_is_null() {
        assert_eq!(Item::Double(f64::INFINITY).to_json(), Json::Null);
    }
}
