//! value representation
//!
//! The document model a schema overlays. Value types:
//! - null (an absent key reads as null, see [crate::view])
//! - boolean (true/false)
//! - integer (signed, currently: i64 - may change)
//! - decimal (currently: f64 - may change)
//! - string (utf-8)
//! - array ("list" of values)
//! - document (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Schemas never declare arrays, but a stored document may carry them in
//! undeclared keys and those must survive a sync untouched, so the model keeps
//! them representable.
use serde::{
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, SerializeSeq},
    Deserializer, Serializer,
};

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Borrow the nested document, if this value is one
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type name for log and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Document(_) => "document",
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

/// An ordered mapping from string keys to [Value]s
///
/// This is the on-the-wire shape of a host attribute. Key order is preserved
/// through read, merge and write-back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document(indexmap::IndexMap<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or overwrite `key`, keeping its position when it already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Document(value) => value.serialize(serializer),
        }
    }
}

impl serde::ser::Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(Some(self.0.len()))?;
        for (element_key, element_value) in &self.0 {
            ser.serialize_entry(element_key, element_value)?;
        }
        ser.end()
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("any document value")
    }

    fn visit_unit<E>(self) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }

    fn visit_bool<E>(self, value: bool) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Boolean(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Value, E>
    where
        E: de::Error,
    {
        // integers beyond i64 degrade to decimal rather than failing the read
        Ok(i64::try_from(value)
            .map(Value::Integer)
            .unwrap_or(Value::Decimal(value as f64)))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Decimal(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(value.to_owned()))
    }

    fn visit_string<E>(self, value: String) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut elements = Vec::new();
        while let Some(element) = seq.next_element::<Value>()? {
            elements.push(element);
        }
        Ok(Value::Array(elements))
    }

    fn visit_map<A>(self, map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        DocumentVisitor.visit_map(map).map(Value::Document)
    }
}

impl<'de> serde::de::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a string-keyed mapping")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Document, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut document = Document::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            document.insert(key, value);
        }
        Ok(document)
    }
}

impl<'de> serde::de::Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Utility macro to create [Document]s
///
/// ```
/// # use veneer::document;
/// let song = document! {
///     "title" => "Corduroy",
///     "band" => document! { "name" => "Pearl Jam" },
/// };
///
/// assert_eq!(song.keys().count(), 2);
/// ```
#[macro_export]
macro_rules! document {
    {} => {
        $crate::document::Document::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {{
        let mut document = $crate::document::Document::new();
        $(
            document.insert($key, $value);
        )+
        document
    }};
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_order_is_preserved() {
        let document = document! {
            "zulu" => 1,
            "alpha" => 2,
            "mike" => 3,
        };

        let keys: Vec<_> = document.keys().collect();
        assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn overwriting_keeps_the_position() {
        let mut document = document! { "first" => 1, "second" => 2 };
        document.insert("first", "changed");

        let keys: Vec<_> = document.keys().collect();
        assert_eq!(keys, vec!["first", "second"]);
        assert_eq!(document.get("first"), Some(&Value::String("changed".into())));
    }

    #[test]
    fn json_round_trip() {
        let raw = r#"{"title":"Corduroy","count":3,"live":true,"tags":["a","b"],"band":{"name":"Pearl Jam"},"gone":null}"#;

        let parsed: Value = serde_json::from_str(raw).unwrap();
        let Value::Document(document) = &parsed else {
            panic!("expected a document");
        };

        assert_eq!(document.get("count"), Some(&Value::Integer(3)));
        assert_eq!(document.get("gone"), Some(&Value::Null));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
    }

    #[test]
    fn yaml_null_reads_as_null() {
        let parsed: Value = serde_yaml::from_str("title: ~\nband:\n  name: Low\n").unwrap();

        let document = parsed.as_document().unwrap();
        assert_eq!(document.get("title"), Some(&Value::Null));
        assert_eq!(
            document.get("band").unwrap().as_document().unwrap().get("name"),
            Some(&Value::String("Low".into()))
        );
    }

    #[test]
    fn oversized_integers_degrade_to_decimal() {
        let parsed: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert!(matches!(parsed, Value::Decimal(_)));
    }
}
