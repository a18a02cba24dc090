//! Canonical keys over an ordered field list
//!
//! A key is a JSON object whose members follow the declared field order,
//! e.g. `{"name":"fib","os":"linux"}`. JSON string escaping keeps the
//! encoding injective, and decoding fills every declared field the key does
//! not carry with [`SENTINEL`], so `decode(encode(r))` is lossless.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::borrow::Cow;

use crate::error::{Error, Result};

/// Stand-in value for a field a record does not carry
pub const SENTINEL: &str = "-";

/// Anything that can be looked up by field name
pub trait Fields {
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Ordered field → value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldValues(Vec<(String, String)>);

impl FieldValues {
    /// Project `record` onto `fields`, sentinel-filling missing ones
    pub fn collect<R: Fields + ?Sized>(fields: &[String], record: &R) -> Self {
        Self(
            fields
                .iter()
                .map(|name| {
                    let value = record
                        .field(name)
                        .map_or_else(|| SENTINEL.to_string(), Cow::into_owned);
                    (name.clone(), value)
                })
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether `field` holds `value`
    pub fn matches(&self, field: &str, value: &str) -> bool {
        self.get(field) == Some(value)
    }

    /// Values that are not the sentinel, in field order
    pub fn present_values(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .map(|(_, value)| value)
            .filter(|value| *value != SENTINEL)
    }

    /// Serialized key form
    pub fn to_key(&self) -> String {
        let members: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| {
                format!("{}:{}", Value::from(name.as_str()), Value::from(value.as_str()))
            })
            .collect();
        format!("{{{}}}", members.join(","))
    }
}

impl Fields for FieldValues {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl Serialize for FieldValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Encodes and decodes keys for one ordered field list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    fields: Vec<String>,
}

impl KeyCodec {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values<R: Fields + ?Sized>(&self, record: &R) -> FieldValues {
        FieldValues::collect(&self.fields, record)
    }

    pub fn encode<R: Fields + ?Sized>(&self, record: &R) -> String {
        self.values(record).to_key()
    }

    /// Rebuild the mapping for every codec field from a key string
    pub fn decode(&self, key: &str) -> Result<FieldValues> {
        let object: serde_json::Map<String, Value> =
            serde_json::from_str(key).map_err(|e| Error::InvalidKey {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        let values = self
            .fields
            .iter()
            .map(|name| {
                let value = match object.get(name) {
                    None | Some(Value::Null) => SENTINEL.to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect();

        Ok(FieldValues(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BenchResult;
    use pretty_assertions::assert_eq;

    fn codec() -> KeyCodec {
        KeyCodec::new(["name", "os", "keySize"])
    }

    #[test]
    fn test_encode_follows_field_order() {
        let bench = BenchResult::new("sign", 1.0, "ns")
            .with_field("keySize", 512)
            .with_field("os", "linux");

        assert_eq!(
            codec().encode(&bench),
            r#"{"name":"sign","os":"linux","keySize":"512"}"#
        );
    }

    #[test]
    fn test_agreeing_records_share_a_key() {
        let a = BenchResult::new("sign", 1.0, "ns").with_field("os", "linux");
        let b = BenchResult::new("sign", 99.0, "ms")
            .with_field("os", "linux")
            .with_field("category", "unrelated");

        assert_eq!(codec().encode(&a), codec().encode(&b));
    }

    #[test]
    fn test_differing_records_get_distinct_keys() {
        let base = BenchResult::new("sign", 1.0, "ns").with_field("os", "linux");
        let other_os = BenchResult::new("sign", 1.0, "ns").with_field("os", "macos");
        let other_name = BenchResult::new("verify", 1.0, "ns").with_field("os", "linux");

        let codec = codec();
        assert_ne!(codec.encode(&base), codec.encode(&other_os));
        assert_ne!(codec.encode(&base), codec.encode(&other_name));
    }

    #[test]
    fn test_no_collision_across_field_boundaries() {
        // Plain concatenation would map both of these to "ab" + "c".
        let codec = KeyCodec::new(["a", "b"]);
        let left = BenchResult::new("x", 1.0, "ns")
            .with_field("a", "ab")
            .with_field("b", "c");
        let right = BenchResult::new("x", 1.0, "ns")
            .with_field("a", "a")
            .with_field("b", "bc");

        assert_ne!(codec.encode(&left), codec.encode(&right));
    }

    #[test]
    fn test_values_with_json_metacharacters_are_escaped() {
        let codec = KeyCodec::new(["a", "b"]);
        let tricky = BenchResult::new("x", 1.0, "ns")
            .with_field("a", r#"1","b":"2"#)
            .with_field("b", "3");
        let plain = BenchResult::new("x", 1.0, "ns")
            .with_field("a", "1")
            .with_field("b", "2");

        let key = codec.encode(&tricky);
        assert_ne!(key, codec.encode(&plain));
        assert_eq!(codec.decode(&key).unwrap(), codec.values(&tricky));
    }

    #[test]
    fn test_round_trip_fills_missing_fields() {
        let bench = BenchResult::new("sign", 1.0, "ns").with_field("os", "linux");
        let codec = codec();

        let decoded = codec.decode(&codec.encode(&bench)).unwrap();
        assert_eq!(decoded.get("name"), Some("sign"));
        assert_eq!(decoded.get("os"), Some("linux"));
        assert_eq!(decoded.get("keySize"), Some(SENTINEL));
        assert_eq!(decoded, codec.values(&bench));
    }

    #[test]
    fn test_decode_fills_fields_the_key_omits() {
        let decoded = codec().decode(r#"{"os":"linux","extra":"ignored"}"#).unwrap();
        assert_eq!(
            decoded.iter().collect::<Vec<_>>(),
            vec![("name", SENTINEL), ("os", "linux"), ("keySize", SENTINEL)]
        );
    }

    #[test]
    fn test_decode_rejects_malformed_keys() {
        assert!(matches!(
            codec().decode("linux|512"),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(codec().decode("[]"), Err(Error::InvalidKey { .. })));
    }

    #[test]
    fn test_serialize_keeps_field_order() {
        let values = KeyCodec::new(["os", "arch"]).decode(r#"{"arch":"x86","os":"linux"}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"{"os":"linux","arch":"x86"}"#
        );
        assert_eq!(values.present_values().collect::<Vec<_>>(), vec!["linux", "x86"]);
    }
}
