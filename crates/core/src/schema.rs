//! Schema and GroupBy field lists

use serde::Serialize;

use crate::key::KeyCodec;

/// Ordered classification fields of a suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema(Vec<String>);

impl Schema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }

    /// Fields identifying a trace: the schema, led by `name` when undeclared
    pub fn trace_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.0.len() + 1);
        if !self.contains("name") {
            fields.push("name".to_string());
        }
        fields.extend(self.0.iter().cloned());
        fields
    }

    pub fn trace_codec(&self) -> KeyCodec {
        KeyCodec::new(self.trace_fields())
    }
}

/// Ordered fields along which a suite is split into charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupBy(Vec<String>);

impl GroupBy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }

    /// Fields the schema cannot supply
    pub fn uncovered<'a>(&'a self, schema: &'a Schema) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .map(String::as_str)
            .filter(move |field| *field != "name" && !schema.contains(field))
    }

    pub fn codec(&self) -> KeyCodec {
        KeyCodec::new(self.0.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_fields_lead_with_name() {
        let schema = Schema::new(["os", "keySize"]);
        assert_eq!(schema.trace_fields(), vec!["name", "os", "keySize"]);

        let schema = Schema::new(["os", "name"]);
        assert_eq!(schema.trace_fields(), vec!["os", "name"]);
    }

    #[test]
    fn test_uncovered_group_by_fields() {
        let schema = Schema::new(["name", "os"]);
        let group_by = GroupBy::new(["os", "arch", "name"]);
        assert_eq!(group_by.uncovered(&schema).collect::<Vec<_>>(), vec!["arch"]);
    }
}
