//! Data structures for the persisted benchmark history
//!
//! The document layout follows the `benchmark-data.json` files written by the
//! benchmark action: camelCase keys, epoch-millisecond timestamps and one
//! ordered list of runs per suite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::key::Fields;

/// A single measured benchmark within a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchResult {
    /// Name of the benchmark
    pub name: String,
    /// The measured value
    pub value: f64,
    /// Unit label, e.g. `ns/iter` or `ms`
    pub unit: String,
    /// Range/variance if available (e.g., "+/- 5")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Caller-defined classification fields (platform, keySize, ...)
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl BenchResult {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            range: None,
            fields: BTreeMap::new(),
        }
    }

    /// Attach a classification field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }
}

impl Fields for BenchResult {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "name" => Some(Cow::Borrowed(self.name.as_str())),
            "unit" => Some(Cow::Borrowed(self.unit.as_str())),
            "range" => self.range.as_deref().map(Cow::Borrowed),
            "value" => Some(Cow::Owned(self.value.to_string())),
            other => self.fields.get(other).and_then(json_text),
        }
    }
}

/// Text form of a classification value; `null` counts as missing
fn json_text(value: &serde_json::Value) -> Option<Cow<'_, str>> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Information about the commit a run was recorded for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commit {
    /// Git commit SHA
    pub id: String,
    /// Commit message
    #[serde(default)]
    pub message: String,
    /// Commit URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Commit {
    /// Abbreviated commit id
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(7)
            .map_or(self.id.len(), |(idx, _)| idx);
        &self.id[..end]
    }
}

/// One benchmark run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub commit: Commit,
    /// When the benchmark was run
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Whether larger values are better for this run's benchmarks
    #[serde(default)]
    pub bigger_is_better: bool,
    /// Tool that produced the results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub benches: Vec<BenchResult>,
}

/// The whole history document
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDocument {
    /// Last update timestamp
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    /// Runs grouped by suite name, oldest first
    pub entries: BTreeMap<String, Vec<HistoryEntry>>,
    /// Declared GroupBy per suite
    #[serde(default)]
    pub group_by: HashMap<String, Vec<String>>,
    /// Declared Schema per suite
    #[serde(default)]
    pub schema: HashMap<String, Vec<String>>,
}

impl HistoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a history document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        match raw.as_object() {
            Some(object) if object.contains_key("entries") => {}
            Some(_) => {
                return Err(Error::InvalidDocument(
                    "missing top-level `entries` field".to_string(),
                ))
            }
            None => {
                return Err(Error::InvalidDocument(
                    "top-level value is not an object".to_string(),
                ))
            }
        }
        Ok(serde_json::from_value(raw)?)
    }

    /// Load a history document from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    /// All runs recorded for a suite
    pub fn suite(&self, name: &str) -> Result<&[HistoryEntry]> {
        self.entries
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownSuite(name.to_string()))
    }

    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn declared_schema(&self, suite: &str) -> Option<&[String]> {
        self.schema.get(suite).map(Vec::as_slice)
    }

    pub fn declared_group_by(&self, suite: &str) -> Option<&[String]> {
        self.group_by.get(suite).map(Vec::as_slice)
    }

    /// Get the most recent run for a suite
    pub fn latest_entry(&self, suite: &str) -> Option<&HistoryEntry> {
        self.entries.get(suite).and_then(|runs| runs.last())
    }
}
