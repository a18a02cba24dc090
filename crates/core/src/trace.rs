//! Trace building
//!
//! Flattens the runs of one suite into observations and gathers them into
//! one trace per distinct schema key. Traces keep the order in which their
//! key first appears; observations keep history order.

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::collections::HashMap;

use crate::data::{BenchResult, HistoryEntry};
use crate::key::{FieldValues, Fields, SENTINEL};
use crate::schema::{GroupBy, Schema};

/// One measured point of a trace
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: DateTime<Utc>,
    /// Raw value in `unit`
    pub value: f64,
    pub unit: String,
    /// Tooltip text
    pub text: String,
}

/// One plotted series
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub key: FieldValues,
    /// Legend name
    pub name: String,
    pub observations: Vec<Observation>,
}

impl Fields for Trace {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.key.field(name)
    }
}

/// Build one trace per distinct schema key found in `entries`
pub fn build_traces(entries: &[HistoryEntry], schema: &Schema, group_by: &GroupBy) -> Vec<Trace> {
    let codec = schema.trace_codec();
    let mut traces: Vec<Trace> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        for bench in &entry.benches {
            let key = codec.values(bench);
            let slot = *index.entry(key.to_key()).or_insert_with(|| {
                traces.push(Trace {
                    name: legend_name(&key, group_by),
                    key,
                    observations: Vec::new(),
                });
                traces.len() - 1
            });

            traces[slot].observations.push(Observation {
                date: entry.date,
                value: bench.value,
                unit: bench.unit.clone(),
                text: tooltip(entry, bench),
            });
        }
    }

    tracing::debug!(
        traces = traces.len(),
        runs = entries.len(),
        "built traces"
    );
    traces
}

/// Legend text: schema values outside the GroupBy and other than `unit`
pub fn legend_name(key: &FieldValues, group_by: &GroupBy) -> String {
    let parts: Vec<&str> = key
        .iter()
        .filter(|(field, value)| {
            !group_by.contains(field) && *field != "unit" && *value != SENTINEL
        })
        .map(|(_, value)| value)
        .collect();

    if parts.is_empty() {
        key.get("name").unwrap_or(SENTINEL).to_string()
    } else {
        parts.join(" ")
    }
}

/// Tooltip text for one observation
///
/// Always carries the benchmark name, value, unit, range, commit id, commit
/// message and commit url; an absent range or url shows as the sentinel.
pub fn tooltip(entry: &HistoryEntry, bench: &BenchResult) -> String {
    let lines = [
        escape_html(&bench.name),
        format!("{} {}", bench.value, escape_html(&bench.unit)),
        format!("range: {}", escape_html(bench.range.as_deref().unwrap_or(SENTINEL))),
        format!("commit: {}", escape_html(&entry.commit.id)),
        escape_html(&entry.commit.message),
        escape_html(entry.commit.url.as_deref().unwrap_or(SENTINEL)),
    ];
    lines.join("<br>")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
