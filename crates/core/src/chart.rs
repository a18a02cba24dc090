//! Chart payloads for one suite
//!
//! [`RenderContext`] carries the loaded history and the render configuration
//! through the pipeline: traces are built from the suite's runs, grouped into
//! charts, normalized per chart and turned into payloads for the plotting
//! library.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::data::HistoryDocument;
use crate::error::Result;
use crate::group::{distinct_values, group_traces, FieldValueSet, Group};
use crate::key::FieldValues;
use crate::schema::{GroupBy, Schema};
use crate::trace::build_traces;
use crate::units::{normalize, TimeUnit};

/// Render configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Schema used when a suite declares none (or an empty one)
    pub default_schema: Vec<String>,
    /// GroupBy used when a suite declares none (or one the schema can't cover)
    pub default_group_by: Vec<String>,
    /// Chart height in pixels
    pub height: u32,
    /// Chart width in pixels
    pub width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_schema: vec!["name".to_string()],
            default_group_by: vec!["name".to_string()],
            height: 400,
            width: 800,
        }
    }
}

/// One series as the plotting library expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracePayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<DateTime<Utc>>,
    pub y: Vec<f64>,
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: AxisLayout,
    pub yaxis: AxisLayout,
    pub height: u32,
    pub width: u32,
}

/// Everything needed to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    /// Encoded group key
    pub id: String,
    /// GroupBy field values of this chart
    pub key: FieldValues,
    pub unit: TimeUnit,
    pub traces: Vec<TracePayload>,
    pub layout: Layout,
}

/// A chart that could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartFailure {
    /// Encoded group key
    pub group: String,
    pub message: String,
}

/// All charts of one suite
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteCharts {
    pub suite: String,
    pub schema: Schema,
    pub group_by: GroupBy,
    /// Checkbox values per GroupBy field
    pub filters: Vec<FieldValueSet>,
    pub charts: Vec<ChartPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ChartFailure>,
}

/// Explicit state for one render pass
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    document: &'a HistoryDocument,
    config: &'a RenderConfig,
}

impl<'a> RenderContext<'a> {
    pub fn new(document: &'a HistoryDocument, config: &'a RenderConfig) -> Self {
        Self { document, config }
    }

    pub fn document(&self) -> &'a HistoryDocument {
        self.document
    }

    /// Declared schema of `suite`, or the default when absent or empty
    pub fn schema(&self, suite: &str) -> Schema {
        match self.document.declared_schema(suite) {
            Some(fields) if !fields.is_empty() => Schema::new(fields.iter().cloned()),
            Some(_) => {
                warn!(suite, "empty schema, using default {:?}", self.config.default_schema);
                Schema::new(self.config.default_schema.iter().cloned())
            }
            None => {
                warn!(suite, "no schema declared, using default {:?}", self.config.default_schema);
                Schema::new(self.config.default_schema.iter().cloned())
            }
        }
    }

    /// Declared GroupBy of `suite`, or the default when absent or not covered by `schema`
    pub fn group_by(&self, suite: &str, schema: &Schema) -> GroupBy {
        let default = || GroupBy::new(self.config.default_group_by.iter().cloned());

        let Some(fields) = self.document.declared_group_by(suite) else {
            warn!(suite, "no groupBy declared, using default {:?}", self.config.default_group_by);
            return default();
        };

        let group_by = GroupBy::new(fields.iter().cloned());
        let uncovered: Vec<&str> = group_by.uncovered(schema).collect();
        if !uncovered.is_empty() {
            warn!(
                suite,
                "groupBy fields {:?} are not in the schema, using default {:?}",
                uncovered,
                self.config.default_group_by
            );
            return default();
        }
        group_by
    }

    /// Build the charts of one suite
    ///
    /// A chart whose units can't be normalized is recorded as a failure and
    /// the remaining charts are still rendered.
    pub fn render_suite(&self, suite: &str) -> Result<SuiteCharts> {
        let entries = self.document.suite(suite)?;
        let schema = self.schema(suite);
        let group_by = self.group_by(suite, &schema);

        let traces = build_traces(entries, &schema, &group_by);
        let filters = distinct_values(&traces, &group_by);
        let groups = group_traces(traces, &group_by);
        debug!(suite, groups = groups.len(), "grouped traces");

        let mut charts = Vec::with_capacity(groups.len());
        let mut failures = Vec::new();
        for group in &groups {
            match self.chart(suite, group) {
                Ok(Some(chart)) => charts.push(chart),
                Ok(None) => {}
                Err(e) => {
                    error!(suite, group = %group.id(), "failed to render chart: {}", e);
                    failures.push(ChartFailure {
                        group: group.id(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(SuiteCharts {
            suite: suite.to_string(),
            schema,
            group_by,
            filters,
            charts,
            failures,
        })
    }

    /// Render every suite of the document
    pub fn render_all(&self) -> Vec<SuiteCharts> {
        self.document
            .suite_names()
            .filter_map(|suite| self.render_suite(suite).ok())
            .collect()
    }

    /// Render the single chart of `suite` whose encoded group key is `group_key`
    ///
    /// Returns `Ok(None)` when no trace falls into that group.
    pub fn render_group(&self, suite: &str, group_key: &str) -> Result<Option<ChartPayload>> {
        let entries = self.document.suite(suite)?;
        let schema = self.schema(suite);
        let group_by = self.group_by(suite, &schema);
        let codec = group_by.codec();
        let wanted = codec.decode(group_key)?;

        let traces = build_traces(entries, &schema, &group_by);
        let group = Group {
            traces: traces
                .into_iter()
                .filter(|trace| codec.values(trace) == wanted)
                .collect(),
            key: wanted,
        };
        self.chart(suite, &group)
    }

    /// Normalize one group and lay it out; `None` when it has no traces
    fn chart(&self, suite: &str, group: &Group) -> Result<Option<ChartPayload>> {
        if group.traces.is_empty() {
            warn!(suite, group = %group.id(), "no traces for group, skipping chart");
            return Ok(None);
        }

        let normalized = normalize(
            group
                .traces
                .iter()
                .flat_map(|t| t.observations.iter())
                .map(|o| (o.value, o.unit.as_str())),
        )?;

        let mut values = normalized.values.into_iter();
        let traces = group
            .traces
            .iter()
            .map(|trace| TracePayload {
                kind: "scatter",
                mode: "lines+markers",
                name: trace.name.clone(),
                x: trace.observations.iter().map(|o| o.date).collect(),
                y: values.by_ref().take(trace.observations.len()).collect(),
                text: trace.observations.iter().map(|o| o.text.clone()).collect(),
            })
            .collect();

        Ok(Some(ChartPayload {
            id: group.id(),
            key: group.key.clone(),
            unit: normalized.unit,
            traces,
            layout: Layout {
                title: chart_title(suite, &group.key),
                xaxis: AxisLayout {
                    title: "Date".to_string(),
                },
                yaxis: AxisLayout {
                    title: format!("Time ({})", normalized.unit),
                },
                height: self.config.height,
                width: self.config.width,
            },
        }))
    }
}

fn chart_title(suite: &str, key: &FieldValues) -> String {
    let values: Vec<&str> = key.present_values().collect();
    if values.is_empty() {
        suite.to_string()
    } else {
        format!("{} [{}]", suite, values.join(", "))
    }
}
