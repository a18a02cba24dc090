//! benchtrack-core - Chart building for benchmark history
//!
//! This crate contains WASM-compatible code shared by the CLI and any
//! browser front end. It does no I/O beyond loading a history document.
//!
//! # Features
//!
//! - History document model (`benchmark-data.json` layout)
//! - Injective, round-trippable group keys
//! - Trace building and grouping by arbitrary schema fields
//! - Duration unit normalization per chart
//! - Counter-based filter state for chart visibility
//!
//! # Example
//!
//! ```no_run
//! use benchtrack_core::{FilterEvent, FilterState, HistoryDocument, RenderConfig, RenderContext};
//!
//! let doc = HistoryDocument::load_from_file(std::path::Path::new("benchmark-data.json")).unwrap();
//! let config = RenderConfig::default();
//! let charts = RenderContext::new(&doc, &config).render_suite("rsa").unwrap();
//!
//! let mut filters = FilterState::new(charts.charts.iter().map(|c| &c.key));
//! filters.apply(&FilterEvent::uncheck("os", "linux"));
//! ```

pub mod chart;
pub mod data;
pub mod error;
pub mod filter;
pub mod group;
pub mod key;
pub mod schema;
pub mod trace;
pub mod units;

pub use chart::{ChartFailure, ChartPayload, RenderConfig, RenderContext, SuiteCharts};
pub use data::{BenchResult, Commit, HistoryDocument, HistoryEntry};
pub use error::{Error, Result};
pub use filter::{FilterEvent, FilterState, Visibility, VisibilityChange};
pub use group::{distinct_values, group_traces, FieldValueSet, Group};
pub use key::{FieldValues, Fields, KeyCodec, SENTINEL};
pub use schema::{GroupBy, Schema};
pub use trace::{build_traces, Observation, Trace};
pub use units::{normalize, Normalized, TimeUnit};
