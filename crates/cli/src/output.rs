//! Text and JSON reports printed by the CLI

use benchtrack_core::{FilterState, RenderContext, SuiteCharts, Visibility};
use serde::Serialize;
use std::collections::HashSet;

/// Visibility of one chart after filter events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartVisibility {
    pub id: String,
    pub title: String,
    pub hidden_by: u32,
    pub visibility: Visibility,
}

/// Per-chart visibility of a suite, in chart order
pub fn visibility_report(charts: &SuiteCharts, state: &FilterState) -> Vec<ChartVisibility> {
    charts
        .charts
        .iter()
        .enumerate()
        .map(|(idx, chart)| ChartVisibility {
            id: chart.id.clone(),
            title: chart.layout.title.clone(),
            hidden_by: state.hidden_by(idx).unwrap_or(0),
            visibility: state.visibility(idx).unwrap_or(Visibility::Visible),
        })
        .collect()
}

pub fn format_visibility(suite: &str, report: &[ChartVisibility]) -> String {
    let mut lines = vec![format!("## {}", suite)];
    for chart in report {
        let state = match chart.visibility {
            Visibility::Visible => "visible".to_string(),
            Visibility::Hidden => format!("hidden ({})", chart.hidden_by),
        };
        lines.push(format!("  {:<12} {}", state, chart.title));
    }
    lines.join("\n")
}

/// Summary of one suite: run counts and the resolved schema/groupBy
pub fn format_suite_summary(ctx: &RenderContext<'_>, suite: &str) -> String {
    let runs = ctx.document().entries.get(suite).map_or(&[][..], Vec::as_slice);
    let schema = ctx.schema(suite);
    let group_by = ctx.group_by(suite, &schema);

    let bench_count = runs
        .iter()
        .flat_map(|r| r.benches.iter().map(|b| b.name.as_str()))
        .collect::<HashSet<_>>()
        .len();

    let mut lines = vec![
        format!("## {}", suite),
        format!("runs: {}, benchmarks: {}", runs.len(), bench_count),
        format!("schema: {}", schema.fields().join(", ")),
        format!("groupBy: {}", group_by.fields().join(", ")),
    ];

    if let Some(latest) = runs.last() {
        lines.push(format!(
            "latest: {} - {} ({})",
            latest.commit.short_id(),
            latest.commit.message,
            latest.date.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    lines.join("\n")
}
