//! benchtrack CLI - Render benchmark history into chart payloads

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod output;

use benchtrack_core::{FilterEvent, FilterState, HistoryDocument, RenderConfig, RenderContext, SuiteCharts};

/// benchtrack: grouped, filterable charts from benchmark history
#[derive(Parser, Debug)]
#[command(name = "benchtrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to benchmark history JSON file
    #[arg(
        long,
        global = true,
        env = "BENCHTRACK_DATA_FILE",
        default_value = "benchmark-data.json"
    )]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Emit chart payloads as JSON
    Charts(ChartsArgs),
    /// List suites with their resolved schema and groupBy
    Suites,
    /// Apply filter checkboxes and report chart visibility
    Filter(FilterArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Name of the benchmark suite (all suites if not specified)
    #[arg(short, long)]
    suite: Option<String>,

    /// Chart height in pixels
    #[arg(long, default_value_t = 400)]
    height: u32,

    /// Chart width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Schema for suites that declare none (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "name")]
    default_schema: Vec<String>,

    /// GroupBy for suites that declare none (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "name")]
    default_group_by: Vec<String>,
}

impl RenderArgs {
    fn config(&self) -> RenderConfig {
        RenderConfig {
            default_schema: self.default_schema.clone(),
            default_group_by: self.default_group_by.clone(),
            height: self.height,
            width: self.width,
        }
    }
}

#[derive(Parser, Debug)]
struct ChartsArgs {
    #[command(flatten)]
    render: RenderArgs,

    /// Pretty-print the JSON
    #[arg(long, default_value = "false")]
    pretty: bool,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    #[command(flatten)]
    render: RenderArgs,

    /// Uncheck a filter box (repeatable)
    #[arg(long = "hide", value_name = "FIELD=VALUE", value_parser = parse_hide)]
    hide: Vec<FilterEvent>,

    /// Print the report as JSON
    #[arg(long, default_value = "false")]
    json: bool,
}

/// Parse `field=value` into an uncheck event
fn parse_hide(s: &str) -> std::result::Result<FilterEvent, String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok(FilterEvent::uncheck(field.trim(), value.trim()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let doc = load_document(&cli.data_file)?;

    match cli.command {
        Commands::Charts(args) => charts_command(&doc, args),
        Commands::Suites => suites_command(&doc),
        Commands::Filter(args) => filter_command(&doc, args),
    }
}

fn load_document(path: &Path) -> Result<HistoryDocument> {
    debug!("Loading benchmark history from {:?}", path);
    let doc = HistoryDocument::load_from_file(path)
        .with_context(|| format!("Failed to load benchmark history: {:?}", path))?;
    debug!("Loaded {} suite(s)", doc.entries.len());
    Ok(doc)
}

fn render(ctx: &RenderContext<'_>, suite: Option<&str>) -> Result<Vec<SuiteCharts>> {
    match suite {
        Some(name) => Ok(vec![ctx.render_suite(name)?]),
        None => Ok(ctx.render_all()),
    }
}

fn charts_command(doc: &HistoryDocument, args: ChartsArgs) -> Result<()> {
    let config = args.render.config();
    let ctx = RenderContext::new(doc, &config);
    let suites = render(&ctx, args.render.suite.as_deref())?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&suites)?
    } else {
        serde_json::to_string(&suites)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write chart payloads: {:?}", path))?;
            info!("Wrote chart payloads to {:?}", path);
        }
        None => println!("{}", json),
    }

    let failed: usize = suites.iter().map(|s| s.failures.len()).sum();
    if failed > 0 {
        anyhow::bail!("{} chart(s) failed to render", failed);
    }

    Ok(())
}

fn suites_command(doc: &HistoryDocument) -> Result<()> {
    if doc.entries.is_empty() {
        warn!("No suites in benchmark history");
        return Ok(());
    }

    let config = RenderConfig::default();
    let ctx = RenderContext::new(doc, &config);
    for suite in doc.suite_names() {
        println!("{}\n", output::format_suite_summary(&ctx, suite));
    }

    Ok(())
}

fn filter_command(doc: &HistoryDocument, args: FilterArgs) -> Result<()> {
    let config = args.render.config();
    let ctx = RenderContext::new(doc, &config);
    let suites = render(&ctx, args.render.suite.as_deref())?;

    let mut reports = Vec::with_capacity(suites.len());
    for charts in &suites {
        let mut state = FilterState::new(charts.charts.iter().map(|c| &c.key));
        for event in &args.hide {
            let changes = state.apply(event);
            debug!(
                suite = %charts.suite,
                "{}={} unchecked, {} chart(s) changed visibility",
                event.field,
                event.value,
                changes.len()
            );
        }
        reports.push((charts.suite.as_str(), output::visibility_report(charts, &state)));
    }

    if args.json {
        let json: serde_json::Map<String, serde_json::Value> = reports
            .into_iter()
            .map(|(suite, report)| -> Result<(String, serde_json::Value)> {
                Ok((suite.to_string(), serde_json::to_value(report)?))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for (suite, report) in &reports {
            println!("{}\n", output::format_visibility(suite, report));
        }
    }

    Ok(())
}
