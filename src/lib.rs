pub mod cli;
pub mod config;
pub mod criteria;
pub mod display;
pub mod filter;
pub mod live;
pub mod query;

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::display::{format_plan_text, format_record_line};
pub use cli::{Assignment, Cli, ColorMode, Commands, CriteriaArgs, OutputFormat, cli_parse};
pub use criteria::{Criteria, CriteriaError, Field, Operator, Parsed, Timezone, TransportCriteria};
pub use filter::{CompiledFilter, Record, compile};
pub use live::{CriteriaSession, CriteriaSubscription, filter_live};
pub use query::{
    Conditions, QueryEngine, QueryError, QueryOptions, QueryPlan, QueryResult, SqlValue, Store,
    StoreError, plan_query, to_conditions,
};

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn apply_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}

/// Criteria file first, then every `--set` in command-line order
pub fn build_criteria(args: &CriteriaArgs, config: &EngineConfig) -> Result<Criteria> {
    let timezone = config.timezone()?;
    let mut criteria = match &args.criteria {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read criteria file '{}'", path.display()))?;
            let transported = Criteria::parse_transport(&text)
                .with_context(|| format!("Failed to parse criteria file '{}'", path.display()))?;
            Criteria::from_file_form(&transported, timezone)
        }
        None => Criteria::new(timezone),
    };

    for assignment in &args.set {
        criteria
            .set_criteria(&assignment.field, &assignment.operator, &assignment.value)
            .with_context(|| {
                format!(
                    "Cannot set {}.{}={:?}",
                    assignment.field, assignment.operator, assignment.value
                )
            })?;
    }
    Ok(criteria)
}

/// Counters reported after a filter run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub read: usize,
    pub matched: usize,
    pub skipped: usize,
}

/// Stream JSON-lines records from `reader`, writing the ones passing
/// `filter` to `out`. Lines that are not JSON objects are skipped.
pub fn filter_records<R: BufRead, W: Write>(
    reader: R,
    filter: &CompiledFilter,
    format: OutputFormat,
    limit: Option<usize>,
    out: &mut W,
) -> Result<FilterSummary> {
    let mut summary = FilterSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        if limit.is_some_and(|max| summary.matched >= max) {
            break;
        }
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let record = match serde_json::from_str::<Record>(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "Skipping malformed record");
                summary.skipped += 1;
                continue;
            }
        };
        summary.read += 1;

        if !filter.matches(&record) {
            continue;
        }
        summary.matched += 1;
        match format {
            OutputFormat::Text => writeln!(out, "{}", format_record_line(&record))?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&record)?)?,
        }
    }
    Ok(summary)
}

fn open_input(input: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}

pub fn run() -> Result<()> {
    let cli = cli_parse();
    init_tracing(cli.verbose, cli.quiet);
    apply_color_mode(cli.color);

    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    tracing::debug!(timezone = %config.timezone, table = %config.query.table, "Configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Filter {
            criteria,
            input,
            limit,
        } => {
            let criteria = build_criteria(criteria, &config)?;
            if criteria.is_unconstrained() {
                tracing::info!("No active criteria, every record passes");
            }
            let filter = CompiledFilter::compile(&criteria);
            tracing::debug!(checks = filter.len(), "Predicate compiled");

            let reader = open_input(input.as_deref())?;
            let summary = filter_records(reader, &filter, cli.format, *limit, &mut out)?;

            if !cli.quiet {
                let mut line = format!("Matched {} of {} records", summary.matched, summary.read);
                if summary.skipped > 0 {
                    line.push_str(&format!(" ({} malformed lines skipped)", summary.skipped));
                }
                eprintln!("{}", line.bold());
            }
        }
        Commands::Query { criteria, limit } => {
            let criteria = build_criteria(criteria, &config)?;
            let options = QueryOptions::new(limit.unwrap_or(config.query.default_limit));
            let plan = plan_query(&config.query, &criteria, &options)?;
            let conditions = to_conditions(&criteria);

            match cli.format {
                OutputFormat::Text => write!(out, "{}", format_plan_text(&conditions, &plan))?,
                OutputFormat::Json => {
                    let report = serde_json::json!({
                        "conditions": conditions,
                        "plan": plan,
                        "limit": options.limit,
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
                }
            }
        }
        Commands::Export { criteria } => {
            let criteria = build_criteria(criteria, &config)?;
            let exported = criteria.export();
            writeln!(out, "{}", serde_json::to_string_pretty(&exported)?)?;
        }
    }

    Ok(())
}
