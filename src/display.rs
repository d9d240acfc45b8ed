use crate::filter::Record;
use crate::query::{Conditions, QueryPlan};
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::Value;
use std::fmt::Write as _;

/// Table with the look shared by every text report
pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    table
}

fn field_text<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

fn format_timestamp(record: &Record) -> String {
    let seconds = match record.get("timestamp") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    seconds
        .and_then(|secs| DateTime::<Utc>::from_timestamp_millis((secs * 1000.0).round() as i64))
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| "-".repeat(24))
}

/// One record on one line, colored by severity
pub fn format_record_line(record: &Record) -> String {
    let severity = field_text(record, "severity");
    let label = format!("[{:<1}]", severity);
    let label = match severity {
        "F" => label.on_red().white().bold(),
        "E" => label.red().bold(),
        "W" => label.yellow(),
        "D" => label.dimmed(),
        _ => label.normal(),
    };
    let message = field_text(record, "message").replace('\n', "\\n");

    format!(
        "{} {} {} {} | {}",
        format_timestamp(record).dimmed(),
        label,
        field_text(record, "hostname").cyan(),
        field_text(record, "facility").magenta(),
        message
    )
}

/// Text report for a dry-run query
pub fn format_plan_text(conditions: &Conditions, plan: &QueryPlan) -> String {
    let mut out = String::new();

    if conditions.is_empty() {
        let _ = writeln!(out, "{}", "No active criteria: query is unfiltered".yellow());
    } else {
        let mut table = create_styled_table(&["#", "Condition", "Bound value", "Display"]);
        for (idx, ((fragment, value), verbose)) in conditions
            .criteria
            .iter()
            .zip(&conditions.values)
            .zip(&conditions.verbose)
            .enumerate()
        {
            table.add_row(vec![
                Cell::new(idx + 1),
                Cell::new(fragment),
                Cell::new(value.to_string()),
                Cell::new(verbose),
            ]);
        }
        let _ = writeln!(out, "{table}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Rows query:".bold().bright_blue());
    let _ = writeln!(out, "  {}", plan.rows_sql);
    let _ = writeln!(out, "{}", "Count query:".bold().bright_blue());
    let _ = writeln!(out, "  {}", plan.count_sql);
    let _ = writeln!(out, "{}", "As string:".bold().bright_blue());
    let _ = writeln!(out, "  {}", plan.query_as_string);
    out
}
