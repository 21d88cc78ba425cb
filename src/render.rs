//! Output rendering for reports and query results.
//!
//! Every command produces a presentation-independent value; this module turns
//! it into text tables, pretty-printed JSON, or horizontal bar charts.

use crate::db::{QueryResult, Value};
use crate::quarter::QuarterTemplate;
use crate::report::{InventoryReport, QuarterlyReport, TableDump};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

/// Maximum width for any table column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any table column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Width of the longest bar in a chart.
const CHART_WIDTH: usize = 50;

/// How command output is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text tables.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// Horizontal bar charts; non-report output falls back to text.
    Chart,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "chart" => Ok(Self::Chart),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: text, json, or chart"
            )),
        }
    }
}

/// Renders a per-quarter report.
pub fn render_quarterly(report: &QuarterlyReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Text => quarterly_text(report),
        OutputFormat::Chart => quarterly_chart(report),
    }
}

fn quarterly_text(report: &QuarterlyReport) -> String {
    let mut out = format!(
        "{} (generated {})\n{}\n\n",
        report.title, report.generated_on, report.description
    );
    if report.is_empty() {
        out.push_str("No dated records found.\n");
        return out;
    }

    let headers: Vec<String> = std::iter::once("Quarter".to_string())
        .chain(report.series.iter().map(|s| s.name.clone()))
        .collect();

    let rows: Vec<Vec<String>> = report
        .quarters
        .iter()
        .enumerate()
        .map(|(i, quarter)| {
            std::iter::once(quarter.clone())
                .chain(report.series.iter().map(|s| {
                    s.counts
                        .entries()
                        .get(i)
                        .map(|entry| entry.count.to_string())
                        .unwrap_or_default()
                }))
                .collect()
        })
        .collect();

    out.push_str(&format_table(&headers, &rows));
    out
}

fn quarterly_chart(report: &QuarterlyReport) -> String {
    let mut out = format!(
        "{} (generated {})\n{} per quarter\n",
        report.title, report.generated_on, report.value_label
    );
    if report.is_empty() {
        out.push_str("\nNo dated records found.\n");
        return out;
    }

    let max = report.max_count();
    for series in &report.series {
        out.push('\n');
        out.push_str(&series.name);
        out.push('\n');
        for entry in series.counts.entries() {
            let bar = "#".repeat(bar_length(entry.count, max));
            out.push_str(&format!("  {} |{} {}\n", entry.quarter, bar, entry.count));
        }
    }
    out
}

/// Scales `count` against `max` so the longest bar is `CHART_WIDTH` wide.
///
/// Non-zero counts always get at least one mark.
fn bar_length(count: i64, max: i64) -> usize {
    if count <= 0 || max <= 0 {
        return 0;
    }
    let width = CHART_WIDTH as i64;
    let scaled = if max <= width {
        count
    } else {
        (count * width + max - 1) / max
    };
    usize::try_from(scaled).unwrap_or(0)
}

/// Renders the inventory age report.
pub fn render_inventory(report: &InventoryReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut out = format!(
        "Inventory Age Report (generated {})\n\
         Rental items in use longer than {} months; items {} years or older should be retired.\n",
        report.generated_on, report.review_months, report.retire_years
    );

    if report.is_empty() {
        out.push_str(&format!(
            "\nNo rental items have been in use longer than {} months.\n",
            report.review_months
        ));
        return out;
    }

    for item in &report.items {
        let rental = item
            .rental_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "not currently rented".to_string());
        out.push_str(&format!(
            "\nProduct: {}\nRental ID: {}\nIn use since: {} ({} years, {} months)\nStatus: {}\n",
            item.name, rental, item.initial_use, item.years, item.months, item.status
        ));
    }

    out.push_str(&format!(
        "\n{} item(s) listed, {} due for retirement.\n",
        report.items.len(),
        report.retire_count()
    ));
    out
}

/// Renders table dumps as one `column: value` block per record.
pub fn render_dumps(dumps: &[TableDump], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        let tables: Vec<_> = dumps
            .iter()
            .map(|dump| json!({ "table": dump.table, "rows": rows_as_json(&dump.result) }))
            .collect();
        return to_json(&tables);
    }

    let mut out = String::new();
    for dump in dumps {
        out.push_str(&format!("-- DISPLAYING {} RECORDS --\n", dump.table));
        if dump.result.is_empty() {
            out.push_str("(no records)\n");
        }
        for row in &dump.result.rows {
            for (column, value) in dump.result.columns.iter().zip(row) {
                out.push_str(&format!("{}: {}\n", column.name, value));
            }
            out.push('\n');
        }
        if let Some(warning) = dump.result.truncation_warning() {
            out.push_str(&format!("{warning}\n"));
        }
    }
    out
}

/// Renders an ad hoc query result.
pub fn render_query(result: &QueryResult, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(&rows_as_json(result));
    }

    if result.columns.is_empty() {
        return "(empty result)\n".to_string();
    }

    let headers: Vec<String> = result.columns.iter().map(|c| c.name.clone()).collect();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(Value::to_display_string).collect())
        .collect();

    let mut out = format_table(&headers, &rows);
    out.push_str(&format!(
        "{} row{} returned ({}ms)\n",
        result.row_count,
        if result.row_count == 1 { "" } else { "s" },
        result.execution_time.as_millis()
    ));
    if let Some(warning) = result.truncation_warning() {
        out.push_str(&format!("{warning}\n"));
    }
    out
}

/// Renders a bare quarter template and its cutoff dates.
pub fn render_quarters(
    cutoffs: &[NaiveDate],
    template: &QuarterTemplate,
    format: OutputFormat,
) -> String {
    if format == OutputFormat::Json {
        return to_json(&json!({ "template": template, "cutoffs": cutoffs }));
    }

    let headers = vec!["Quarter".to_string(), "Cutoff".to_string()];
    let rows: Vec<Vec<String>> = template
        .quarters()
        .enumerate()
        .map(|(i, quarter)| {
            let cutoff = cutoffs
                .get(i)
                .map(|d| format!("<= {d}"))
                .unwrap_or_else(|| "(remainder)".to_string());
            vec![quarter.to_string(), cutoff]
        })
        .collect();

    let mut out = format_table(&headers, &rows);
    out.push_str(&format!(
        "{} quarter{}, {} cutoff{}\n",
        template.len(),
        if template.len() == 1 { "" } else { "s" },
        cutoffs.len(),
        if cutoffs.len() == 1 { "" } else { "s" }
    ));
    out
}

/// Converts result rows to JSON objects keyed by column name.
fn rows_as_json(result: &QueryResult) -> serde_json::Value {
    let rows = result
        .rows
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = result
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| (column.name.clone(), value_to_json(value)))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::String(s) => json!(s),
        other => json!(other.to_display_string()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut text = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e));
    text.push('\n');
    text
}

/// Formats rows as a box-drawn table with auto-sized columns.
fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let widths = column_widths(headers, rows);

    let mut lines = vec![
        border(&widths, '┌', '┬', '┐'),
        table_row(headers, &widths),
        border(&widths, '├', '┼', '┤'),
    ];
    lines.extend(rows.iter().map(|row| table_row(row, &widths)));
    lines.push(border(&widths, '└', '┴', '┘'));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| h.chars().count().max(MIN_COLUMN_WIDTH))
        .collect();

    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|&w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&mid.to_string()))
}

fn table_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!(" {:<width$} ", truncate(cell, width))
        })
        .collect();
    format!("│{}│", padded.join("│"))
}

/// Truncates a string to `max_width` characters, adding an ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}
