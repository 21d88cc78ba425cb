//! Report generation for the Outland Adventures database.
//!
//! Each report runs a fixed set of queries through a [`DatabaseClient`] and
//! returns a presentation-independent structure for the `render` module.

mod dump;
mod equipment;
mod inventory;
pub mod sql;
mod trips;

pub use dump::{dump_tables, run_read_only, TableDump, OUTLAND_TABLES};
pub use equipment::equipment_report;
pub use inventory::{inventory_report, AgeStatus, InventoryItem, InventoryReport};
pub use trips::trip_report;

use crate::db::{DatabaseClient, QueryResult};
use crate::error::{ReportError, Result};
use crate::quarter::{build_quarter_template, QuarterTemplate};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// One category's counts, aligned to the report's quarters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub counts: QuarterTemplate,
}

/// A per-quarter report with one series per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlyReport {
    pub title: String,
    pub description: String,
    pub generated_on: NaiveDate,
    /// Y axis caption.
    pub value_label: String,
    /// Quarter labels in chronological order (the x axis).
    pub quarters: Vec<String>,
    pub series: Vec<Series>,
}

impl QuarterlyReport {
    /// Creates a report whose axis is taken from `template`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        value_label: impl Into<String>,
        template: &QuarterTemplate,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            generated_on,
            value_label: value_label.into(),
            quarters: template.labels(),
            series: Vec::new(),
        }
    }

    pub fn push_series(&mut self, name: impl Into<String>, counts: QuarterTemplate) {
        self.series.push(Series {
            name: name.into(),
            counts,
        });
    }

    /// True when the source tables held no dated rows.
    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }

    /// Largest single count across all series.
    pub fn max_count(&self) -> i64 {
        self.series
            .iter()
            .flat_map(|s| s.counts.counts())
            .max()
            .unwrap_or(0)
    }
}

/// Dated span covered by one or more `(table, column)` date sources.
///
/// Returns the earliest and latest non-null dates across all sources, or
/// `None` when every source is empty.
pub async fn fetch_date_range(
    db: &dyn DatabaseClient,
    sources: &[(&str, &str)],
) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let mut range: Option<(NaiveDate, NaiveDate)> = None;

    for (table, column) in sources {
        let earliest = db
            .execute_query(&sql::earliest_date_query(table, column))
            .await?;
        let latest = db
            .execute_query(&sql::latest_date_query(table, column))
            .await?;

        let (Some(first), Some(last)) = (scalar_date(&earliest)?, scalar_date(&latest)?) else {
            debug!("{table}.{column} has no dated rows");
            continue;
        };

        range = Some(match range {
            Some((start, end)) => (start.min(first), end.max(last)),
            None => (first, last),
        });
    }

    Ok(range)
}

/// Builds the template for the span of `sources`, or `None` if they are empty.
async fn template_for(
    db: &dyn DatabaseClient,
    sources: &[(&str, &str)],
) -> Result<Option<(Vec<NaiveDate>, QuarterTemplate)>> {
    match fetch_date_range(db, sources).await? {
        Some((start, end)) => {
            debug!("Bucketing {start} to {end} into quarters");
            Ok(Some(build_quarter_template(start, end)?))
        }
        None => Ok(None),
    }
}

fn scalar_date(result: &QueryResult) -> Result<Option<NaiveDate>> {
    match result.scalar() {
        None => Ok(None),
        Some(value) if value.is_null() => Ok(None),
        Some(value) => value
            .as_date()
            .map(Some)
            .ok_or_else(|| ReportError::query(format!("Expected a date, got '{value}'"))),
    }
}

/// Reads `(quarter label, count)` pairs from the given result columns.
///
/// NULL counts (an empty `SUM`) read as zero.
fn quarter_counts(
    result: &QueryResult,
    label_column: usize,
    count_column: usize,
) -> Result<Vec<(String, i64)>> {
    result
        .rows
        .iter()
        .map(|row| {
            let label = row
                .get(label_column)
                .and_then(|v| v.as_str())
                .ok_or_else(|| ReportError::query("Missing quarter label in result row"))?;
            let count = match row.get(count_column) {
                Some(v) if v.is_null() => 0,
                Some(v) => v
                    .as_i64()
                    .ok_or_else(|| ReportError::query(format!("Expected a count, got '{v}'")))?,
                None => return Err(ReportError::query("Missing count in result row")),
            };
            Ok((label.to_string(), count))
        })
        .collect()
}
