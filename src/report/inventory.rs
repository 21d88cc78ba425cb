//! Inventory Age report: rental equipment due for review or retirement.

use super::sql;
use crate::config::ReportSettings;
use crate::db::{DatabaseClient, Row, Value};
use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Where an item stands relative to the retirement age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgeStatus {
    /// Past the review threshold but younger than the retirement age.
    Approaching,
    /// At or past the retirement age.
    Retire,
}

impl fmt::Display for AgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeStatus::Approaching => write!(f, "Approaching retirement"),
            AgeStatus::Retire => write!(f, "Retire"),
        }
    }
}

/// A rental item in circulation longer than the review threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    /// Rental currently holding the item, if any.
    pub rental_id: Option<i64>,
    pub name: String,
    pub initial_use: NaiveDate,
    pub years: i64,
    pub months: i64,
    pub status: AgeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    pub generated_on: NaiveDate,
    pub review_months: u32,
    pub retire_years: u32,
    /// Newest first.
    pub items: Vec<InventoryItem>,
}

impl InventoryReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items at or past the retirement age.
    pub fn retire_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == AgeStatus::Retire)
            .count()
    }
}

/// Lists rental equipment older than `settings.inventory_review_months`.
///
/// Ages are computed by the database against its current date;
/// `generated_on` is only recorded on the report.
pub async fn inventory_report(
    db: &dyn DatabaseClient,
    settings: &ReportSettings,
    generated_on: NaiveDate,
) -> Result<InventoryReport> {
    let result = db
        .execute_query(&sql::inventory_age_query(settings.inventory_review_months))
        .await?;
    debug!("Inventory query returned {} rows", result.row_count);

    let items = result
        .rows
        .iter()
        .map(|row| parse_item(row, settings.inventory_retire_years))
        .collect::<Result<Vec<_>>>()?;

    Ok(InventoryReport {
        generated_on,
        review_months: settings.inventory_review_months,
        retire_years: settings.inventory_retire_years,
        items,
    })
}

fn parse_item(row: &Row, retire_years: u32) -> Result<InventoryItem> {
    let column = |index: usize, name: &str| {
        row.get(index)
            .ok_or_else(|| ReportError::query(format!("Missing {name} in inventory row")))
    };
    let integer = |value: &Value, name: &str| {
        value
            .as_i64()
            .ok_or_else(|| ReportError::query(format!("Expected a number for {name}, got '{value}'")))
    };

    let rental_id = match column(0, "rental_id")? {
        Value::Null => None,
        value => Some(integer(value, "rental_id")?),
    };
    let initial_use_value = column(1, "initial_use")?;
    let initial_use = initial_use_value.as_date().ok_or_else(|| {
        ReportError::query(format!("Expected a date for initial_use, got '{initial_use_value}'"))
    })?;
    let name = column(2, "name")?.to_display_string();
    let years = integer(column(3, "years_in_use")?, "years_in_use")?;
    let months = integer(column(4, "months_in_use")?, "months_in_use")?;

    let status = if years >= i64::from(retire_years) {
        AgeStatus::Retire
    } else {
        AgeStatus::Approaching
    };

    Ok(InventoryItem {
        rental_id,
        name,
        initial_use,
        years,
        months,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, MockDatabaseClient, QueryResult};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inventory_rows(rows: Vec<Row>) -> QueryResult {
        QueryResult::with_data(
            vec![
                ColumnInfo::new("rental_id", "INT"),
                ColumnInfo::new("initial_use", "DATE"),
                ColumnInfo::new("name", "VARCHAR"),
                ColumnInfo::new("years_in_use", "BIGINT"),
                ColumnInfo::new("months_in_use", "BIGINT"),
            ],
            rows,
        )
    }

    #[tokio::test]
    async fn test_inventory_report_classifies_ages() {
        let db = MockDatabaseClient::new().with_response(
            "FROM rental_inventory",
            inventory_rows(vec![
                vec![
                    Value::Int(12),
                    Value::Date(date(2021, 3, 1)),
                    Value::from("Two-person tent"),
                    Value::Int(4),
                    Value::Int(7),
                ],
                vec![
                    Value::Null,
                    Value::Date(date(2019, 6, 15)),
                    Value::from("Trekking poles"),
                    Value::Int(5),
                    Value::Int(4),
                ],
            ]),
        );

        let settings = ReportSettings::default();
        let report = inventory_report(&db, &settings, date(2025, 10, 20)).await.unwrap();

        assert_eq!(report.generated_on, date(2025, 10, 20));
        assert_eq!(report.review_months, 54);
        assert_eq!(report.retire_years, 5);
        assert_eq!(
            report.items,
            vec![
                InventoryItem {
                    rental_id: Some(12),
                    name: "Two-person tent".to_string(),
                    initial_use: date(2021, 3, 1),
                    years: 4,
                    months: 7,
                    status: AgeStatus::Approaching,
                },
                InventoryItem {
                    rental_id: None,
                    name: "Trekking poles".to_string(),
                    initial_use: date(2019, 6, 15),
                    years: 5,
                    months: 4,
                    status: AgeStatus::Retire,
                },
            ]
        );
        assert_eq!(report.retire_count(), 1);
    }

    #[tokio::test]
    async fn test_inventory_report_uses_configured_threshold() {
        let db = MockDatabaseClient::new();
        let settings = ReportSettings {
            inventory_review_months: 36,
            inventory_retire_years: 4,
        };

        let report = inventory_report(&db, &settings, date(2025, 1, 1)).await.unwrap();
        assert!(report.is_empty());
        assert!(db.executed_queries()[0].contains("INTERVAL 36 MONTH"));
    }

    #[tokio::test]
    async fn test_inventory_report_rejects_bad_dates() {
        let db = MockDatabaseClient::new().with_response(
            "FROM rental_inventory",
            inventory_rows(vec![vec![
                Value::Int(1),
                Value::from("yesterday"),
                Value::from("Kayak"),
                Value::Int(6),
                Value::Int(0),
            ]]),
        );

        let err = inventory_report(&db, &ReportSettings::default(), date(2025, 1, 1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("initial_use"));
    }

    #[test]
    fn test_age_status_display() {
        assert_eq!(AgeStatus::Retire.to_string(), "Retire");
        assert_eq!(AgeStatus::Approaching.to_string(), "Approaching retirement");
    }
}
