//! Report tests against an in-memory trip table.
//!
//! `TripTable` answers the trip report's queries by evaluating the generated
//! quarter `CASE` expression itself, so these tests check that the SQL
//! buckets every date the same way `QuarterTemplate::bucket_for` does.

use async_trait::async_trait;
use chrono::NaiveDate;
use outland_reports::db::{ColumnInfo, DatabaseClient, MockDatabaseClient, QueryResult, Value};
use outland_reports::error::{ReportError, Result};
use outland_reports::quarter::{build_quarter_template, merge_results};
use outland_reports::render::{render_quarterly, OutputFormat};
use outland_reports::report::{dump_tables, equipment_report, run_read_only, trip_report};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2025, 10, 20)
}

/// Rows of `trip`: destination and optional end date.
struct TripTable {
    trips: Vec<(&'static str, Option<NaiveDate>)>,
}

impl TripTable {
    fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.trips.iter().filter_map(|(_, end)| *end)
    }

    fn single_date(date: Option<NaiveDate>) -> QueryResult {
        QueryResult::with_data(
            vec![ColumnInfo::new("trip_end", "DATE")],
            date.map(|d| vec![vec![Value::Date(d)]]).unwrap_or_default(),
        )
    }
}

fn continent(destination: &str) -> &str {
    destination.rsplit(", ").next().unwrap_or(destination)
}

/// Evaluates the quarter expression of `sql` for `date`.
fn evaluate_quarter(sql: &str, date: NaiveDate) -> Option<String> {
    let Some(case) = sql.split("CASE ").nth(1) else {
        // Single quarter: a bare label literal.
        let before = sql.split(" AS quarter").next()?;
        return before.rsplit('\'').nth(1).map(String::from);
    };
    let case = case.split(" END").next()?;

    for clause in case.split("WHEN ").skip(1) {
        let mut quoted = clause.split('\'').skip(1).step_by(2);
        let cutoff: NaiveDate = quoted.next()?.parse().ok()?;
        let label = quoted.next()?;
        if date <= cutoff {
            return Some(label.to_string());
        }
    }

    case.split("ELSE ").nth(1)?.split('\'').nth(1).map(String::from)
}

#[async_trait]
impl DatabaseClient for TripTable {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        if sql.contains("ORDER BY trip_end DESC") {
            return Ok(Self::single_date(self.dates().max()));
        }
        if sql.contains("ORDER BY trip_end LIMIT 1") {
            return Ok(Self::single_date(self.dates().min()));
        }
        if sql.contains("SELECT DISTINCT") {
            let mut names: Vec<&str> = self.trips.iter().map(|(d, _)| continent(d)).collect();
            names.sort();
            names.dedup();
            return Ok(QueryResult::with_data(
                vec![ColumnInfo::new("continent", "VARCHAR")],
                names.into_iter().map(|n| vec![Value::from(n)]).collect(),
            ));
        }
        if sql.contains("COUNT(*) AS trips") {
            let mut groups: BTreeMap<(String, String), i64> = BTreeMap::new();
            for (destination, end) in &self.trips {
                let Some(end) = end else { continue };
                let quarter = evaluate_quarter(sql, *end)
                    .ok_or_else(|| ReportError::query(format!("cannot evaluate {sql}")))?;
                *groups.entry((continent(destination).to_string(), quarter)).or_default() += 1;
            }
            return Ok(QueryResult::with_data(
                vec![
                    ColumnInfo::new("continent", "VARCHAR"),
                    ColumnInfo::new("quarter", "VARCHAR"),
                    ColumnInfo::new("trips", "BIGINT"),
                ],
                groups
                    .into_iter()
                    .map(|((c, q), n)| vec![Value::String(c), Value::String(q), Value::Int(n)])
                    .collect(),
            ));
        }
        Err(ReportError::query(format!("unexpected query: {sql}")))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(vec!["trip".to_string()])
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

fn sample_trips() -> TripTable {
    TripTable {
        trips: vec![
            ("Kilimanjaro, Tanzania, Africa", Some(date(2023, 11, 3))),
            ("Atlas Mountains, Morocco, Africa", Some(date(2023, 12, 31))),
            ("Dolomites, Italy, Europe", Some(date(2024, 1, 1))),
            ("Annapurna, Nepal, Asia", Some(date(2024, 3, 31))),
            ("Fuji, Japan, Asia", Some(date(2024, 4, 1))),
            ("Lofoten, Norway, Europe", Some(date(2024, 9, 30))),
            ("Pyrenees, Spain, Europe", Some(date(2024, 10, 1))),
            ("Gobi, Mongolia, Asia", Some(date(2025, 2, 14))),
            ("Serengeti, Tanzania, Africa", None),
        ],
    }
}

#[tokio::test]
async fn test_sql_buckets_match_in_memory_buckets() {
    let db = sample_trips();
    let report = trip_report(&db, today()).await.unwrap();

    let (_, template) = build_quarter_template(date(2023, 11, 3), date(2025, 2, 14)).unwrap();
    assert_eq!(report.quarters, template.labels());

    for series in &report.series {
        let mut pairs: BTreeMap<String, i64> = BTreeMap::new();
        for (destination, end) in &db.trips {
            if continent(destination) != series.name {
                continue;
            }
            if let Some(quarter) = end.and_then(|d| template.bucket_for(d)) {
                *pairs.entry(quarter.label()).or_default() += 1;
            }
        }
        let expected = merge_results(&template, pairs).unwrap();
        assert_eq!(series.counts, expected, "{}", series.name);
    }
}

#[tokio::test]
async fn test_trip_report_boundary_dates() {
    let report = trip_report(&sample_trips(), today()).await.unwrap();

    let by_name = |name: &str| {
        report
            .series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.counts.clone())
            .unwrap()
    };

    assert_eq!(report.quarters.first().map(String::as_str), Some("2023Q4"));
    assert_eq!(report.quarters.last().map(String::as_str), Some("2025Q1"));

    // Quarter-end dates stay in their quarter; the first day moves on.
    assert_eq!(by_name("Africa").get("2023Q4"), Some(2));
    assert_eq!(by_name("Asia").get("2024Q1"), Some(1));
    assert_eq!(by_name("Asia").get("2024Q2"), Some(1));
    assert_eq!(by_name("Europe").get("2024Q3"), Some(1));
    assert_eq!(by_name("Europe").get("2024Q4"), Some(1));
    assert_eq!(by_name("Asia").get("2025Q1"), Some(1));

    let total: i64 = report.series.iter().map(|s| s.counts.total()).sum();
    assert_eq!(total, 8);
}

#[tokio::test]
async fn test_trip_report_single_quarter() {
    let db = TripTable {
        trips: vec![
            ("Fuji, Japan, Asia", Some(date(2024, 4, 2))),
            ("Dolomites, Italy, Europe", Some(date(2024, 5, 2))),
        ],
    };

    let report = trip_report(&db, today()).await.unwrap();
    assert_eq!(report.quarters, vec!["2024Q2"]);
    assert_eq!(report.series.len(), 2);
    assert!(report.series.iter().all(|s| s.counts.counts() == vec![1]));
}

#[tokio::test]
async fn test_trip_report_renders_every_format() {
    let report = trip_report(&sample_trips(), today()).await.unwrap();

    let text = render_quarterly(&report, OutputFormat::Text);
    assert!(text.starts_with("Trip Destination Trends (generated 2025-10-20)\n"));
    assert!(text.contains("│ Quarter │ Africa │ Asia │ Europe │"));

    let chart = render_quarterly(&report, OutputFormat::Chart);
    assert!(chart.contains("Number of Trips per quarter"));

    let json: serde_json::Value =
        serde_json::from_str(&render_quarterly(&report, OutputFormat::Json)).unwrap();
    assert_eq!(json["series"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_equipment_series_are_independent() {
    let dates = |first: NaiveDate, last: NaiveDate| {
        (
            QueryResult::with_data(vec![ColumnInfo::new("d", "DATE")], vec![vec![Value::Date(first)]]),
            QueryResult::with_data(vec![ColumnInfo::new("d", "DATE")], vec![vec![Value::Date(last)]]),
        )
    };
    let (order_first, order_last) = dates(date(2024, 1, 10), date(2024, 4, 10));
    let (rental_first, rental_last) = dates(date(2024, 2, 1), date(2024, 7, 1));
    let counts = |rows: &[(&str, i64)]| {
        QueryResult::with_data(
            vec![ColumnInfo::new("quarter", "VARCHAR"), ColumnInfo::new("items", "BIGINT")],
            rows.iter()
                .map(|(q, n)| vec![Value::from(*q), Value::Int(*n)])
                .collect(),
        )
    };

    let db = MockDatabaseClient::new()
        .with_response("ORDER BY order_date LIMIT 1", order_first)
        .with_response("ORDER BY order_date DESC", order_last)
        .with_response("ORDER BY rental_date LIMIT 1", rental_first)
        .with_response("ORDER BY rental_date DESC", rental_last)
        .with_response("SUM(order_item.quantity)", counts(&[("2024Q1", 5)]))
        .with_response("COUNT(rental_history.id)", counts(&[("2024Q3", 2)]));

    let report = equipment_report(&db, today()).await.unwrap();
    assert_eq!(report.quarters, vec!["2024Q1", "2024Q2", "2024Q3"]);
    assert_eq!(report.series[0].counts.counts(), vec![5, 0, 0]);
    assert_eq!(report.series[1].counts.counts(), vec![0, 0, 2]);
}

#[tokio::test]
async fn test_dump_and_query_through_public_api() {
    let db = MockDatabaseClient::new().with_tables(["trip", "customer"]);

    let dumps = dump_tables(&db, &[]).await.unwrap();
    let names: Vec<&str> = dumps.iter().map(|d| d.table.as_str()).collect();
    assert_eq!(names, vec!["customer", "trip"]);

    let err = run_read_only(&db, "TRUNCATE TABLE trip").await.unwrap_err();
    assert_eq!(err.category(), "Safety Error");
}

#[test]
fn test_evaluate_quarter_helper() {
    let sql = "SELECT CASE WHEN d <= '2024-03-31' THEN '2024Q1' ELSE '2024Q2' END AS quarter";
    assert_eq!(evaluate_quarter(sql, date(2024, 3, 31)), Some("2024Q1".to_string()));
    assert_eq!(evaluate_quarter(sql, date(2024, 4, 1)), Some("2024Q2".to_string()));
    assert_eq!(
        evaluate_quarter("SELECT x AS continent, '2024Q2' AS quarter", date(2024, 4, 1)),
        Some("2024Q2".to_string())
    );
}
