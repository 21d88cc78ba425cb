//! Table dumps and ad hoc read-only queries.

use super::sql;
use crate::db::{DatabaseClient, QueryResult};
use crate::error::{ReportError, Result};
use crate::safety::classify_sql;
use serde::Serialize;
use tracing::{debug, warn};

/// The Outland Adventures tables, parents before children.
pub const OUTLAND_TABLES: &[&str] = &[
    "customer",
    "staff",
    "trip",
    "trip_member",
    "guide_req",
    "guide_req_tracker",
    "order_inventory",
    "orders",
    "order_item",
    "rental",
    "rental_inventory",
];

/// The full contents of one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableDump {
    pub table: String,
    pub result: QueryResult,
}

/// Dumps `requested` tables, or every table when the list is empty.
///
/// Names are checked against the database's own table list before they are
/// interpolated into SQL. An empty request dumps the Outland tables in schema
/// order followed by any other tables alphabetically.
pub async fn dump_tables(db: &dyn DatabaseClient, requested: &[String]) -> Result<Vec<TableDump>> {
    let existing = db.list_tables().await?;
    debug!("Database has {} tables", existing.len());

    let tables: Vec<String> = if requested.is_empty() {
        default_order(&existing)
    } else {
        for table in requested {
            if !existing.iter().any(|t| t == table) {
                return Err(ReportError::query(format!("Table '{table}' doesn't exist")));
            }
        }
        requested.to_vec()
    };

    let mut dumps = Vec::with_capacity(tables.len());
    for table in tables {
        let result = db.execute_query(&sql::select_all_query(&table)).await?;
        if let Some(warning) = result.truncation_warning() {
            warn!("{table}: {warning}");
        }
        dumps.push(TableDump { table, result });
    }

    Ok(dumps)
}

fn default_order(existing: &[String]) -> Vec<String> {
    let known = OUTLAND_TABLES
        .iter()
        .filter(|name| existing.iter().any(|t| t == *name))
        .map(|name| name.to_string());
    let others = existing
        .iter()
        .filter(|t| !OUTLAND_TABLES.contains(&t.as_str()))
        .cloned();
    known.chain(others).collect()
}

/// Runs `sql` only if it classifies as read-only.
pub async fn run_read_only(db: &dyn DatabaseClient, sql: &str) -> Result<QueryResult> {
    let classification = classify_sql(sql);
    if !classification.is_read_only() {
        return Err(ReportError::unsafe_sql(classification.describe()));
    }
    db.execute_query(sql).await
}
