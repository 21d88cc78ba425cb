//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL and MariaDB databases using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlDatabaseError, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::types::BigDecimal;
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum rows to return from a query.
const MAX_ROWS: usize = 10_000;

/// MySQL server error: access denied for user.
const ER_ACCESS_DENIED_ERROR: u16 = 1045;

/// MySQL server error: unknown database.
const ER_BAD_DB_ERROR: u16 = 1049;

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Opens a connection pool for the given configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        debug!("Connecting to {}", config.display_string());

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();
        debug!("Executing query: {}", sql);

        let result = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            sqlx::query(sql).fetch_all(&self.pool),
        )
        .await
        .map_err(|_| {
            ReportError::query(format!(
                "Query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })?
        .map_err(|e| ReportError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        // Column metadata is only available from a row; empty results carry none.
        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|first_row| {
                first_row
                    .columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let total_rows = result.len();
        let was_truncated = total_rows > MAX_ROWS;

        if was_truncated {
            warn!(
                "Query returned {} rows, truncating to {} rows",
                total_rows, MAX_ROWS
            );
        }

        let rows: Vec<Row> = result.iter().take(MAX_ROWS).map(convert_row).collect();
        let row_count = rows.len();

        Ok(QueryResult {
            columns,
            rows,
            execution_time,
            row_count,
            total_rows: Some(total_rows),
            was_truncated,
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT CAST(table_name AS CHAR)
            FROM information_schema.tables
            WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReportError::query(format!("Failed to list tables: {e}")))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let type_name = type_name.to_uppercase();

    if type_name.ends_with("UNSIGNED") {
        return match decode::<u64>(row, index, &type_name) {
            Decoded::Value(v) => i64::try_from(v)
                .map(Value::Int)
                .unwrap_or_else(|_| Value::String(v.to_string())),
            Decoded::Null => Value::Null,
            Decoded::Failed => raw_value(row, index),
        };
    }

    let decoded = match type_name.as_str() {
        "BOOLEAN" => decode(row, index, &type_name).map(Value::Bool),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            decode(row, index, &type_name).map(Value::Int)
        }

        "FLOAT" => decode::<f32>(row, index, &type_name).map(|v| Value::Float(f64::from(v))),

        "DOUBLE" => decode(row, index, &type_name).map(Value::Float),

        // Kept as text so money columns print exactly as stored.
        "DECIMAL" | "NUMERIC" => {
            decode::<BigDecimal>(row, index, &type_name).map(|v| Value::String(v.to_string()))
        }

        "DATE" => decode(row, index, &type_name).map(Value::Date),

        "DATETIME" | "TIMESTAMP" => decode(row, index, &type_name).map(Value::DateTime),

        "TIME" => decode::<NaiveTime>(row, index, &type_name).map(|v| Value::String(v.to_string())),

        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            decode(row, index, &type_name).map(Value::Bytes)
        }

        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => {
            decode(row, index, &type_name).map(Value::String)
        }

        // JSON, BIT, SET and anything newer: read the raw column bytes.
        _ => Decoded::Failed,
    };

    match decoded {
        Decoded::Value(value) => value,
        Decoded::Null => Value::Null,
        Decoded::Failed => raw_value(row, index),
    }
}

/// Outcome of decoding one column with a typed decoder.
enum Decoded<T> {
    Value(T),
    Null,
    Failed,
}

impl<T> Decoded<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Value(v) => Decoded::Value(f(v)),
            Decoded::Null => Decoded::Null,
            Decoded::Failed => Decoded::Failed,
        }
    }
}

fn decode<'r, T>(row: &'r MySqlRow, index: usize, type_name: &str) -> Decoded<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    match row.try_get::<Option<T>, _>(index) {
        Ok(Some(value)) => Decoded::Value(value),
        Ok(None) => Decoded::Null,
        Err(e) => {
            warn!("Cannot decode column {index} as {type_name}: {e}");
            Decoded::Failed
        }
    }
}

/// Reads a column's wire bytes without a type check, as text when it is UTF-8.
fn raw_value(row: &MySqlRow, index: usize) -> Value {
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(index) {
        Ok(Some(bytes)) => match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        Ok(None) => Value::Null,
        Err(e) => {
            warn!("Cannot read column {index}: {e}");
            Value::Null
        }
    }
}

/// Returns the MySQL server error number, if the error came from the server.
fn server_error_number(error: &sqlx::Error) -> Option<u16> {
    error
        .as_database_error()
        .and_then(|db_error| db_error.try_downcast_ref::<MySqlDatabaseError>())
        .map(|mysql_error| mysql_error.number())
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port_or_default();
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    match server_error_number(&error) {
        Some(ER_ACCESS_DENIED_ERROR) => {
            return ReportError::connection(format!(
                "The supplied username or password are invalid (user '{user}')."
            ))
        }
        Some(ER_BAD_DB_ERROR) => {
            return ReportError::connection(format!(
                "The specified database '{database}' does not exist."
            ))
        }
        _ => {}
    }

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a query error, prefixing the server error number when present.
fn format_query_error(error: sqlx::Error) -> String {
    match (server_error_number(&error), error.as_database_error()) {
        (Some(number), Some(db_error)) => format!("ERROR {number}: {}", db_error.message()),
        (None, Some(db_error)) => format!("ERROR: {}", db_error.message()),
        _ => error.to_string(),
    }
}
