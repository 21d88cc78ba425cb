//! Database abstraction layer.
//!
//! Provides a trait-based interface for database operations, allowing the
//! live MySQL backend and the in-memory mock to be used interchangeably by
//! the reports.

mod mock;
mod mysql;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a database client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = MySqlClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with ReportError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Lists the base tables of the current database, sorted by name.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
