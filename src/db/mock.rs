//! Mock database clients for testing.
//!
//! `MockDatabaseClient` answers queries from a script of canned results,
//! `FailingDatabaseClient` fails every call.

use super::{DatabaseClient, QueryResult};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A mock database client that returns predefined results.
///
/// Each scripted response is keyed by a SQL fragment; a query receives the
/// first response whose fragment it contains, or an empty result otherwise.
/// Every executed query is recorded for later inspection.
#[derive(Default)]
pub struct MockDatabaseClient {
    responses: Vec<(String, QueryResult)>,
    tables: Vec<String>,
    executed: Mutex<Vec<String>>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a response returned for any query containing `fragment`.
    pub fn with_response(mut self, fragment: impl Into<String>, result: QueryResult) -> Self {
        self.responses.push((fragment.into(), result));
        self
    }

    /// Sets the table names returned by `list_tables`.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Returns every query executed so far, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.executed
            .lock()
            .map_err(|_| ReportError::internal("mock query log poisoned"))?
            .push(sql.to_string());

        let result = self
            .responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default();

        Ok(result.with_execution_time(Duration::from_millis(1)))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = self.tables.clone();
        tables.sort();
        Ok(tables)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every operation fails with a query error.
#[derive(Debug, Default)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(ReportError::query(self.message.clone()))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Err(ReportError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
