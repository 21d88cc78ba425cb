//! Error types for outland-reports.
//!
//! Defines the main error enum used throughout the application.

use crate::quarter::QuarterError;
use thiserror::Error;

/// Main error type for report generation.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Database connection errors (host unreachable, access denied, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, unknown tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// SQL rejected because it is not read-only.
    #[error("Refusing to run {0}")]
    Unsafe(String),

    /// Quarter bucketing errors.
    #[error(transparent)]
    Quarter(#[from] QuarterError),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsafe_sql(msg: impl Into<String>) -> Self {
        Self::Unsafe(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Unsafe(_) => "Safety Error",
            Self::Quarter(_) => "Bucketing Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ReportError.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_error_display_connection() {
        let err = ReportError::connection("Cannot connect to localhost:3306");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:3306"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = ReportError::query("Table 'outland.trips' doesn't exist");
        assert_eq!(
            err.to_string(),
            "Query error: Table 'outland.trips' doesn't exist"
        );
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = ReportError::config("missing DATABASE in .env");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing DATABASE in .env"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_unsafe() {
        let err = ReportError::unsafe_sql("DELETE statement");
        assert_eq!(err.to_string(), "Refusing to run DELETE statement");
        assert_eq!(err.category(), "Safety Error");
    }

    #[test]
    fn test_error_from_quarter_error() {
        let err: ReportError = QuarterError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid date range: 2024-02-01 is after 2024-01-01"
        );
        assert_eq!(err.category(), "Bucketing Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = ReportError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportError>();
    }
}
