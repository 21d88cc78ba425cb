//! Query safety classification module.
//!
//! Parses SQL and classifies queries as safe, mutating, or destructive so
//! that ad hoc queries can be limited to read-only statements.

mod parser;

pub use parser::{classify_sql, SqlClassifier};

use std::fmt;

/// Safety level classification for SQL queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SafetyLevel {
    /// Read-only queries (SELECT, EXPLAIN, SHOW).
    Safe,
    /// Data modification queries (INSERT, UPDATE).
    Mutating,
    /// Data loss or schema changes (DELETE, DROP, TRUNCATE, ALTER), and
    /// anything that could not be classified.
    Destructive,
}

impl SafetyLevel {
    /// Returns true if a statement at this level only reads data.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Truncate,
    Explain,
    Show,
    /// Multiple statements detected; contains the most dangerous type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Drop => write!(f, "DROP"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Show => write!(f, "SHOW"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The type of statement(s) detected.
    pub statement_type: StatementType,
    /// Optional warning message for the user.
    pub warning: Option<String>,
}

impl ClassificationResult {
    /// Creates a new classification result.
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
            warning: None,
        }
    }

    /// Creates a classification result with a warning message.
    pub fn with_warning(
        level: SafetyLevel,
        statement_type: StatementType,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            level,
            statement_type,
            warning: Some(warning.into()),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.level.is_read_only()
    }

    /// One-line description used when a statement is refused.
    pub fn describe(&self) -> String {
        match &self.warning {
            Some(warning) => format!("{} statement ({}): {}", self.statement_type, self.level, warning),
            None => format!("{} statement ({})", self.statement_type, self.level),
        }
    }
}
