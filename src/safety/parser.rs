//! SQL parsing and classification logic.
//!
//! Uses sqlparser-rs with the MySQL dialect to parse SQL and classify
//! statements by their safety level.

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

use crate::error::{ReportError, Result};

use super::{ClassificationResult, SafetyLevel, StatementType};

/// SQL classifier that parses and classifies SQL queries.
#[derive(Debug)]
pub struct SqlClassifier {
    dialect: MySqlDialect,
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    /// Creates a new SQL classifier.
    pub fn new() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }

    /// Classifies a SQL string and returns the classification result.
    ///
    /// SQL that cannot be parsed is treated as destructive.
    pub fn classify(&self, sql: &str) -> ClassificationResult {
        match self.parse_and_classify(sql) {
            Ok(result) => result,
            Err(e) => ClassificationResult::with_warning(
                SafetyLevel::Destructive,
                StatementType::Unknown,
                e.to_string(),
            ),
        }
    }

    fn parse_and_classify(&self, sql: &str) -> Result<ClassificationResult> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| ReportError::query(format!("SQL parse error: {}", e)))?;

        let Some((first, rest)) = statements.split_first() else {
            return Ok(ClassificationResult::with_warning(
                SafetyLevel::Destructive,
                StatementType::Unknown,
                "Empty SQL statement",
            ));
        };

        let (level, stmt_type) = if rest.is_empty() {
            classify_statement(first)
        } else {
            let (level, stmt_type) = statements
                .iter()
                .map(classify_statement)
                .max_by_key(|(level, _)| *level)
                .unwrap_or((SafetyLevel::Destructive, StatementType::Unknown));
            (level, StatementType::Multiple(Box::new(stmt_type)))
        };

        let result = if level == SafetyLevel::Destructive {
            ClassificationResult::with_warning(level, stmt_type, "This action cannot be undone.")
        } else {
            ClassificationResult::new(level, stmt_type)
        };
        Ok(result)
    }
}

/// Convenience function to classify SQL without creating a classifier instance.
pub fn classify_sql(sql: &str) -> ClassificationResult {
    SqlClassifier::new().classify(sql)
}

/// Keeps whichever classification is more dangerous.
fn most_dangerous(
    a: (SafetyLevel, StatementType),
    b: (SafetyLevel, StatementType),
) -> (SafetyLevel, StatementType) {
    if b.0 > a.0 {
        b
    } else {
        a
    }
}

/// Classifies a single parsed statement.
fn classify_statement(statement: &Statement) -> (SafetyLevel, StatementType) {
    match statement {
        // Query: may contain data-modifying CTEs, so recurse
        Statement::Query(query) => classify_query(query),
        Statement::Explain {
            analyze, statement, ..
        } => {
            if *analyze {
                // EXPLAIN ANALYZE runs the statement
                let (inner_level, _) = classify_statement(statement);
                (inner_level, StatementType::Explain)
            } else {
                (SafetyLevel::Safe, StatementType::Explain)
            }
        }
        Statement::ShowVariable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowCreate { .. } => (SafetyLevel::Safe, StatementType::Show),

        Statement::Insert(_) => (SafetyLevel::Mutating, StatementType::Insert),
        Statement::Update { .. } => (SafetyLevel::Mutating, StatementType::Update),

        Statement::Delete(_) => (SafetyLevel::Destructive, StatementType::Delete),
        Statement::Drop { .. } => (SafetyLevel::Destructive, StatementType::Drop),
        Statement::Truncate { .. } => (SafetyLevel::Destructive, StatementType::Truncate),

        // Conservative default: treat everything else as destructive
        _ => (SafetyLevel::Destructive, StatementType::Unknown),
    }
}

/// Classifies a Query by recursively inspecting for data-modifying operations.
fn classify_query(query: &Query) -> (SafetyLevel, StatementType) {
    let ctes = query
        .with
        .iter()
        .flat_map(|with| with.cte_tables.iter())
        .map(|cte| classify_query(&cte.query));

    ctes.fold(classify_set_expr(&query.body), most_dangerous)
}

/// Classifies a SetExpr, detecting mutations and recursing into nested queries.
#[allow(unreachable_patterns)]
fn classify_set_expr(set_expr: &SetExpr) -> (SafetyLevel, StatementType) {
    match set_expr {
        SetExpr::Insert(stmt) | SetExpr::Update(stmt) => classify_statement(stmt),
        SetExpr::Query(query) => classify_query(query),
        SetExpr::Select(select) => classify_select(select),
        SetExpr::SetOperation { left, right, .. } => {
            most_dangerous(classify_set_expr(left), classify_set_expr(right))
        }
        SetExpr::Values(_) | SetExpr::Table(_) => (SafetyLevel::Safe, StatementType::Select),
        _ => (SafetyLevel::Destructive, StatementType::Unknown),
    }
}

/// Classifies a Select by checking its FROM clause for subqueries.
fn classify_select(select: &Select) -> (SafetyLevel, StatementType) {
    select
        .from
        .iter()
        .map(classify_table_with_joins)
        .fold((SafetyLevel::Safe, StatementType::Select), most_dangerous)
}

/// Classifies a TableWithJoins, checking the main relation and all joins.
fn classify_table_with_joins(twj: &TableWithJoins) -> (SafetyLevel, StatementType) {
    twj.joins
        .iter()
        .map(|join| classify_table_factor(&join.relation))
        .fold(classify_table_factor(&twj.relation), most_dangerous)
}

/// Classifies a TableFactor, recursing into derived tables (subqueries).
fn classify_table_factor(factor: &TableFactor) -> (SafetyLevel, StatementType) {
    match factor {
        TableFactor::Derived { subquery, .. } => classify_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => classify_table_with_joins(table_with_joins),
        _ => (SafetyLevel::Safe, StatementType::Select),
    }
}
