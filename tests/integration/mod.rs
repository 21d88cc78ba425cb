//! Integration tests for outland-reports.

pub mod mysql_test;
pub mod report_test;
