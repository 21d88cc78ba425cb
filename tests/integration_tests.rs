//! Integration tests for outland-reports.
//!
//! The report suite runs against in-memory databases. The MySQL suite needs a
//! running server: set the DATABASE_URL environment variable to run it.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
