//! Outland Reports - quarterly trend reports for the Outland Adventures database.
//!
//! This library exposes the core modules for the `outland` binary and for
//! integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod quarter;
pub mod render;
pub mod report;
pub mod safety;
