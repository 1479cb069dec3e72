//! Terminal output formatting for logstat
//!
//! This crate provides table and JSON output formatters for aggregate
//! results and per-session listings.

pub mod output;

pub use output::{ColumnToggles, JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
