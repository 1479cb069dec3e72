//! Core types and the aggregation pipeline for logstat
//!
//! This crate turns one day of `<timestamp>\t<json>` log lines into session
//! statistics. It performs no I/O: fetching and presentation live in the
//! `logstat-fetch` and `logstat-terminal` crates.

pub mod aggregation;
pub mod aggregation_types;
pub mod error;
pub mod grouping;
pub mod parser;
pub mod pipeline;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use aggregation_types::{AggregateReport, AggregateResult, PopulationStats, SessionStats};
pub use error::{LogstatError, Result};
pub use pipeline::{Pipeline, aggregate};
pub use types::{LocalTimestamp, LogRecord, Session, SessionId, TargetDate};
