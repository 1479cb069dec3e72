//! logstat - Aggregate session statistics from a one-day event log
//!
//! This library provides functionality to:
//! - Fetch a line-oriented event log over HTTP(S) or from a local file
//! - Parse timestamped JSON payload lines for a single local calendar day
//! - Group records by session and compute duration and event statistics
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use logstat::{Pipeline, fetch::{LogFetcher, fetcher_for}, timezone::TimestampConverter};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> logstat::Result<()> {
//!     let fetcher = fetcher_for("https://logs.example.com/app.log", Duration::from_secs(30))?;
//!     let lines = fetcher.fetch_lines().await?;
//!
//!     let report = Pipeline::new("20210726".parse()?)
//!         .with_converter(TimestampConverter::from_hours(9)?)
//!         .run(&lines);
//!     println!("{} sessions", report.result.all.session_count);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;

pub use logstat_core::{
    aggregation, aggregation_types, error, grouping, parser, pipeline, timezone, types,
};
pub use logstat_fetch as fetch;
pub use logstat_terminal::output;

// Re-export commonly used types
pub use logstat_core::{
    AggregateReport, AggregateResult, LogRecord, LogstatError, Pipeline, PopulationStats, Result,
    SessionId, SessionStats, TargetDate, aggregate,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
