//! Error types for logstat
//!
//! This module defines the error types used throughout the logstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Malformed log lines are never reported through these types: the parser
//! drops them and records the reason in [`ParseStats`](crate::parser::ParseStats).
//!
//! # Example
//!
//! ```
//! use logstat_core::error::{LogstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to LogstatError
//!     let _file = std::fs::read_to_string("nonexistent.log")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for logstat operations
#[derive(Error, Debug)]
pub enum LogstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid target date
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Timestamp did not match `[YYYY-MM-DDTHH:MM:SS.fffZ]`
    #[error("Invalid timestamp: {0}")]
    TimestampFormat(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The log server answered with a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Fetch {
        /// The requested URL
        url: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in logstat
pub type Result<T> = std::result::Result<T, LogstatError>;
