//! Log line parser
//!
//! Each line of the log has the shape `<timestamp>\t<json-object>`:
//!
//! ```text
//! [2021-07-25T21:46:39.549Z]	{"logType":"startSession","sessionId":"722972664639320","sessionIsValid":"0"}
//! ```
//!
//! Lines that cannot be parsed, or that fall outside the target date, are
//! dropped without surfacing an error. Every drop is tallied in [`ParseStats`]
//! so callers can tell how much of the input was discarded.
//!
//! # Examples
//!
//! ```
//! use logstat_core::parser::{LineOutcome, LogRecordParser, SkipReason};
//!
//! let parser = LogRecordParser::new("20210726".parse().unwrap());
//!
//! let line = "[2021-07-25T21:46:39.549Z]\t{\"logType\":\"userAction\",\"sessionId\":\"S1\"}";
//! assert!(matches!(parser.parse_line(line), LineOutcome::Record(_)));
//!
//! let other_day = "[2021-07-25T01:00:00.000Z]\t{\"sessionId\":\"S1\"}";
//! assert_eq!(
//!     parser.parse_line(other_day),
//!     LineOutcome::Skipped(SkipReason::OtherDate)
//! );
//! ```

use crate::timezone::TimestampConverter;
use crate::types::{LogRecord, TargetDate};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

/// Why a line produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Empty or whitespace-only line
    Blank,
    /// No tab separating timestamp and payload
    MissingTab,
    /// Timestamp did not match the expected format
    InvalidTimestamp,
    /// Local date differs from the target date
    OtherDate,
    /// Payload is not a JSON object
    InvalidPayload,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "blank"),
            Self::MissingTab => write!(f, "missing tab"),
            Self::InvalidTimestamp => write!(f, "invalid timestamp"),
            Self::OtherDate => write!(f, "other date"),
            Self::InvalidPayload => write!(f, "invalid payload"),
        }
    }
}

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The line produced a record for the target date
    Record(LogRecord),
    /// The line was dropped
    Skipped(SkipReason),
}

/// Line counts collected while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Lines read, including blank ones
    pub lines_read: usize,
    /// Lines that produced a record
    pub records: usize,
    /// Empty or whitespace-only lines
    pub blank: usize,
    /// Lines without a tab separator
    pub missing_tab: usize,
    /// Lines with an unparseable timestamp
    pub invalid_timestamp: usize,
    /// Well-formed lines for another local date
    pub other_date: usize,
    /// Lines whose payload is not a JSON object
    pub invalid_payload: usize,
}

impl ParseStats {
    /// Tally one outcome
    pub fn record(&mut self, outcome: &LineOutcome) {
        self.lines_read += 1;
        match outcome {
            LineOutcome::Record(_) => self.records += 1,
            LineOutcome::Skipped(SkipReason::Blank) => self.blank += 1,
            LineOutcome::Skipped(SkipReason::MissingTab) => self.missing_tab += 1,
            LineOutcome::Skipped(SkipReason::InvalidTimestamp) => self.invalid_timestamp += 1,
            LineOutcome::Skipped(SkipReason::OtherDate) => self.other_date += 1,
            LineOutcome::Skipped(SkipReason::InvalidPayload) => self.invalid_payload += 1,
        }
    }

    /// Malformed lines; blank lines and other-date lines are not counted
    pub fn malformed(&self) -> usize {
        self.missing_tab + self.invalid_timestamp + self.invalid_payload
    }

    /// Non-blank lines that produced no record
    pub fn dropped(&self) -> usize {
        self.malformed() + self.other_date
    }

    /// Combine counts from two partial runs
    pub fn merge(self, other: Self) -> Self {
        Self {
            lines_read: self.lines_read + other.lines_read,
            records: self.records + other.records,
            blank: self.blank + other.blank,
            missing_tab: self.missing_tab + other.missing_tab,
            invalid_timestamp: self.invalid_timestamp + other.invalid_timestamp,
            other_date: self.other_date + other.other_date,
            invalid_payload: self.invalid_payload + other.invalid_payload,
        }
    }
}

/// Turns raw log lines into [`LogRecord`]s for one target date
#[derive(Debug, Clone)]
pub struct LogRecordParser {
    target_date: TargetDate,
    converter: TimestampConverter,
}

impl LogRecordParser {
    /// Create a parser using the default +09:00 converter
    pub fn new(target_date: TargetDate) -> Self {
        Self {
            target_date,
            converter: TimestampConverter::default(),
        }
    }

    /// Use a different timestamp converter
    pub fn with_converter(mut self, converter: TimestampConverter) -> Self {
        self.converter = converter;
        self
    }

    /// The date records must fall on
    pub fn target_date(&self) -> TargetDate {
        self.target_date
    }

    /// Parse a single line
    pub fn parse_line(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Skipped(SkipReason::Blank);
        }

        let Some((stamp, payload)) = line.split_once('\t') else {
            trace!("Skipping line without tab separator");
            return LineOutcome::Skipped(SkipReason::MissingTab);
        };

        let timestamp = match self.converter.convert(stamp) {
            Ok(ts) => ts,
            Err(e) => {
                trace!("Skipping line: {}", e);
                return LineOutcome::Skipped(SkipReason::InvalidTimestamp);
            }
        };

        if !self.target_date.matches(&timestamp) {
            return LineOutcome::Skipped(SkipReason::OtherDate);
        }

        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(serde_json::Value::Object(fields)) => {
                LineOutcome::Record(LogRecord::from_payload(timestamp, fields))
            }
            Ok(_) => {
                trace!("Skipping line: payload is not a JSON object");
                LineOutcome::Skipped(SkipReason::InvalidPayload)
            }
            Err(e) => {
                trace!("Skipping line: invalid JSON payload: {}", e);
                LineOutcome::Skipped(SkipReason::InvalidPayload)
            }
        }
    }

    /// Parse all lines in order, keeping records for the target date
    pub fn parse_lines<I, S>(&self, lines: I) -> (Vec<LogRecord>, ParseStats)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = ParseStats::default();
        let mut records = Vec::new();

        for line in lines {
            let outcome = self.parse_line(line.as_ref());
            stats.record(&outcome);
            if let LineOutcome::Record(record) = outcome {
                records.push(record);
            }
        }

        Self::log_stats(&stats);
        (records, stats)
    }

    /// Parse all lines on the rayon pool.
    ///
    /// Produces the same records, in the same order, as [`parse_lines`](Self::parse_lines).
    pub fn parse_lines_parallel<S>(&self, lines: &[S]) -> (Vec<LogRecord>, ParseStats)
    where
        S: AsRef<str> + Sync,
    {
        let outcomes: Vec<LineOutcome> = lines
            .par_iter()
            .map(|line| self.parse_line(line.as_ref()))
            .collect();

        let stats = outcomes
            .par_iter()
            .fold(ParseStats::default, |mut stats, outcome| {
                stats.record(outcome);
                stats
            })
            .reduce(ParseStats::default, ParseStats::merge);

        let records: Vec<LogRecord> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                LineOutcome::Record(record) => Some(record),
                LineOutcome::Skipped(_) => None,
            })
            .collect();

        Self::log_stats(&stats);
        (records, stats)
    }

    fn log_stats(stats: &ParseStats) {
        debug!(
            "Parsed {} lines: {} records, {} other date, {} malformed, {} blank",
            stats.lines_read,
            stats.records,
            stats.other_date,
            stats.malformed(),
            stats.blank
        );
    }
}
