//! Core domain types for logstat
//!
//! This module contains the fundamental types used throughout the logstat library:
//! session identifiers, local timestamps, the validated target date, and the
//! parsed log records that flow from the parser into the session grouper.

use crate::error::{LogstatError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `logType` of a state-change event
pub const LOG_TYPE_CHANGE_STATE: &str = "changeState";
/// `logType` of a user-action event
pub const LOG_TYPE_USER_ACTION: &str = "userAction";
/// `logType` marking the start of the valid part of a session
pub const LOG_TYPE_START_VALID_SESSION: &str = "startValidSession";
/// `sessionIsValid` value flagging a record as valid
pub const SESSION_VALID_FLAG: &str = "1";

/// Strongly-typed session ID wrapper
///
/// # Examples
/// ```
/// use logstat_core::types::SessionId;
///
/// let session = SessionId::new("722972664639320");
/// assert_eq!(session.as_str(), "722972664639320");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Grouping key for sessions.
///
/// Records without a `sessionId` field still form a session of their own,
/// keyed by `None`. An empty string is a distinct, present key.
pub type SessionKey = Option<SessionId>;

/// Render a session key for display
pub fn display_session_key(key: &SessionKey) -> &str {
    key.as_ref().map_or("(none)", SessionId::as_str)
}

/// Civil timestamp at the configured fixed offset
///
/// Produced by the [`TimestampConverter`](crate::timezone::TimestampConverter).
/// Ordering and differences follow the underlying instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalTimestamp(DateTime<FixedOffset>);

impl LocalTimestamp {
    /// Create a new LocalTimestamp
    pub fn new(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Local calendar date
    pub fn local_date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Seconds elapsed from `earlier` to `self`, negative when `earlier` is later
    pub fn seconds_since(&self, earlier: &LocalTimestamp) -> f64 {
        (self.0 - earlier.0).num_milliseconds() as f64 / 1000.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for LocalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Aggregation target date, written as `YYYYMMDD`
///
/// # Examples
/// ```
/// use logstat_core::types::TargetDate;
///
/// let date: TargetDate = "20210725".parse().unwrap();
/// assert_eq!(date.to_string(), "20210725");
/// assert!("2021-07-25".parse::<TargetDate>().is_err());
/// assert!("20210231".parse::<TargetDate>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    /// Create a new TargetDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Whether a local timestamp falls on this date
    pub fn matches(&self, ts: &LocalTimestamp) -> bool {
        ts.local_date() == self.0
    }
}

impl FromStr for TargetDate {
    type Err = LogstatError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LogstatError::InvalidDate(format!("'{s}'. Use YYYYMMDD format"));

        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year = s[0..4].parse::<i32>().map_err(|_| invalid())?;
        let month = s[4..6].parse::<u32>().map_err(|_| invalid())?;
        let day = s[6..8].parse::<u32>().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

/// One parsed log line
///
/// Immutable once built by the parser. The well-known payload fields are
/// lifted into typed optional fields; the full payload is kept in `raw_fields`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Timestamp converted to local time
    pub timestamp: LocalTimestamp,
    /// `sessionId` payload field
    pub session_id: SessionKey,
    /// `logType` payload field
    pub log_type: Option<String>,
    /// `sessionIsValid` payload field
    pub session_is_valid: Option<String>,
    /// Complete JSON payload
    pub raw_fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Build a record from a converted timestamp and a decoded payload object
    pub fn from_payload(
        timestamp: LocalTimestamp,
        raw_fields: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let field = |name: &str| {
            raw_fields
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        // Non-string ids key on their JSON text; `null` counts as absent
        let session_id = match raw_fields.get("sessionId") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(id)) => Some(SessionId::new(id.as_str())),
            Some(other) => Some(SessionId::new(other.to_string())),
        };

        Self {
            timestamp,
            session_id,
            log_type: field("logType"),
            session_is_valid: field("sessionIsValid"),
            raw_fields,
        }
    }

    /// Whether `logType` equals the given value
    pub fn has_log_type(&self, log_type: &str) -> bool {
        self.log_type.as_deref() == Some(log_type)
    }

    /// State-change event
    pub fn is_change_state(&self) -> bool {
        self.has_log_type(LOG_TYPE_CHANGE_STATE)
    }

    /// User-action event
    pub fn is_user_action(&self) -> bool {
        self.has_log_type(LOG_TYPE_USER_ACTION)
    }

    /// Marks the start of the valid part of a session
    pub fn is_start_valid_session(&self) -> bool {
        self.has_log_type(LOG_TYPE_START_VALID_SESSION)
    }

    /// Whether the record is flagged `sessionIsValid == "1"`
    pub fn is_valid(&self) -> bool {
        self.session_is_valid.as_deref() == Some(SESSION_VALID_FLAG)
    }
}

/// All records sharing a session key, in the order they were read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Session key shared by every record
    pub session_id: SessionKey,
    /// Records in source order; never empty
    pub records: Vec<LogRecord>,
}

impl Session {
    /// Start a session from its first record
    pub fn new(first: LogRecord) -> Self {
        Self {
            session_id: first.session_id.clone(),
            records: vec![first],
        }
    }

    /// Earliest and latest record timestamps
    pub fn time_bounds(&self) -> Option<(LocalTimestamp, LocalTimestamp)> {
        time_bounds(self.records.iter())
    }
}

/// Chronological bounds of a set of records, `None` when empty
pub(crate) fn time_bounds<'a>(
    records: impl Iterator<Item = &'a LogRecord>,
) -> Option<(LocalTimestamp, LocalTimestamp)> {
    records.map(|r| r.timestamp).fold(None, |bounds, ts| match bounds {
        None => Some((ts, ts)),
        Some((min, max)) => Some((min.min(ts), max.max(ts))),
    })
}
