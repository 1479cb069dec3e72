//! Common test utilities and helpers for logstat tests
//!
//! This module provides a builder for raw log lines and a helper that writes
//! lines to a temporary log file.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::io::Write;
use tempfile::NamedTempFile;

/// Builder for raw `[timestamp]\t{json}` log lines
pub struct LogLineBuilder {
    timestamp: DateTime<Utc>,
    fields: Map<String, Value>,
}

impl LogLineBuilder {
    /// Create a builder at 2021-07-25T21:00:00Z, which is 2021-07-26 06:00 at +9
    pub fn new() -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2021, 7, 25, 21, 0, 0).unwrap(),
            fields: Map::new(),
        }
    }

    pub fn at(mut self, year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        self.timestamp = Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap();
        self
    }

    /// Shift the timestamp by whole seconds
    pub fn plus_secs(mut self, secs: i64) -> Self {
        self.timestamp += chrono::Duration::seconds(secs);
        self
    }

    pub fn session(self, id: &str) -> Self {
        self.field("sessionId", Value::from(id))
    }

    pub fn log_type(self, log_type: &str) -> Self {
        self.field("logType", Value::from(log_type))
    }

    pub fn valid(self) -> Self {
        self.field("sessionIsValid", Value::from("1"))
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Build the raw line
    pub fn build(self) -> String {
        format!(
            "[{}]\t{}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            Value::Object(self.fields)
        )
    }
}

impl Default for LogLineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write lines to a temporary log file
#[allow(dead_code)]
pub fn write_log_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}
