//! Session grouping
//!
//! Buckets parsed records into sessions keyed by `sessionId`. Records keep
//! the order they were read in, and sessions iterate in first-seen order so
//! that output built from the map is deterministic.

use crate::types::{LogRecord, Session, SessionKey};
use std::collections::HashMap;
use tracing::debug;

/// Sessions keyed by session ID, iterated in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMap {
    sessions: Vec<Session>,
    index: HashMap<SessionKey, usize>,
}

impl SessionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its session, creating the session on first sight
    pub fn insert(&mut self, record: LogRecord) {
        match self.index.get(&record.session_id) {
            Some(&pos) => self.sessions[pos].records.push(record),
            None => {
                self.index
                    .insert(record.session_id.clone(), self.sessions.len());
                self.sessions.push(Session::new(record));
            }
        }
    }

    /// Look up a session by key
    pub fn get(&self, key: &SessionKey) -> Option<&Session> {
        self.index.get(key).map(|&pos| &self.sessions[pos])
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session was found
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    /// Total records across all sessions
    pub fn record_count(&self) -> usize {
        self.sessions.iter().map(|s| s.records.len()).sum()
    }
}

impl Extend<LogRecord> for SessionMap {
    fn extend<T: IntoIterator<Item = LogRecord>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<LogRecord> for SessionMap {
    fn from_iter<T: IntoIterator<Item = LogRecord>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a> IntoIterator for &'a SessionMap {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

/// Groups date-filtered records into sessions
pub struct SessionGrouper;

impl SessionGrouper {
    /// Group records by session ID, preserving input order within each session
    pub fn group(records: impl IntoIterator<Item = LogRecord>) -> SessionMap {
        let map: SessionMap = records.into_iter().collect();
        debug!(
            "Grouped {} records into {} sessions",
            map.record_count(),
            map.len()
        );
        map
    }
}
