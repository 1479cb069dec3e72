//! Metrics calculation over grouped sessions
//!
//! Two passes run over two populations:
//!
//! 1. **All sessions.** Every session contributes its duration (latest minus
//!    earliest timestamp, by time rather than by position) and its
//!    `changeState` / `userAction` counts. Sessions holding at least one
//!    record with `sessionIsValid == "1"` yield a [`ValidSession`] that keeps
//!    only those records.
//! 2. **Valid sessions.** Each valid session's duration runs from its
//!    `startValidSession` record (falling back to its earliest valid record)
//!    to its latest valid record. Event counts cover the valid records only.
//!
//! Both passes are folds into immutable totals. Averages over an empty
//! population are 0.0.
//!
//! # Examples
//!
//! ```
//! use logstat_core::aggregation::MetricsCalculator;
//! use logstat_core::grouping::SessionGrouper;
//! use logstat_core::parser::LogRecordParser;
//!
//! let lines = [
//!     "[2021-07-25T21:00:00.000Z]\t{\"sessionId\":\"S1\",\"logType\":\"startValidSession\",\"sessionIsValid\":\"1\"}",
//!     "[2021-07-25T21:00:30.000Z]\t{\"sessionId\":\"S1\",\"logType\":\"userAction\",\"sessionIsValid\":\"1\"}",
//! ];
//!
//! let parser = LogRecordParser::new("20210726".parse().unwrap());
//! let (records, _stats) = parser.parse_lines(lines);
//! let sessions = SessionGrouper::group(records);
//! let result = MetricsCalculator::calculate(&sessions);
//!
//! assert_eq!(result.all.session_count, 1);
//! assert_eq!(result.all.duration_avg, 30.0);
//! assert_eq!(result.valid.user_action_avg, 1.0);
//! ```

use crate::aggregation_types::{
    AggregateResult, PopulationStats, PopulationTotals, SessionStats, ValidSessionStats,
};
use crate::grouping::SessionMap;
use crate::types::{LocalTimestamp, LogRecord, Session, SessionKey, time_bounds};
use tracing::debug;

/// The valid part of a session: only its `sessionIsValid == "1"` records
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSession<'a> {
    /// Key of the originating session
    pub session_id: &'a SessionKey,
    /// Valid records in source order; never empty
    pub records: Vec<&'a LogRecord>,
}

impl<'a> ValidSession<'a> {
    /// Derive the valid part of a session, `None` if no record is flagged valid
    pub fn from_session(session: &'a Session) -> Option<Self> {
        let records: Vec<&LogRecord> = session.records.iter().filter(|r| r.is_valid()).collect();
        if records.is_empty() {
            return None;
        }

        Some(Self {
            session_id: &session.session_id,
            records,
        })
    }

    /// First `startValidSession` record's time, else the earliest record
    pub fn start_time(&self) -> Option<LocalTimestamp> {
        self.records
            .iter()
            .find(|r| r.is_start_valid_session())
            .map(|r| r.timestamp)
            .or_else(|| self.time_bounds().map(|(min, _)| min))
    }

    /// Latest record
    pub fn end_time(&self) -> Option<LocalTimestamp> {
        self.time_bounds().map(|(_, max)| max)
    }

    fn time_bounds(&self) -> Option<(LocalTimestamp, LocalTimestamp)> {
        time_bounds(self.records.iter().copied())
    }

    fn stats(&self) -> Option<ValidSessionStats> {
        let start_time = self.start_time()?;
        let end_time = self.end_time()?;
        let (change_state_count, user_action_count) = event_counts(self.records.iter().copied());

        Some(ValidSessionStats {
            record_count: self.records.len(),
            start_time,
            end_time,
            duration_secs: end_time.seconds_since(&start_time),
            change_state_count,
            user_action_count,
        })
    }
}

/// Count `changeState` and `userAction` records
fn event_counts<'a>(records: impl Iterator<Item = &'a LogRecord>) -> (usize, usize) {
    records.fold((0, 0), |(change_state, user_action), r| {
        (
            change_state + usize::from(r.is_change_state()),
            user_action + usize::from(r.is_user_action()),
        )
    })
}

/// Computes fleet-wide and valid-subset statistics from grouped sessions
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Run both aggregation passes
    pub fn calculate(sessions: &SessionMap) -> AggregateResult {
        let (all, valid_sessions) = Self::all_sessions_pass(sessions);
        let valid = Self::valid_sessions_pass(&valid_sessions);

        debug!(
            "Aggregated {} sessions ({} valid)",
            all.session_count, valid.session_count
        );

        AggregateResult { all, valid }
    }

    /// Statistics over every session, plus the valid sessions found on the way
    pub fn all_sessions_pass(sessions: &SessionMap) -> (PopulationStats, Vec<ValidSession<'_>>) {
        let mut valid_sessions = Vec::new();

        let totals = sessions
            .iter()
            .fold(PopulationTotals::default(), |totals, session| {
                if let Some(valid) = ValidSession::from_session(session) {
                    valid_sessions.push(valid);
                }

                let duration = session
                    .time_bounds()
                    .map_or(0.0, |(start, end)| end.seconds_since(&start));
                let (change_state, user_action) = event_counts(session.records.iter());
                totals.add_session(duration, change_state, user_action)
            });

        (totals.finish(), valid_sessions)
    }

    /// Statistics over the valid parts of valid sessions
    pub fn valid_sessions_pass(valid_sessions: &[ValidSession<'_>]) -> PopulationStats {
        valid_sessions
            .iter()
            .filter_map(ValidSession::stats)
            .fold(PopulationTotals::default(), |totals, stats| {
                totals.add_session(
                    stats.duration_secs,
                    stats.change_state_count,
                    stats.user_action_count,
                )
            })
            .finish()
    }

    /// Per-session figures in first-seen order
    pub fn session_stats(sessions: &SessionMap) -> Vec<SessionStats> {
        sessions
            .iter()
            .filter_map(|session| {
                let (start_time, end_time) = session.time_bounds()?;
                let (change_state_count, user_action_count) = event_counts(session.records.iter());

                Some(SessionStats {
                    session_id: session.session_id.clone(),
                    record_count: session.records.len(),
                    start_time,
                    end_time,
                    duration_secs: end_time.seconds_since(&start_time),
                    change_state_count,
                    user_action_count,
                    valid: ValidSession::from_session(session).and_then(|v| v.stats()),
                })
            })
            .collect()
    }
}
