//! Aggregation data types for logstat
//!
//! Pure data structures describing computed statistics. These types have no
//! dependencies on the parser or the calculator.

use crate::parser::ParseStats;
use crate::types::{LocalTimestamp, SessionKey, TargetDate};
use serde::{Serialize, Serializer};

/// Statistics for one session population (all sessions, or valid sessions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PopulationStats {
    /// Number of sessions
    pub session_count: usize,
    /// Mean session duration in seconds
    pub duration_avg: f64,
    /// Number of `changeState` events
    pub change_state_count: usize,
    /// `changeState` events per session
    pub change_state_avg: f64,
    /// Number of `userAction` events
    pub user_action_count: usize,
    /// `userAction` events per session
    pub user_action_avg: f64,
}

/// Running sums for one population, finished into [`PopulationStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationTotals {
    /// Sessions seen
    pub sessions: usize,
    /// Sum of session durations in seconds
    pub duration_sum: f64,
    /// `changeState` events seen
    pub change_state: usize,
    /// `userAction` events seen
    pub user_action: usize,
}

impl PopulationTotals {
    /// Add one session's figures
    pub fn add_session(self, duration: f64, change_state: usize, user_action: usize) -> Self {
        Self {
            sessions: self.sessions + 1,
            duration_sum: self.duration_sum + duration,
            change_state: self.change_state + change_state,
            user_action: self.user_action + user_action,
        }
    }

    /// Compute averages; every average is 0.0 for an empty population
    pub fn finish(self) -> PopulationStats {
        PopulationStats {
            session_count: self.sessions,
            duration_avg: average(self.duration_sum, self.sessions),
            change_state_count: self.change_state,
            change_state_avg: average(self.change_state as f64, self.sessions),
            user_action_count: self.user_action,
            user_action_avg: average(self.user_action as f64, self.sessions),
        }
    }
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// Fleet-wide statistics for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Every session
    pub all: PopulationStats,
    /// Sessions with at least one `sessionIsValid == "1"` record, counting only those records
    pub valid: PopulationStats,
}

/// Figures for the valid part of one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidSessionStats {
    /// Records flagged valid
    pub record_count: usize,
    /// `startValidSession` time, or the earliest valid record
    pub start_time: LocalTimestamp,
    /// Latest valid record
    pub end_time: LocalTimestamp,
    /// `end_time - start_time` in seconds
    pub duration_secs: f64,
    /// `changeState` events among valid records
    pub change_state_count: usize,
    /// `userAction` events among valid records
    pub user_action_count: usize,
}

/// Per-session figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    /// Session key
    pub session_id: SessionKey,
    /// Records in the session
    pub record_count: usize,
    /// Earliest record
    pub start_time: LocalTimestamp,
    /// Latest record
    pub end_time: LocalTimestamp,
    /// `end_time - start_time` in seconds
    pub duration_secs: f64,
    /// `changeState` events
    pub change_state_count: usize,
    /// `userAction` events
    pub user_action_count: usize,
    /// Valid-part figures, present only for valid sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<ValidSessionStats>,
}

/// Everything a run produces, handed to the output formatters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// Date that was aggregated
    #[serde(serialize_with = "serialize_target_date")]
    pub target_date: TargetDate,
    /// Fleet-wide statistics
    pub result: AggregateResult,
    /// Line accounting from the parser
    pub parse_stats: ParseStats,
    /// Per-session figures in first-seen order
    pub sessions: Vec<SessionStats>,
}

fn serialize_target_date<S: Serializer>(
    date: &TargetDate,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_population_averages_are_zero() {
        let stats = PopulationTotals::default().finish();
        assert_eq!(stats, PopulationStats::default());
        assert_eq!(stats.duration_avg, 0.0);
        assert_eq!(stats.change_state_avg, 0.0);
        assert_eq!(stats.user_action_avg, 0.0);
    }

    #[test]
    fn test_population_averages() {
        let stats = PopulationTotals::default()
            .add_session(30.0, 2, 1)
            .add_session(90.0, 1, 0)
            .finish();

        assert_eq!(stats.session_count, 2);
        assert_eq!(stats.duration_avg, 60.0);
        assert_eq!(stats.change_state_count, 3);
        assert_eq!(stats.change_state_avg, 1.5);
        assert_eq!(stats.user_action_count, 1);
        assert_eq!(stats.user_action_avg, 0.5);
    }

    #[test]
    fn test_negative_durations_propagate() {
        let stats = PopulationTotals::default()
            .add_session(-10.0, 0, 0)
            .finish();
        assert_eq!(stats.duration_avg, -10.0);
    }
}
