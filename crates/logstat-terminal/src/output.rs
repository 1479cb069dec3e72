//! Output formatting module for logstat
//!
//! This module provides formatters for displaying aggregate results:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! Column groups (state changes, user actions) and the valid-session `ACTIVE`
//! row can be switched off with [`ColumnToggles`]; both formatters honour them.
//!
//! # Examples
//!
//! ```
//! use logstat_core::Pipeline;
//! use logstat_terminal::output::{ColumnToggles, get_formatter};
//! use std::time::Duration;
//!
//! let lines = [
//!     "[2021-07-25T21:00:00.000Z]\t{\"sessionId\":\"S1\",\"logType\":\"userAction\"}",
//! ];
//! let report = Pipeline::new("20210726".parse().unwrap()).run(&lines);
//!
//! let formatter = get_formatter(false, ColumnToggles::default());
//! let table = formatter.format_aggregate(&report, Duration::from_millis(12));
//! assert!(table.contains("ALL"));
//! assert!(table.contains("Time: 0.0120s"));
//! ```

use logstat_core::aggregation_types::{AggregateReport, PopulationStats, SessionStats};
use logstat_core::types::display_session_key;
use prettytable::{Cell, Row, Table, format};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Which optional parts of the report to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnToggles {
    /// Show the valid-session (`ACTIVE`) row
    pub active: bool,
    /// Show state-change columns
    pub state: bool,
    /// Show user-action columns
    pub action: bool,
}

impl Default for ColumnToggles {
    fn default() -> Self {
        Self {
            active: true,
            state: true,
            action: true,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the fleet-wide statistics and the elapsed run time
    fn format_aggregate(&self, report: &AggregateReport, elapsed: Duration) -> String;

    /// Format per-session figures
    fn format_sessions(&self, sessions: &[SessionStats]) -> String;

    /// Format a whole run: the per-session listing when requested, then the aggregate
    fn format_report(
        &self,
        report: &AggregateReport,
        elapsed: Duration,
        with_sessions: bool,
    ) -> String {
        let aggregate = self.format_aggregate(report, elapsed);
        if with_sessions {
            format!("{}\n{}", self.format_sessions(&report.sessions), aggregate)
        } else {
            aggregate
        }
    }
}

/// Table formatter for human-readable output
///
/// Produces fixed-width ASCII tables suitable for terminal display.
pub struct TableFormatter {
    toggles: ColumnToggles,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(toggles: ColumnToggles) -> Self {
        Self { toggles }
    }

    fn format_count(n: usize) -> String {
        n.to_string()
    }

    fn format_decimal(value: f64) -> String {
        format!("{value:.1}")
    }

    fn header(text: &str) -> Cell {
        Cell::new(text).style_spec("b")
    }

    fn group_header(text: &str) -> Cell {
        Cell::new(text).style_spec("bc").with_hspan(2)
    }

    fn population_row(&self, label: &str, stats: &PopulationStats) -> Row {
        let mut cells = vec![
            Cell::new(label).style_spec("b"),
            Cell::new(&Self::format_count(stats.session_count)).style_spec("r"),
            Cell::new(&Self::format_decimal(stats.duration_avg)).style_spec("r"),
        ];
        if self.toggles.state {
            cells.push(Cell::new(&Self::format_count(stats.change_state_count)).style_spec("r"));
            cells.push(Cell::new(&Self::format_decimal(stats.change_state_avg)).style_spec("r"));
        }
        if self.toggles.action {
            cells.push(Cell::new(&Self::format_count(stats.user_action_count)).style_spec("r"));
            cells.push(Cell::new(&Self::format_decimal(stats.user_action_avg)).style_spec("r"));
        }
        Row::new(cells)
    }
}

impl OutputFormatter for TableFormatter {
    fn format_aggregate(&self, report: &AggregateReport, elapsed: Duration) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_DEFAULT);

        let mut groups = vec![Cell::new(""), Self::group_header("SESSION")];
        let mut columns = vec![
            Cell::new(""),
            Self::header("COUNT"),
            Self::header("TIME(sec)"),
        ];
        if self.toggles.state {
            groups.push(Self::group_header("STATE"));
            columns.extend([Self::header("COUNT"), Self::header("AVG")]);
        }
        if self.toggles.action {
            groups.push(Self::group_header("ACTION"));
            columns.extend([Self::header("COUNT"), Self::header("AVG")]);
        }

        table.set_titles(Row::new(groups));
        table.add_row(Row::new(columns));
        table.add_row(self.population_row("ALL", &report.result.all));
        if self.toggles.active {
            table.add_row(self.population_row("ACTIVE", &report.result.valid));
        }

        format!("{}Time: {:.4}s\n", table, elapsed.as_secs_f64())
    }

    fn format_sessions(&self, sessions: &[SessionStats]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        let mut titles = vec![
            Self::header("Session ID"),
            Self::header("Start"),
            Self::header("End"),
            Self::header("Records"),
            Self::header("Duration(sec)"),
        ];
        if self.toggles.state {
            titles.push(Self::header("State"));
        }
        if self.toggles.action {
            titles.push(Self::header("Action"));
        }
        if self.toggles.active {
            titles.push(Self::header("Active(sec)"));
        }
        table.set_titles(Row::new(titles));

        for session in sessions {
            let mut cells = vec![
                Cell::new(display_session_key(&session.session_id)),
                Cell::new(&session.start_time.format("%H:%M:%S%.3f")),
                Cell::new(&session.end_time.format("%H:%M:%S%.3f")),
                Cell::new(&Self::format_count(session.record_count)).style_spec("r"),
                Cell::new(&Self::format_decimal(session.duration_secs)).style_spec("r"),
            ];
            if self.toggles.state {
                cells.push(
                    Cell::new(&Self::format_count(session.change_state_count)).style_spec("r"),
                );
            }
            if self.toggles.action {
                cells.push(
                    Cell::new(&Self::format_count(session.user_action_count)).style_spec("r"),
                );
            }
            if self.toggles.active {
                let active = session
                    .valid
                    .map_or_else(|| "-".to_string(), |v| Self::format_decimal(v.duration_secs));
                cells.push(Cell::new(&active).style_spec("r"));
            }
            table.add_row(Row::new(cells));
        }

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    toggles: ColumnToggles,
}

impl JsonFormatter {
    /// Create a new JsonFormatter
    pub fn new(toggles: ColumnToggles) -> Self {
        Self { toggles }
    }

    fn population(&self, stats: &PopulationStats) -> Value {
        let mut object = Map::new();
        object.insert("session_count".into(), json!(stats.session_count));
        object.insert("duration_avg".into(), json!(stats.duration_avg));
        if self.toggles.state {
            object.insert(
                "change_state".into(),
                json!({ "count": stats.change_state_count, "avg": stats.change_state_avg }),
            );
        }
        if self.toggles.action {
            object.insert(
                "user_action".into(),
                json!({ "count": stats.user_action_count, "avg": stats.user_action_avg }),
            );
        }
        Value::Object(object)
    }

    fn aggregate_value(&self, report: &AggregateReport, elapsed: Duration) -> Value {
        let mut output = json!({
            "date": report.target_date.to_string(),
            "all": self.population(&report.result.all),
            "parse_stats": report.parse_stats,
            "elapsed_seconds": elapsed.as_secs_f64(),
        });
        if self.toggles.active {
            output["active"] = self.population(&report.result.valid);
        }
        output
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_aggregate(&self, report: &AggregateReport, elapsed: Duration) -> String {
        serde_json::to_string_pretty(&self.aggregate_value(report, elapsed)).unwrap_or_default()
    }

    fn format_sessions(&self, sessions: &[SessionStats]) -> String {
        let output = json!({ "sessions": sessions });
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    /// One JSON document, with a `sessions` key when requested
    fn format_report(
        &self,
        report: &AggregateReport,
        elapsed: Duration,
        with_sessions: bool,
    ) -> String {
        let mut output = self.aggregate_value(report, elapsed);
        if with_sessions {
            output["sessions"] = json!(report.sessions);
        }
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }
}

/// Get an output formatter
pub fn get_formatter(json: bool, toggles: ColumnToggles) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter::new(toggles))
    } else {
        Box::new(TableFormatter::new(toggles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logstat_core::Pipeline;

    fn sample_report() -> AggregateReport {
        let lines = [
            "[2021-07-25T21:00:00.000Z]\t{\"sessionId\":\"S1\",\"logType\":\"startValidSession\",\"sessionIsValid\":\"1\"}",
            "[2021-07-25T21:00:30.000Z]\t{\"sessionId\":\"S1\",\"logType\":\"userAction\",\"sessionIsValid\":\"1\"}",
            "[2021-07-25T22:00:00.000Z]\t{\"sessionId\":\"S2\",\"logType\":\"changeState\"}",
            "[2021-07-25T22:01:00.000Z]\t{\"sessionId\":\"S2\",\"logType\":\"changeState\"}",
            "malformed",
        ];
        Pipeline::new("20210726".parse().unwrap()).run(&lines)
    }

    fn toggles(active: bool, state: bool, action: bool) -> ColumnToggles {
        ColumnToggles {
            active,
            state,
            action,
        }
    }

    #[test]
    fn test_table_all_columns() {
        let formatter = TableFormatter::new(ColumnToggles::default());
        let output = formatter.format_aggregate(&sample_report(), Duration::from_millis(1500));

        for expected in [
            "SESSION", "STATE", "ACTION", "COUNT", "TIME(sec)", "AVG", "ALL", "ACTIVE",
        ] {
            assert!(output.contains(expected), "missing {expected} in\n{output}");
        }
        // ALL: 2 sessions, (30 + 60) / 2 = 45.0 seconds
        assert!(output.contains("45.0"));
        assert!(output.ends_with("Time: 1.5000s\n"));
    }

    #[test]
    fn test_table_toggles_hide_columns_and_rows() {
        let formatter = TableFormatter::new(toggles(false, false, true));
        let output = formatter.format_aggregate(&sample_report(), Duration::ZERO);

        assert!(output.contains("ACTION"));
        assert!(!output.contains("STATE"));
        assert!(!output.contains("ACTIVE"));
        assert!(output.contains("ALL"));
        assert!(output.contains("Time: 0.0000s"));
    }

    #[test]
    fn test_table_sessions() {
        let report = sample_report();
        let formatter = TableFormatter::new(ColumnToggles::default());
        let output = formatter.format_sessions(&report.sessions);

        assert!(output.contains("Session ID"));
        assert!(output.contains("S1"));
        assert!(output.contains("S2"));
        assert!(output.contains("06:00:00.000"));
        assert!(output.contains("60.0"));
    }

    #[test]
    fn test_json_aggregate() {
        let formatter = JsonFormatter::new(ColumnToggles::default());
        let output = formatter.format_aggregate(&sample_report(), Duration::from_millis(250));
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["date"], "20210726");
        assert_eq!(value["all"]["session_count"], 2);
        assert_eq!(value["all"]["duration_avg"], 45.0);
        assert_eq!(value["all"]["change_state"]["count"], 2);
        assert_eq!(value["all"]["user_action"]["avg"], 0.5);
        assert_eq!(value["active"]["session_count"], 1);
        assert_eq!(value["active"]["duration_avg"], 30.0);
        assert_eq!(value["parse_stats"]["missing_tab"], 1);
        assert_eq!(value["elapsed_seconds"], 0.25);
    }

    #[test]
    fn test_json_toggles() {
        let formatter = JsonFormatter::new(toggles(false, true, false));
        let output = formatter.format_aggregate(&sample_report(), Duration::ZERO);
        let value: Value = serde_json::from_str(&output).unwrap();

        assert!(value.get("active").is_none());
        assert!(value["all"].get("change_state").is_some());
        assert!(value["all"].get("user_action").is_none());
    }

    #[test]
    fn test_json_sessions() {
        let report = sample_report();
        let formatter = JsonFormatter::new(ColumnToggles::default());
        let value: Value =
            serde_json::from_str(&formatter.format_sessions(&report.sessions)).unwrap();

        let sessions = value["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0]["session_id"], "S1");
        assert_eq!(sessions[0]["valid"]["duration_secs"], 30.0);
        assert!(sessions[1].get("valid").is_none());
    }

    #[test]
    fn test_json_report_is_a_single_document() {
        let report = sample_report();
        let formatter = JsonFormatter::new(ColumnToggles::default());

        let output = formatter.format_report(&report, Duration::from_millis(250), true);
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["all"]["session_count"], 2);
        assert_eq!(value["sessions"].as_array().unwrap().len(), 2);
        assert_eq!(value["sessions"][0]["session_id"], "S1");

        let output = formatter.format_report(&report, Duration::ZERO, false);
        let value: Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("sessions").is_none());
    }

    #[test]
    fn test_table_report_lists_sessions_before_aggregate() {
        let report = sample_report();
        let formatter = TableFormatter::new(ColumnToggles::default());

        let output = formatter.format_report(&report, Duration::ZERO, true);
        let sessions_at = output.find("Session ID").unwrap();
        let aggregate_at = output.find("SESSION").unwrap();
        assert!(sessions_at < aggregate_at);
        assert!(output.ends_with("Time: 0.0000s\n"));

        let output = formatter.format_report(&report, Duration::ZERO, false);
        assert!(!output.contains("Session ID"));
    }

    #[test]
    fn test_get_formatter() {
        let report = sample_report();
        let json = get_formatter(true, ColumnToggles::default());
        assert!(json.format_aggregate(&report, Duration::ZERO).starts_with('{'));

        let table = get_formatter(false, ColumnToggles::default());
        assert!(table.format_aggregate(&report, Duration::ZERO).starts_with('+'));
    }
}
