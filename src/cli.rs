//! CLI interface for logstat
//!
//! This module defines the command-line interface using clap. A run takes one
//! log source and one target date, and prints the statistics for that day.
//!
//! # Example
//!
//! ```bash
//! # Aggregate a remote log for 26 July 2021
//! logstat --url https://logs.example.com/app.log --date 20210726
//!
//! # Only the user-action columns, as JSON
//! logstat --url ./app.log --date 20210726 --state off --active off --json
//! ```

use clap::{Parser, ValueEnum};
use logstat_core::TargetDate;
use logstat_terminal::ColumnToggles;
use std::time::Duration;

/// On/off switch for an output section
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    /// Whether the section is shown
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

/// Aggregate session statistics from a one-day event log
#[derive(Parser, Debug, Clone)]
#[command(name = "logstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log source: an http(s) URL, a `file://` URL or a local path
    #[arg(long, env = "LOGSTAT_URL")]
    pub url: String,

    /// Day to aggregate, as YYYYMMDD in the local offset
    #[arg(long, env = "LOGSTAT_DATE", value_parser = parse_target_date)]
    pub date: TargetDate,

    /// Show the row for valid sessions
    #[arg(long, value_enum, default_value = "on")]
    pub active: Switch,

    /// Show state-change columns
    #[arg(long, value_enum, default_value = "on")]
    pub state: Switch,

    /// Show user-action columns
    #[arg(long, value_enum, default_value = "on")]
    pub action: Switch,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also list per-session statistics
    #[arg(long)]
    pub sessions: bool,

    /// Parse lines on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Hours added to UTC timestamps before date matching
    #[arg(
        long,
        default_value_t = logstat_core::timezone::DEFAULT_OFFSET_HOURS,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-23..=23)
    )]
    pub utc_offset: i32,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Show debug output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Output sections selected by the on/off flags
    pub fn toggles(&self) -> ColumnToggles {
        ColumnToggles {
            active: self.active.is_on(),
            state: self.state.is_on(),
            action: self.action.is_on(),
        }
    }

    /// Fetch timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn parse_target_date(s: &str) -> Result<TargetDate, String> {
    s.parse::<TargetDate>().map_err(|e| e.to_string())
}
