//! End-to-end aggregation over an in-memory log
//!
//! Chains the parser, the session grouper and the metrics calculator. No file
//! or network access happens here; the caller supplies the fetched lines.

use crate::aggregation::MetricsCalculator;
use crate::aggregation_types::{AggregateReport, AggregateResult};
use crate::grouping::SessionGrouper;
use crate::parser::LogRecordParser;
use crate::timezone::TimestampConverter;
use crate::types::TargetDate;
use tracing::info;

/// Aggregate one day of log lines using the default +09:00 offset
///
/// # Examples
/// ```
/// use logstat_core::aggregate;
///
/// let lines = ["", "no tab here"];
/// let result = aggregate(&lines, &"20210726".parse().unwrap());
/// assert_eq!(result.all.session_count, 0);
/// assert_eq!(result.all.duration_avg, 0.0);
/// ```
pub fn aggregate<I, S>(lines: I, target_date: &TargetDate) -> AggregateResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (records, _) = LogRecordParser::new(*target_date).parse_lines(lines);
    MetricsCalculator::calculate(&SessionGrouper::group(records))
}

/// Configurable aggregation run producing a full [`AggregateReport`]
#[derive(Debug, Clone)]
pub struct Pipeline {
    target_date: TargetDate,
    converter: TimestampConverter,
    parallel: bool,
}

impl Pipeline {
    /// Create a pipeline for one target date
    pub fn new(target_date: TargetDate) -> Self {
        Self {
            target_date,
            converter: TimestampConverter::default(),
            parallel: false,
        }
    }

    /// Use a different timestamp converter
    pub fn with_converter(mut self, converter: TimestampConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Parse lines on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse, group and aggregate
    pub fn run<S>(&self, lines: &[S]) -> AggregateReport
    where
        S: AsRef<str> + Sync,
    {
        let parser = LogRecordParser::new(self.target_date).with_converter(self.converter);
        let (records, parse_stats) = if self.parallel {
            parser.parse_lines_parallel(lines)
        } else {
            parser.parse_lines(lines)
        };

        let sessions = SessionGrouper::group(records);
        let result = MetricsCalculator::calculate(&sessions);

        info!(
            "Aggregated {} sessions for {} ({} lines, {} dropped)",
            result.all.session_count,
            self.target_date,
            parse_stats.lines_read,
            parse_stats.dropped()
        );

        AggregateReport {
            target_date: self.target_date,
            result,
            parse_stats,
            sessions: MetricsCalculator::session_stats(&sessions),
        }
    }
}
