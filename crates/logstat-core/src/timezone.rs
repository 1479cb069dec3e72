//! Timestamp conversion from UTC log stamps to local civil time
//!
//! Log lines carry UTC timestamps such as `[2021-07-25T21:46:39.549Z]`. Date
//! filtering and duration math run on local time at a fixed offset (+09:00 by
//! default). The offset is a plain constant shift: there is no timezone
//! database lookup and no daylight saving handling.

use crate::error::{LogstatError, Result};
use crate::types::LocalTimestamp;
use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use tracing::debug;

/// Default local offset in hours east of UTC
pub const DEFAULT_OFFSET_HOURS: i32 = 9;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Fractional seconds go down to microseconds
const MAX_FRACTION_DIGITS: usize = 6;

/// Converts UTC log timestamps to local time at a fixed offset
///
/// # Examples
/// ```
/// use logstat_core::timezone::TimestampConverter;
///
/// let converter = TimestampConverter::default();
/// let local = converter.convert("[2021-07-25T15:30:00.000Z]").unwrap();
/// assert_eq!(local.format("%Y%m%d %H:%M"), "20210726 00:30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampConverter {
    offset: FixedOffset,
}

impl Default for TimestampConverter {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl TimestampConverter {
    /// Create a converter for an arbitrary fixed offset
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Create a converter from whole hours east of UTC
    pub fn from_hours(hours: i32) -> Result<Self> {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                LogstatError::InvalidArgument(format!(
                    "UTC offset {hours} is out of range (-23..=23 hours)"
                ))
            })?;
        debug!("Using fixed UTC offset: {}", offset);
        Ok(Self { offset })
    }

    /// The configured offset
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Convert a `[YYYY-MM-DDTHH:MM:SS.fffZ]` UTC stamp to local time.
    ///
    /// Enclosing brackets are optional; the fractional seconds are not.
    pub fn convert(&self, raw: &str) -> Result<LocalTimestamp> {
        let stamp = raw.trim_matches(|c| c == '[' || c == ']');

        let invalid = || LogstatError::TimestampFormat(raw.to_string());

        // `%.f` would also accept a stamp without a fraction
        let fraction = stamp
            .strip_suffix('Z')
            .and_then(|body| body.rsplit_once('.'))
            .map(|(_, digits)| digits)
            .ok_or_else(invalid)?;
        if !(1..=MAX_FRACTION_DIGITS).contains(&fraction.len())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let utc = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|_| invalid())?;
        Ok(LocalTimestamp::new(self.offset.from_utc_datetime(&utc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_shifts_by_nine_hours() {
        let converter = TimestampConverter::default();
        let local = converter.convert("[2021-07-25T21:46:39.549Z]").unwrap();
        assert_eq!(
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            "2021-07-26 06:46:39.549"
        );
    }

    #[test]
    fn test_convert_without_brackets() {
        let converter = TimestampConverter::default();
        let local = converter.convert("2021-07-25T01:00:00.000Z").unwrap();
        assert_eq!(local.format("%Y%m%d%H"), "2021072510");
    }

    #[test]
    fn test_convert_rejects_malformed_stamps() {
        let converter = TimestampConverter::default();
        for raw in [
            "",
            "[]",
            "[2021-07-25T21:46:39Z]",
            "[2021-07-25T21:46:39.Z]",
            "[2021-07-25 21:46:39.549Z]",
            "[2021-07-25T21:46:39.549]",
            "[2021-13-25T21:46:39.549Z]",
            "[2021-07-25T21:46:39.5x9Z]",
            "[2021-07-25T21:46:39.5490000Z]",
            "[2021-07-25T21:46:39.549000000Z]",
            "not a timestamp",
        ] {
            let result = converter.convert(raw);
            assert!(
                matches!(result, Err(LogstatError::TimestampFormat(_))),
                "expected failure for {raw:?}"
            );
        }
    }

    #[test]
    fn test_fraction_precision_range() {
        let converter = TimestampConverter::default();

        let short = converter.convert("[2021-07-25T21:46:39.5Z]").unwrap();
        assert_eq!(short.format("%H:%M:%S%.3f"), "06:46:39.500");

        let micros = converter.convert("[2021-07-25T21:46:39.549123Z]").unwrap();
        assert_eq!(micros.format("%H:%M:%S%.6f"), "06:46:39.549123");

        assert!(converter.convert("[2021-07-25T21:46:39.5491234Z]").is_err());
    }

    #[test]
    fn test_custom_offset() {
        let converter = TimestampConverter::from_hours(-5).unwrap();
        let local = converter.convert("[2021-07-25T03:00:00.000Z]").unwrap();
        assert_eq!(local.format("%Y%m%d %H"), "20210724 22");
        assert_eq!(converter.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(TimestampConverter::from_hours(24).is_err());
        assert!(TimestampConverter::from_hours(-24).is_err());
        assert!(TimestampConverter::from_hours(i32::MAX).is_err());
        assert!(TimestampConverter::from_hours(23).is_ok());
    }
}
