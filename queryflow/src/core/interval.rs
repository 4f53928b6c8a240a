//! Half-open time intervals.

use crate::errors::{QueryError, QueryResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A half-open time interval `[start, end)` in UTC.
///
/// The textual form is ISO-8601 `start/end`, which is also how intervals
/// are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Creates a new interval.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInterval` if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> QueryResult<Self> {
        if end < start {
            return Err(QueryError::InvalidInterval {
                start: format_instant(start),
                end: format_instant(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates an interval starting at `start` and lasting `length`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInterval` for a negative length or one
    /// that runs past the representable time range.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> QueryResult<Self> {
        let end = start
            .checked_add_signed(length)
            .ok_or_else(|| QueryError::InvalidInterval {
                start: format_instant(start),
                end: format!("{} + {length}", format_instant(start)),
            })?;
        Self::new(start, end)
    }

    /// Returns the inclusive start.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the exclusive end.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the length of the interval.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the interval covers no time at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `instant` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Returns true if the two intervals share any instant.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(raw: &str, whole: &str) -> QueryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| QueryError::IntervalParse(whole.to_string()))
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", format_instant(self.start), format_instant(self.end))
    }
}

impl FromStr for Interval {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| QueryError::IntervalParse(s.to_string()))?;
        Self::new(parse_instant(start, s)?, parse_instant(end, s)?)
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_interval_new_rejects_reversed_bounds() {
        let err = Interval::new(day(2), day(1)).unwrap_err();
        assert_eq!(err.code(), "QUERY-INVALID-INTERVAL");
    }

    #[test]
    fn test_starting_at_rejects_out_of_range_length() {
        let err = Interval::starting_at(day(1), Duration::days(1_000_000_000)).unwrap_err();
        assert_eq!(err.code(), "QUERY-INVALID-INTERVAL");

        let err = Interval::starting_at(day(2), Duration::hours(-1)).unwrap_err();
        assert_eq!(err.code(), "QUERY-INVALID-INTERVAL");
    }

    #[test]
    fn test_interval_is_half_open() {
        let interval = Interval::new(day(1), day(2)).unwrap();
        assert!(interval.contains(day(1)));
        assert!(!interval.contains(day(2)));
        assert_eq!(interval.duration(), Duration::days(1));
        assert!(!interval.is_empty());
    }

    #[test]
    fn test_interval_overlaps() {
        let a = Interval::new(day(1), day(3)).unwrap();
        let b = Interval::new(day(2), day(4)).unwrap();
        let c = Interval::new(day(3), day(4)).unwrap();

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_interval_display_and_parse() {
        let interval = Interval::new(day(1), day(2)).unwrap();
        let text = interval.to_string();
        assert_eq!(text, "2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z");

        let parsed: Interval = text.parse().unwrap();
        assert_eq!(parsed, interval);
    }

    #[test]
    fn test_interval_parse_errors() {
        assert!(matches!(
            "2024-01-01T00:00:00Z".parse::<Interval>(),
            Err(QueryError::IntervalParse(_))
        ));
        assert!(matches!(
            "yesterday/today".parse::<Interval>(),
            Err(QueryError::IntervalParse(_))
        ));
    }

    #[test]
    fn test_interval_serializes_as_string() {
        let interval = Interval::new(day(1), day(2)).unwrap();
        let json = serde_json::to_string(&interval).unwrap();
        assert_eq!(json, r#""2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z""#);

        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, interval);
    }
}
