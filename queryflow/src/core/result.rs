//! Result element types, including the by-segment envelope.

use super::Interval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value stamped with a representative timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedResult<V> {
    /// The representative timestamp.
    pub timestamp: DateTime<Utc>,
    /// The stamped value.
    #[serde(rename = "result")]
    pub value: V,
}

impl<V> TimestampedResult<V> {
    /// Creates a new timestamped result.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, value: V) -> Self {
        Self { timestamp, value }
    }

    /// Returns the timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns a reference to the value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the result and returns the value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }
}

/// The payload of a by-segment envelope: every result one segment produced
/// for a query, in production order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BySegmentResultValue<T> {
    /// The segment's results, in the order the inner runner produced them.
    pub results: Vec<T>,
    /// Identifier of the segment that produced the results.
    #[serde(rename = "segment")]
    pub segment_id: String,
    /// The first interval declared by the query.
    pub interval: Interval,
}

impl<T> BySegmentResultValue<T> {
    /// Creates a new by-segment value.
    #[must_use]
    pub fn new(results: Vec<T>, segment_id: impl Into<String>, interval: Interval) -> Self {
        Self {
            results,
            segment_id: segment_id.into(),
            interval,
        }
    }

    /// Returns the wrapped results.
    #[must_use]
    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Returns the segment identifier.
    #[must_use]
    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    /// Returns the query interval recorded in the envelope.
    #[must_use]
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Consumes the value and returns the results.
    #[must_use]
    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T> fmt::Display for BySegmentResultValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BySegmentResultValue{{results={}, segment_id={}, interval={}}}",
            self.results.len(),
            self.segment_id,
            self.interval
        )
    }
}

/// The envelope element emitted by a by-segment runner.
pub type BySegmentResult<T> = TimestampedResult<BySegmentResultValue<T>>;

/// A result element that is either a plain value or a by-segment envelope
/// of further elements.
///
/// Chains that may run in by-segment mode use this as their element type so
/// the envelope travels through the same sequence as ordinary rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultElement<V> {
    /// A plain result value.
    Value(V),
    /// A segment's complete output wrapped in one envelope.
    BySegment(BySegmentResult<ResultElement<V>>),
}

impl<V> ResultElement<V> {
    /// Wraps a plain value.
    #[must_use]
    pub fn value(value: V) -> Self {
        Self::Value(value)
    }

    /// Returns the plain value, if this is not an envelope.
    #[must_use]
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Self::Value(v) => Some(v),
            Self::BySegment(_) => None,
        }
    }

    /// Returns the envelope, if this is one.
    #[must_use]
    pub fn as_by_segment(&self) -> Option<&BySegmentResult<Self>> {
        match self {
            Self::Value(_) => None,
            Self::BySegment(envelope) => Some(envelope),
        }
    }

    /// Returns true if this element is a by-segment envelope.
    #[must_use]
    pub fn is_by_segment(&self) -> bool {
        matches!(self, Self::BySegment(_))
    }
}

impl<V> From<BySegmentResult<ResultElement<V>>> for ResultElement<V> {
    fn from(envelope: BySegmentResult<ResultElement<V>>) -> Self {
        Self::BySegment(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interval() -> Interval {
        "2024-01-01T00:00:00Z/2024-01-02T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_by_segment_value_display() {
        let value = BySegmentResultValue::new(vec![1, 2, 3], "seg-1", interval());
        assert_eq!(
            value.to_string(),
            "BySegmentResultValue{results=3, segment_id=seg-1, \
             interval=2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z}"
        );
    }

    #[test]
    fn test_result_element_accessors() {
        let plain: ResultElement<&str> = ResultElement::value("A");
        assert_eq!(plain.as_value(), Some(&"A"));
        assert!(plain.as_by_segment().is_none());

        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let wrapped: ResultElement<&str> = TimestampedResult::new(
            ts,
            BySegmentResultValue::new(vec![plain.clone()], "seg-1", interval()),
        )
        .into();

        assert!(wrapped.is_by_segment());
        let envelope = wrapped.as_by_segment().unwrap();
        assert_eq!(envelope.timestamp(), ts);
        assert_eq!(envelope.value().results(), &[plain]);
    }

    #[test]
    fn test_by_segment_json_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let element: ResultElement<u32> = TimestampedResult::new(
            ts,
            BySegmentResultValue::new(vec![ResultElement::value(7)], "seg-1", interval()),
        )
        .into();

        let json = serde_json::to_value(&element).unwrap();
        let envelope = &json["by_segment"];
        assert_eq!(envelope["result"]["segment"], "seg-1");
        assert_eq!(envelope["result"]["results"][0]["value"], 7);
        assert_eq!(
            envelope["result"]["interval"],
            "2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z"
        );

        let back: ResultElement<u32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
}
