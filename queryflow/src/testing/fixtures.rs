//! Shared fixtures for runner tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::core::{Interval, ResultElement};
use crate::errors::QueryResult;
use crate::query::{Query, ResponseContext};
use crate::runners::QueryRunner;
use crate::sequence;
use std::sync::Arc;

/// Data source used by the fixture queries.
pub const FIXTURE_DATA_SOURCE: &str = "wikipedia";

/// Segment identifier used by the fixture chains.
pub const FIXTURE_SEGMENT_ID: &str = "seg-2024-01";

/// `2024-01-01T00:00:00Z`.
#[must_use]
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("fixture timestamp is unambiguous")
}

/// `[2024-01-01T00:00:00Z, 2024-01-02T00:00:00Z)`.
#[must_use]
pub fn fixture_interval() -> Interval {
    Interval::starting_at(fixture_timestamp(), chrono::Duration::days(1))
        .expect("fixture interval is ordered")
}

/// A query over the fixture interval without by-segment.
#[must_use]
pub fn plain_query() -> Query {
    Query::builder(FIXTURE_DATA_SOURCE)
        .interval(fixture_interval())
        .build()
        .expect("fixture query is valid")
}

/// A query over the fixture interval with by-segment set.
#[must_use]
pub fn by_segment_query() -> Query {
    plain_query().with_by_segment(true)
}

/// Wraps plain values as result elements.
#[must_use]
pub fn values<V: Clone>(items: &[V]) -> Vec<ResultElement<V>> {
    items.iter().cloned().map(ResultElement::Value).collect()
}

/// Runs `runner` and materializes the whole sequence.
///
/// # Errors
///
/// Returns the first error the sequence yields.
pub async fn run_to_vec<T, R>(
    runner: &R,
    query: Query,
    response: &ResponseContext,
) -> QueryResult<Vec<T>>
where
    R: QueryRunner<T> + ?Sized,
{
    sequence::to_list(runner.run(Arc::new(query), response.clone())).await
}
