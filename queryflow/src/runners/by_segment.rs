//! By-segment result envelopes.

use super::{BoxedQueryRunner, QueryRunner};
use crate::cancellation::CancellationToken;
use crate::core::{BySegmentResult, BySegmentResultValue, TimestampedResult};
use crate::observability::RunnerSpanAttributes;
use crate::query::{Query, ResponseContext};
use crate::sequence::{self, Sequence};
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Wraps a segment's output into a single envelope when the request asks for
/// by-segment results.
///
/// Without the flag the inner sequence is returned untouched. With it, the
/// inner sequence is drained on the first pull of the returned sequence and
/// re-emitted as exactly one [`BySegmentResult`] holding:
/// - the representative timestamp and segment id this runner was built with,
/// - every inner element, in order (possibly none),
/// - the query's first interval; any further intervals are not recorded.
///
/// This is the one runner that breaks laziness on purpose. A failure while
/// draining becomes the only item of the sequence and no envelope is built.
pub struct BySegmentQueryRunner<T> {
    segment_id: String,
    timestamp: DateTime<Utc>,
    base: BoxedQueryRunner<T>,
    cancellation: Option<Arc<CancellationToken>>,
}

impl<T> BySegmentQueryRunner<T> {
    /// Creates a runner serving `segment_id`, stamping envelopes with
    /// `timestamp`.
    pub fn new(
        segment_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        base: BoxedQueryRunner<T>,
    ) -> Self {
        Self {
            segment_id: segment_id.into(),
            timestamp,
            base,
            cancellation: None,
        }
    }

    /// Checks `token` before every pull while draining.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns the segment identifier.
    #[must_use]
    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    /// Returns the representative timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn span_attributes(&self, query: &Query) -> RunnerSpanAttributes {
        RunnerSpanAttributes::new("BySegmentQueryRunner")
            .with_segment_id(self.segment_id.clone())
            .with_query_id(query.query_id())
    }
}

impl<T> Debug for BySegmentQueryRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BySegmentQueryRunner")
            .field("segment_id", &self.segment_id)
            .field("timestamp", &self.timestamp)
            .field("base", &self.base.name())
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

impl<T> QueryRunner<T> for BySegmentQueryRunner<T>
where
    T: From<BySegmentResult<T>> + Send + 'static,
{
    fn name(&self) -> &str {
        "BySegmentQueryRunner"
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        if !query.is_by_segment() {
            debug!(
                segment_id = %self.segment_id,
                query_id = query.query_id().unwrap_or("-"),
                "Passing segment results through"
            );
            return self.base.run(query, response);
        }

        let attributes = self.span_attributes(&query);
        let base_sequence = self.base.run(Arc::clone(&query), response);
        let segment_id = self.segment_id.clone();
        let timestamp = self.timestamp;
        let cancellation = self.cancellation.clone();

        sequence::deferred(async move {
            let drained = match cancellation.as_deref() {
                Some(token) => sequence::to_list_cancellable(base_sequence, token).await,
                None => sequence::to_list(base_sequence).await,
            };

            match drained {
                Ok(results) => {
                    let attributes = attributes.with_rows(results.len() as u64);
                    debug!(
                        attributes = ?attributes.to_otel_attributes(),
                        "Wrapped segment results"
                    );
                    let value = BySegmentResultValue::new(results, segment_id, query.first_interval());
                    sequence::simple(vec![T::from(TimestampedResult::new(timestamp, value))])
                }
                Err(error) => {
                    let attributes = attributes.with_error(error.to_string());
                    debug!(
                        error_code = error.code(),
                        attributes = ?attributes.to_otel_attributes(),
                        "Draining segment results failed"
                    );
                    sequence::failed(error)
                }
            }
        })
    }
}
