//! Row and timing metrics reported through the response context.

use super::{BoxedQueryRunner, QueryRunner};
use crate::errors::QueryError;
use crate::observability::{RunnerSpanAttributes, SpanTimer};
use crate::query::response::{ELAPSED_MS, ROW_COUNT};
use crate::query::{Query, ResponseContext};
use crate::sequence::Sequence;
use futures::stream::{self, StreamExt};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{info, warn};

/// Counts the elements flowing through it and, once the inner sequence is
/// exhausted, adds the count and elapsed milliseconds to the response
/// context under [`ROW_COUNT`] and [`ELAPSED_MS`].
///
/// Elements pass through unchanged and in order. Timing starts at the first
/// pull, not at `run`. A sequence that fails or is dropped early reports
/// nothing, even if the consumer keeps pulling past the error.
pub struct MetricsQueryRunner<T> {
    name: String,
    base: BoxedQueryRunner<T>,
}

impl<T> MetricsQueryRunner<T> {
    /// Creates a metrics runner reporting under `name`.
    pub fn new(name: impl Into<String>, base: BoxedQueryRunner<T>) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }
}

impl<T> Debug for MetricsQueryRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsQueryRunner")
            .field("name", &self.name)
            .field("base", &self.base.name())
            .finish()
    }
}

struct Metered<T> {
    inner: Sequence<T>,
    timer: Option<SpanTimer>,
    rows: u64,
    failed: bool,
    attributes: RunnerSpanAttributes,
    response: ResponseContext,
}

impl<T> Metered<T> {
    fn fail(&mut self, error: &QueryError, elapsed_ms: f64) {
        self.failed = true;
        let attributes = self
            .attributes
            .clone()
            .with_rows(self.rows)
            .with_duration_ms(elapsed_ms)
            .with_error(error.to_string());
        warn!(
            runner = %attributes.runner_name,
            error_code = error.code(),
            rows = self.rows,
            attributes = ?attributes.to_otel_attributes(),
            "Runner sequence failed"
        );
    }

    fn report(self, elapsed_ms: f64) {
        let attributes = self
            .attributes
            .with_rows(self.rows)
            .with_duration_ms(elapsed_ms);

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let updates = [
            (ROW_COUNT, self.rows as i64),
            (ELAPSED_MS, elapsed_ms.round() as i64),
        ];
        for (key, delta) in updates {
            if let Err(e) = self.response.add_to_counter(key, delta) {
                warn!(runner = %attributes.runner_name, error = %e, "Could not record runner metric");
            }
        }

        info!(
            runner = %attributes.runner_name,
            rows = self.rows,
            elapsed_ms,
            attributes = ?attributes.to_otel_attributes(),
            "Runner sequence exhausted"
        );
    }
}

impl<T> QueryRunner<T> for MetricsQueryRunner<T>
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        let attributes = RunnerSpanAttributes::new(self.name.clone()).with_query_id(query.query_id());
        let state = Metered {
            inner: self.base.run(query, response.clone()),
            timer: None,
            rows: 0,
            failed: false,
            attributes,
            response,
        };

        stream::unfold(state, |mut state| async move {
            let timer = *state.timer.get_or_insert_with(SpanTimer::start);
            match state.inner.next().await {
                Some(Ok(item)) => {
                    if !state.failed {
                        state.rows += 1;
                    }
                    Some((Ok(item), state))
                }
                Some(Err(error)) => {
                    if !state.failed {
                        state.fail(&error, timer.elapsed_ms());
                    }
                    Some((Err(error), state))
                }
                None => {
                    if !state.failed {
                        state.report(timer.elapsed_ms());
                    }
                    None
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{plain_query, run_to_vec, FailingRunner, StaticRunner};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_passes_rows_through_and_reports() {
        let runner = MetricsQueryRunner::new(
            "scan-metrics",
            Arc::new(StaticRunner::new("scan", vec!["a", "b", "c"])),
        );
        let response = ResponseContext::new();

        let rows = run_to_vec(&runner, plain_query(), &response).await.unwrap();

        assert_eq!(rows, vec!["a", "b", "c"]);
        assert_eq!(response.get(ROW_COUNT), Some(json!(3)));
        assert!(response.get(ELAPSED_MS).and_then(|v| v.as_i64()).is_some());
    }

    #[tokio::test]
    async fn test_counts_accumulate_across_invocations() {
        let runner = MetricsQueryRunner::new(
            "scan-metrics",
            Arc::new(StaticRunner::new("scan", vec![1, 2])),
        );
        let response = ResponseContext::new();

        run_to_vec(&runner, plain_query(), &response).await.unwrap();
        run_to_vec(&runner, plain_query(), &response).await.unwrap();

        assert_eq!(response.get(ROW_COUNT), Some(json!(4)));
    }

    #[tokio::test]
    async fn test_nothing_reported_before_exhaustion() {
        let runner = MetricsQueryRunner::new(
            "scan-metrics",
            Arc::new(StaticRunner::new("scan", vec![1, 2])),
        );
        let response = ResponseContext::new();

        let mut sequence = runner.run(Arc::new(plain_query()), response.clone());
        assert_eq!(sequence.next().await, Some(Ok(1)));
        assert!(!response.contains_key(ROW_COUNT));
    }

    #[tokio::test]
    async fn test_failure_passes_through_without_report() {
        let runner = MetricsQueryRunner::new(
            "scan-metrics",
            Arc::new(FailingRunner::new("scan", vec![1], QueryError::execution("boom"))),
        );
        let response = ResponseContext::new();

        let err = run_to_vec(&runner, plain_query(), &response).await.unwrap_err();

        assert_eq!(err, QueryError::execution("boom"));
        assert!(!response.contains_key(ROW_COUNT));
    }

    #[tokio::test]
    async fn test_pulling_past_failure_reports_nothing() {
        let runner = MetricsQueryRunner::new(
            "scan-metrics",
            Arc::new(FailingRunner::new("scan", vec![1, 2], QueryError::execution("boom"))),
        );
        let response = ResponseContext::new();

        let items: Vec<_> = runner
            .run(Arc::new(plain_query()), response.clone())
            .collect()
            .await;

        assert_eq!(items, vec![Ok(1), Ok(2), Err(QueryError::execution("boom"))]);
        assert!(!response.contains_key(ROW_COUNT));
        assert!(!response.contains_key(ELAPSED_MS));
    }

    #[tokio::test]
    async fn test_bad_counter_is_logged_not_raised() {
        let runner = MetricsQueryRunner::new(
            "scan-metrics",
            Arc::new(StaticRunner::new("scan", vec![1])),
        );
        let response = ResponseContext::new();
        response.insert(ROW_COUNT, json!("not a number"));

        let rows = run_to_vec(&runner, plain_query(), &response).await.unwrap();

        assert_eq!(rows, vec![1]);
        assert_eq!(response.get(ROW_COUNT), Some(json!("not a number")));
    }
}
