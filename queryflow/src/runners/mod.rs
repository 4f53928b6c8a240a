//! Query runners and their composition.
//!
//! A runner takes a query and the shared response context and returns a lazy
//! [`Sequence`]. Runners wrap other runners: each one either steps aside for
//! requests that do not concern it or transforms the request, the sequence,
//! or both. A chain is built once, bottom-up, and never mutated afterwards.
//!
//! Every runner here follows the same rules:
//! - `run` does no per-element work; pulling the sequence does.
//! - The response context is forwarded as the same handle, never replaced.
//! - Element order from the inner runner is kept, unless the runner's docs
//!   say it collapses or reorders.
//! - Errors are neither caught nor retried.

mod by_segment;
mod chain;
mod concat;
mod metrics;
mod skipping;

pub use by_segment::BySegmentQueryRunner;
pub use chain::RunnerChain;
pub use concat::ConcatQueryRunner;
pub use metrics::MetricsQueryRunner;
pub use skipping::BySegmentSkippingQueryRunner;

use crate::query::{Query, ResponseContext};
use crate::sequence::{self, Sequence};
use std::fmt::Debug;
use std::sync::Arc;

/// One link in a query-execution chain.
pub trait QueryRunner<T>: Send + Sync {
    /// Returns the runner's name, used in logs and chain descriptions.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs the query.
    ///
    /// Returns immediately. Elements are produced, and errors surface, only
    /// when the returned sequence is pulled.
    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T>;
}

/// A shared, type-erased runner.
pub type BoxedQueryRunner<T> = Arc<dyn QueryRunner<T>>;

impl<T, R> QueryRunner<T> for Arc<R>
where
    R: QueryRunner<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        (**self).run(query, response)
    }
}

impl<T, R> QueryRunner<T> for Box<R>
where
    R: QueryRunner<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        (**self).run(query, response)
    }
}

/// A runner that never produces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueryRunner;

impl<T> QueryRunner<T> for NoopQueryRunner
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        "NoopQueryRunner"
    }

    fn run(&self, _query: Arc<Query>, _response: ResponseContext) -> Sequence<T> {
        sequence::empty()
    }
}

/// A closure-based runner.
pub struct FnQueryRunner<F> {
    name: String,
    func: F,
}

impl<F> FnQueryRunner<F> {
    /// Creates a new closure-based runner.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnQueryRunner<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnQueryRunner")
            .field("name", &self.name)
            .finish()
    }
}

impl<T, F> QueryRunner<T> for FnQueryRunner<F>
where
    F: Fn(Arc<Query>, ResponseContext) -> Sequence<T> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        (self.func)(query, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{by_segment_query, plain_query, run_to_vec};

    #[tokio::test]
    async fn test_noop_runner() {
        let runner = NoopQueryRunner;
        let rows: Vec<u32> = run_to_vec(&runner, plain_query(), &ResponseContext::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(QueryRunner::<u32>::name(&runner), "NoopQueryRunner");
    }

    #[tokio::test]
    async fn test_fn_runner_sees_query_and_response() {
        let runner = FnQueryRunner::new("echo", |query: Arc<Query>, response: ResponseContext| {
            response.insert("seen", serde_json::json!(query.data_source()));
            sequence::simple(vec![query.is_by_segment()])
        });

        let response = ResponseContext::new();
        let rows = run_to_vec(&runner, by_segment_query(), &response).await.unwrap();

        assert_eq!(rows, vec![true]);
        assert_eq!(response.get("seen"), Some(serde_json::json!("wikipedia")));
        assert_eq!(QueryRunner::<bool>::name(&runner), "echo");
    }

    #[tokio::test]
    async fn test_arc_and_box_forward() {
        let boxed: Box<dyn QueryRunner<u32>> = Box::new(NoopQueryRunner);
        let shared: BoxedQueryRunner<u32> = Arc::new(NoopQueryRunner);

        assert_eq!(boxed.name(), "NoopQueryRunner");
        assert_eq!(shared.name(), "NoopQueryRunner");
        assert!(run_to_vec(&shared, plain_query(), &ResponseContext::new())
            .await
            .unwrap()
            .is_empty());
    }
}
