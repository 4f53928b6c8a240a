//! Bottom-up construction of runner chains.

use super::{
    BoxedQueryRunner, BySegmentQueryRunner, BySegmentSkippingQueryRunner, MetricsQueryRunner,
    QueryRunner,
};
use crate::cancellation::CancellationToken;
use crate::core::BySegmentResult;
use crate::query::{Query, ResponseContext};
use crate::sequence::Sequence;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Builder that wraps an innermost runner one layer at a time.
///
/// Each call wraps everything added so far, so the last layer added is the
/// outermost. The built chain is immutable.
///
/// ```rust,ignore
/// let runner = RunnerChain::new(segment_scan)
///     .by_segment("seg-2024-01", timestamp)
///     .metrics("segment-metrics")
///     .build();
/// ```
pub struct RunnerChain<T> {
    runner: BoxedQueryRunner<T>,
    layers: Vec<String>,
}

impl<T> RunnerChain<T>
where
    T: Send + 'static,
{
    /// Starts a chain from its innermost runner.
    pub fn new<R>(innermost: R) -> Self
    where
        R: QueryRunner<T> + 'static,
    {
        Self::from_shared(Arc::new(innermost))
    }

    /// Starts a chain from a runner that is already shared.
    #[must_use]
    pub fn from_shared(innermost: BoxedQueryRunner<T>) -> Self {
        let layers = vec![innermost.name().to_string()];
        Self {
            runner: innermost,
            layers,
        }
    }

    /// Wraps the chain with an arbitrary runner built from it.
    #[must_use]
    pub fn wrap<R, F>(self, wrapper: F) -> Self
    where
        R: QueryRunner<T> + 'static,
        F: FnOnce(BoxedQueryRunner<T>) -> R,
    {
        let outer = wrapper(self.runner);
        let mut layers = self.layers;
        layers.push(outer.name().to_string());
        Self {
            runner: Arc::new(outer),
            layers,
        }
    }

    /// Wraps the chain with a [`MetricsQueryRunner`].
    #[must_use]
    pub fn metrics(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.wrap(|base| MetricsQueryRunner::new(name, base))
    }

    /// Wraps the chain with a [`BySegmentSkippingQueryRunner`].
    #[must_use]
    pub fn skip_by_segment<F>(self, name: impl Into<String>, process: F) -> Self
    where
        F: Fn(&BoxedQueryRunner<T>, Arc<Query>, ResponseContext) -> Sequence<T>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        self.wrap(|base| BySegmentSkippingQueryRunner::new(name, base, process))
    }

    /// Returns the layer names, innermost first.
    #[must_use]
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Finishes the chain.
    #[must_use]
    pub fn build(self) -> BoxedQueryRunner<T> {
        tracing::debug!(layers = ?self.layers, "Built runner chain");
        self.runner
    }
}

impl<T> RunnerChain<T>
where
    T: From<BySegmentResult<T>> + Send + 'static,
{
    /// Wraps the chain with a [`BySegmentQueryRunner`].
    #[must_use]
    pub fn by_segment(self, segment_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let segment_id = segment_id.into();
        self.wrap(|base| BySegmentQueryRunner::new(segment_id, timestamp, base))
    }

    /// Wraps the chain with a [`BySegmentQueryRunner`] that observes `token`
    /// while draining.
    #[must_use]
    pub fn by_segment_cancellable(
        self,
        segment_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        token: Arc<CancellationToken>,
    ) -> Self {
        let segment_id = segment_id.into();
        self.wrap(|base| BySegmentQueryRunner::new(segment_id, timestamp, base).with_cancellation(token))
    }
}
