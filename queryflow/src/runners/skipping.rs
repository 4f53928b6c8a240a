//! Runners that step aside for by-segment requests.

use super::{BoxedQueryRunner, QueryRunner};
use crate::query::{Query, ResponseContext};
use crate::sequence::Sequence;
use std::fmt::Debug;
use std::sync::Arc;

/// The transformation a skipping runner applies to ordinary requests.
pub type SkippableRun<T> =
    dyn Fn(&BoxedQueryRunner<T>, Arc<Query>, ResponseContext) -> Sequence<T> + Send + Sync;

/// Applies its own processing only when the request is *not* by-segment.
///
/// Stages such as merging or finalizing would mangle by-segment envelopes
/// coming up from below, so for by-segment requests this runner hands the
/// query straight to its inner runner.
pub struct BySegmentSkippingQueryRunner<T> {
    name: String,
    base: BoxedQueryRunner<T>,
    process: Box<SkippableRun<T>>,
}

impl<T> BySegmentSkippingQueryRunner<T> {
    /// Creates a skipping runner. `process` receives the inner runner and
    /// decides how to run it for ordinary requests.
    pub fn new<F>(name: impl Into<String>, base: BoxedQueryRunner<T>, process: F) -> Self
    where
        F: Fn(&BoxedQueryRunner<T>, Arc<Query>, ResponseContext) -> Sequence<T>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            base,
            process: Box::new(process),
        }
    }
}

impl<T> Debug for BySegmentSkippingQueryRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BySegmentSkippingQueryRunner")
            .field("name", &self.name)
            .field("base", &self.base.name())
            .finish_non_exhaustive()
    }
}

impl<T> QueryRunner<T> for BySegmentSkippingQueryRunner<T>
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        if query.is_by_segment() {
            return self.base.run(query, response);
        }
        (self.process)(&self.base, query, response)
    }
}
