//! Local concatenation of several runners.

use super::{BoxedQueryRunner, QueryRunner};
use crate::query::{Query, ResponseContext};
use crate::sequence::{self, Sequence};
use std::fmt::Debug;
use std::sync::Arc;

/// Runs every child with the same query and response context and
/// concatenates their sequences in child order.
///
/// Children are pulled one after another, never interleaved or merged.
pub struct ConcatQueryRunner<T> {
    children: Vec<BoxedQueryRunner<T>>,
}

impl<T> ConcatQueryRunner<T> {
    /// Creates a concatenating runner.
    #[must_use]
    pub fn new(children: Vec<BoxedQueryRunner<T>>) -> Self {
        Self { children }
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<T> Debug for ConcatQueryRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.children.iter().map(|c| c.name()))
            .finish()
    }
}

impl<T> QueryRunner<T> for ConcatQueryRunner<T>
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        "ConcatQueryRunner"
    }

    fn run(&self, query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        sequence::concat(
            self.children
                .iter()
                .map(|child| child.run(Arc::clone(&query), response.clone()))
                .collect(),
        )
    }
}
