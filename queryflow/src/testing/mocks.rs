//! Mock runners for testing.

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::QueryError;
use crate::query::{Query, ResponseContext};
use crate::runners::QueryRunner;
use crate::sequence::Sequence;

/// A runner that yields a fixed list lazily and records how it was used.
#[derive(Debug)]
pub struct StaticRunner<T> {
    name: String,
    items: Vec<T>,
    calls: AtomicUsize,
    pulls: Arc<AtomicUsize>,
    responses: Mutex<Vec<ResponseContext>>,
}

impl<T> StaticRunner<T> {
    /// Creates a runner that yields `items` on every run.
    #[must_use]
    pub fn new(name: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            name: name.into(),
            items,
            calls: AtomicUsize::new(0),
            pulls: Arc::new(AtomicUsize::new(0)),
            responses: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times `run` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the number of elements pulled across all runs.
    #[must_use]
    pub fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    /// Returns the response contexts received, one per run.
    #[must_use]
    pub fn recorded_responses(&self) -> Vec<ResponseContext> {
        self.responses.lock().clone()
    }
}

impl<T> QueryRunner<T> for StaticRunner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _query: Arc<Query>, response: ResponseContext) -> Sequence<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.lock().push(response);

        let pulls = Arc::clone(&self.pulls);
        stream::iter(self.items.clone())
            .map(move |item| {
                pulls.fetch_add(1, Ordering::SeqCst);
                Ok(item)
            })
            .boxed()
    }
}

/// A runner that yields some elements and then fails.
#[derive(Debug)]
pub struct FailingRunner<T> {
    name: String,
    items: Vec<T>,
    error: QueryError,
    pulls: Arc<AtomicUsize>,
}

impl<T> FailingRunner<T> {
    /// Creates a runner that yields `items`, then `error`.
    #[must_use]
    pub fn new(name: impl Into<String>, items: Vec<T>, error: QueryError) -> Self {
        Self {
            name: name.into(),
            items,
            error,
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a runner that fails on the very first pull.
    #[must_use]
    pub fn immediately(name: impl Into<String>, error: QueryError) -> Self {
        Self::new(name, Vec::new(), error)
    }

    /// Returns the number of pulls served, including the failing one.
    #[must_use]
    pub fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }
}

impl<T> QueryRunner<T> for FailingRunner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _query: Arc<Query>, _response: ResponseContext) -> Sequence<T> {
        let pulls = Arc::clone(&self.pulls);
        let items = self.items.clone().into_iter().map(Ok);
        stream::iter(items.chain(std::iter::once(Err(self.error.clone()))))
            .inspect(move |_| {
                pulls.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }
}
