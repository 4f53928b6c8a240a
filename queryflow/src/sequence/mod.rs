//! Lazy result sequences.
//!
//! A [`Sequence`] is a boxed, pull-based stream of fallible elements. Nothing
//! is produced until the consumer polls it, so building a runner chain and
//! calling `run` is free. Only [`to_list`] and [`to_list_cancellable`]
//! materialize a sequence, and runners that call them say so in their docs.

use crate::cancellation::CancellationToken;
use crate::errors::{QueryError, QueryResult};
use futures::future::Future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

/// The lazy, ordered result stream every runner returns.
pub type Sequence<T> = BoxStream<'static, QueryResult<T>>;

/// A sequence over a fixed, already known set of elements.
pub fn simple<T>(items: Vec<T>) -> Sequence<T>
where
    T: Send + 'static,
{
    stream::iter(items.into_iter().map(Ok)).boxed()
}

/// A sequence with no elements.
pub fn empty<T>() -> Sequence<T>
where
    T: Send + 'static,
{
    stream::empty().boxed()
}

/// A sequence over fixed elements, some of which may be failures.
pub fn from_results<T>(items: Vec<QueryResult<T>>) -> Sequence<T>
where
    T: Send + 'static,
{
    stream::iter(items).boxed()
}

/// A sequence that yields a single error.
pub fn failed<T>(error: QueryError) -> Sequence<T>
where
    T: Send + 'static,
{
    stream::once(async move { Err(error) }).boxed()
}

/// A sequence whose contents are decided by a future that runs on the first
/// pull.
pub fn deferred<T, F>(future: F) -> Sequence<T>
where
    T: Send + 'static,
    F: Future<Output = Sequence<T>> + Send + 'static,
{
    stream::once(future).flatten().boxed()
}

/// Concatenates sequences in order without evaluating any of them.
pub fn concat<T>(sequences: Vec<Sequence<T>>) -> Sequence<T>
where
    T: Send + 'static,
{
    stream::iter(sequences).flatten().boxed()
}

/// Lazily maps every element. Errors pass through untouched.
pub fn map<T, U, F>(sequence: Sequence<T>, f: F) -> Sequence<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    sequence.map_ok(f).boxed()
}

/// Pulls every element into a `Vec`, preserving order.
///
/// # Errors
///
/// Returns the first error the sequence yields; later elements are not pulled.
pub async fn to_list<T>(sequence: Sequence<T>) -> QueryResult<Vec<T>> {
    sequence.try_collect().await
}

/// Like [`to_list`], but checks `token` before every pull.
///
/// # Errors
///
/// Returns `QueryError::Cancelled` as soon as the token is observed
/// cancelled, or the first error the sequence yields.
pub async fn to_list_cancellable<T>(
    mut sequence: Sequence<T>,
    token: &CancellationToken,
) -> QueryResult<Vec<T>> {
    let mut results = Vec::new();
    loop {
        token.check()?;
        match sequence.next().await {
            Some(item) => results.push(item?),
            None => return Ok(results),
        }
    }
}
