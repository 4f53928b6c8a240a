//! The immutable query descriptor handed to every runner.

use super::QueryContext;
use crate::core::Interval;
use crate::errors::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};

/// An immutable query request.
///
/// A `Query` always declares at least one interval; construction fails
/// otherwise, so runners can read [`Query::first_interval`] without checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QuerySpec")]
pub struct Query {
    data_source: String,
    intervals: Vec<Interval>,
    context: QueryContext,
}

/// Unvalidated wire form of a [`Query`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuerySpec {
    data_source: String,
    intervals: Vec<Interval>,
    #[serde(default)]
    context: QueryContext,
}

impl TryFrom<QuerySpec> for Query {
    type Error = QueryError;

    fn try_from(spec: QuerySpec) -> Result<Self, Self::Error> {
        Self::new(spec.data_source, spec.intervals, spec.context)
    }
}

impl Query {
    /// Creates a new query.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::MissingIntervals` if `intervals` is empty.
    pub fn new(
        data_source: impl Into<String>,
        intervals: Vec<Interval>,
        context: QueryContext,
    ) -> QueryResult<Self> {
        if intervals.is_empty() {
            return Err(QueryError::MissingIntervals);
        }
        Ok(Self {
            data_source: data_source.into(),
            intervals,
            context,
        })
    }

    /// Starts a fluent builder.
    #[must_use]
    pub fn builder(data_source: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(data_source)
    }

    /// Returns the data source name.
    #[must_use]
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// Returns the declared intervals, in declaration order.
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Returns the first declared interval.
    #[must_use]
    pub fn first_interval(&self) -> Interval {
        // Non-empty by construction.
        self.intervals[0]
    }

    /// Returns the validated options.
    #[must_use]
    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    /// Whether the request asked for by-segment envelopes.
    #[must_use]
    pub fn is_by_segment(&self) -> bool {
        self.context.by_segment()
    }

    /// The query identifier, if any.
    #[must_use]
    pub fn query_id(&self) -> Option<&str> {
        self.context.query_id()
    }

    /// Returns a copy with a different context.
    #[must_use]
    pub fn with_context(&self, context: QueryContext) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Returns a copy with the by-segment flag overridden.
    #[must_use]
    pub fn with_by_segment(&self, by_segment: bool) -> Self {
        self.with_context(self.context.clone().with_by_segment(by_segment))
    }

    /// Returns the query unchanged if it has an id, otherwise a copy with a
    /// fresh v4 uuid as its id.
    #[must_use]
    pub fn with_generated_id(self) -> Self {
        if self.query_id().is_some() {
            return self;
        }
        let id = uuid::Uuid::new_v4().to_string();
        let context = self.context.clone().with_query_id(id);
        Self { context, ..self }
    }
}

/// Fluent builder for [`Query`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    data_source: String,
    intervals: Vec<Interval>,
    context: QueryContext,
    pending: Vec<(String, serde_json::Value)>,
}

impl QueryBuilder {
    /// Creates a builder for `data_source`.
    #[must_use]
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            intervals: Vec::new(),
            context: QueryContext::new(),
            pending: Vec::new(),
        }
    }

    /// Appends an interval.
    #[must_use]
    pub fn interval(mut self, interval: Interval) -> Self {
        self.intervals.push(interval);
        self
    }

    /// Appends several intervals.
    #[must_use]
    pub fn intervals(mut self, intervals: impl IntoIterator<Item = Interval>) -> Self {
        self.intervals.extend(intervals);
        self
    }

    /// Replaces the whole context.
    #[must_use]
    pub fn context(mut self, context: QueryContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the by-segment flag.
    #[must_use]
    pub fn by_segment(mut self, by_segment: bool) -> Self {
        self.context = self.context.with_by_segment(by_segment);
        self
    }

    /// Sets a raw context option, validated at [`QueryBuilder::build`].
    #[must_use]
    pub fn context_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.pending.push((key.into(), value));
        self
    }

    /// Validates and builds the query.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::MissingIntervals` without intervals, or
    /// `QueryError::InvalidContext` for a bad option value.
    pub fn build(self) -> QueryResult<Query> {
        let mut context = self.context;
        for (key, value) in self.pending {
            context = context.with_value(key, value)?;
        }
        Query::new(self.data_source, self.intervals, context)
    }
}
