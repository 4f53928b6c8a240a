//! Error types for query runners.
//!
//! Runners never swallow or retry errors. A failure raised while producing
//! an element travels through every wrapping runner unchanged and reaches
//! whoever pulls the sequence.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type QueryResult<T> = Result<T, QueryError>;

/// The main error type for query execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An inner runner failed while producing an element.
    #[error("Query execution error: {0}")]
    Execution(String),

    /// The query was cancelled while a runner was pulling its inner sequence.
    #[error("Query cancelled: {reason}")]
    Cancelled {
        /// The first cancellation reason recorded on the token.
        reason: String,
    },

    /// A query was built without any intervals.
    #[error("Query must declare at least one interval")]
    MissingIntervals,

    /// An interval whose end precedes its start.
    #[error("Invalid interval: end {end} is before start {start}")]
    InvalidInterval {
        /// Interval start, ISO-8601.
        start: String,
        /// Interval end, ISO-8601.
        end: String,
    },

    /// An interval string could not be parsed.
    #[error("Cannot parse interval '{0}': expected '<start>/<end>'")]
    IntervalParse(String),

    /// A query context option had the wrong type.
    #[error("Invalid query context value for '{key}': {reason}")]
    InvalidContext {
        /// The offending option key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The logging subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl QueryError {
    /// Creates an execution error.
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Creates an invalid context error.
    #[must_use]
    pub fn invalid_context(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidContext {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns a stable error code for the variant.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Execution(_) => "QUERY-EXECUTION",
            Self::Cancelled { .. } => "QUERY-CANCELLED",
            Self::MissingIntervals => "QUERY-MISSING-INTERVALS",
            Self::InvalidInterval { .. } => "QUERY-INVALID-INTERVAL",
            Self::IntervalParse(_) => "QUERY-INTERVAL-PARSE",
            Self::InvalidContext { .. } => "QUERY-INVALID-CONTEXT",
            Self::Serialization(_) => "QUERY-SERIALIZATION",
            Self::Logging(_) => "QUERY-LOGGING",
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
