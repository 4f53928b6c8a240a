//! Span attributes and timing for runner execution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Attributes describing one runner's pass over its sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerSpanAttributes {
    /// Runner name.
    pub runner_name: String,
    /// Query identifier, if the request carried one.
    pub query_id: Option<String>,
    /// Segment the runner serves, if any.
    pub segment_id: Option<String>,
    /// Elements observed.
    pub rows: Option<u64>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if the sequence failed.
    pub error: Option<String>,
}

impl RunnerSpanAttributes {
    /// Creates new runner span attributes.
    #[must_use]
    pub fn new(runner_name: impl Into<String>) -> Self {
        Self {
            runner_name: runner_name.into(),
            ..Default::default()
        }
    }

    /// Sets the query id.
    #[must_use]
    pub fn with_query_id(mut self, query_id: Option<&str>) -> Self {
        self.query_id = query_id.map(str::to_string);
        self
    }

    /// Sets the segment id.
    #[must_use]
    pub fn with_segment_id(mut self, segment_id: impl Into<String>) -> Self {
        self.segment_id = Some(segment_id.into());
        self
    }

    /// Sets the row count.
    #[must_use]
    pub fn with_rows(mut self, rows: u64) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Converts to OpenTelemetry-style attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("runner.name".to_string(), self.runner_name.clone());

        if let Some(ref v) = self.query_id {
            attrs.insert("query.id".to_string(), v.clone());
        }
        if let Some(ref v) = self.segment_id {
            attrs.insert("segment.id".to_string(), v.clone());
        }
        if let Some(v) = self.rows {
            attrs.insert("runner.rows".to_string(), v.to_string());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("runner.duration_ms".to_string(), v.to_string());
        }
        if let Some(ref v) = self.error {
            attrs.insert("runner.error".to_string(), v.clone());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug, Clone, Copy)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
