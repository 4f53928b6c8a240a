//! # Queryflow
//!
//! Composable, lazy query runners for segment-oriented analytical queries.
//!
//! A query is executed by a chain of [`runners::QueryRunner`]s, each wrapping
//! the next one down. Every runner returns a lazy [`sequence::Sequence`] of
//! results, and a shared [`query::ResponseContext`] travels unchanged through
//! the whole chain so that any layer can report metadata back to the caller.
//!
//! Queryflow provides:
//!
//! - **By-segment envelopes**: [`runners::BySegmentQueryRunner`] collapses a
//!   segment's results into one record tagged with the segment id and query
//!   interval, when the query context asks for it
//! - **Chain building**: [`runners::RunnerChain`] assembles runners bottom-up
//! - **Metrics and cancellation**: row and timing counters in the response
//!   context, and cooperative cancellation while draining
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use queryflow::prelude::*;
//!
//! let runner = RunnerChain::new(segment_scan)
//!     .by_segment("seg-2024-01", segment_timestamp)
//!     .metrics("segment-metrics")
//!     .build();
//!
//! let query = Query::builder("wikipedia")
//!     .interval("2024-01-01T00:00:00Z/2024-01-02T00:00:00Z".parse()?)
//!     .by_segment(true)
//!     .build()?;
//!
//! let rows = sequence::to_list(runner.run(Arc::new(query), ResponseContext::new())).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod core;
pub mod errors;
pub mod observability;
pub mod query;
pub mod runners;
pub mod sequence;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::core::{
        BySegmentResult, BySegmentResultValue, Interval, ResultElement, TimestampedResult,
    };
    pub use crate::errors::{QueryError, QueryResult};
    pub use crate::observability::{init_logging, LogFormat};
    pub use crate::query::{Query, QueryBuilder, QueryContext, ResponseContext};
    pub use crate::runners::{
        BoxedQueryRunner, BySegmentQueryRunner, BySegmentSkippingQueryRunner, ConcatQueryRunner,
        FnQueryRunner, MetricsQueryRunner, NoopQueryRunner, QueryRunner, RunnerChain,
    };
    pub use crate::sequence::{self, Sequence};
}
