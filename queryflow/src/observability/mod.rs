//! Observability utilities.

mod logging;
mod spans;

pub use logging::{env_filter, init_logging, LogFormat, DEFAULT_FILTER};
pub use spans::{RunnerSpanAttributes, SpanTimer};
