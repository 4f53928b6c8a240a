//! Core domain model types for queryflow.
//!
//! This module contains the value types every runner shares:
//! - Half-open time intervals
//! - Timestamped results and the by-segment envelope

mod interval;
mod result;

pub use interval::Interval;
pub use result::{BySegmentResult, BySegmentResultValue, ResultElement, TimestampedResult};
