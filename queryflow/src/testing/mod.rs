//! Testing utilities for queryflow runners.
//!
//! This module provides:
//! - Mock runners that record how they were driven
//! - Fixture queries, intervals and rows
//! - Assertions for by-segment output

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_no_envelopes, assert_single_envelope};
pub use fixtures::{
    by_segment_query, fixture_interval, fixture_timestamp, plain_query, run_to_vec, values,
    FIXTURE_DATA_SOURCE, FIXTURE_SEGMENT_ID,
};
pub use mocks::{FailingRunner, StaticRunner};
