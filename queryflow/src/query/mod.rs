//! Request-side types shared by every runner.
//!
//! This module provides:
//! - The immutable [`Query`] descriptor and its builder
//! - Typed, validated query options
//! - The shared [`ResponseContext`] side channel

pub mod context;
mod request;
pub mod response;

pub use context::QueryContext;
pub use request::{Query, QueryBuilder};
pub use response::ResponseContext;
