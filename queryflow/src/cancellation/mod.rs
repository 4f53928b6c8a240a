//! Cooperative cancellation for runners that drain their inner sequence.

mod token;

pub use token::{CancelCallback, CancellationToken};
