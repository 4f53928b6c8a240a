//! Test assertions for runner output.

use std::fmt::Debug;

use crate::core::{Interval, ResultElement};

/// Asserts that `output` is exactly one by-segment envelope and returns the
/// wrapped results.
pub fn assert_single_envelope<'a, V>(
    output: &'a [ResultElement<V>],
    segment_id: &str,
    interval: Interval,
) -> &'a [ResultElement<V>]
where
    V: Debug,
{
    assert_eq!(
        output.len(),
        1,
        "Expected exactly one envelope, got {} elements: {:?}",
        output.len(),
        output
    );
    let envelope = output[0]
        .as_by_segment()
        .unwrap_or_else(|| panic!("Expected a by-segment envelope, got {:?}", output[0]));
    assert_eq!(envelope.value().segment_id(), segment_id);
    assert_eq!(envelope.value().interval(), interval);
    envelope.value().results()
}

/// Asserts that no element of `output` is a by-segment envelope.
pub fn assert_no_envelopes<V>(output: &[ResultElement<V>])
where
    V: Debug,
{
    if let Some(found) = output.iter().find(|e| e.is_by_segment()) {
        panic!("Expected plain values only, found envelope {found:?}");
    }
}
