//! Shared response metadata for one top-level query invocation.

use crate::errors::{QueryError, QueryResult};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Segments a runner expected to read but could not find.
pub const MISSING_SEGMENTS: &str = "missingSegments";
/// Total elements observed by metrics runners.
pub const ROW_COUNT: &str = "rowCount";
/// Total milliseconds spent producing elements, as seen by metrics runners.
pub const ELAPSED_MS: &str = "elapsedMs";

/// A side channel every runner in a chain can read and append to.
///
/// The caller creates one per top-level invocation and passes it to the
/// outermost runner. Clones are handles to the same map, so writes made by an
/// inner runner are visible to the outer ones and vice versa. There is no
/// `remove`: a runner only ever adds or updates its own keys.
#[derive(Debug, Clone, Default)]
pub struct ResponseContext {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl ResponseContext {
    /// Creates a new, empty response context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both handles point at the same map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Sets a value, replacing any previous one.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries.write().insert(key.into(), value);
    }

    /// Sets a value only if the key is absent. Returns true if it was set.
    pub fn insert_if_absent(&self, key: impl Into<String>, value: Value) -> bool {
        let mut entries = self.entries.write();
        let key = key.into();
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, value);
        true
    }

    /// Appends to a list-valued key, creating the list if needed.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if the key holds a non-list value.
    pub fn append_to_list(&self, key: impl Into<String>, value: Value) -> QueryResult<()> {
        let key = key.into();
        let mut entries = self.entries.write();
        match entries
            .entry(key.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(QueryError::invalid_context(key, "response entry is not a list")),
        }
    }

    /// Adds `delta` to an integer counter, creating it at zero if needed.
    /// Returns the new total.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if the key holds a non-integer.
    pub fn add_to_counter(&self, key: impl Into<String>, delta: i64) -> QueryResult<i64> {
        let key = key.into();
        let mut entries = self.entries.write();
        let slot = entries.entry(key.clone()).or_insert_with(|| Value::from(0));
        let current = slot
            .as_i64()
            .ok_or_else(|| QueryError::invalid_context(&key, "response entry is not a counter"))?;
        let total = current.saturating_add(delta);
        *slot = Value::from(total);
        Ok(total)
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no runner has written anything yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a copy of all entries.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.entries.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_the_map() {
        let ctx = ResponseContext::new();
        let handle = ctx.clone();
        handle.insert("ETag", json!("abc"));

        assert!(ctx.ptr_eq(&handle));
        assert_eq!(ctx.get("ETag"), Some(json!("abc")));
        assert!(!ctx.ptr_eq(&ResponseContext::new()));
    }

    #[test]
    fn test_insert_if_absent() {
        let ctx = ResponseContext::new();
        assert!(ctx.insert_if_absent("k", json!(1)));
        assert!(!ctx.insert_if_absent("k", json!(2)));
        assert_eq!(ctx.get("k"), Some(json!(1)));
    }

    #[test]
    fn test_append_to_list() {
        let ctx = ResponseContext::new();
        ctx.append_to_list(MISSING_SEGMENTS, json!("seg-1")).unwrap();
        ctx.append_to_list(MISSING_SEGMENTS, json!("seg-2")).unwrap();
        assert_eq!(ctx.get(MISSING_SEGMENTS), Some(json!(["seg-1", "seg-2"])));

        ctx.insert("scalar", json!(5));
        assert!(ctx.append_to_list("scalar", json!(6)).is_err());
    }

    #[test]
    fn test_add_to_counter() {
        let ctx = ResponseContext::new();
        assert_eq!(ctx.add_to_counter(ROW_COUNT, 3).unwrap(), 3);
        assert_eq!(ctx.add_to_counter(ROW_COUNT, 4).unwrap(), 7);

        ctx.insert("name", json!("x"));
        assert!(ctx.add_to_counter("name", 1).is_err());
    }

    #[test]
    fn test_len_keys_and_snapshot() {
        let ctx = ResponseContext::new();
        assert!(ctx.is_empty());

        ctx.insert("a", json!(1));
        ctx.insert("b", json!(2));

        let mut keys = ctx.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ctx.len(), 2);
        assert!(ctx.contains_key("a"));
        assert_eq!(ctx.to_map().get("b"), Some(&json!(2)));
    }
}
