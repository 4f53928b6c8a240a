//! Typed query options.
//!
//! Requests arrive with a loosely typed option map. It is validated once,
//! when the query is built, into a [`QueryContext`]; runners then read plain
//! fields instead of doing keyed lookups on every invocation.

use crate::errors::{QueryError, QueryResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Well-known option keys.
pub mod keys {
    /// Opt-in flag for by-segment result envelopes.
    pub const BY_SEGMENT: &str = "bySegment";
    /// Caller-supplied query identifier.
    pub const QUERY_ID: &str = "queryId";
}

/// Validated per-request options.
///
/// The raw map is kept so options owned by other runners survive the
/// conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryContext {
    by_segment: bool,
    query_id: Option<String>,
    raw: Map<String, Value>,
}

impl QueryContext {
    /// Creates an empty context with every option at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a raw option map.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if a known option has a value
    /// that cannot be coerced to its type.
    pub fn from_map(raw: Map<String, Value>) -> QueryResult<Self> {
        let by_segment = parse_bool(&raw, keys::BY_SEGMENT, false)?;
        let query_id = parse_string(&raw, keys::QUERY_ID)?;
        Ok(Self {
            by_segment,
            query_id,
            raw,
        })
    }

    /// Returns a copy with `key` set to `value`, revalidated.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if the new value is invalid.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> QueryResult<Self> {
        self.raw.insert(key.into(), value);
        Self::from_map(self.raw)
    }

    /// Returns a copy with the by-segment flag set.
    #[must_use]
    pub fn with_by_segment(mut self, by_segment: bool) -> Self {
        self.by_segment = by_segment;
        self.raw
            .insert(keys::BY_SEGMENT.to_string(), Value::Bool(by_segment));
        self
    }

    /// Returns a copy with the query id set.
    #[must_use]
    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        let query_id = query_id.into();
        self.raw
            .insert(keys::QUERY_ID.to_string(), Value::String(query_id.clone()));
        self.query_id = Some(query_id);
        self
    }

    /// Whether the request asked for by-segment envelopes.
    #[must_use]
    pub fn by_segment(&self) -> bool {
        self.by_segment
    }

    /// The caller-supplied query identifier, if any.
    #[must_use]
    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    /// Reads a boolean option, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if the value is not a boolean or
    /// a `"true"`/`"false"` string.
    pub fn get_bool(&self, key: &str, default: bool) -> QueryResult<bool> {
        parse_bool(&self.raw, key, default)
    }

    /// Reads an integer option, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if the value is not an integer
    /// or a numeric string.
    pub fn get_i64(&self, key: &str, default: i64) -> QueryResult<i64> {
        match self.raw.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| QueryError::invalid_context(key, "expected an integer")),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| QueryError::invalid_context(key, format!("'{s}' is not an integer"))),
            Some(_) => Err(QueryError::invalid_context(key, "expected an integer")),
        }
    }

    /// Reads a string option.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidContext` if the value is not a string.
    pub fn get_str(&self, key: &str) -> QueryResult<Option<&str>> {
        match self.raw.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(QueryError::invalid_context(key, "expected a string")),
        }
    }

    /// Returns the raw option map.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

fn parse_bool(raw: &Map<String, Value>, key: &str, default: bool) -> QueryResult<bool> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(QueryError::invalid_context(
            key,
            format!("expected a boolean, got {other}"),
        )),
    }
}

fn parse_string(raw: &Map<String, Value>, key: &str) -> QueryResult<Option<String>> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(QueryError::invalid_context(
            key,
            format!("expected a string, got {other}"),
        )),
    }
}

impl TryFrom<Map<String, Value>> for QueryContext {
    type Error = QueryError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_map(raw)
    }
}

impl Serialize for QueryContext {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryContext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::deserialize(deserializer)?;
        Self::from_map(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_defaults() {
        let ctx = QueryContext::new();
        assert!(!ctx.by_segment());
        assert!(ctx.query_id().is_none());
    }

    #[test]
    fn test_by_segment_accepts_bool_and_string() {
        let ctx = QueryContext::from_map(map(json!({"bySegment": true}))).unwrap();
        assert!(ctx.by_segment());

        let ctx = QueryContext::from_map(map(json!({"bySegment": "TRUE"}))).unwrap();
        assert!(ctx.by_segment());

        let ctx = QueryContext::from_map(map(json!({"bySegment": "false"}))).unwrap();
        assert!(!ctx.by_segment());
    }

    #[test]
    fn test_by_segment_rejects_other_types() {
        let err = QueryContext::from_map(map(json!({"bySegment": 1}))).unwrap_err();
        assert!(matches!(err, QueryError::InvalidContext { ref key, .. } if key == "bySegment"));

        let err = QueryContext::from_map(map(json!({"bySegment": "yes"}))).unwrap_err();
        assert_eq!(err.code(), "QUERY-INVALID-CONTEXT");
    }

    #[test]
    fn test_query_id_number_is_stringified() {
        let ctx = QueryContext::from_map(map(json!({"queryId": 42}))).unwrap();
        assert_eq!(ctx.query_id(), Some("42"));
    }

    #[test]
    fn test_raw_accessors_for_foreign_keys() {
        let ctx = QueryContext::from_map(map(json!({
            "timeout": "30000",
            "useCache": false,
            "lane": "interactive",
        })))
        .unwrap();

        assert_eq!(ctx.get_i64("timeout", 0).unwrap(), 30_000);
        assert_eq!(ctx.get_i64("priority", 7).unwrap(), 7);
        assert!(!ctx.get_bool("useCache", true).unwrap());
        assert_eq!(ctx.get_str("lane").unwrap(), Some("interactive"));
        assert!(ctx.get_str("timeout").unwrap().is_some());
        assert!(ctx.get_str("useCache").is_err());
        assert!(ctx.get_i64("lane", 0).is_err());
    }

    #[test]
    fn test_with_value_revalidates() {
        let ctx = QueryContext::new()
            .with_value("bySegment", json!("true"))
            .unwrap();
        assert!(ctx.by_segment());

        assert!(QueryContext::new()
            .with_value("bySegment", json!([]))
            .is_err());
    }

    #[test]
    fn test_with_by_segment_keeps_raw_in_sync() {
        let ctx = QueryContext::new().with_by_segment(true);
        assert_eq!(ctx.raw().get("bySegment"), Some(&json!(true)));

        let json = serde_json::to_value(&ctx).unwrap();
        let back: QueryContext = serde_json::from_value(json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_deserialize_rejects_invalid_values() {
        let result: Result<QueryContext, _> = serde_json::from_value(json!({"bySegment": {}}));
        assert!(result.is_err());
    }
}
