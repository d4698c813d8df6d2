//! Envelope Module
//!
//! The record every cached value is wrapped in, and the rules deciding whether
//! a stored envelope may still be served.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cache::tags::{TagState, GLOBAL_TAG};
use crate::error::{CacheError, Result};

// == Tags ==
/// Ordered, de-duplicated set of tag labels.
///
/// Labels are trimmed on insertion and empty labels are dropped. Deserializes
/// from either a single string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag unless it is blank or already present.
    pub fn push(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return;
        }
        self.0.push(trimmed.to_string());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lenient conversion used on decoded envelopes: anything that is not an
    /// array of strings contributes no tags.
    fn from_loose(value: Option<Value>) -> Self {
        match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(tag) => Some(tag),
                    _ => None,
                })
                .collect(),
            _ => Self::new(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Self::new();
        for tag in iter {
            tags.push(tag);
        }
        tags
    }
}

impl From<&str> for Tags {
    fn from(tag: &str) -> Self {
        std::iter::once(tag).collect()
    }
}

impl From<String> for Tags {
    fn from(tag: String) -> Self {
        std::iter::once(tag).collect()
    }
}

impl<S: Into<String>> From<Vec<S>> for Tags {
    fn from(tags: Vec<S>) -> Self {
        tags.into_iter().collect()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Tags {
    fn from(tags: [S; N]) -> Self {
        tags.into_iter().collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(tag) => Tags::from(tag),
            OneOrMany::Many(tags) => Tags::from(tags),
        })
    }
}

// == Verdict ==
/// Outcome of checking a stored blob against the requested key, the clock and
/// the known tag invalidations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Servable, with this many milliseconds left
    Valid { ttl_ms: u64 },
    /// Absolute expiry reached
    Expired,
    /// Envelope belongs to another key that hashed to the same index
    KeyMismatch,
    /// A tag (possibly the global one) was invalidated at or after insertion
    Invalidated { tag: String },
    /// Stored bytes could not be parsed at all
    Corrupt,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }
}

// == Envelope ==
/// A cached value with its bookkeeping.
///
/// The single-letter field names are the wire format shared with other
/// readers of the same backend and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Insertion instant (Unix milliseconds)
    #[serde(rename = "i")]
    pub inserted_at: u64,
    /// Absolute expiration instant (Unix milliseconds)
    #[serde(rename = "e")]
    pub expires_at: u64,
    /// Original, un-hashed key
    #[serde(rename = "k")]
    pub key: String,
    /// Payload
    #[serde(rename = "v")]
    pub value: Value,
    /// Tags attached at write time
    #[serde(rename = "t", default)]
    pub tags: Tags,
}

impl Envelope {
    // == Constructor ==
    /// Wraps `value` for `key`, written at `now` and living `expire_ms`.
    pub fn new(key: impl Into<String>, value: Value, now: u64, expire_ms: u64, tags: Tags) -> Self {
        Self {
            inserted_at: now,
            expires_at: now.saturating_add(expire_ms),
            key: key.into(),
            value,
            tags,
        }
    }

    /// Validates a decoded JSON document as an envelope.
    ///
    /// Fails with `UnexpectedCacheValue` when `i`, `e`, `k` or `v` is missing
    /// or has the wrong type. An explicit `null` payload is accepted.
    pub fn from_json(document: Value) -> Result<Self> {
        let raw: RawEnvelope =
            serde_json::from_value(document).map_err(|_| CacheError::UnexpectedCacheValue)?;

        match (raw.i, raw.e, raw.k, raw.v) {
            (Some(inserted_at), Some(expires_at), Some(key), Some(value)) => Ok(Self {
                inserted_at,
                expires_at,
                key,
                value,
                tags: Tags::from_loose(raw.t),
            }),
            _ => Err(CacheError::UnexpectedCacheValue),
        }
    }

    // == Verdict ==
    /// Decides whether this envelope may be served for `key` at `now`.
    ///
    /// An entry is invalidated when its insertion instant is less than or
    /// equal to the invalidation instant of the global tag or of any of its
    /// own tags.
    pub fn verdict(&self, key: &str, now: u64, tag_state: &TagState) -> Verdict {
        if self.expires_at <= now {
            return Verdict::Expired;
        }
        if self.key != key {
            return Verdict::KeyMismatch;
        }

        for tag in std::iter::once(GLOBAL_TAG).chain(self.tags.iter()) {
            if let Some(instant) = tag_state.instant(tag) {
                if self.inserted_at <= instant {
                    return Verdict::Invalidated {
                        tag: tag.to_string(),
                    };
                }
            }
        }

        Verdict::Valid {
            ttl_ms: self.expires_at - now,
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    i: Option<u64>,
    #[serde(default)]
    e: Option<u64>,
    #[serde(default)]
    k: Option<String>,
    #[serde(default, deserialize_with = "present")]
    v: Option<Value>,
    #[serde(default)]
    t: Option<Value>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(tags: Tags) -> Envelope {
        Envelope::new("k", json!("v"), 1_000, 500, tags)
    }

    #[test]
    fn test_tags_normalization() {
        let tags = Tags::from(vec![" a ", "b", "a", "", "  "]);
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);

        let single = Tags::from("solo");
        assert_eq!(single.len(), 1);
        assert!(single.contains("solo"));
    }

    #[test]
    fn test_tags_deserialize_one_or_many() {
        let one: Tags = serde_json::from_value(json!("a")).unwrap();
        let many: Tags = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(one, Tags::from(["a"]));
        assert_eq!(many, Tags::from(["a", "b"]));
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(envelope(Tags::from("x"))).unwrap();
        assert_eq!(
            json,
            json!({ "i": 1_000, "e": 1_500, "k": "k", "v": "v", "t": ["x"] })
        );
    }

    #[test]
    fn test_from_json_missing_expiry_is_malformed() {
        let result = Envelope::from_json(json!({ "i": 1, "k": "k", "v": 1, "t": [] }));
        assert!(matches!(result, Err(CacheError::UnexpectedCacheValue)));
    }

    #[test]
    fn test_from_json_non_object_is_malformed() {
        assert!(matches!(
            Envelope::from_json(json!(42)),
            Err(CacheError::UnexpectedCacheValue)
        ));
    }

    #[test]
    fn test_from_json_null_value_is_accepted() {
        let env = Envelope::from_json(json!({ "i": 1, "e": 2, "k": "k", "v": null })).unwrap();
        assert_eq!(env.value, Value::Null);
        assert!(env.tags.is_empty());
    }

    #[test]
    fn test_from_json_tolerates_odd_tag_field() {
        let env =
            Envelope::from_json(json!({ "i": 1, "e": 2, "k": "k", "v": 0, "t": "nope" })).unwrap();
        assert!(env.tags.is_empty());
    }

    #[test]
    fn test_verdict_valid_reports_remaining_ttl() {
        let verdict = envelope(Tags::new()).verdict("k", 1_200, &TagState::new(0));
        assert_eq!(verdict, Verdict::Valid { ttl_ms: 300 });
    }

    #[test]
    fn test_verdict_expired_at_boundary() {
        let env = envelope(Tags::new());
        assert_eq!(env.verdict("k", 1_500, &TagState::new(0)), Verdict::Expired);
        assert_eq!(env.verdict("k", 1_499, &TagState::new(0)), Verdict::Valid { ttl_ms: 1 });
    }

    #[test]
    fn test_verdict_key_mismatch() {
        let verdict = envelope(Tags::new()).verdict("other", 1_200, &TagState::new(0));
        assert_eq!(verdict, Verdict::KeyMismatch);
    }

    #[test]
    fn test_verdict_same_millisecond_invalidation() {
        let mut state = TagState::new(0);
        state.invalidate("a", 1_000, false);
        let verdict = envelope(Tags::from("a")).verdict("k", 1_200, &state);
        assert_eq!(verdict, Verdict::Invalidated { tag: "a".to_string() });
    }

    #[test]
    fn test_verdict_older_invalidation_keeps_entry() {
        let mut state = TagState::new(0);
        state.invalidate("a", 999, false);
        assert!(envelope(Tags::from("a")).verdict("k", 1_200, &state).is_valid());
    }

    #[test]
    fn test_verdict_global_tag_applies_to_untagged() {
        let mut state = TagState::new(0);
        state.invalidate(GLOBAL_TAG, 1_100, false);
        let verdict = envelope(Tags::new()).verdict("k", 1_200, &state);
        assert_eq!(
            verdict,
            Verdict::Invalidated {
                tag: GLOBAL_TAG.to_string()
            }
        );
    }

    #[test]
    fn test_verdict_unrelated_tag_ignored() {
        let mut state = TagState::new(0);
        state.invalidate("b", 1_100, false);
        assert!(envelope(Tags::from("a")).verdict("k", 1_200, &state).is_valid());
    }
}
