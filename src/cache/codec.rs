//! Entry Codec Module
//!
//! Converts envelopes to and from what a backend stores.

use serde_json::Value;
use tracing::debug;

use crate::cache::Envelope;
use crate::error::Result;

// == Payload ==
/// What a backend holds under a storage key.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured envelope kept as-is by an in-process store
    Entry(Envelope),
    /// Serialized envelope text for out-of-process stores
    Encoded(String),
}

impl Payload {
    /// Approximate footprint, used by stores that bound value size.
    ///
    /// Structured payloads are measured by walking the value, without
    /// serializing it.
    pub fn size_hint(&self) -> usize {
        match self {
            Payload::Entry(envelope) => {
                let tags: usize = envelope.tags.iter().map(str::len).sum();
                envelope.key.len() + tags + value_footprint(&envelope.value)
            }
            Payload::Encoded(text) => text.len(),
        }
    }
}

/// Rough JSON-text size of `value`: strings and keys by length, scalars at
/// a fixed cost.
fn value_footprint(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => 8,
        Value::String(text) => text.len() + 2,
        Value::Array(items) => items.iter().map(value_footprint).sum::<usize>() + 2,
        Value::Object(fields) => {
            fields
                .iter()
                .map(|(name, field)| name.len() + 3 + value_footprint(field))
                .sum::<usize>()
                + 2
        }
    }
}

// == Entry Codec ==
/// Encoding mode, fixed when a cache instance is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCodec {
    /// No serialization; the backend keeps the structure
    Passthrough,
    /// JSON text
    Json,
}

impl EntryCodec {
    /// Picks the mode suited to a backend.
    pub fn for_backend(in_process: bool) -> Self {
        if in_process {
            EntryCodec::Passthrough
        } else {
            EntryCodec::Json
        }
    }

    pub fn encode(&self, envelope: Envelope) -> Result<Payload> {
        match self {
            EntryCodec::Passthrough => Ok(Payload::Entry(envelope)),
            EntryCodec::Json => Ok(Payload::Encoded(serde_json::to_string(&envelope)?)),
        }
    }

    /// Turns a stored payload back into an envelope.
    ///
    /// Either payload form is accepted whatever the mode. Text that does not
    /// parse yields `Ok(None)` so corrupt or foreign data reads as a miss;
    /// parseable text missing required fields is an `UnexpectedCacheValue`.
    pub fn decode(&self, payload: Payload) -> Result<Option<Envelope>> {
        match payload {
            Payload::Entry(envelope) => Ok(Some(envelope)),
            Payload::Encoded(text) => {
                let document: Value = match serde_json::from_str(&text) {
                    Ok(document) => document,
                    Err(err) => {
                        debug!("Discarding unparseable cache payload: {}", err);
                        return Ok(None);
                    }
                };
                Envelope::from_json(document).map(Some)
            }
        }
    }
}
