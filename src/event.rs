//! The typed event record handed to the consumer callback (spec §3/§4.3,
//! component I).
//!
//! The legacy design (per design note 9) is a linked list of
//! `(key, label, type, value, format)` nodes. Here that becomes an owned,
//! typed [`Event`]: a small `Vec` of `(key, FieldValue)` pairs built fresh
//! per successful decode. `FieldValue` derives `Serialize` the way the
//! teacher's `Capture` does (§11 of SPEC_FULL.md) so a downstream sink can
//! serialize it directly, even though sink formatting itself is out of
//! scope.

use serde::Serialize;
use std::collections::BTreeMap;

/// One decoded field's value. A sum type standing in for the legacy
/// `(type, value)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Double(f64),
    Str(String),
    Array(Vec<FieldValue>),
    Nested(Box<Event>),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}
impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v as i64)
    }
}
impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::Int(v as i64)
    }
}
impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Int(v as i64)
    }
}
impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}
impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}
impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}
impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Str(if v { "OK" } else { "LOW" }.to_string())
    }
}

/// One decoded message, packaged as a typed record and owned by the emitter
/// until the consumer callback takes it.
///
/// Field order is preserved (insertion order) since some sinks care about
/// it (e.g. `model` first); lookups by key are still O(n) over a handful of
/// fields, which is the common case for these protocols.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Event {
    fields: Vec<(String, FieldValue)>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a record with the conventional leading `model` field.
    pub fn for_model(model: impl Into<String>) -> Self {
        let mut e = Self::new();
        e.push("model", FieldValue::Str(model.into()));
        e
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Render as an ordered map for sinks that want key lookup rather than
    /// positional iteration (still insertion-order-independent for reading).
    pub fn as_map(&self) -> BTreeMap<&str, &FieldValue> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}
