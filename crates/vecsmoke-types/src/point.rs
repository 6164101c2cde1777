//! Point types sent to a vector store.
//!
//! A point is a fixed-length vector plus an optional payload of scalar values.
//! Points are built in memory, sent once in an upsert batch and then dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;

/// Identifier of a point within a collection.
///
/// Vector stores accept either an unsigned integer or a UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    /// Numeric identifier
    Num(u64),
    /// UUID identifier (hyphenated or simple form)
    Uuid(String),
}

impl PointId {
    /// Create a UUID identifier. Format is checked by [`PointId::validate`].
    pub fn uuid(value: impl Into<String>) -> Self {
        PointId::Uuid(value.into())
    }

    /// Check that a UUID identifier is well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            PointId::Num(_) => Ok(()),
            PointId::Uuid(s) if is_uuid(s) => Ok(()),
            PointId::Uuid(s) => Err(ValidationError::InvalidId(s.clone())),
        }
    }
}

impl From<u64> for PointId {
    fn from(id: u64) -> Self {
        PointId::Num(id)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Num(n) => write!(f, "{}", n),
            PointId::Uuid(s) => write!(f, "{}", s),
        }
    }
}

fn is_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.len() {
        32 => bytes.iter().all(u8::is_ascii_hexdigit),
        36 => bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        }),
        _ => false,
    }
}

/// A scalar payload value.
///
/// Untagged on the wire, so `"red"`, `32`, `0.5` and `true` map to the
/// matching variant. Integers are tried before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::Bool(b) => write!(f, "{}", b),
            PayloadValue::Integer(i) => write!(f, "{}", i),
            PayloadValue::Float(x) => write!(f, "{}", x),
            PayloadValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for PayloadValue {
    fn from(v: bool) -> Self {
        PayloadValue::Bool(v)
    }
}

impl From<i64> for PayloadValue {
    fn from(v: i64) -> Self {
        PayloadValue::Integer(v)
    }
}

impl From<i32> for PayloadValue {
    fn from(v: i32) -> Self {
        PayloadValue::Integer(v as i64)
    }
}

impl From<f64> for PayloadValue {
    fn from(v: f64) -> Self {
        PayloadValue::Float(v)
    }
}

impl From<&str> for PayloadValue {
    fn from(v: &str) -> Self {
        PayloadValue::String(v.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(v: String) -> Self {
        PayloadValue::String(v)
    }
}

/// Payload map. Ordered so printed output is stable.
pub type Payload = BTreeMap<String, PayloadValue>;

/// A point to upsert into a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Identifier, unique within the collection
    pub id: PointId,

    /// Vector; length must equal the collection dimensionality
    pub vector: Vec<f32>,

    /// Optional scalar payload
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub payload: Payload,
}

impl Point {
    /// Create a point without payload.
    pub fn new(id: impl Into<PointId>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            payload: Payload::new(),
        }
    }

    /// Replace the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Add a single payload entry.
    pub fn with_payload_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<PayloadValue>,
    ) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Vector length.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}
