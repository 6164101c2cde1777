//! Sample data for a smoke-test run.
//!
//! The built-in set is the classic 4-dimensional two-point example. A JSON
//! file with the same shape can replace it:
//!
//! ```json
//! {
//!   "query": [0.6235, 0.123, 0.532, 0.123],
//!   "points": [{"id": 1, "vector": [0.32, 0.52, 0.21, 0.52], "payload": {"color": "red"}}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SmokeError;
use crate::point::Point;

/// Points to upsert plus the query vector to search with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    /// Query vector
    pub query: Vec<f32>,

    /// Points to upsert in one batch
    pub points: Vec<Point>,
}

impl SampleSet {
    /// The built-in 4-dimensional sample.
    pub fn builtin() -> Self {
        Self {
            query: vec![0.6235, 0.123, 0.532, 0.123],
            points: vec![
                Point::new(1, vec![0.32, 0.52, 0.21, 0.52])
                    .with_payload_entry("color", "red")
                    .with_payload_entry("rand_number", 32),
                Point::new(2, vec![1.42, 0.52, 0.67, 0.632])
                    .with_payload_entry("color", "black")
                    .with_payload_entry("rand_number", 53)
                    .with_payload_entry("extra_field", true),
            ],
        }
    }

    /// Parse a sample set from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SmokeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a sample set from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SmokeError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Length of the query vector.
    pub fn dimension(&self) -> usize {
        self.query.len()
    }
}

impl Default for SampleSet {
    fn default() -> Self {
        Self::builtin()
    }
}
