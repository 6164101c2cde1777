//! Search result type and ranking helpers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::collection::Distance;
use crate::point::{Payload, PointId};

/// A scored hit returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Point identifier
    pub id: PointId,

    /// Score as reported by the server (a distance for euclidean collections)
    pub score: f32,

    /// Payload snapshot, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl SearchResult {
    pub fn new(id: impl Into<PointId>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Compare two hits so that the better match sorts first.
    pub fn rank_cmp(&self, other: &Self, distance: Distance) -> Ordering {
        if distance.higher_is_better() {
            other.score.total_cmp(&self.score)
        } else {
            self.score.total_cmp(&other.score)
        }
    }
}

/// Whether hits are ordered best-first for the given metric. Ties are allowed.
pub fn is_ranked(results: &[SearchResult], distance: Distance) -> bool {
    results
        .windows(2)
        .all(|w| w[0].rank_cmp(&w[1], distance) != Ordering::Greater)
}

/// Stable sort of hits best-first for the given metric.
pub fn sort_ranked(results: &mut [SearchResult], distance: Distance) {
    results.sort_by(|a, b| a.rank_cmp(b, distance));
}
