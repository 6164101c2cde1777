//! Run report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use vecsmoke_types::{CollectionInfo, Distance, SearchResult};

/// What step 2 did with the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionOutcome {
    /// Collection was absent and has been created
    Created,
    /// Collection existed with matching parameters and was reused
    AlreadyExisted,
    /// Collection existed and was deleted and created again
    Recreated,
}

impl fmt::Display for CollectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionOutcome::Created => write!(f, "created"),
            CollectionOutcome::AlreadyExisted => write!(f, "already existed"),
            CollectionOutcome::Recreated => write!(f, "recreated"),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique run identifier (ULID)
    pub run_id: String,

    /// Collection name
    pub collection: String,

    /// Metric the results are ranked by
    pub distance: Distance,

    /// Collection step outcome
    pub collection_outcome: CollectionOutcome,

    /// Number of points accepted by the upsert
    pub upserted: usize,

    /// Hits, best match first
    pub results: Vec<SearchResult>,

    /// Whether the collection was deleted after the search
    pub cleaned_up: bool,

    /// Run start
    pub started_at: DateTime<Utc>,

    /// Run end
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Best hit, if any.
    pub fn top_hit(&self) -> Option<&SearchResult> {
        self.results.first()
    }

    /// Wall-clock duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        format!(
            "collection '{}' {}, {} point(s) upserted, {} result(s) in {} ms",
            self.collection,
            self.collection_outcome,
            self.upserted,
            self.results.len(),
            self.duration_ms()
        )
    }
}

/// Result of a connectivity probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Endpoint probed (no credential)
    pub endpoint: String,

    /// Every collection on the server, sorted
    pub collections: Vec<String>,

    /// Collection name checked
    pub collection: String,

    /// Whether it exists
    pub exists: bool,

    /// Its parameters when it exists
    pub info: Option<CollectionInfo>,
}
