//! Run configuration.

use vecsmoke_types::{
    CollectionPolicy, CollectionSpec, Point, SampleSet, Settings, SmokeError, ValidationError,
};

/// Default number of search results.
pub const DEFAULT_LIMIT: u64 = 5;

/// Everything a run needs besides the connection.
///
/// Endpoint and credential belong to the `Connector` the runner is built with.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Collection to ensure and write to
    pub collection: CollectionSpec,

    /// Points to upsert in one batch
    pub points: Vec<Point>,

    /// Query vector
    pub query: Vec<f32>,

    /// Maximum number of search results
    pub limit: u64,

    /// Existing-collection policy
    pub policy: CollectionPolicy,

    /// Delete the collection after a successful search
    pub cleanup: bool,
}

impl RunConfig {
    /// Create a config with the default limit and the `Ensure` policy.
    pub fn new(collection: CollectionSpec, sample: SampleSet) -> Self {
        Self {
            collection,
            points: sample.points,
            query: sample.query,
            limit: DEFAULT_LIMIT,
            policy: CollectionPolicy::Ensure,
            cleanup: false,
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_policy(mut self, policy: CollectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Build from validated settings and a sample set.
    pub fn from_settings(settings: &Settings, sample: SampleSet) -> Result<Self, SmokeError> {
        settings.validate()?;
        Ok(Self::new(settings.collection_spec(), sample)
            .with_limit(settings.search_limit)
            .with_policy(settings.policy)
            .with_cleanup(settings.cleanup))
    }

    /// Check collection, batch and query before anything is sent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.collection.validate()?;
        if self.limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }
        self.collection.validate_points(&self.points)?;
        self.collection.validate_query(&self.query)
    }
}
