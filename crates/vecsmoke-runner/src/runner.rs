//! Smoke-test runner.
//!
//! A run is a fixed sequence of awaited steps sharing one connection:
//!
//! 1. acquire a connection (released on every exit path)
//! 2. ensure the collection (check, then create)
//! 3. upsert the sample points in one batch
//! 4. search with the query vector
//! 5. optionally delete the collection, then report
//!
//! Nothing is retried. The only failure absorbed is a create that loses a
//! race to another run ("already exists"); the existing collection's
//! parameters are then checked like any pre-existing collection.

use chrono::Utc;
use tracing::{info, warn};
use ulid::Ulid;

use vecsmoke_client::{ClientError, Connector, RequestError, VectorStore};
use vecsmoke_types::search::{is_ranked, sort_ranked};
use vecsmoke_types::{CollectionInfo, CollectionPolicy, CollectionSpec, SearchResult};

use crate::config::RunConfig;
use crate::error::RunError;
use crate::guard::ConnectionGuard;
use crate::report::{CollectionOutcome, ProbeReport, RunReport};

/// Runs smoke tests through a connector.
pub struct SmokeTestRunner<C> {
    connector: C,
}

impl<C: Connector> SmokeTestRunner<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Execute one run.
    ///
    /// Input is validated before connecting, so a malformed batch or query
    /// never reaches the service.
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport, RunError> {
        let run_id = Ulid::new().to_string();
        let started_at = Utc::now();
        let spec = &config.collection;

        config.validate().map_err(ClientError::from)?;

        info!(
            run_id = %run_id,
            endpoint = %self.connector.endpoint(),
            collection = %spec.name,
            dimension = spec.dimension,
            distance = %spec.distance,
            policy = %config.policy,
            "Starting smoke test"
        );

        let store = ConnectionGuard::acquire(&self.connector).await?;

        let collection_outcome = ensure_collection(&*store, spec, config.policy).await?;
        info!(collection = %spec.name, outcome = %collection_outcome, "Collection ready");

        let upserted = store.upsert(&spec.name, &config.points).await?;
        info!(collection = %spec.name, count = upserted, "Upserted points");

        let results = search(&*store, spec, &config.query, config.limit).await?;
        info!(collection = %spec.name, hits = results.len(), "Search complete");

        let cleaned_up = if config.cleanup {
            let deleted = store.delete_collection(&spec.name).await?;
            info!(collection = %spec.name, deleted, "Cleaned up collection");
            deleted
        } else {
            false
        };

        Ok(RunReport {
            run_id,
            collection: spec.name.clone(),
            distance: spec.distance,
            collection_outcome,
            upserted,
            results,
            cleaned_up,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Connect, list the server's collections and report whether `collection`
    /// exists, with its parameters.
    pub async fn probe(&self, collection: &str) -> Result<ProbeReport, RunError> {
        let store = ConnectionGuard::acquire(&self.connector).await?;
        let mut collections = store.list_collections().await?;
        collections.sort();
        let exists = store.collection_exists(collection).await?;
        let info = if exists {
            Some(store.collection_info(collection).await?)
        } else {
            None
        };

        Ok(ProbeReport {
            endpoint: self.connector.endpoint(),
            collections,
            collection: collection.to_string(),
            exists,
            info,
        })
    }
}

/// Step 2: make sure the collection exists with the requested parameters.
async fn ensure_collection(
    store: &dyn VectorStore,
    spec: &CollectionSpec,
    policy: CollectionPolicy,
) -> Result<CollectionOutcome, ClientError> {
    let exists = store.collection_exists(&spec.name).await?;

    match (policy, exists) {
        (CollectionPolicy::Recreate, true) => {
            store.delete_collection(&spec.name).await?;
            info!(collection = %spec.name, "Deleted existing collection");
            store.create_collection(spec).await?;
            Ok(CollectionOutcome::Recreated)
        }
        (_, true) => {
            verify_collection(store, spec).await?;
            Ok(CollectionOutcome::AlreadyExisted)
        }
        (_, false) => match store.create_collection(spec).await {
            Ok(()) => Ok(CollectionOutcome::Created),
            Err(e) if e.is_already_exists() && policy == CollectionPolicy::Ensure => {
                warn!(collection = %spec.name, "Collection was created concurrently; reusing it");
                verify_collection(store, spec).await?;
                Ok(CollectionOutcome::AlreadyExisted)
            }
            Err(e) => Err(e),
        },
    }
}

/// Reject an existing collection whose parameters differ from `spec`.
async fn verify_collection(
    store: &dyn VectorStore,
    spec: &CollectionSpec,
) -> Result<(), ClientError> {
    let actual = store.collection_info(&spec.name).await?;
    if actual.matches(spec) {
        return Ok(());
    }

    let expected = CollectionInfo {
        dimension: spec.dimension,
        distance: spec.distance,
    };
    Err(RequestError::SchemaMismatch {
        collection: spec.name.clone(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
    .into())
}

/// Step 4: search and enforce best-first order and the limit.
async fn search(
    store: &dyn VectorStore,
    spec: &CollectionSpec,
    query: &[f32],
    limit: u64,
) -> Result<Vec<SearchResult>, ClientError> {
    let mut results = store.search(&spec.name, query, limit).await?;

    if !is_ranked(&results, spec.distance) {
        warn!(collection = %spec.name, "Search results arrived out of order; re-sorting");
        sort_ranked(&mut results, spec.distance);
    }
    if results.len() as u64 > limit {
        warn!(
            collection = %spec.name,
            hits = results.len(),
            limit,
            "Server returned more hits than requested; truncating"
        );
        results.truncate(limit as usize);
    }

    Ok(results)
}
