//! In-memory vector store for tests and dry runs.
//!
//! Behaves like a remote service from the runner's point of view: it keeps
//! collections in a shared map, rejects dimension mismatches server-side,
//! reports duplicate creates as `AlreadyExists` and ranks hits by the
//! collection's metric. It also records how often handles were opened and
//! closed, how often each operation ran, and can inject one failure per
//! operation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use vecsmoke_types::search::sort_ranked;
use vecsmoke_types::{CollectionInfo, CollectionSpec, Distance, Point, PointId, SearchResult};

use crate::error::{ClientError, ConnectionError, RemoteError, RequestError};
use crate::store::{Connector, Operation, VectorStore};

struct Collection {
    info: CollectionInfo,
    points: BTreeMap<PointId, Point>,
}

#[derive(Default)]
struct Shared {
    collections: Mutex<HashMap<String, Collection>>,
    calls: Mutex<HashMap<Operation, usize>>,
    failures: Mutex<HashMap<Operation, ClientError>>,
    connect_failure: Mutex<Option<ClientError>>,
    reverse_results: AtomicBool,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared in-memory store. Clones see the same collections and counters.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a collection, bypassing call counters.
    pub fn with_collection(self, spec: &CollectionSpec) -> Self {
        lock(&self.shared.collections).insert(
            spec.name.clone(),
            Collection {
                info: CollectionInfo {
                    dimension: spec.dimension,
                    distance: spec.distance,
                },
                points: BTreeMap::new(),
            },
        );
        self
    }

    /// Fail the next call of `op` with `error`.
    pub fn fail_next(&self, op: Operation, error: impl Into<ClientError>) {
        lock(&self.shared.failures).insert(op, error.into());
    }

    /// Fail the next `connect` with `error`.
    pub fn fail_connect(&self, error: impl Into<ClientError>) {
        *lock(&self.shared.connect_failure) = Some(error.into());
    }

    /// Return search hits worst-first, like a misbehaving server.
    pub fn reverse_search_results(&self, enabled: bool) {
        self.shared.reverse_results.store(enabled, Ordering::SeqCst);
    }

    /// Number of handles opened.
    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Number of `close` calls across all handles.
    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Number of times `op` was invoked.
    pub fn calls(&self, op: Operation) -> usize {
        lock(&self.shared.calls).get(&op).copied().unwrap_or(0)
    }

    /// Parameters of a stored collection.
    pub fn info(&self, name: &str) -> Option<CollectionInfo> {
        lock(&self.shared.collections).get(name).map(|c| c.info)
    }

    /// Number of points in a collection (0 when absent).
    pub fn point_count(&self, name: &str) -> usize {
        lock(&self.shared.collections)
            .get(name)
            .map_or(0, |c| c.points.len())
    }
}

#[async_trait]
impl Connector for MemoryStore {
    async fn connect(&self) -> Result<Box<dyn VectorStore>, ClientError> {
        if let Some(error) = lock(&self.shared.connect_failure).take() {
            return Err(error);
        }
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        debug!("Opened in-memory vector store handle");
        Ok(Box::new(MemoryHandle {
            shared: Arc::clone(&self.shared),
            closed: false,
        }))
    }

    fn endpoint(&self) -> String {
        "memory://".to_string()
    }
}

/// Handle returned by [`MemoryStore::connect`].
pub struct MemoryHandle {
    shared: Arc<Shared>,
    closed: bool,
}

impl MemoryHandle {
    /// Record the call and surface closed handles or injected failures.
    fn enter(&self, op: Operation) -> Result<(), ClientError> {
        if self.closed {
            return Err(ConnectionError::Closed.into());
        }
        *lock(&self.shared.calls).entry(op).or_insert(0) += 1;
        match lock(&self.shared.failures).remove(&op) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn not_found(name: &str) -> ClientError {
    RemoteError::NotFound(format!("Collection `{}` doesn't exist!", name)).into()
}

#[async_trait]
impl VectorStore for MemoryHandle {
    async fn list_collections(&self) -> Result<Vec<String>, ClientError> {
        self.enter(Operation::ListCollections)?;
        let mut names: Vec<String> = lock(&self.shared.collections).keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, ClientError> {
        self.enter(Operation::CollectionExists)?;
        Ok(lock(&self.shared.collections).contains_key(name))
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, ClientError> {
        self.enter(Operation::CollectionInfo)?;
        lock(&self.shared.collections)
            .get(name)
            .map(|c| c.info)
            .ok_or_else(|| not_found(name))
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), ClientError> {
        self.enter(Operation::CreateCollection)?;
        let mut collections = lock(&self.shared.collections);
        if collections.contains_key(&spec.name) {
            return Err(RemoteError::AlreadyExists(spec.name.clone()).into());
        }
        collections.insert(
            spec.name.clone(),
            Collection {
                info: CollectionInfo {
                    dimension: spec.dimension,
                    distance: spec.distance,
                },
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool, ClientError> {
        self.enter(Operation::DeleteCollection)?;
        Ok(lock(&self.shared.collections).remove(name).is_some())
    }

    async fn upsert(&self, collection: &str, points: &[Point]) -> Result<usize, ClientError> {
        self.enter(Operation::Upsert)?;
        let mut collections = lock(&self.shared.collections);
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        // Whole batch is checked before anything is stored.
        let expected = target.info.dimension;
        if let Some(bad) = points.iter().find(|p| p.dimension() as u64 != expected) {
            return Err(RequestError::Rejected(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                expected,
                bad.dimension()
            ))
            .into());
        }

        for point in points {
            target.points.insert(point.id.clone(), point.clone());
        }
        Ok(points.len())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: u64,
    ) -> Result<Vec<SearchResult>, ClientError> {
        self.enter(Operation::Search)?;
        let collections = lock(&self.shared.collections);
        let target = collections
            .get(collection)
            .ok_or_else(|| not_found(collection))?;

        if query.len() as u64 != target.info.dimension {
            return Err(RequestError::Rejected(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                target.info.dimension,
                query.len()
            ))
            .into());
        }

        let distance = target.info.distance;
        let mut hits: Vec<SearchResult> = target
            .points
            .values()
            .map(|p| {
                SearchResult::new(p.id.clone(), score(distance, query, &p.vector))
                    .with_payload(p.payload.clone())
            })
            .collect();
        sort_ranked(&mut hits, distance);
        hits.truncate(limit as usize);

        if self.shared.reverse_results.load(Ordering::SeqCst) {
            hits.reverse();
        }
        Ok(hits)
    }

    fn close(&mut self) {
        self.closed = true;
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
        debug!("Closed in-memory vector store handle");
    }
}

/// Score of `v` against `query` under `distance`.
fn score(distance: Distance, query: &[f32], v: &[f32]) -> f32 {
    match distance {
        Distance::Cosine => cosine_similarity(query, v),
        Distance::Dot => dot(query, v),
        Distance::Euclidean => euclidean_distance(query, v),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity in [-1.0, 1.0]; zero vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot(a, b) / (norm_a * norm_b)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
