//! Vector store traits.
//!
//! `Connector` opens a handle; `VectorStore` is the handle. A handle is owned
//! by exactly one run and must be closed once when the run ends.

use std::fmt;

use async_trait::async_trait;
use vecsmoke_types::{CollectionInfo, CollectionSpec, Point, SearchResult};

use crate::error::ClientError;

/// Remote operations issued by a smoke-test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListCollections,
    CollectionExists,
    CollectionInfo,
    CreateCollection,
    DeleteCollection,
    Upsert,
    Search,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ListCollections => write!(f, "list_collections"),
            Operation::CollectionExists => write!(f, "collection_exists"),
            Operation::CollectionInfo => write!(f, "collection_info"),
            Operation::CreateCollection => write!(f, "create_collection"),
            Operation::DeleteCollection => write!(f, "delete_collection"),
            Operation::Upsert => write!(f, "upsert"),
            Operation::Search => write!(f, "search"),
        }
    }
}

/// Handle to a vector store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Names of every collection on the server.
    async fn list_collections(&self) -> Result<Vec<String>, ClientError>;

    /// Whether a collection with this name exists.
    async fn collection_exists(&self, name: &str) -> Result<bool, ClientError>;

    /// Vector parameters of an existing collection.
    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, ClientError>;

    /// Create a collection.
    ///
    /// Fails with `RemoteError::AlreadyExists` when the name is taken.
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), ClientError>;

    /// Delete a collection. Returns whether anything was deleted.
    async fn delete_collection(&self, name: &str) -> Result<bool, ClientError>;

    /// Insert or replace a batch of points in one call.
    ///
    /// Either the whole batch is accepted or an error is returned.
    /// Returns the number of points accepted.
    async fn upsert(&self, collection: &str, points: &[Point]) -> Result<usize, ClientError>;

    /// Nearest-neighbor search, best match first, payload included.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: u64,
    ) -> Result<Vec<SearchResult>, ClientError>;

    /// Release the handle. Later calls fail with `ConnectionError::Closed`.
    fn close(&mut self);
}

/// Opens vector store handles.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a handle bound to this connector's endpoint and credential.
    async fn connect(&self) -> Result<Box<dyn VectorStore>, ClientError>;

    /// Endpoint description for logs. Never includes the credential.
    fn endpoint(&self) -> String;
}
