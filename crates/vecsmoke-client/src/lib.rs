//! Vector store client layer for vecsmoke.
//!
//! This crate provides:
//! - `VectorStore` and `Connector` traits: the network boundary of a run
//! - `QdrantConnector` / `QdrantStore`: a Qdrant REST implementation
//! - `MemoryStore`: an in-memory store for tests and dry runs
//! - `ClientError`: connection, request and remote error kinds
//!
//! # Example
//!
//! ```rust,no_run
//! use vecsmoke_client::{Connector, QdrantConfig, QdrantConnector, VectorStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = QdrantConnector::new(
//!         QdrantConfig::new("https://localhost:6333").with_api_key("secret"),
//!     );
//!     let mut store = connector.connect().await?;
//!
//!     let exists = store.collection_exists("smoke").await?;
//!     println!("collection exists: {}", exists);
//!
//!     store.close();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod qdrant;
pub mod store;

pub use error::{ClientError, ConnectionError, ErrorKind, RemoteError, RequestError};
pub use memory::{MemoryHandle, MemoryStore};
pub use qdrant::{QdrantConfig, QdrantConnector, QdrantStore, DEFAULT_PORT};
pub use store::{Connector, Operation, VectorStore};
