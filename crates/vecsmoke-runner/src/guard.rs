//! Scoped ownership of a vector store handle.

use std::ops::Deref;

use tracing::debug;

use vecsmoke_client::{ClientError, Connector, VectorStore};

/// Owns a store handle for the duration of a run and closes it on drop.
///
/// The handle is closed exactly once, whether the run returns early with an
/// error or completes.
pub struct ConnectionGuard {
    store: Box<dyn VectorStore>,
}

impl ConnectionGuard {
    /// Open a handle through `connector`.
    pub async fn acquire(connector: &dyn Connector) -> Result<Self, ClientError> {
        let store = connector.connect().await?;
        debug!(endpoint = %connector.endpoint(), "Acquired vector store connection");
        Ok(Self { store })
    }

    /// Wrap an already open handle.
    pub fn new(store: Box<dyn VectorStore>) -> Self {
        Self { store }
    }
}

impl Deref for ConnectionGuard {
    type Target = dyn VectorStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.store.close();
        debug!("Released vector store connection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecsmoke_client::MemoryStore;

    #[tokio::test]
    async fn test_guard_closes_once_on_drop() {
        let store = MemoryStore::new();
        {
            let guard = ConnectionGuard::acquire(&store).await.unwrap();
            assert!(!guard.collection_exists("smoke").await.unwrap());
            assert_eq!(store.closed(), 0);
        }
        assert_eq!(store.opened(), 1);
        assert_eq!(store.closed(), 1);
    }

    #[tokio::test]
    async fn test_guard_closes_on_early_return() {
        async fn failing(connector: &MemoryStore) -> Result<(), ClientError> {
            let guard = ConnectionGuard::acquire(connector).await?;
            guard.collection_info("absent").await?;
            Ok(())
        }

        let store = MemoryStore::new();
        assert!(failing(&store).await.is_err());
        assert_eq!(store.closed(), 1);
    }

    #[tokio::test]
    async fn test_failed_acquire_closes_nothing() {
        let store = MemoryStore::new();
        store.fail_connect(vecsmoke_client::ConnectionError::Unreachable(
            "refused".to_string(),
        ));

        assert!(ConnectionGuard::acquire(&store).await.is_err());
        assert_eq!(store.opened(), 0);
        assert_eq!(store.closed(), 0);
    }
}
