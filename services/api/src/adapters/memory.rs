//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the `StorageService` port. Used when no
//! database is configured, and by the handler tests.

use async_trait::async_trait;
use skinlog_core::domain::{Product, UsageLogEntry};
use skinlog_core::ports::{PortResult, StorageService};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    shelf: RwLock<Vec<Product>>,
    history: RwLock<Vec<UsageLogEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageService for InMemoryStore {
    async fn load_shelf(&self) -> PortResult<Vec<Product>> {
        Ok(self.shelf.read().await.clone())
    }

    async fn save_shelf(&self, products: &[Product]) -> PortResult<()> {
        *self.shelf.write().await = products.to_vec();
        Ok(())
    }

    async fn load_history(&self) -> PortResult<Vec<UsageLogEntry>> {
        Ok(self.history.read().await.clone())
    }

    async fn append_history(&self, entries: &[UsageLogEntry]) -> PortResult<()> {
        self.history.write().await.extend_from_slice(entries);
        Ok(())
    }
}
