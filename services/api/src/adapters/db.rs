//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StorageService` port from the `core` crate. The shelf and the history are
//! each kept as one JSON array in a key-value table, using `sqlx` over PostgreSQL.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use skinlog_core::domain::{Product, UsageLogEntry};
use skinlog_core::ports::{PortError, PortResult, StorageService};
use sqlx::{types::Json, PgPool};
use tracing::debug;

pub const SHELF_KEY: &str = "skinlog_shelf";
pub const HISTORY_KEY: &str = "skinlog_history";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StorageService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Reads one collection. A key that was never written reads as an empty array.
    async fn load_collection<T>(&self, key: &str) -> PortResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Unpin + 'static,
    {
        let row: Option<(Json<Vec<T>>,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(row.map(|(Json(items),)| items).unwrap_or_default())
    }
}

//=========================================================================================
// `StorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorageService for DbAdapter {
    async fn load_shelf(&self) -> PortResult<Vec<Product>> {
        self.load_collection(SHELF_KEY).await
    }

    async fn save_shelf(&self, products: &[Product]) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(SHELF_KEY)
        .bind(Json(products))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!(count = products.len(), "Shelf saved");
        Ok(())
    }

    async fn load_history(&self) -> PortResult<Vec<UsageLogEntry>> {
        self.load_collection(HISTORY_KEY).await
    }

    async fn append_history(&self, entries: &[UsageLogEntry]) -> PortResult<()> {
        // jsonb array concatenation keeps the stored order and appends at the end.
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE \
             SET value = kv_store.value || EXCLUDED.value, updated_at = NOW()",
        )
        .bind(HISTORY_KEY)
        .bind(Json(entries))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!(count = entries.len(), "History appended");
        Ok(())
    }
}
