//! crates/skinlog_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete blob store and the AI classifier.

use async_trait::async_trait;

use crate::domain::{Product, ProductAnalysis, ProductQuery, UsageLogEntry};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// A generic error type for storage port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failure of the product classification collaborator.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The underlying call failed (network, API error, empty answer).
    #[error("Classification request failed: {0}")]
    Request(String),
    /// The collaborator answered with something that could not be parsed.
    #[error("Classification response could not be parsed: {0}")]
    Unparsable(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for the two logical collections: the shelf and the usage history.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Returns the shelf in insertion order. A missing shelf is empty.
    async fn load_shelf(&self) -> PortResult<Vec<Product>>;

    /// Replaces the whole shelf.
    async fn save_shelf(&self, products: &[Product]) -> PortResult<()>;

    /// Returns the usage log in append order. A missing log is empty.
    async fn load_history(&self) -> PortResult<Vec<UsageLogEntry>>;

    /// Appends a batch of entries to the end of the usage log.
    async fn append_history(&self, entries: &[UsageLogEntry]) -> PortResult<()>;
}

#[async_trait]
pub trait ProductClassificationService: Send + Sync {
    /// Identifies brand, name, category and key actives of a product.
    async fn classify(&self, query: &ProductQuery) -> Result<ProductAnalysis, AnalysisError>;
}
