//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_failures_keep_their_cause() {
        let missing = ApiError::from(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        assert_eq!(
            missing.to_string(),
            "Configuration error: Missing the environment variable OPENAI_API_KEY"
        );

        let io = ApiError::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy"));
        assert!(matches!(io, ApiError::Io(_)));
    }
}
