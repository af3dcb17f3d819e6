use common::{ContributionId, CorrelationId, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the contribution store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record changed between read and write.
    /// The expected version did not match the stored version.
    #[error(
        "Version conflict for contribution {id}: expected version {expected}, found {actual}"
    )]
    VersionConflict {
        id: ContributionId,
        expected: Version,
        actual: Version,
    },

    /// The contribution was not found in the store.
    #[error("Contribution not found: {0}")]
    NotFound(ContributionId),

    /// The record already carries a correlation ID; it is set at most once.
    #[error("Correlation ID already recorded for contribution {id}")]
    CorrelationIdAlreadySet { id: ContributionId },

    /// Another record already holds this correlation ID.
    #[error("Correlation ID already in use: {0}")]
    CorrelationIdTaken(CorrelationId),

    /// A stored row did not map back onto the domain model.
    #[error("Invalid stored record: {0}")]
    InvalidRecord(#[from] domain::ContributionError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
