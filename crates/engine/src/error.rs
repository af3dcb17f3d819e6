//! Reconciliation engine error types.

use common::CorrelationId;
use domain::ContributionError;
use gateway::GatewayError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request failed validation before any store write.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ContributionError),

    /// No contribution carries this correlation ID.
    #[error("No contribution matches correlation ID {0}")]
    NotFound(CorrelationId),

    /// Talking to the payment provider failed; during initiation the
    /// pending record is marked failed before this surfaces.
    #[error("Payment gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    /// The provider's status answer matched none of the known shapes.
    /// The record is left untouched.
    #[error("Unrecognized provider status response for {correlation_id}")]
    UnknownResponse { correlation_id: CorrelationId },

    /// Persistence failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
