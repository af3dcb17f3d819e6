use async_trait::async_trait;
use common::{ContributionId, CorrelationId, Version};
use domain::{Amount, Contribution, ContributionUpdate};

use crate::Result;

/// Core trait for contribution store implementations.
///
/// A store persists contribution records and serializes concurrent
/// mutations of the same record. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait ContributionStore: Send + Sync {
    /// Persists a freshly created record.
    ///
    /// Fails with `CorrelationIdTaken` if the record carries a
    /// correlation ID another record already holds.
    async fn insert(&self, contribution: &Contribution) -> Result<()>;

    /// Retrieves a record by its internal ID.
    async fn find(&self, id: ContributionId) -> Result<Option<Contribution>>;

    /// Retrieves the record holding the given correlation ID.
    async fn find_by_correlation_id(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Option<Contribution>>;

    /// Applies a mutation to a record, conditioned on its version.
    ///
    /// The update only commits if the stored version still equals
    /// `expected_version`; otherwise the call fails with
    /// `VersionConflict` and the caller re-reads and retries. An update
    /// that sets a correlation ID fails with `CorrelationIdAlreadySet`
    /// when the record already has one, and with `CorrelationIdTaken`
    /// when another record holds the same value.
    ///
    /// Returns the record as persisted, with its bumped version.
    async fn update(
        &self,
        id: ContributionId,
        expected_version: Version,
        update: &ContributionUpdate,
    ) -> Result<Contribution>;

    /// Returns the most recent verified contributions, newest first.
    async fn list_verified(&self, limit: usize) -> Result<Vec<Contribution>>;

    /// Returns the total verified amount.
    async fn sum_verified(&self) -> Result<Amount>;
}
