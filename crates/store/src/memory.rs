use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{ContributionId, CorrelationId, Version};
use domain::{Amount, Contribution, ContributionUpdate};
use tokio::sync::RwLock;

use crate::{Result, StoreError, store::ContributionStore};

/// In-memory contribution store for testing and local runs.
///
/// Provides the same semantics as the PostgreSQL implementation,
/// including version-conditioned updates and correlation ID
/// uniqueness.
#[derive(Clone, Default)]
pub struct InMemoryContributionStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<ContributionId, Contribution>,
    by_correlation: HashMap<CorrelationId, ContributionId>,
}

impl InMemoryContributionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.records.clear();
        inner.by_correlation.clear();
    }
}

#[async_trait]
impl ContributionStore for InMemoryContributionStore {
    async fn insert(&self, contribution: &Contribution) -> Result<()> {
        let mut inner = self.inner.write().await;

        if let Some(correlation_id) = &contribution.correlation_id {
            if inner.by_correlation.contains_key(correlation_id) {
                return Err(StoreError::CorrelationIdTaken(correlation_id.clone()));
            }
            inner
                .by_correlation
                .insert(correlation_id.clone(), contribution.id);
        }

        inner.records.insert(contribution.id, contribution.clone());
        Ok(())
    }

    async fn find(&self, id: ContributionId) -> Result<Option<Contribution>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn find_by_correlation_id(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Option<Contribution>> {
        let inner = self.inner.read().await;
        let Some(id) = inner.by_correlation.get(correlation_id) else {
            return Ok(None);
        };
        Ok(inner.records.get(id).cloned())
    }

    async fn update(
        &self,
        id: ContributionId,
        expected_version: Version,
        update: &ContributionUpdate,
    ) -> Result<Contribution> {
        let mut inner = self.inner.write().await;

        let record = inner.records.get(&id).ok_or(StoreError::NotFound(id))?;

        if record.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: record.version,
            });
        }

        if let Some(correlation_id) = &update.correlation_id {
            if record.correlation_id.is_some() {
                return Err(StoreError::CorrelationIdAlreadySet { id });
            }
            if inner.by_correlation.contains_key(correlation_id) {
                return Err(StoreError::CorrelationIdTaken(correlation_id.clone()));
            }
        }

        let mut updated = record.clone();
        updated.apply_update(update, Utc::now());

        if let Some(correlation_id) = &update.correlation_id {
            inner.by_correlation.insert(correlation_id.clone(), id);
        }
        inner.records.insert(id, updated.clone());

        Ok(updated)
    }

    async fn list_verified(&self, limit: usize) -> Result<Vec<Contribution>> {
        let inner = self.inner.read().await;
        let mut verified: Vec<_> = inner
            .records
            .values()
            .filter(|c| c.is_verified)
            .cloned()
            .collect();
        verified.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        verified.truncate(limit);
        Ok(verified)
    }

    async fn sum_verified(&self) -> Result<Amount> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|c| c.is_verified)
            .map(|c| c.amount)
            .sum())
    }
}
