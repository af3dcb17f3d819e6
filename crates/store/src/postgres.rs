use async_trait::async_trait;
use chrono::Utc;
use common::{ContributionId, CorrelationId, Version};
use domain::{Amount, Contribution, ContributionStatus, ContributionUpdate, PhoneNumber};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{Result, StoreError, store::ContributionStore};

/// PostgreSQL-backed contribution store.
///
/// Updates run as a version-conditioned write inside a transaction with
/// the row locked, so two racing settlements of the same record cannot
/// both commit. Correlation ID uniqueness is enforced by a partial
/// unique index.
#[derive(Clone)]
pub struct PgContributionStore {
    pool: PgPool,
}

impl PgContributionStore {
    /// Creates a new PostgreSQL contribution store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_contribution(row: PgRow) -> Result<Contribution> {
        let status: ContributionStatus = row.try_get::<String, _>("status")?.parse()?;

        Ok(Contribution {
            id: ContributionId::from_uuid(row.try_get::<Uuid, _>("id")?),
            full_name: row.try_get("full_name")?,
            phone: PhoneNumber::from_canonical(row.try_get("phone")?),
            email: row.try_get("email")?,
            amount: Amount::from_cents(row.try_get("amount_cents")?),
            status,
            receipt: row.try_get("receipt")?,
            is_verified: row.try_get("is_verified")?,
            correlation_id: row
                .try_get::<Option<String>, _>("correlation_id")?
                .map(CorrelationId::new),
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_correlation_violation(
        error: sqlx::Error,
        correlation_id: Option<&CorrelationId>,
    ) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = error
            && db_err.constraint() == Some("idx_contributions_correlation_id")
            && let Some(correlation_id) = correlation_id
        {
            return StoreError::CorrelationIdTaken(correlation_id.clone());
        }
        StoreError::Database(error)
    }
}

#[async_trait]
impl ContributionStore for PgContributionStore {
    async fn insert(&self, contribution: &Contribution) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contributions
                (id, full_name, phone, email, amount_cents, status, receipt,
                 is_verified, correlation_id, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(contribution.id.as_uuid())
        .bind(&contribution.full_name)
        .bind(contribution.phone.as_str())
        .bind(&contribution.email)
        .bind(contribution.amount.cents())
        .bind(contribution.status.as_str())
        .bind(&contribution.receipt)
        .bind(contribution.is_verified)
        .bind(contribution.correlation_id.as_ref().map(|c| c.as_str()))
        .bind(contribution.version.as_i64())
        .bind(contribution.created_at)
        .bind(contribution.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_correlation_violation(e, contribution.correlation_id.as_ref()))?;

        Ok(())
    }

    async fn find(&self, id: ContributionId) -> Result<Option<Contribution>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, phone, email, amount_cents, status, receipt,
                   is_verified, correlation_id, version, created_at, updated_at
            FROM contributions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_contribution).transpose()
    }

    async fn find_by_correlation_id(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Option<Contribution>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, phone, email, amount_cents, status, receipt,
                   is_verified, correlation_id, version, created_at, updated_at
            FROM contributions
            WHERE correlation_id = $1
            "#,
        )
        .bind(correlation_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_contribution).transpose()
    }

    #[tracing::instrument(skip(self, update), fields(id = %id, expected = %expected_version))]
    async fn update(
        &self,
        id: ContributionId,
        expected_version: Version,
        update: &ContributionUpdate,
    ) -> Result<Contribution> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, full_name, phone, email, amount_cents, status, receipt,
                   is_verified, correlation_id, version, created_at, updated_at
            FROM contributions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let current = match row {
            Some(row) => Self::row_to_contribution(row)?,
            None => return Err(StoreError::NotFound(id)),
        };

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: current.version,
            });
        }

        if update.correlation_id.is_some() && current.correlation_id.is_some() {
            return Err(StoreError::CorrelationIdAlreadySet { id });
        }

        let mut updated = current;
        updated.apply_update(update, Utc::now());

        sqlx::query(
            r#"
            UPDATE contributions
            SET phone = $2, amount_cents = $3, status = $4, receipt = $5,
                is_verified = $6, correlation_id = $7, version = $8, updated_at = $9
            WHERE id = $1 AND version = $10
            "#,
        )
        .bind(id.as_uuid())
        .bind(updated.phone.as_str())
        .bind(updated.amount.cents())
        .bind(updated.status.as_str())
        .bind(&updated.receipt)
        .bind(updated.is_verified)
        .bind(updated.correlation_id.as_ref().map(|c| c.as_str()))
        .bind(updated.version.as_i64())
        .bind(updated.updated_at)
        .bind(expected_version.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_correlation_violation(e, update.correlation_id.as_ref()))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn list_verified(&self, limit: usize) -> Result<Vec<Contribution>> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, phone, email, amount_cents, status, receipt,
                   is_verified, correlation_id, version, created_at, updated_at
            FROM contributions
            WHERE is_verified
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_contribution).collect()
    }

    async fn sum_verified(&self) -> Result<Amount> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM contributions WHERE is_verified",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Amount::from_cents(cents))
    }
}
