//! Campaign statistics.
//!
//! A pure read-side projection over the contribution store: the total
//! raised, progress against the target, the event countdown, and the
//! public feed of recent verified contributions. Nothing here mutates
//! a record.

use chrono::{DateTime, Utc};
use domain::{CampaignSettings, Contribution};
use serde::Serialize;
use store::{ContributionStore, StoreError};
use thiserror::Error;

/// Errors that can occur while computing statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Reading from the store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Time remaining until the event starts, clamped to zero once it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Computes the countdown from `now` to `target`.
    pub fn until(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let remaining = (target - now).num_seconds().max(0);
        Self {
            days: remaining / 86_400,
            hours: remaining % 86_400 / 3_600,
            minutes: remaining % 3_600 / 60,
            seconds: remaining % 60,
        }
    }

    /// True once the event has started.
    pub fn is_elapsed(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// The campaign dashboard numbers.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignStats {
    pub total_raised_kes: f64,
    pub target_kes: f64,
    /// Progress against the target, clamped to `[0, 100]`.
    pub percentage: f64,
    pub countdown: Countdown,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
}

/// One entry in the public contribution feed.
#[derive(Debug, Clone, Serialize)]
pub struct RecentContribution {
    pub full_name: String,
    pub amount_kes: f64,
    pub contributed_at: DateTime<Utc>,
}

impl From<&Contribution> for RecentContribution {
    fn from(record: &Contribution) -> Self {
        Self {
            full_name: record.full_name.clone(),
            amount_kes: record.amount.as_kes_f64(),
            contributed_at: record.updated_at,
        }
    }
}

/// Read-only statistics service over the contribution store.
pub struct StatsService<S: ContributionStore> {
    store: S,
    settings: CampaignSettings,
}

impl<S: ContributionStore> StatsService<S> {
    /// Creates a new statistics service.
    pub fn new(store: S, settings: CampaignSettings) -> Self {
        Self { store, settings }
    }

    /// Computes the campaign statistics as of now.
    pub async fn campaign_stats(&self) -> Result<CampaignStats> {
        self.campaign_stats_at(Utc::now()).await
    }

    /// Computes the campaign statistics as of a given instant.
    #[tracing::instrument(skip(self))]
    pub async fn campaign_stats_at(&self, now: DateTime<Utc>) -> Result<CampaignStats> {
        let total = self.store.sum_verified().await?;

        let target = self.settings.target_amount;
        let percentage = if target.is_positive() {
            (total.as_kes_f64() / target.as_kes_f64() * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Ok(CampaignStats {
            total_raised_kes: total.as_kes_f64(),
            target_kes: target.as_kes_f64(),
            percentage,
            countdown: Countdown::until(now, self.settings.event_start),
            event_start: self.settings.event_start,
            event_end: self.settings.event_end,
        })
    }

    /// Returns the most recent verified contributions, newest first.
    pub async fn recent_contributions(&self, limit: usize) -> Result<Vec<RecentContribution>> {
        let records = self.store.list_verified(limit).await?;
        Ok(records.iter().map(RecentContribution::from).collect())
    }
}
