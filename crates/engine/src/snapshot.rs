//! Read-side views the engine hands back to callers.

use common::ContributionId;
use domain::{Contribution, ContributionStatus, RESULT_PENDING};
use serde::Serialize;

/// The outcome of a status poll, echoing the provider's result
/// alongside the canonical record state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Provider result code; [`RESULT_PENDING`] while unanswered.
    pub result_code: i64,

    /// Provider result description.
    pub result_description: String,

    /// Canonical contribution status after the poll was applied.
    pub status: ContributionStatus,

    /// Provider transaction reference, if known.
    pub receipt: Option<String>,
}

impl StatusSnapshot {
    /// Snapshot for a push the payer has not answered yet. The record
    /// is untouched.
    pub fn pending(status: ContributionStatus) -> Self {
        Self {
            result_code: RESULT_PENDING,
            result_description: "Pending: Awaiting user interaction".to_string(),
            status,
            receipt: None,
        }
    }
}

/// A stored contribution as seen by status lookups and feeds. Carries
/// no mutation capability.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionView {
    pub contribution_id: ContributionId,
    pub status: ContributionStatus,
    pub is_verified: bool,
    pub amount_kes: f64,
    pub receipt: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Contribution> for ContributionView {
    fn from(record: &Contribution) -> Self {
        Self {
            contribution_id: record.id,
            status: record.status,
            is_verified: record.is_verified,
            amount_kes: record.amount.as_kes_f64(),
            receipt: record.receipt.clone(),
            updated_at: record.updated_at,
        }
    }
}
