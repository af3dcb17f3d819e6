//! Contribution status state machine.

use serde::{Deserialize, Serialize};

/// The status of a contribution in its payment lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Completed (sticky once verified)
///           ├──► Failed ─────► Completed (late success)
///           └──► Cancelled ──► Completed (late success)
/// ```
///
/// Completed never transitions away. Failed and Cancelled may still be
/// overridden by a later successful result, because the provider's
/// asynchronous callback can arrive after a premature failure
/// classification from a timed-out poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    /// Payment initiated, awaiting the provider's result.
    #[default]
    Pending,

    /// A successful payment result has been applied.
    Completed,

    /// The provider reported a non-success result.
    Failed,

    /// The payer dismissed the payment prompt.
    Cancelled,
}

impl ContributionStatus {
    /// Returns true if the status may move to `next`.
    pub fn can_transition_to(&self, next: ContributionStatus) -> bool {
        use ContributionStatus::*;
        matches!(
            (*self, next),
            (Pending, Completed)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Failed, Completed)
                | (Cancelled, Completed)
        )
    }

    /// Returns true if a successful payment result can still be applied.
    pub fn can_accept_success(&self) -> bool {
        self.can_transition_to(ContributionStatus::Completed)
    }

    /// Returns true if the provider has answered, successfully or not.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ContributionStatus::Pending)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionStatus::Pending => "pending",
            ContributionStatus::Completed => "completed",
            ContributionStatus::Failed => "failed",
            ContributionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContributionStatus {
    type Err = super::ContributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContributionStatus::Pending),
            "completed" => Ok(ContributionStatus::Completed),
            "failed" => Ok(ContributionStatus::Failed),
            "cancelled" => Ok(ContributionStatus::Cancelled),
            other => Err(super::ContributionError::UnknownStatus(other.to_string())),
        }
    }
}
