//! Campaign configuration.

use chrono::{DateTime, Utc};

use crate::contribution::{Amount, ContributionError};

/// Singleton campaign configuration: the fundraising target, the event
/// window the countdown runs against, the provider account reference
/// that travels with each payment push, and the acceptance gate.
///
/// Read-only from the reconciliation engine's perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSettings {
    /// Fundraising target.
    pub target_amount: Amount,

    /// When the event starts; the public countdown runs to this instant.
    pub event_start: DateTime<Utc>,

    /// When the event ends.
    pub event_end: DateTime<Utc>,

    /// Account reference the provider shows on payer statements.
    pub account_reference: String,

    /// Largest single contribution accepted.
    pub max_contribution: Amount,

    /// Whether contributions are currently accepted.
    pub is_active: bool,
}

impl CampaignSettings {
    /// Rejects amounts outside `(0, max_contribution]`.
    pub fn validate_amount(&self, amount: Amount) -> Result<(), ContributionError> {
        if !amount.is_positive() || amount > self.max_contribution {
            return Err(ContributionError::AmountOutOfRange {
                amount,
                max: self.max_contribution,
            });
        }
        Ok(())
    }

    /// Rejects initiation while the campaign is closed.
    pub fn ensure_active(&self) -> Result<(), ContributionError> {
        if !self.is_active {
            return Err(ContributionError::CampaignClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings() -> CampaignSettings {
        CampaignSettings {
            target_amount: Amount::from_kes(2_300_000),
            event_start: Utc.with_ymd_and_hms(2026, 12, 5, 8, 0, 0).unwrap(),
            event_end: Utc.with_ymd_and_hms(2026, 12, 7, 18, 0, 0).unwrap(),
            account_reference: "Camp2025".to_string(),
            max_contribution: Amount::from_kes(1_000_000),
            is_active: true,
        }
    }

    #[test]
    fn test_amount_within_range_accepted() {
        assert!(settings().validate_amount(Amount::from_kes(500)).is_ok());
        assert!(settings().validate_amount(Amount::from_kes(1_000_000)).is_ok());
        assert!(settings().validate_amount(Amount::from_cents(1)).is_ok());
    }

    #[test]
    fn test_amount_above_max_rejected() {
        let err = settings()
            .validate_amount(Amount::from_kes(1_500_000))
            .unwrap_err();
        assert!(matches!(err, ContributionError::AmountOutOfRange { .. }));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(settings().validate_amount(Amount::zero()).is_err());
        assert!(settings().validate_amount(Amount::from_kes(-10)).is_err());
    }

    #[test]
    fn test_inactive_campaign_rejects_initiation() {
        let mut s = settings();
        assert!(s.ensure_active().is_ok());
        s.is_active = false;
        assert_eq!(s.ensure_active(), Err(ContributionError::CampaignClosed));
    }
}
