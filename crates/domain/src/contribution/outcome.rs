//! Payment outcome classification and settlement decisions.

use super::{Amount, ContributionStatus, ContributionUpdate, PhoneNumber};

/// Result code the provider uses for a successful payment.
pub const RESULT_SUCCESS: i64 = 0;

/// Result code the provider uses when the payer dismissed the prompt.
pub const RESULT_CANCELLED_BY_USER: i64 = 1032;

/// Result code reported to clients while the provider has not answered.
pub const RESULT_PENDING: i64 = -1;

/// Fields extracted from a successful payment result.
///
/// The provider's metadata items are optional in practice; a missing
/// field never blocks settlement, it is simply stored as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentConfirmation {
    /// Amount the provider confirms was paid.
    pub amount: Option<Amount>,

    /// Provider transaction reference (receipt number).
    pub receipt: Option<String>,

    /// Payer phone number as the provider saw it.
    pub phone: Option<PhoneNumber>,
}

/// A classified payment result from either the callback or the status
/// query channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// The payment went through.
    Success(PaymentConfirmation),

    /// The payer cancelled the prompt.
    Cancelled,

    /// Any other non-success result.
    Failed,
}

impl PaymentOutcome {
    /// Classifies a provider result code.
    pub fn from_result(code: i64, confirmation: PaymentConfirmation) -> Self {
        match code {
            RESULT_SUCCESS => PaymentOutcome::Success(confirmation),
            RESULT_CANCELLED_BY_USER => PaymentOutcome::Cancelled,
            _ => PaymentOutcome::Failed,
        }
    }

    /// The status this outcome settles a contribution into.
    pub fn target_status(&self) -> ContributionStatus {
        match self {
            PaymentOutcome::Success(_) => ContributionStatus::Completed,
            PaymentOutcome::Cancelled => ContributionStatus::Cancelled,
            PaymentOutcome::Failed => ContributionStatus::Failed,
        }
    }
}

/// The decision produced by settling an outcome against the current
/// record state. Exactly one of these holds for any (record, outcome)
/// pair, which is what keeps redelivered callbacks and racing polls
/// from double-writing.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// The outcome advances the record; the mutation to persist.
    Apply(ContributionUpdate),

    /// The record is already verified; nothing to do, report success.
    AlreadyProcessed,

    /// The transition is not permitted from the current status; the
    /// signal is acknowledged but the record keeps its state.
    Skipped { current: ContributionStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_code_classifies_with_confirmation() {
        let confirmation = PaymentConfirmation {
            amount: Some(Amount::from_kes(500)),
            receipt: Some("QAX123".to_string()),
            phone: None,
        };
        let outcome = PaymentOutcome::from_result(RESULT_SUCCESS, confirmation.clone());
        assert_eq!(outcome, PaymentOutcome::Success(confirmation));
        assert_eq!(outcome.target_status(), ContributionStatus::Completed);
    }

    #[test]
    fn test_cancel_code_classifies_as_cancelled() {
        let outcome = PaymentOutcome::from_result(1032, PaymentConfirmation::default());
        assert_eq!(outcome, PaymentOutcome::Cancelled);
        assert_eq!(outcome.target_status(), ContributionStatus::Cancelled);
    }

    #[test]
    fn test_any_other_code_classifies_as_failed() {
        for code in [1, 17, 1037, 2001, -5] {
            let outcome = PaymentOutcome::from_result(code, PaymentConfirmation::default());
            assert_eq!(outcome, PaymentOutcome::Failed, "code {code}");
            assert_eq!(outcome.target_status(), ContributionStatus::Failed);
        }
    }
}
