//! The contribution record and its settlement logic.

use chrono::{DateTime, Utc};
use common::{ContributionId, CorrelationId, Version};

use super::{
    Amount, ContributionStatus, PaymentOutcome, PhoneNumber,
    outcome::Settlement,
};

/// A single contribution: the unit of record that the three payment
/// channels (initiation response, provider callback, status poll) all
/// reconcile into.
///
/// A record is created in `pending` state before the payment push goes
/// out. The correlation ID is written exactly once, by the initiation
/// path, after the provider accepts the push. Settlement then advances
/// the status; once `is_verified` is true the record never changes
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// Internal identifier, assigned at creation.
    pub id: ContributionId,

    /// Contributor's full name.
    pub full_name: String,

    /// Canonical phone number the push was sent to.
    pub phone: PhoneNumber,

    /// Contributor's email, if supplied.
    pub email: Option<String>,

    /// Pledged amount; overwritten by the provider-confirmed amount on
    /// successful settlement when the metadata carries one.
    pub amount: Amount,

    /// Current lifecycle status.
    pub status: ContributionStatus,

    /// Provider transaction reference, set on successful settlement.
    pub receipt: Option<String>,

    /// True once a successful terminal result has been applied.
    pub is_verified: bool,

    /// Provider-issued checkout identifier; null until initiation
    /// succeeds, unique once set.
    pub correlation_id: Option<CorrelationId>,

    /// Optimistic concurrency version.
    pub version: Version,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Contribution {
    /// Creates a fresh pending record for a newly initiated payment.
    pub fn pending(
        full_name: impl Into<String>,
        phone: PhoneNumber,
        email: Option<String>,
        amount: Amount,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ContributionId::new(),
            full_name: full_name.into(),
            phone,
            email,
            amount,
            status: ContributionStatus::Pending,
            receipt: None,
            is_verified: false,
            correlation_id: None,
            version: Version::first(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Decides how a payment outcome settles against the current state.
    ///
    /// This is the single authority for the idempotency rules: a
    /// verified record absorbs everything as [`Settlement::AlreadyProcessed`],
    /// a forbidden transition becomes [`Settlement::Skipped`], and only
    /// a permitted transition yields a mutation to persist.
    pub fn settle(&self, outcome: &PaymentOutcome) -> Settlement {
        if self.is_verified {
            return Settlement::AlreadyProcessed;
        }

        let target = outcome.target_status();
        if !self.status.can_transition_to(target) {
            // Completed without the verified flag cannot normally occur,
            // but it still must not regress.
            return if self.status == ContributionStatus::Completed {
                Settlement::AlreadyProcessed
            } else {
                Settlement::Skipped {
                    current: self.status,
                }
            };
        }

        let mut update = ContributionUpdate::status(target);
        if let PaymentOutcome::Success(confirmation) = outcome {
            update.is_verified = Some(true);
            update.receipt = confirmation.receipt.clone();
            update.amount = confirmation.amount;
            update.phone = confirmation.phone.clone();
        }
        Settlement::Apply(update)
    }

    /// Applies a mutation in place, bumping the version and the update
    /// timestamp. Store implementations use this to materialize an
    /// accepted compare-and-swap.
    pub fn apply_update(&mut self, update: &ContributionUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(verified) = update.is_verified {
            self.is_verified = verified;
        }
        if let Some(receipt) = &update.receipt {
            self.receipt = Some(receipt.clone());
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.clone();
        }
        if let Some(correlation_id) = &update.correlation_id {
            self.correlation_id = Some(correlation_id.clone());
        }
        self.version = self.version.next();
        self.updated_at = now;
    }
}

/// A partial mutation of a contribution record. `None` fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionUpdate {
    pub status: Option<ContributionStatus>,
    pub is_verified: Option<bool>,
    pub receipt: Option<String>,
    pub amount: Option<Amount>,
    pub phone: Option<PhoneNumber>,
    pub correlation_id: Option<CorrelationId>,
}

impl ContributionUpdate {
    /// A mutation that only changes the status.
    pub fn status(status: ContributionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// A mutation that records the provider-issued correlation ID.
    pub fn correlation(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            ..Default::default()
        }
    }
}
