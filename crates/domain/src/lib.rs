//! Domain model for the contribution reconciliation system.
//!
//! This crate provides the pure core of the system:
//! - The contribution record and its status state machine
//! - Phone number normalization and money amounts
//! - Payment outcome classification and the settlement decision
//! - Campaign settings and validation
//!
//! Nothing in this crate performs I/O; the store, gateway, and engine
//! crates build on these types.

pub mod contribution;
pub mod settings;

pub use contribution::{
    Amount, Contribution, ContributionError, ContributionStatus, ContributionUpdate,
    PaymentConfirmation, PaymentOutcome, PhoneNumber, RESULT_CANCELLED_BY_USER, RESULT_PENDING,
    RESULT_SUCCESS, Settlement,
};
pub use settings::CampaignSettings;
