//! Contribution record, status machine, and settlement rules.

mod outcome;
mod phone;
mod record;
mod state;
mod value_objects;

pub use outcome::{
    PaymentConfirmation, PaymentOutcome, RESULT_CANCELLED_BY_USER, RESULT_PENDING, RESULT_SUCCESS,
    Settlement,
};
pub use phone::PhoneNumber;
pub use record::{Contribution, ContributionUpdate};
pub use state::ContributionStatus;
pub use value_objects::Amount;

use thiserror::Error;

/// Errors that can occur while validating or settling a contribution.
#[derive(Debug, Error, PartialEq)]
pub enum ContributionError {
    /// Phone number did not normalize to the canonical format.
    #[error("Invalid phone number: {input}")]
    InvalidPhone { input: String },

    /// Amount outside the accepted range.
    #[error("Invalid amount: {amount} (must be positive and at most {max})")]
    AmountOutOfRange { amount: Amount, max: Amount },

    /// A required field was empty.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The campaign is not currently accepting contributions.
    #[error("The campaign is not accepting contributions")]
    CampaignClosed,

    /// A stored status string did not match any known status.
    #[error("Unknown contribution status: {0}")]
    UnknownStatus(String),
}
