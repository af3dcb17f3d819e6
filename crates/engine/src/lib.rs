//! Payment reconciliation engine.
//!
//! The [`Reconciler`] owns the contribution state machine: it creates
//! pending records, correlates them with provider-issued checkout IDs,
//! and settles callback and poll results idempotently regardless of
//! arrival order.

pub mod error;
pub mod reconciler;
pub mod snapshot;

pub use error::{EngineError, Result};
pub use reconciler::{InitiateReceipt, InitiateRequest, ReconcileAck, Reconciler};
pub use snapshot::{ContributionView, StatusSnapshot};
