//! Gateway client capability trait.

use async_trait::async_trait;
use common::CorrelationId;
use domain::{Amount, PhoneNumber};

use crate::error::Result;
use crate::wire::{PushResponse, StatusResponse};

/// An access credential obtained from the provider's auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Capability trait for the payment provider.
///
/// The reconciliation engine only ever talks to the provider through
/// this trait; the wire shapes in [`crate::wire`] are the given
/// external protocol. All implementations must be thread-safe.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Obtains an access credential for subsequent calls.
    async fn obtain_credential(&self) -> Result<AccessToken>;

    /// Submits a payment push to the payer's device.
    ///
    /// `reference` is the campaign account reference shown on the
    /// payer's statement.
    async fn initiate_payment(
        &self,
        phone: &PhoneNumber,
        amount: Amount,
        reference: &str,
    ) -> Result<PushResponse>;

    /// Queries the outcome of a previously initiated push.
    async fn query_status(&self, correlation_id: &CorrelationId) -> Result<StatusResponse>;
}
