//! In-memory gateway for tests and local runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use common::CorrelationId;
use domain::{Amount, PhoneNumber};

use crate::client::{AccessToken, GatewayClient};
use crate::config::GatewayConfig;
use crate::credentials;
use crate::error::{GatewayError, Result};
use crate::wire::{PushResponse, RESPONSE_ACCEPTED, StatusResponse};

/// A push request the in-memory gateway accepted, kept for assertions.
#[derive(Debug, Clone)]
pub struct PushRecord {
    pub phone: PhoneNumber,
    pub amount: Amount,
    pub reference: String,
    pub password: String,
}

/// How the in-memory gateway answers the next push requests.
#[derive(Debug, Clone, Default)]
enum PushMode {
    #[default]
    Accept,
    Reject {
        code: String,
        description: String,
    },
    NetworkFailure,
    AuthFailure,
}

#[derive(Default)]
struct InMemoryGatewayState {
    next_id: u32,
    pushes: HashMap<CorrelationId, PushRecord>,
    statuses: HashMap<CorrelationId, StatusResponse>,
    push_mode: PushMode,
}

/// In-memory provider double.
///
/// Accepted pushes are assigned sequential `ws_CO_...` checkout IDs
/// and default to [`StatusResponse::NotYetAnswered`] until a test
/// scripts a result with [`set_status`](Self::set_status).
#[derive(Clone)]
pub struct InMemoryGateway {
    config: GatewayConfig,
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryGateway {
    /// Creates a gateway double with the given account configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(InMemoryGatewayState::default())),
        }
    }

    /// Makes subsequent pushes answer with a non-success response code.
    pub fn set_reject_push(&self, code: impl Into<String>, description: impl Into<String>) {
        self.state.write().unwrap().push_mode = PushMode::Reject {
            code: code.into(),
            description: description.into(),
        };
    }

    /// Makes subsequent pushes fail with a network error.
    pub fn set_network_failure(&self) {
        self.state.write().unwrap().push_mode = PushMode::NetworkFailure;
    }

    /// Makes credential requests fail.
    pub fn set_auth_failure(&self) {
        self.state.write().unwrap().push_mode = PushMode::AuthFailure;
    }

    /// Restores the default accept-everything behavior.
    pub fn set_accept(&self) {
        self.state.write().unwrap().push_mode = PushMode::Accept;
    }

    /// Scripts the status-query answer for a checkout.
    pub fn set_status(&self, correlation_id: impl Into<CorrelationId>, status: StatusResponse) {
        self.state
            .write()
            .unwrap()
            .statuses
            .insert(correlation_id.into(), status);
    }

    /// Returns the number of pushes accepted so far.
    pub fn push_count(&self) -> usize {
        self.state.read().unwrap().pushes.len()
    }

    /// Returns the accepted push for a checkout, if any.
    pub fn push(&self, correlation_id: &CorrelationId) -> Option<PushRecord> {
        self.state.read().unwrap().pushes.get(correlation_id).cloned()
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

#[async_trait]
impl GatewayClient for InMemoryGateway {
    async fn obtain_credential(&self) -> Result<AccessToken> {
        if matches!(self.state.read().unwrap().push_mode, PushMode::AuthFailure) {
            return Err(GatewayError::AuthFailure(
                "Access token not found in response".to_string(),
            ));
        }
        if self.config.consumer_key.is_empty() || self.config.consumer_secret.is_empty() {
            return Err(GatewayError::AuthFailure(
                "Missing consumer credentials".to_string(),
            ));
        }
        // A real client would exchange this header at the auth
        // endpoint; the double hands it back as the token.
        Ok(AccessToken::new(credentials::basic_auth_header(
            &self.config.consumer_key,
            &self.config.consumer_secret,
        )))
    }

    async fn initiate_payment(
        &self,
        phone: &PhoneNumber,
        amount: Amount,
        reference: &str,
    ) -> Result<PushResponse> {
        self.obtain_credential().await?;

        let mut state = self.state.write().unwrap();
        match state.push_mode.clone() {
            PushMode::NetworkFailure => {
                return Err(GatewayError::Network("connection refused".to_string()));
            }
            PushMode::AuthFailure => {
                // obtain_credential above already failed in this mode.
                return Err(GatewayError::AuthFailure(
                    "Access token not found in response".to_string(),
                ));
            }
            PushMode::Reject { code, description } => {
                return Ok(PushResponse {
                    response_code: code,
                    response_description: description,
                    checkout_request_id: None,
                    customer_message: None,
                });
            }
            PushMode::Accept => {}
        }

        state.next_id += 1;
        let correlation_id = CorrelationId::new(format!("ws_CO_{:04}", state.next_id));

        let timestamp = credentials::provider_timestamp(Utc::now());
        let password =
            credentials::stk_password(&self.config.short_code, &self.config.passkey, &timestamp);
        state.pushes.insert(
            correlation_id.clone(),
            PushRecord {
                phone: phone.clone(),
                amount,
                reference: reference.to_string(),
                password,
            },
        );

        Ok(PushResponse {
            response_code: RESPONSE_ACCEPTED.to_string(),
            response_description: "Success. Request accepted for processing".to_string(),
            checkout_request_id: Some(correlation_id.as_str().to_string()),
            customer_message: Some("Payment request sent to your phone".to_string()),
        })
    }

    async fn query_status(&self, correlation_id: &CorrelationId) -> Result<StatusResponse> {
        self.obtain_credential().await?;

        let state = self.state.read().unwrap();
        Ok(state
            .statuses
            .get(correlation_id)
            .cloned()
            .unwrap_or(StatusResponse::NotYetAnswered))
    }
}
