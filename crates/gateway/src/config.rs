//! Gateway configuration.

use std::time::Duration;

/// Provider account configuration, injected into the client
/// constructor. Nothing here is read from process-wide state.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// OAuth consumer key for the credential request.
    pub consumer_key: String,

    /// OAuth consumer secret for the credential request.
    pub consumer_secret: String,

    /// Business short code payments are routed to.
    pub short_code: String,

    /// Passkey used to derive the push password.
    pub passkey: String,

    /// URL the provider delivers payment-result callbacks to.
    pub callback_url: String,

    /// Upper bound on any single provider call.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            consumer_key: "sandbox-key".to_string(),
            consumer_secret: "sandbox-secret".to_string(),
            short_code: "174379".to_string(),
            passkey: "sandbox-passkey".to_string(),
            callback_url: "http://localhost:3000/payments/callback".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
