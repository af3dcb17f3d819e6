use thiserror::Error;

/// Errors that can occur when talking to the payment provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// Could not obtain an access credential.
    #[error("Gateway authentication failed: {0}")]
    AuthFailure(String),

    /// The provider was unreachable or the connection dropped.
    #[error("Gateway network failure: {0}")]
    Network(String),

    /// The provider did not answer within the bounded timeout.
    #[error("Gateway request timed out")]
    Timeout,

    /// The provider answered the push request with a non-success code.
    #[error("Payment push rejected (code {code}): {description}")]
    Rejected { code: String, description: String },
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
