//! Payment provider gateway capability.
//!
//! The [`GatewayClient`] trait is the only surface the reconciliation
//! engine sees; [`wire`] holds the provider's payload shapes and
//! [`InMemoryGateway`] is a scriptable double for tests and local
//! runs. Account configuration is injected via [`GatewayConfig`].

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod wire;

pub use client::{AccessToken, GatewayClient};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use memory::{InMemoryGateway, PushRecord};
pub use wire::{
    CallbackEnvelope, CallbackMetadata, ERROR_NOT_YET_ANSWERED, MetadataItem, PushResponse,
    RESPONSE_ACCEPTED, StatusResponse, StkCallback,
};
