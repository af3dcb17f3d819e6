//! HTTP route handlers.

pub mod contributions;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod stats;
