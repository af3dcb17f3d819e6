//! Shared types used across the contribution reconciliation crates.

pub mod types;

pub use types::{ContributionId, CorrelationId, Version};
