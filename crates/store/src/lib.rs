//! Contribution persistence.
//!
//! The [`ContributionStore`] trait is the storage contract the
//! reconciliation engine runs against. Two implementations are
//! provided: [`InMemoryContributionStore`] for tests and local runs,
//! and [`PgContributionStore`] backed by PostgreSQL.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryContributionStore;
pub use postgres::PgContributionStore;
pub use store::ContributionStore;
