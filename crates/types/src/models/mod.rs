//! Shared domain models used across entities

pub mod amount;
pub mod chain;
pub mod health;
pub mod secret;

pub use amount::{Amount, AmountError};
pub use chain::{ChainRef, Ecosystem, TokenStandard};
pub use health::{HealthStatus, ProviderHealth};
pub use secret::Secret;
