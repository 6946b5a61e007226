//! Omniswap Registry
//!
//! The provider registry adapters self-register into, and the
//! supported-quote cache used for bootstrap chain-support checks.

pub mod registry;
pub mod supported_cache;

pub use registry::{ProviderRegistry, RegistryError};
pub use supported_cache::SupportedQuoteCache;
