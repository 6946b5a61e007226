//! Omniswap Adapters
//!
//! Concrete provider adapters for third-party aggregators and routers. Each
//! adapter module exposes an `init` entry point that receives the registry
//! and registers itself; the composition root calls [`register_defaults`]
//! and has no other knowledge of which adapters exist.

pub mod http;
pub mod jupiter;
pub mod lifi;
pub mod odos;
pub mod thorchain;
pub mod zerox;

pub use jupiter::JupiterAdapter;
pub use lifi::LifiAdapter;
pub use odos::OdosAdapter;
pub use thorchain::ThorchainAdapter;
pub use zerox::ZeroExAdapter;

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;

/// Register every built-in adapter.
///
/// The host invokes this once at startup, then transitions the registry's
/// completion latch itself.
pub fn register_defaults(registry: &ProviderRegistry, settings: &Settings) {
	zerox::init(registry, settings);
	odos::init(registry, settings);
	lifi::init(registry, settings);
	jupiter::init(registry, settings);
	thorchain::init(registry, settings);
}
