//! Omniswap Config
//!
//! Settings structures and configuration loading for the gateway.

pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use loader::{load_config, ConfigLoadError};
pub use settings::{
	AggregationSettings, AggregatorKeySettings, LogFormat, LoggingSettings, RateLimitSettings,
	RpcSettings, ServerSettings, Settings,
};
