//! Configuration settings structures

use std::collections::HashMap;

use omniswap_types::constants::limits::{
	QUOTE_TIMEOUT_MS, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECONDS,
};
use omniswap_types::Secret;
use serde::{Deserialize, Serialize};

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
	#[serde(default)]
	pub server: ServerSettings,
	/// RPC endpoints keyed by EVM chain id
	#[serde(default)]
	pub rpc: RpcSettings,
	#[serde(default)]
	pub aggregators: AggregatorKeySettings,
	#[serde(default)]
	pub aggregation: AggregationSettings,
	#[serde(default)]
	pub rate_limiting: RateLimitSettings,
	#[serde(default)]
	pub logging: LoggingSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
	/// Server host/interface to bind to; overridden by HOST
	pub host: String,
	/// Server port to bind to; overridden by PORT
	pub port: u16,
	/// Allowed CORS origin; overridden by CORS_ORIGIN. "*" means permissive.
	pub cors_origin: String,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
			cors_origin: "*".to_string(),
		}
	}
}

/// EVM RPC endpoints keyed by chain id.
///
/// Populated from the config file and `*_RPC_URL` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RpcSettings {
	#[serde(default)]
	pub endpoints: HashMap<u64, String>,
}

impl RpcSettings {
	pub fn endpoint(&self, chain_id: u64) -> Option<&str> {
		self.endpoints.get(&chain_id).map(String::as_str)
	}
}

/// Third-party aggregator credentials.
///
/// All keys are optional; adapters without a key register anyway and rely on
/// the upstream's unauthenticated tier.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AggregatorKeySettings {
	pub zerox_api_key: Option<Secret>,
	pub lifi_api_key: Option<Secret>,
	pub socket_api_key: Option<Secret>,
	pub rango_api_key: Option<Secret>,
	pub router_api_key: Option<Secret>,
	pub jupiter_api_key: Option<Secret>,
	pub odos_referral_code: Option<String>,
}

/// Aggregation behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AggregationSettings {
	/// Per-provider quote timeout in milliseconds
	pub quote_timeout_ms: u64,
	/// Whether quotes may be served before any provider registered
	pub allow_bootstrap_requests: bool,
}

impl Default for AggregationSettings {
	fn default() -> Self {
		Self {
			quote_timeout_ms: QUOTE_TIMEOUT_MS,
			allow_bootstrap_requests: true,
		}
	}
}

/// Inbound rate limiting configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitSettings {
	pub enabled: bool,
	pub max_requests: u32,
	pub window_seconds: u64,
}

impl Default for RateLimitSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			max_requests: RATE_LIMIT_MAX_REQUESTS,
			window_seconds: RATE_LIMIT_WINDOW_SECONDS,
		}
	}
}

/// Log output format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Compact,
	Json,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Compact,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_serviceable() {
		let settings = Settings::default();
		assert_eq!(settings.server.port, 3000);
		assert!(settings.rate_limiting.enabled);
		assert_eq!(settings.rate_limiting.max_requests, 100);
		assert_eq!(settings.rate_limiting.window_seconds, 60);
	}

	#[test]
	fn rpc_endpoint_lookup() {
		let mut settings = Settings::default();
		settings
			.rpc
			.endpoints
			.insert(1, "https://eth.example.com".to_string());
		assert_eq!(settings.rpc.endpoint(1), Some("https://eth.example.com"));
		assert_eq!(settings.rpc.endpoint(137), None);
	}

	#[test]
	fn api_keys_never_serialize_in_clear() {
		let mut settings = Settings::default();
		settings.aggregators.zerox_api_key = Some(Secret::from("super-secret"));
		let json = serde_json::to_string(&settings).unwrap();
		assert!(!json.contains("super-secret"));
		assert!(json.contains("[REDACTED]"));
	}
}
