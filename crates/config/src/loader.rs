//! Configuration loading: optional file source plus environment overrides

use std::env;

use config::{Config, File};
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::Settings;
use omniswap_types::Secret;

/// EVM chains with a dedicated `*_RPC_URL` environment variable
const RPC_ENV_CHAINS: [(&str, u64); 8] = [
	("ETHEREUM_RPC_URL", 1),
	("OPTIMISM_RPC_URL", 10),
	("BSC_RPC_URL", 56),
	("POLYGON_RPC_URL", 137),
	("ZKSYNC_RPC_URL", 324),
	("BASE_RPC_URL", 8453),
	("ARBITRUM_RPC_URL", 42161),
	("AVALANCHE_RPC_URL", 43114),
];

#[derive(Error, Debug)]
pub enum ConfigLoadError {
	#[error("config file error: {0}")]
	File(#[from] config::ConfigError),

	#[error("invalid {variable}: {reason}")]
	InvalidEnvironment { variable: String, reason: String },
}

/// Load configuration from the optional config file, then apply environment
/// overrides on top.
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	let file = Config::builder()
		.add_source(File::with_name("config/config").required(false))
		.build()?;

	let mut settings: Settings = file.try_deserialize().unwrap_or_default();
	apply_env_overrides(&mut settings)?;
	Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings) -> Result<(), ConfigLoadError> {
	if let Ok(port) = env::var("PORT") {
		settings.server.port =
			port.parse()
				.map_err(|_| ConfigLoadError::InvalidEnvironment {
					variable: "PORT".to_string(),
					reason: format!("not a port number: {}", port),
				})?;
	}

	if let Ok(host) = env::var("HOST") {
		settings.server.host = host;
	}

	if let Ok(origin) = env::var("CORS_ORIGIN") {
		settings.server.cors_origin = origin;
	}

	for (variable, chain_id) in RPC_ENV_CHAINS {
		if let Ok(url) = env::var(variable) {
			if url.is_empty() {
				warn!(variable, "ignoring empty RPC URL override");
				continue;
			}
			debug!(variable, chain_id, "RPC endpoint from environment");
			settings.rpc.endpoints.insert(chain_id, url);
		}
	}

	settings.aggregators.zerox_api_key =
		env_secret("ZEROX_API_KEY").or(settings.aggregators.zerox_api_key.take());
	settings.aggregators.lifi_api_key =
		env_secret("LIFI_API_KEY").or(settings.aggregators.lifi_api_key.take());
	settings.aggregators.socket_api_key =
		env_secret("SOCKET_API_KEY").or(settings.aggregators.socket_api_key.take());
	settings.aggregators.rango_api_key =
		env_secret("RANGO_API_KEY").or(settings.aggregators.rango_api_key.take());
	settings.aggregators.router_api_key =
		env_secret("ROUTER_API_KEY").or(settings.aggregators.router_api_key.take());
	settings.aggregators.jupiter_api_key =
		env_secret("JUPITER_API_KEY").or(settings.aggregators.jupiter_api_key.take());

	if let Ok(code) = env::var("ODOS_REFERRAL_CODE") {
		settings.aggregators.odos_referral_code = Some(code);
	}

	Ok(())
}

fn env_secret(variable: &str) -> Option<Secret> {
	env::var(variable).ok().filter(|v| !v.is_empty()).map(Secret::new)
}

#[cfg(test)]
mod tests {
	use super::*;

	// one test body: parallel test threads share the process environment
	#[test]
	fn env_overrides_apply_and_invalid_values_are_rejected() {
		let mut settings = Settings::default();
		env::set_var("PORT", "8080");
		env::set_var("ETHEREUM_RPC_URL", "https://rpc.test");
		env::set_var("ZEROX_API_KEY", "key-123");

		apply_env_overrides(&mut settings).unwrap();

		assert_eq!(settings.server.port, 8080);
		assert_eq!(settings.rpc.endpoint(1), Some("https://rpc.test"));
		assert_eq!(
			settings.aggregators.zerox_api_key.as_ref().map(|k| k.expose()),
			Some("key-123")
		);

		env::set_var("PORT", "not-a-port");
		let result = apply_env_overrides(&mut settings);
		assert!(matches!(
			result,
			Err(ConfigLoadError::InvalidEnvironment { .. })
		));

		env::remove_var("PORT");
		env::remove_var("ETHEREUM_RPC_URL");
		env::remove_var("ZEROX_API_KEY");
	}
}
