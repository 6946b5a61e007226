//! Service startup logging

use std::env;
use tracing::info;

/// Logs service information at startup
pub fn log_service_info() {
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Omniswap Gateway Starting ===");
	info!("Service: omniswap-gateway v{}", service_version);
	info!("Platform: {} / {}", env::consts::OS, env::consts::ARCH);

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("Log filter: {}", rust_log);
	}
}

/// Logs startup completion with the bound address
pub fn log_startup_complete(bind_address: &str, provider_summary: &str) {
	info!("Omniswap gateway started");
	info!("Providers: {}", provider_summary);
	info!("Listening on: {}", bind_address);
}

/// Logs service shutdown
pub fn log_service_shutdown() {
	info!("Omniswap gateway shutting down");
}
