//! Omniswap Gateway Server
//!
//! Main entry point for the gateway server

use omniswap_gateway::{init_tracing, GatewayBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let settings = omniswap_gateway::config::load_config()?;
	init_tracing(&settings);

	GatewayBuilder::new()
		.with_settings(settings)
		.start_server()
		.await
}
