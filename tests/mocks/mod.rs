//! Test server and fixtures for integration tests
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use tokio::task::JoinHandle;

use omniswap_api::AppState;
use omniswap_config::Settings;
use omniswap_gateway::mocks::{MockEvmAggregator, MockMetaAggregator};
use omniswap_gateway::GatewayBuilder;
use omniswap_types::{ChainRef, UniversalSwapRequest};

pub use omniswap_types::test_utils::{sample_request, sample_universal_request, TAKER, USDC, WETH};

/// Running test server bound to an ephemeral port
pub struct TestServer {
	pub base_url: String,
	pub state: AppState,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Gateway with healthy `0x` and `odos` mocks on chains 1 and 137
	pub async fn spawn_with_mock_adapters() -> Result<Self, Box<dyn std::error::Error>> {
		let builder = GatewayBuilder::new()
			.with_settings(Settings::default())
			.without_default_adapters()
			.with_evm_provider(
				MockEvmAggregator::new("0x", &[1, 137])
					.with_buy_amount("2500000000")
					.with_to_address("0x00000000000000000000000000000000000000aa")
					.into_arc(),
			)
			.with_evm_provider(
				MockEvmAggregator::new("odos", &[1, 137])
					.with_buy_amount("2490000000")
					.with_to_address("0x00000000000000000000000000000000000000bb")
					.into_arc(),
			)
			.with_meta_provider(MockMetaAggregator::new("lifi").into_arc());

		Self::spawn(builder).await
	}

	/// Gateway with no providers at all
	pub async fn spawn_minimal() -> Result<Self, Box<dyn std::error::Error>> {
		let builder = GatewayBuilder::new()
			.with_settings(Settings::default())
			.without_default_adapters();
		Self::spawn(builder).await
	}

	pub async fn spawn(builder: GatewayBuilder) -> Result<Self, Box<dyn std::error::Error>> {
		let (router, state) = builder.start().await?;
		Self::spawn_router(router, state).await
	}

	async fn spawn_router(
		router: Router,
		state: AppState,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let address = listener.local_addr()?;

		let handle = tokio::spawn(async move {
			axum::serve(
				listener,
				router.into_make_service_with_connect_info::<SocketAddr>(),
			)
			.await
			.expect("test server crashed");
		});

		Ok(Self {
			base_url: format!("http://{}", address),
			state,
			handle,
		})
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

/// Cross-chain mainnet -> arbitrum request
pub fn cross_chain_request() -> UniversalSwapRequest {
	sample_universal_request(ChainRef::evm(1), ChainRef::evm(42161))
}

/// Same-chain mainnet request in universal form
pub fn mainnet_request() -> UniversalSwapRequest {
	sample_universal_request(ChainRef::evm(1), ChainRef::evm(1))
}
