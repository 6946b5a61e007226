//! Omniswap Gateway
//!
//! A universal swap aggregation gateway: given a request to trade one token
//! for another, possibly across blockchain ecosystems, it discovers candidate
//! execution providers, fans out parallel quote requests, ranks the routes
//! and orchestrates EVM approval and submission.
//!
//! The [`GatewayBuilder`] is the composition root: it loads settings, lets
//! every adapter register itself, seals the registry and wires the service
//! graph into an axum router.

pub mod mocks;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use omniswap_adapters::register_defaults;
use omniswap_api::{create_router, AppState, RateLimitGuard};
use omniswap_config::{load_config, startup_logger, LogFormat, Settings};
use omniswap_registry::{ProviderRegistry, SupportedQuoteCache};
use omniswap_service::{
	ApprovalService, EvmChains, ExecutionCoordinator, HealthMonitor, PrecheckService,
	QuoteOrchestrator, RoutingClassifier, SwapGateway,
};

pub use omniswap_adapters as adapters;
pub use omniswap_api as api;
pub use omniswap_config as config;
pub use omniswap_registry as registry;
pub use omniswap_service as service;
pub use omniswap_types as types;

/// Install the global tracing subscriber from logging settings
pub fn init_tracing(settings: &Settings) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

	match settings.logging.format {
		LogFormat::Json => {
			tracing_subscriber::fmt().with_env_filter(filter).json().init();
		},
		LogFormat::Compact => {
			tracing_subscriber::fmt().with_env_filter(filter).compact().init();
		},
	}
}

/// Builder for assembling and starting the gateway
pub struct GatewayBuilder {
	settings: Option<Settings>,
	registry: Arc<ProviderRegistry>,
	evm_chains: Option<EvmChains>,
	register_default_adapters: bool,
}

impl Default for GatewayBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl GatewayBuilder {
	pub fn new() -> Self {
		Self {
			settings: None,
			registry: Arc::new(ProviderRegistry::new()),
			evm_chains: None,
			register_default_adapters: true,
		}
	}

	/// Use explicit settings instead of loading configuration
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Skip the built-in adapters; only explicitly registered providers
	/// remain. Used by tests and embedders with their own adapter set.
	pub fn without_default_adapters(mut self) -> Self {
		self.register_default_adapters = false;
		self
	}

	/// Register a custom EVM aggregator. Registration happens immediately,
	/// so a custom adapter wins name conflicts against the defaults.
	pub fn with_evm_provider(
		self,
		provider: Arc<dyn omniswap_types::OnChainAggregator>,
	) -> Self {
		self.registry.register_evm(provider);
		self
	}

	pub fn with_evm_spender(
		self,
		provider: Arc<dyn omniswap_types::EvmSpenderProvider>,
	) -> Self {
		self.registry.register_evm_spender(provider);
		self
	}

	pub fn with_meta_provider(self, provider: Arc<dyn omniswap_types::MetaAggregator>) -> Self {
		self.registry.register_meta(provider);
		self
	}

	pub fn with_solana_provider(self, provider: Arc<dyn omniswap_types::SolanaRouter>) -> Self {
		self.registry.register_solana(provider);
		self
	}

	pub fn with_native_provider(self, provider: Arc<dyn omniswap_types::NativeRouter>) -> Self {
		self.registry.register_native(provider);
		self
	}

	/// Inject pre-built chain clients (tests use mock chains)
	pub fn with_evm_chains(mut self, chains: EvmChains) -> Self {
		self.evm_chains = Some(chains);
		self
	}

	/// Assemble the service graph and return the router with its state.
	///
	/// This is the host side of the self-registration contract: adapters
	/// register here and the completion latch is transitioned exactly once,
	/// before the first request can be served.
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = match self.settings {
			Some(settings) => settings,
			None => load_config()?,
		};
		let settings = Arc::new(settings);

		if self.register_default_adapters {
			register_defaults(&self.registry, &settings);
		}
		self.registry.on_registration_complete();

		let registry = self.registry;
		let supported_cache = Arc::new(SupportedQuoteCache::new());
		let health = Arc::new(HealthMonitor::new());
		let chains = Arc::new(
			self.evm_chains
				.unwrap_or_else(|| EvmChains::from_settings(&settings.rpc)),
		);

		let classifier = Arc::new(RoutingClassifier::new(
			Arc::clone(&registry),
			Arc::clone(&supported_cache),
		));
		let orchestrator = Arc::new(QuoteOrchestrator::new(
			Arc::clone(&registry),
			Arc::clone(&health),
			Arc::clone(&supported_cache),
		));
		let gateway = Arc::new(SwapGateway::new(
			Arc::clone(&classifier),
			Arc::clone(&orchestrator),
			Arc::clone(&registry),
			Arc::clone(&health),
		));
		let approval = Arc::new(ApprovalService::new(
			Arc::clone(&chains),
			Arc::clone(&registry),
		));
		let precheck = Arc::new(PrecheckService::new(
			Arc::clone(&classifier),
			Arc::clone(&orchestrator),
			Arc::clone(&approval),
			Arc::clone(&chains),
			Arc::clone(&registry),
			Arc::clone(&health),
		));
		let executor = Arc::new(ExecutionCoordinator::new(
			Arc::clone(&orchestrator),
			Arc::clone(&approval),
			Arc::clone(&precheck),
			Arc::clone(&chains),
		));

		let rate_limiter = Arc::new(RateLimitGuard::new(
			settings.rate_limiting.max_requests,
			settings.rate_limiting.window_seconds,
			settings.rate_limiting.enabled,
		));
		let _cleanup = rate_limiter.spawn_cleanup();

		let state = AppState {
			registry,
			classifier,
			orchestrator,
			gateway,
			precheck,
			approval,
			executor,
			health,
			rate_limiter,
			settings: Arc::clone(&settings),
		};

		let router = create_router(state.clone());
		Ok((router, state))
	}

	/// Start the full server: bind, serve, shut down on ctrl-c
	pub async fn start_server(self) -> Result<(), Box<dyn std::error::Error>> {
		startup_logger::log_service_info();

		let (router, state) = self.start().await?;

		let address: SocketAddr = format!(
			"{}:{}",
			state.settings.server.host, state.settings.server.port
		)
		.parse()?;
		let listener = tokio::net::TcpListener::bind(address).await?;

		let provider_summary = format!(
			"{} evm, {} meta, {} solana, {} native",
			state
				.registry
				.provider_names(omniswap_types::ProviderCategory::EvmAggregator)
				.len(),
			state
				.registry
				.provider_names(omniswap_types::ProviderCategory::MetaAggregator)
				.len(),
			state
				.registry
				.provider_names(omniswap_types::ProviderCategory::SolanaRouter)
				.len(),
			state
				.registry
				.provider_names(omniswap_types::ProviderCategory::NativeRouter)
				.len(),
		);
		startup_logger::log_startup_complete(&address.to_string(), &provider_summary);

		axum::serve(
			listener,
			router.into_make_service_with_connect_info::<SocketAddr>(),
		)
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			info!("shutdown signal received");
		})
		.await?;

		startup_logger::log_service_shutdown();
		Ok(())
	}
}
