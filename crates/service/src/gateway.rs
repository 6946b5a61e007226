//! Universal swap gateway
//!
//! Entry point behind `/universal-swap/quote`: classifies the request,
//! dispatches it to the category that services it and assembles the ranked
//! route response.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use omniswap_registry::ProviderRegistry;
use omniswap_types::{
	Provider, ProviderCategory, QuoteResult, SwapType, SwapValidationError, TransactionData,
	UniversalSwapRequest,
};

use crate::classifier::{ClassifyError, RoutingClassifier};
use crate::health::HealthMonitor;
use crate::orchestrator::{OrchestratorError, QuoteOrchestrator};

#[derive(Error, Debug)]
pub enum GatewayError {
	#[error(transparent)]
	Validation(#[from] SwapValidationError),

	#[error(transparent)]
	Classify(#[from] ClassifyError),

	#[error(transparent)]
	Orchestrator(#[from] OrchestratorError),

	#[error("no providers registered for category {category}")]
	NoProviders { category: ProviderCategory },

	#[error("all {category} providers failed; last error: {last_error}")]
	CategoryFailed {
		category: ProviderCategory,
		last_error: String,
	},
}

/// One ranked route in a universal quote response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRoute {
	pub provider: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub score: Option<i64>,
	pub quote: QuoteResult,
}

/// Response of the universal quote endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalQuoteResponse {
	pub swap_type: SwapType,
	pub routes: Vec<GatewayRoute>,
	pub recommended_route: GatewayRoute,
	/// Present for single-chain EVM swaps: the recommended route's payload
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction_data: Option<TransactionData>,
	pub warnings: Vec<String>,
}

pub struct SwapGateway {
	classifier: Arc<RoutingClassifier>,
	orchestrator: Arc<QuoteOrchestrator>,
	registry: Arc<ProviderRegistry>,
	health: Arc<HealthMonitor>,
}

impl SwapGateway {
	pub fn new(
		classifier: Arc<RoutingClassifier>,
		orchestrator: Arc<QuoteOrchestrator>,
		registry: Arc<ProviderRegistry>,
		health: Arc<HealthMonitor>,
	) -> Self {
		Self {
			classifier,
			orchestrator,
			registry,
			health,
		}
	}

	pub async fn universal_quote(
		&self,
		request: &UniversalSwapRequest,
	) -> Result<UniversalQuoteResponse, GatewayError> {
		request.validate()?;

		let mut warnings = Vec::new();
		let swap_type = self.classifier.determine_swap_type(request)?;
		if let Some(asserted) = request.swap_type {
			if asserted != swap_type {
				warnings.push(format!(
					"requested swapType {} re-derived as {}",
					asserted, swap_type
				));
			}
		}

		let category = self.classifier.category_for(swap_type, request)?;

		match category {
			ProviderCategory::EvmAggregator => {
				self.evm_routes(request, swap_type, warnings).await
			},
			ProviderCategory::MetaAggregator => {
				self.meta_routes(request, swap_type, warnings).await
			},
			ProviderCategory::SolanaRouter => {
				self.solana_routes(request, swap_type, warnings).await
			},
			ProviderCategory::NativeRouter => {
				self.native_routes(request, swap_type, warnings).await
			},
		}
	}

	/// Single-chain EVM: compare every supported aggregator and rank by
	/// provider score, then by payout. The scoring nudges live here and only
	/// here; the comparison's own `bestAggregator` stays payout-ranked.
	async fn evm_routes(
		&self,
		request: &UniversalSwapRequest,
		swap_type: SwapType,
		mut warnings: Vec<String>,
	) -> Result<UniversalQuoteResponse, GatewayError> {
		let legacy = request.to_legacy()?;
		let comparison = self.orchestrator.get_multiple_quotes(&legacy).await?;

		let mut routes = Vec::with_capacity(comparison.quotes.len());
		for quote in comparison.quotes {
			let provider = quote.aggregator.clone();
			let score = match self.registry.evm_provider(&provider) {
				Some(adapter) => {
					let health = self
						.health
						.health_for(adapter.as_ref() as &dyn Provider)
						.await;
					Some(self.orchestrator.score(&provider, &health, &legacy))
				},
				None => {
					warnings.push(format!("quote from unregistered provider {}", provider));
					None
				},
			};
			routes.push(GatewayRoute {
				provider,
				score,
				quote: QuoteResult::Legacy(quote),
			});
		}

		// Rank by score, payout breaking ties; fan-out order is arbitrary
		routes.sort_by(|a, b| {
			let score = b.score.unwrap_or(0).cmp(&a.score.unwrap_or(0));
			if score != std::cmp::Ordering::Equal {
				return score;
			}
			let a_out = buy_amount_of(&a.quote);
			let b_out = buy_amount_of(&b.quote);
			b_out.cmp(&a_out)
		});

		let recommended_route = routes[0].clone();
		let transaction_data = match &recommended_route.quote {
			QuoteResult::Legacy(quote) => Some(TransactionData::from(quote)),
			QuoteResult::Route(_) => None,
		};

		Ok(UniversalQuoteResponse {
			swap_type,
			routes,
			recommended_route,
			transaction_data,
			warnings,
		})
	}

	async fn meta_routes(
		&self,
		request: &UniversalSwapRequest,
		swap_type: SwapType,
		warnings: Vec<String>,
	) -> Result<UniversalQuoteResponse, GatewayError> {
		let discovered = self.orchestrator.get_cross_chain_routes(request).await?;

		let routes: Vec<GatewayRoute> = discovered
			.into_iter()
			.map(|entry| GatewayRoute {
				provider: entry.provider,
				score: None,
				quote: QuoteResult::Route(entry.route),
			})
			.collect();

		let recommended_route = routes[0].clone();
		Ok(UniversalQuoteResponse {
			swap_type,
			routes,
			recommended_route,
			transaction_data: None,
			warnings,
		})
	}

	/// First Solana router that produces a route wins
	async fn solana_routes(
		&self,
		request: &UniversalSwapRequest,
		swap_type: SwapType,
		warnings: Vec<String>,
	) -> Result<UniversalQuoteResponse, GatewayError> {
		let providers = self.registry.solana_providers();
		if providers.is_empty() {
			return Err(GatewayError::NoProviders {
				category: ProviderCategory::SolanaRouter,
			});
		}

		let mut last_error = String::new();
		for provider in &providers {
			match provider.quote(request).await {
				Ok(route) => {
					let gateway_route = GatewayRoute {
						provider: provider.name().to_string(),
						score: None,
						quote: QuoteResult::Route(route),
					};
					return Ok(UniversalQuoteResponse {
						swap_type,
						routes: vec![gateway_route.clone()],
						recommended_route: gateway_route,
						transaction_data: None,
						warnings,
					});
				},
				Err(e) => {
					warn!(provider = provider.name(), error = %e, "solana quote failed");
					last_error = e.to_string();
				},
			}
		}

		Err(GatewayError::CategoryFailed {
			category: ProviderCategory::SolanaRouter,
			last_error,
		})
	}

	/// First native router that produces a route wins
	async fn native_routes(
		&self,
		request: &UniversalSwapRequest,
		swap_type: SwapType,
		warnings: Vec<String>,
	) -> Result<UniversalQuoteResponse, GatewayError> {
		let providers = self.registry.native_providers();
		if providers.is_empty() {
			return Err(GatewayError::NoProviders {
				category: ProviderCategory::NativeRouter,
			});
		}

		let mut last_error = String::new();
		for provider in &providers {
			match provider.quote_btc(request).await {
				Ok(route) => {
					let gateway_route = GatewayRoute {
						provider: provider.name().to_string(),
						score: None,
						quote: QuoteResult::Route(route),
					};
					return Ok(UniversalQuoteResponse {
						swap_type,
						routes: vec![gateway_route.clone()],
						recommended_route: gateway_route,
						transaction_data: None,
						warnings,
					});
				},
				Err(e) => {
					warn!(provider = provider.name(), error = %e, "native quote failed");
					last_error = e.to_string();
				},
			}
		}

		Err(GatewayError::CategoryFailed {
			category: ProviderCategory::NativeRouter,
			last_error,
		})
	}
}

fn buy_amount_of(quote: &QuoteResult) -> alloy::primitives::U256 {
	match quote {
		QuoteResult::Legacy(quote) => quote
			.buy_amount
			.to_u256()
			.unwrap_or(alloy::primitives::U256::ZERO),
		QuoteResult::Route(route) => route
			.total_estimated_out
			.to_u256()
			.unwrap_or(alloy::primitives::U256::ZERO),
	}
}

impl std::fmt::Debug for SwapGateway {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SwapGateway").finish()
	}
}
