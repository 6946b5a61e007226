//! Quote orchestrator
//!
//! Discovers chain-supported providers, filters by health, scores them, fans
//! quote requests out in parallel and returns either the best single result
//! or a ranked comparison.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use omniswap_registry::{ProviderRegistry, SupportedQuoteCache};
use omniswap_types::constants::limits::{
	QUOTE_TIMEOUT_MS, SCORE_BASE, SCORE_HEALTHY_BONUS, SCORE_LATENCY_CEILING_MS,
	SCORE_UNHEALTHY_PENALTY,
};
use omniswap_types::{
	ApprovalStrategy, HealthStatus, OnChainAggregator, Provider, ProviderHealth, RouteQuote,
	SwapQuote, SwapRequest, UniversalSwapRequest,
};

use crate::health::HealthMonitor;

#[derive(Error, Debug)]
pub enum OrchestratorError {
	#[error("no provider supports chain {chain_id}; supported chains: {supported:?}")]
	NoProviderForChain { chain_id: u64, supported: Vec<u64> },

	#[error("all providers failed for chain {chain_id}; last error: {last_error}")]
	AllProvidersFailed { chain_id: u64, last_error: String },

	#[error("no routes found for cross-chain request; last error: {last_error}")]
	NoRoutesFound { last_error: String },

	#[error("quote validation failed: {0}")]
	InvalidQuote(#[from] omniswap_types::quotes::QuoteValidationError),
}

/// Cross-chain route together with the meta-aggregator that produced it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRoute {
	pub provider: String,
	pub route: RouteQuote,
}

/// Ranked multi-provider comparison
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiQuoteComparison {
	pub quotes: Vec<SwapQuote>,
	/// Provider with the maximal buy amount
	pub best_aggregator: String,
	/// `(best - worst) / worst * 100` with two decimals; "0" for a single
	/// quote
	pub price_difference: String,
}

pub struct QuoteOrchestrator {
	registry: Arc<ProviderRegistry>,
	health: Arc<HealthMonitor>,
	supported_cache: Arc<SupportedQuoteCache>,
	quote_timeout: Duration,
}

impl QuoteOrchestrator {
	pub fn new(
		registry: Arc<ProviderRegistry>,
		health: Arc<HealthMonitor>,
		supported_cache: Arc<SupportedQuoteCache>,
	) -> Self {
		Self {
			registry,
			health,
			supported_cache,
			quote_timeout: Duration::from_millis(QUOTE_TIMEOUT_MS),
		}
	}

	/// Get the single best quote for the request.
	///
	/// When `preferred` names a registered EVM adapter it is attempted once;
	/// any failure falls through to dynamic selection.
	pub async fn get_quote(
		&self,
		request: &SwapRequest,
		preferred: Option<&str>,
		strict: bool,
	) -> Result<SwapQuote, OrchestratorError> {
		if let Some(name) = preferred {
			if let Some(provider) = self.registry.evm_provider(name) {
				match self.try_provider(&provider, request, strict).await {
					Ok(quote) => return Ok(quote),
					Err(e) => {
						warn!(
							provider = name,
							error = %e,
							"preferred provider failed, falling back to dynamic selection"
						);
					},
				}
			} else {
				warn!(provider = name, "preferred provider not registered");
			}
		}

		self.dynamic_select(request, strict).await
	}

	/// Ranked quotes from every chain-supported adapter, regardless of
	/// health, for price comparison. Fails only when every adapter fails.
	pub async fn get_multiple_quotes(
		&self,
		request: &SwapRequest,
	) -> Result<MultiQuoteComparison, OrchestratorError> {
		let providers = self.providers_for_chain(request.chain_id)?;

		let attempts = providers.iter().map(|provider| {
			let provider = Arc::clone(provider);
			async move {
				let name = provider.name().to_string();
				let result = timeout(self.quote_timeout, provider.get_quote(request, false)).await;
				match result {
					Ok(Ok(quote)) => Some(quote),
					Ok(Err(e)) => {
						warn!(provider = %name, error = %e, "quote failed in fan-out");
						None
					},
					Err(_) => {
						warn!(provider = %name, "quote timed out in fan-out");
						None
					},
				}
			}
		});

		let mut quotes: Vec<SwapQuote> = join_all(attempts).await.into_iter().flatten().collect();

		if quotes.is_empty() {
			return Err(OrchestratorError::AllProvidersFailed {
				chain_id: request.chain_id,
				last_error: "every provider failed or timed out in fan-out".to_string(),
			});
		}

		for quote in &quotes {
			quote.validate()?;
			self.supported_cache
				.record(request.chain_id, &quote.sell_token, &quote.buy_token);
		}

		// Rank by buy amount, best first
		quotes.sort_by(|a, b| {
			let a_amount = a.buy_amount.to_u256().unwrap_or(U256::ZERO);
			let b_amount = b.buy_amount.to_u256().unwrap_or(U256::ZERO);
			b_amount.cmp(&a_amount)
		});

		let best_aggregator = quotes[0].aggregator.clone();
		let price_difference = Self::price_difference(&quotes);

		info!(
			chain_id = request.chain_id,
			quotes = quotes.len(),
			best = %best_aggregator,
			"multi-quote comparison complete"
		);

		Ok(MultiQuoteComparison {
			quotes,
			best_aggregator,
			price_difference,
		})
	}

	/// Fan out a cross-chain request to every meta-aggregator and gather the
	/// surviving routes, best estimated output first.
	pub async fn get_cross_chain_routes(
		&self,
		request: &UniversalSwapRequest,
	) -> Result<Vec<ProviderRoute>, OrchestratorError> {
		let providers = self.registry.meta_providers();
		if providers.is_empty() {
			return Err(OrchestratorError::NoRoutesFound {
				last_error: "no meta-aggregators registered".to_string(),
			});
		}

		let attempts = providers.iter().map(|provider| {
			let provider = Arc::clone(provider);
			async move {
				let name = provider.name().to_string();
				match timeout(self.quote_timeout, provider.get_routes(request)).await {
					Ok(Ok(routes)) => Ok((name, routes)),
					Ok(Err(e)) => {
						warn!(provider = %name, error = %e, "route discovery failed");
						Err(e.to_string())
					},
					Err(_) => {
						warn!(provider = %name, "route discovery timed out");
						Err(format!("{} timed out", name))
					},
				}
			}
		});

		let mut last_error = String::new();
		let mut routes: Vec<ProviderRoute> = Vec::new();
		for result in join_all(attempts).await {
			match result {
				Ok((provider, found)) => {
					routes.extend(found.into_iter().map(|route| ProviderRoute {
						provider: provider.clone(),
						route,
					}));
				},
				Err(e) => last_error = e,
			}
		}

		if routes.is_empty() {
			return Err(OrchestratorError::NoRoutesFound { last_error });
		}

		routes.sort_by(|a, b| {
			let a_out = a.route.total_estimated_out.to_u256().unwrap_or(U256::ZERO);
			let b_out = b.route.total_estimated_out.to_u256().unwrap_or(U256::ZERO);
			b_out.cmp(&a_out)
		});

		Ok(routes)
	}

	/// Score a provider for the request. Higher is better; never negative.
	pub fn score(&self, name: &str, health: &ProviderHealth, request: &SwapRequest) -> i64 {
		let mut score = SCORE_BASE;

		match health.status {
			HealthStatus::Healthy => {
				score += SCORE_HEALTHY_BONUS;
			},
			HealthStatus::Degraded => {},
			HealthStatus::Unhealthy => {
				score -= SCORE_UNHEALTHY_PENALTY;
			},
		}

		if let Some(latency) = health.latency_ms {
			score += (SCORE_LATENCY_CEILING_MS - latency as i64).max(0);
		}

		if let Some(error_rate) = health.error_rate {
			score -= (100.0 * error_rate) as i64;
		}

		// Chain-specific nudges
		if request.chain_id == 1 && name == "0x" {
			score += 20;
		}
		if request.chain_id == 137 && name == "odos" {
			score += 15;
		}

		// Large trades favor 0x's deeper RFQ liquidity
		let large_trade = U256::from(10u64).pow(U256::from(21u64));
		if name == "0x" {
			if let Ok(amount) = request.sell_amount.to_u256() {
				if amount > large_trade {
					score += 10;
				}
			}
			if request.approval_strategy == Some(ApprovalStrategy::Permit2) {
				score += 25;
			}
		}

		score.max(0)
	}

	/// Providers claiming the chain, or the no-provider error naming the
	/// union of supported chains.
	fn providers_for_chain(
		&self,
		chain_id: u64,
	) -> Result<Vec<Arc<dyn OnChainAggregator>>, OrchestratorError> {
		let providers = self.registry.evm_providers_for_chain(chain_id);
		if providers.is_empty() {
			return Err(OrchestratorError::NoProviderForChain {
				chain_id,
				supported: self.registry.evm_supported_chains(),
			});
		}
		Ok(providers)
	}

	async fn dynamic_select(
		&self,
		request: &SwapRequest,
		strict: bool,
	) -> Result<SwapQuote, OrchestratorError> {
		let supported = self.providers_for_chain(request.chain_id)?;

		let mut scored: Vec<(Arc<dyn OnChainAggregator>, ProviderHealth)> = Vec::new();
		for provider in &supported {
			let health = self.health.health_for(provider.as_ref() as &dyn Provider).await;
			scored.push((Arc::clone(provider), health));
		}

		let mut candidates: Vec<&(Arc<dyn OnChainAggregator>, ProviderHealth)> =
			scored.iter().filter(|(_, health)| health.is_healthy()).collect();

		if candidates.is_empty() {
			// Fallback mode: every supported provider reported unhealthy, so
			// attempt them all anyway.
			warn!(
				chain_id = request.chain_id,
				"no healthy providers, entering fallback mode"
			);
			candidates = scored.iter().collect();
		}

		candidates.sort_by_key(|(provider, health)| {
			-self.score(provider.name(), health, request)
		});

		let mut last_error = String::from("no provider attempted");
		for (provider, health) in candidates {
			debug!(
				provider = provider.name(),
				score = self.score(provider.name(), health, request),
				"attempting quote"
			);
			match self.try_provider(provider, request, strict).await {
				Ok(quote) => {
					self.supported_cache.record(
						request.chain_id,
						&quote.sell_token,
						&quote.buy_token,
					);
					return Ok(quote);
				},
				Err(e) => {
					warn!(provider = provider.name(), error = %e, "quote attempt failed");
					last_error = e;
				},
			}
		}

		Err(OrchestratorError::AllProvidersFailed {
			chain_id: request.chain_id,
			last_error,
		})
	}

	/// One bounded quote attempt. Permit2-strategy requests go through the
	/// adapter's Permit2 endpoint when it exposes one.
	async fn try_provider(
		&self,
		provider: &Arc<dyn OnChainAggregator>,
		request: &SwapRequest,
		strict: bool,
	) -> Result<SwapQuote, String> {
		let wants_permit2 = request.approval_strategy == Some(ApprovalStrategy::Permit2);

		let attempt = async {
			if wants_permit2 {
				if let Some(spender) = self.registry.spender_provider(provider.name()) {
					return spender.permit2_quote(request).await;
				}
			}
			provider.get_quote(request, strict).await
		};

		let quote = timeout(self.quote_timeout, attempt)
			.await
			.map_err(|_| format!("{} timed out", provider.name()))?
			.map_err(|e| e.to_string())?;

		quote.validate().map_err(|e| e.to_string())?;
		Ok(quote)
	}

	/// `(best - worst) / worst * 100` with two decimals, in integer
	/// arithmetic. "0" when fewer than two quotes or the worst amount is
	/// zero.
	fn price_difference(ranked: &[SwapQuote]) -> String {
		if ranked.len() < 2 {
			return "0".to_string();
		}

		let best = ranked
			.first()
			.and_then(|q| q.buy_amount.to_u256().ok())
			.unwrap_or(U256::ZERO);
		let worst = ranked
			.last()
			.and_then(|q| q.buy_amount.to_u256().ok())
			.unwrap_or(U256::ZERO);

		if worst.is_zero() {
			return "0".to_string();
		}

		// percent scaled by 100: (best - worst) * 10_000 / worst
		let scaled = (best - worst) * U256::from(10_000u64) / worst;
		let scaled: u128 = scaled.try_into().unwrap_or(u128::MAX);
		format!("{}.{:02}", scaled / 100, scaled % 100)
	}
}

impl std::fmt::Debug for QuoteOrchestrator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("QuoteOrchestrator")
			.field("quote_timeout", &self.quote_timeout)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use omniswap_types::Amount;

	fn request_on(chain_id: u64) -> SwapRequest {
		SwapRequest {
			chain_id,
			sell_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
			buy_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			sell_amount: Amount::from("100000000000000"),
			taker: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
			recipient: None,
			slippage_bps: None,
			deadline: None,
			aggregator: None,
			approval_strategy: None,
		}
	}

	fn orchestrator() -> QuoteOrchestrator {
		QuoteOrchestrator::new(
			Arc::new(ProviderRegistry::new()),
			Arc::new(HealthMonitor::new()),
			Arc::new(SupportedQuoteCache::new()),
		)
	}

	#[test]
	fn healthy_low_latency_scores_best() {
		let orchestrator = orchestrator();
		let request = request_on(1);

		let fast = ProviderHealth::healthy("kyber", 10);
		let slow = ProviderHealth::healthy("kyber", 90);
		assert!(
			orchestrator.score("kyber", &fast, &request)
				> orchestrator.score("kyber", &slow, &request)
		);

		let unhealthy = ProviderHealth::unhealthy("kyber");
		assert!(
			orchestrator.score("kyber", &slow, &request)
				> orchestrator.score("kyber", &unhealthy, &request)
		);
	}

	#[test]
	fn chain_nudges_favor_the_native_provider() {
		let orchestrator = orchestrator();
		let health_0x = ProviderHealth::healthy("0x", 50);
		let health_odos = ProviderHealth::healthy("odos", 50);

		let mainnet = request_on(1);
		assert!(
			orchestrator.score("0x", &health_0x, &mainnet)
				> orchestrator.score("odos", &health_odos, &mainnet)
		);

		let polygon = request_on(137);
		assert!(
			orchestrator.score("odos", &health_odos, &polygon)
				> orchestrator.score("0x", &health_0x, &polygon)
		);
	}

	#[test]
	fn large_trades_and_permit2_nudge_0x() {
		let orchestrator = orchestrator();
		let health = ProviderHealth::healthy("0x", 50);

		let small = request_on(10);
		let mut large = request_on(10);
		large.sell_amount = Amount::from("2000000000000000000000"); // 2 * 10^21
		assert_eq!(
			orchestrator.score("0x", &health, &large) - orchestrator.score("0x", &health, &small),
			10
		);

		let mut permit2 = request_on(10);
		permit2.approval_strategy = Some(ApprovalStrategy::Permit2);
		assert_eq!(
			orchestrator.score("0x", &health, &permit2)
				- orchestrator.score("0x", &health, &small),
			25
		);
	}

	#[test]
	fn score_clamps_at_zero() {
		let orchestrator = orchestrator();
		let mut health = ProviderHealth::unhealthy("kyber");
		health.error_rate = Some(1.0);
		let score = orchestrator.score("kyber", &health, &request_on(10));
		assert_eq!(score, 0);
	}

	#[test]
	fn price_difference_two_decimals() {
		use omniswap_types::test_utils::sample_quote;

		// single quote
		let single = vec![sample_quote("0x", "1000")];
		assert_eq!(QuoteOrchestrator::price_difference(&single), "0");

		// 1050 vs 1000 -> 5.00%
		let ranked = vec![sample_quote("0x", "1050"), sample_quote("odos", "1000")];
		assert_eq!(QuoteOrchestrator::price_difference(&ranked), "5.00");

		// 1001 vs 1000 -> 0.10%
		let tight = vec![sample_quote("0x", "1001"), sample_quote("odos", "1000")];
		assert_eq!(QuoteOrchestrator::price_difference(&tight), "0.10");
	}

	#[test]
	fn no_provider_error_lists_supported_chains() {
		let orchestrator = orchestrator();
		let err = orchestrator.providers_for_chain(999).unwrap_err();
		assert!(matches!(
			err,
			OrchestratorError::NoProviderForChain { chain_id: 999, .. }
		));
	}
}
