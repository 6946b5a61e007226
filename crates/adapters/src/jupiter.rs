//! Jupiter Solana router adapter
//!
//! Quote discovery through the v6 quote API. Transaction construction uses
//! the upstream `/swap` endpoint; local Solana keypair signing is a future
//! adapter concern and is declined explicitly.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;
use omniswap_types::{
	Amount, Provider, ProviderConfig, ProviderError, ProviderHealth, ProviderResult, RouteFees,
	RouteQuote, RouteStep, Secret, SignedSolanaTx, SolanaRouter, StepKind, UniversalSwapRequest,
};

use crate::http::{build_client, send_checked};

const BASE_URL: &str = "https://quote-api.jup.ag/v6";

/// Solana's chain id under the Wormhole numbering convention, used where a
/// numeric id is required
const SOLANA_CHAIN_ID: u64 = 101;

pub fn init(registry: &ProviderRegistry, settings: &Settings) {
	match JupiterAdapter::from_settings(settings) {
		Ok(adapter) => {
			registry.register_solana(Arc::new(adapter) as Arc<dyn SolanaRouter>);
		},
		Err(e) => {
			tracing::error!(error = %e, "jupiter adapter failed to initialize");
		},
	}
}

#[derive(Debug)]
pub struct JupiterAdapter {
	config: ProviderConfig,
	client: reqwest::Client,
}

impl JupiterAdapter {
	pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
		let mut config = ProviderConfig::new("jupiter", BASE_URL)
			.with_api_key(settings.aggregators.jupiter_api_key.clone());

		if let Some(key) = &config.api_key {
			config
				.headers
				.insert("x-api-key".to_string(), key.expose().to_string());
		}

		let client = build_client(config.timeout_ms, &config.headers)?;
		Ok(Self { config, client })
	}
}

#[async_trait]
impl Provider for JupiterAdapter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		// a tiny SOL -> USDC probe doubles as the liveness check
		let url = format!("{}/quote", self.config.base_url);
		let started = chrono::Utc::now();

		send_checked(
			&self.config.name,
			self.client.get(&url).query(&[
				("inputMint", "So11111111111111111111111111111111111111112"),
				("outputMint", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
				("amount", "1000000"),
			]),
		)
		.await?;

		let latency = chrono::Utc::now()
			.signed_duration_since(started)
			.num_milliseconds()
			.max(0) as u64;
		Ok(ProviderHealth::healthy(self.name(), latency))
	}
}

#[async_trait]
impl SolanaRouter for JupiterAdapter {
	async fn quote(&self, request: &UniversalSwapRequest) -> ProviderResult<RouteQuote> {
		let url = format!("{}/quote", self.config.base_url);
		let slippage_bps = request.slippage_bps.unwrap_or(50).to_string();

		let response = send_checked(
			&self.config.name,
			self.client.get(&url).query(&[
				("inputMint", request.sell_token.as_str()),
				("outputMint", request.buy_token.as_str()),
				("amount", request.sell_amount.as_str()),
				("slippageBps", slippage_bps.as_str()),
			]),
		)
		.await?;

		let payload: JupiterQuoteResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		debug!(
			out_amount = %payload.out_amount,
			hops = payload.route_plan.len(),
			"jupiter quote received"
		);

		Ok(payload.into_route_quote())
	}

	async fn build_and_sign(
		&self,
		quote: &RouteQuote,
		keypair: Option<&Secret>,
	) -> ProviderResult<SignedSolanaTx> {
		if keypair.is_some() {
			// Solana keypair signing is not wired; declining beats silently
			// broadcasting an unsigned transaction.
			return Err(ProviderError::NotImplemented(
				"solana keypair signing".to_string(),
			));
		}

		// The raw quote response rides in the first step's details and is
		// what the upstream swap endpoint redeems.
		let quote_response = quote
			.steps
			.first()
			.map(|step| step.details.clone())
			.ok_or_else(|| ProviderError::Validation {
				reason: "route has no steps to build from".to_string(),
			})?;

		let url = format!("{}/swap", self.config.base_url);
		let body = json!({
			"quoteResponse": quote_response,
			"userPublicKey": serde_json::Value::Null,
			"wrapAndUnwrapSol": true,
		});

		let response =
			send_checked(&self.config.name, self.client.post(&url).json(&body)).await?;
		let payload: JupiterSwapResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		Ok(SignedSolanaTx {
			raw_tx: payload.swap_transaction,
			txid: None,
			instructions: None,
		})
	}

	async fn supports_token_pair(
		&self,
		sell_mint: &str,
		buy_mint: &str,
	) -> ProviderResult<bool> {
		// Jupiter indexes effectively every tradable SPL mint; shape checks
		// are enough until a token-list probe is worth the round trip.
		Ok(is_plausible_mint(sell_mint) && is_plausible_mint(buy_mint) && sell_mint != buy_mint)
	}
}

fn is_plausible_mint(mint: &str) -> bool {
	(32..=44).contains(&mint.len())
		&& mint
			.chars()
			.all(|c| c.is_ascii_alphanumeric() && c != '0' && c != 'O' && c != 'I' && c != 'l')
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JupiterQuoteResponse {
	out_amount: Amount,
	#[serde(default)]
	price_impact_pct: Option<String>,
	#[serde(default)]
	route_plan: Vec<serde_json::Value>,
	#[serde(flatten)]
	raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JupiterSwapResponse {
	swap_transaction: String,
}

impl JupiterQuoteResponse {
	fn into_route_quote(self) -> RouteQuote {
		let price_impact = self
			.price_impact_pct
			.as_deref()
			.and_then(|pct| pct.parse::<f64>().ok());

		// First step carries the full quote response so the swap endpoint
		// can redeem it later; the remaining hops are informational.
		let mut details = self.raw;
		if let Some(object) = details.as_object_mut() {
			object.insert("outAmount".to_string(), json!(self.out_amount.as_str()));
			object.insert("routePlan".to_string(), json!(self.route_plan));
		}

		let steps = vec![RouteStep {
			kind: StepKind::Swap,
			chain_id: SOLANA_CHAIN_ID,
			details,
			protocol: Some("jupiter".to_string()),
			estimated_time: None,
		}];

		RouteQuote {
			steps,
			total_estimated_out: self.out_amount,
			fees: RouteFees::default(),
			eta_seconds: Some(5),
			route_id: None,
			price_impact,
			confidence: 0.95,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SOL: &str = "So11111111111111111111111111111111111111112";
	const USDC_SOL: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

	#[tokio::test]
	async fn token_pair_shape_checks() {
		let adapter = JupiterAdapter::from_settings(&Settings::default()).unwrap();

		assert!(adapter.supports_token_pair(SOL, USDC_SOL).await.unwrap());
		assert!(!adapter.supports_token_pair(SOL, SOL).await.unwrap());
		assert!(!adapter
			.supports_token_pair("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", USDC_SOL)
			.await
			.unwrap());
		assert!(!adapter.supports_token_pair("", USDC_SOL).await.unwrap());
	}

	#[test]
	fn quote_maps_into_single_step_route() {
		let payload: JupiterQuoteResponse = serde_json::from_value(serde_json::json!({
			"outAmount": "2500000",
			"priceImpactPct": "0.002",
			"routePlan": [{"swapInfo": {"label": "Orca"}}],
			"inputMint": SOL,
			"outputMint": USDC_SOL
		}))
		.unwrap();

		let route = payload.into_route_quote();
		assert_eq!(route.total_estimated_out.as_str(), "2500000");
		assert_eq!(route.steps.len(), 1);
		assert_eq!(route.steps[0].chain_id, SOLANA_CHAIN_ID);
		assert_eq!(route.price_impact, Some(0.002));
		assert!(route.validate().is_ok());
	}
}
