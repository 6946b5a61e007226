//! 0x Swap API v2 adapter
//!
//! Serves single-chain quotes through both the Permit2 and the
//! AllowanceHolder flow and exposes the spender capability.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;
use omniswap_types::constants::evm::{allowance_holder_fallback, PERMIT2_ADDRESS};
use omniswap_types::{
	Amount, ApprovalStrategy, EvmSpenderProvider, OnChainAggregator, Permit2Data, Provider,
	ProviderConfig, ProviderError, ProviderHealth, ProviderResult, SwapQuote, SwapRequest,
	TransactionData,
};

use crate::http::{build_client, send_checked};

const BASE_URL: &str = "https://api.0x.org";

const SUPPORTED_CHAINS: [u64; 10] = [1, 10, 56, 137, 324, 8453, 42161, 43114, 59144, 534352];

/// Register the adapter. Called from the composition root; the adapter is
/// also mirrored into the legacy map by the registry because of its name.
pub fn init(registry: &ProviderRegistry, settings: &Settings) {
	match ZeroExAdapter::from_settings(settings) {
		Ok(adapter) => {
			let adapter = Arc::new(adapter);
			registry.register_evm(Arc::clone(&adapter) as Arc<dyn OnChainAggregator>);
			registry.register_evm_spender(adapter as Arc<dyn EvmSpenderProvider>);
		},
		Err(e) => {
			tracing::error!(error = %e, "0x adapter failed to initialize");
		},
	}
}

#[derive(Debug)]
pub struct ZeroExAdapter {
	config: ProviderConfig,
	client: reqwest::Client,
}

impl ZeroExAdapter {
	pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
		let mut config = ProviderConfig::new("0x", BASE_URL)
			.with_chains(&SUPPORTED_CHAINS)
			.with_api_key(settings.aggregators.zerox_api_key.clone());

		if let Some(key) = &config.api_key {
			config
				.headers
				.insert("0x-api-key".to_string(), key.expose().to_string());
		}
		config
			.headers
			.insert("0x-version".to_string(), "v2".to_string());

		let client = build_client(config.timeout_ms, &config.headers)?;
		Ok(Self { config, client })
	}

	fn ensure_chain(&self, chain_id: u64) -> ProviderResult<()> {
		if !self.config.supported_chains.contains(&chain_id) {
			return Err(ProviderError::ChainNotSupported {
				provider: self.config.name.clone(),
				chain_id,
			});
		}
		Ok(())
	}

	/// Shared GET against one of the v2 swap endpoints
	async fn fetch_quote(&self, path: &str, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.ensure_chain(request.chain_id)?;

		let url = format!("{}{}", self.config.base_url, path);
		let mut query: Vec<(&str, String)> = vec![
			("chainId", request.chain_id.to_string()),
			("sellToken", request.sell_token.clone()),
			("buyToken", request.buy_token.clone()),
			("sellAmount", request.sell_amount.to_string()),
			("taker", request.taker.clone()),
		];
		if let Some(bps) = request.slippage_bps {
			query.push(("slippageBps", bps.to_string()));
		}

		let response = send_checked(&self.config.name, self.client.get(&url).query(&query)).await?;
		let payload: ZeroExQuoteResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		debug!(
			chain_id = request.chain_id,
			buy_amount = %payload.buy_amount,
			permit2 = payload.permit2.is_some(),
			"0x quote received"
		);

		Ok(payload.into_quote(request))
	}
}

#[async_trait]
impl Provider for ZeroExAdapter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		let url = format!("{}/swap/chains", self.config.base_url);
		let started = chrono::Utc::now();

		send_checked(&self.config.name, self.client.get(&url)).await?;

		let latency = chrono::Utc::now()
			.signed_duration_since(started)
			.num_milliseconds()
			.max(0) as u64;
		Ok(ProviderHealth::healthy(self.name(), latency))
	}
}

#[async_trait]
impl OnChainAggregator for ZeroExAdapter {
	async fn get_quote(&self, request: &SwapRequest, strict: bool) -> ProviderResult<SwapQuote> {
		// Indicative prices come from /price, binding quotes from /quote.
		let path = if strict {
			"/swap/allowance-holder/quote"
		} else {
			"/swap/allowance-holder/price"
		};
		self.fetch_quote(path, request).await
	}

	async fn build_transaction(&self, request: &SwapRequest) -> ProviderResult<TransactionData> {
		let quote = self.fetch_quote("/swap/allowance-holder/quote", request).await?;
		Ok(TransactionData::from(&quote))
	}
}

#[async_trait]
impl EvmSpenderProvider for ZeroExAdapter {
	async fn spender_address(
		&self,
		chain_id: u64,
		strategy: ApprovalStrategy,
	) -> ProviderResult<String> {
		self.ensure_chain(chain_id)?;
		match strategy {
			ApprovalStrategy::Permit2 => Ok(PERMIT2_ADDRESS.to_string()),
			ApprovalStrategy::AllowanceHolder => allowance_holder_fallback(chain_id)
				.map(|address| address.to_string())
				.ok_or(ProviderError::ChainNotSupported {
					provider: self.config.name.clone(),
					chain_id,
				}),
		}
	}

	async fn allowance_holder_quote(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.fetch_quote("/swap/allowance-holder/quote", request).await
	}

	async fn permit2_quote(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.fetch_quote("/swap/permit2/quote", request).await
	}

	async fn permit2_price(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.fetch_quote("/swap/permit2/price", request).await
	}
}

/// Wire shape of a v2 quote response, reduced to the fields the gateway uses
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroExQuoteResponse {
	buy_amount: Amount,
	#[serde(default)]
	min_buy_amount: Option<Amount>,
	sell_amount: Amount,
	transaction: ZeroExTransaction,
	#[serde(default)]
	permit2: Option<Permit2Data>,
	#[serde(default)]
	issues: Option<ZeroExIssues>,
	#[serde(default)]
	total_network_fee: Option<Amount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroExTransaction {
	to: String,
	data: String,
	#[serde(default)]
	value: Option<Amount>,
	#[serde(default)]
	gas: Option<Amount>,
	#[serde(default)]
	gas_price: Option<Amount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroExIssues {
	#[serde(default)]
	allowance: Option<ZeroExAllowanceIssue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroExAllowanceIssue {
	#[serde(default)]
	spender: Option<String>,
}

impl ZeroExQuoteResponse {
	fn into_quote(self, request: &SwapRequest) -> SwapQuote {
		let min_buy_amount = self
			.min_buy_amount
			.unwrap_or_else(|| self.buy_amount.clone());
		let allowance_target = self
			.issues
			.and_then(|issues| issues.allowance)
			.and_then(|allowance| allowance.spender);

		let approval_strategy = if self.permit2.is_some() {
			Some(ApprovalStrategy::Permit2)
		} else {
			request.approval_strategy
		};

		SwapQuote {
			sell_token: request.sell_token.clone(),
			buy_token: request.buy_token.clone(),
			sell_amount: self.sell_amount,
			buy_amount: self.buy_amount,
			min_buy_amount,
			to: self.transaction.to,
			data: self.transaction.data,
			value: self.transaction.value.unwrap_or_default(),
			gas: self.transaction.gas.unwrap_or_default(),
			gas_price: self.transaction.gas_price,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
			allowance_target,
			aggregator: "0x".to_string(),
			price_impact: None,
			estimated_gas: self.total_network_fee,
			permit2: self.permit2,
			approval_strategy,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use omniswap_types::test_utils::sample_request;
	use serde_json::json;

	fn adapter() -> ZeroExAdapter {
		ZeroExAdapter::from_settings(&Settings::default()).unwrap()
	}

	#[test]
	fn chain_support_table() {
		let adapter = adapter();
		assert!(adapter.supports_chain(1));
		assert!(adapter.supports_chain(8453));
		assert!(!adapter.supports_chain(250));
	}

	#[test]
	fn rejects_unsupported_chain_before_http() {
		let adapter = adapter();
		assert!(matches!(
			adapter.ensure_chain(250),
			Err(ProviderError::ChainNotSupported { chain_id: 250, .. })
		));
	}

	#[test]
	fn quote_response_maps_into_domain_quote() {
		let payload: ZeroExQuoteResponse = serde_json::from_value(json!({
			"buyAmount": "2500000000",
			"minBuyAmount": "2475000000",
			"sellAmount": "1000000000000000000",
			"transaction": {
				"to": "0x0000000000001fF3684f28c67538d4D072C22734",
				"data": "0xabcdef",
				"value": "0",
				"gas": "300000"
			},
			"issues": {
				"allowance": {"spender": "0x0000000000001fF3684f28c67538d4D072C22734"}
			}
		}))
		.unwrap();

		let quote = payload.into_quote(&sample_request(1));
		assert_eq!(quote.aggregator, "0x");
		assert_eq!(quote.buy_amount.as_str(), "2500000000");
		assert_eq!(quote.min_buy_amount.as_str(), "2475000000");
		assert_eq!(
			quote.allowance_target.as_deref(),
			Some("0x0000000000001fF3684f28c67538d4D072C22734")
		);
		assert!(quote.validate().is_ok());
		assert!(quote.permit2.is_none());
	}

	#[test]
	fn permit2_block_marks_the_strategy() {
		let payload: ZeroExQuoteResponse = serde_json::from_value(json!({
			"buyAmount": "100",
			"sellAmount": "200",
			"transaction": {"to": "0x1", "data": "0x"},
			"permit2": {
				"type": "Permit2",
				"hash": "0xfeed",
				"eip712": {
					"types": {},
					"domain": {},
					"message": {},
					"primaryType": "PermitTransferFrom"
				}
			}
		}))
		.unwrap();

		let quote = payload.into_quote(&sample_request(1));
		assert!(quote.has_permit2());
		assert_eq!(quote.approval_strategy, Some(ApprovalStrategy::Permit2));
	}
}
