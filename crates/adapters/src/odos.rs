//! Odos SOR adapter
//!
//! Two-step upstream: `/sor/quote/v2` returns a `pathId` redeemable at
//! `/sor/assemble` within roughly a minute. The adapter treats paths older
//! than 55 seconds as expired and re-quotes once before giving up.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;
use omniswap_types::constants::limits::ODOS_PATH_VALIDITY_SECONDS;
use omniswap_types::{
	Amount, OnChainAggregator, Provider, ProviderConfig, ProviderError, ProviderHealth,
	ProviderResult, SwapQuote, SwapRequest, TransactionData,
};

use crate::http::{build_client, send_checked};

const BASE_URL: &str = "https://api.odos.xyz";

const SUPPORTED_CHAINS: [u64; 11] = [1, 10, 56, 137, 250, 324, 5000, 8453, 42161, 43114, 59144];

pub fn init(registry: &ProviderRegistry, settings: &Settings) {
	match OdosAdapter::from_settings(settings) {
		Ok(adapter) => {
			registry.register_evm(Arc::new(adapter) as Arc<dyn OnChainAggregator>);
		},
		Err(e) => {
			tracing::error!(error = %e, "odos adapter failed to initialize");
		},
	}
}

#[derive(Debug)]
pub struct OdosAdapter {
	config: ProviderConfig,
	client: reqwest::Client,
	referral_code: Option<String>,
}

struct QuotedPath {
	path_id: String,
	out_amount: Amount,
	price_impact: Option<f64>,
	gas_estimate: Option<Amount>,
	quoted_at: DateTime<Utc>,
}

impl OdosAdapter {
	pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
		let config = ProviderConfig::new("odos", BASE_URL).with_chains(&SUPPORTED_CHAINS);
		let client = build_client(config.timeout_ms, &config.headers)?;

		Ok(Self {
			config,
			client,
			referral_code: settings.aggregators.odos_referral_code.clone(),
		})
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

	async fn quote_path(&self, request: &SwapRequest) -> ProviderResult<QuotedPath> {
		let url = format!("{}/sor/quote/v2", self.config.base_url);

		let mut body = json!({
			"chainId": request.chain_id,
			"inputTokens": [{
				"tokenAddress": request.sell_token,
				"amount": request.sell_amount,
			}],
			"outputTokens": [{
				"tokenAddress": request.buy_token,
				"proportion": 1,
			}],
			"userAddr": request.taker,
			"compact": true,
		});
		if let Some(bps) = request.slippage_bps {
			body["slippageLimitPercent"] = json!(f64::from(bps) / 100.0);
		}
		if let Some(code) = &self.referral_code {
			body["referralCode"] = json!(code);
		}

		let response =
			send_checked(&self.config.name, self.client.post(&url).json(&body)).await?;
		let payload: OdosQuoteResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		let out_amount = payload
			.out_amounts
			.into_iter()
			.next()
			.ok_or_else(|| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: "quote carried no output amounts".to_string(),
			})?;

		debug!(path_id = %payload.path_id, out_amount = %out_amount, "odos path quoted");

		Ok(QuotedPath {
			path_id: payload.path_id,
			out_amount,
			price_impact: payload.price_impact,
			gas_estimate: payload.gas_estimate,
			quoted_at: Utc::now(),
		})
	}

	async fn assemble(
		&self,
		request: &SwapRequest,
		path: &QuotedPath,
	) -> ProviderResult<OdosTransaction> {
		// Paths expire upstream after about a minute; assembling inside the
		// final seconds races that window.
		let age = Utc::now()
			.signed_duration_since(path.quoted_at)
			.num_seconds();
		if age > ODOS_PATH_VALIDITY_SECONDS {
			return Err(ProviderError::QuoteExpired {
				reason: format!("pathId aged {}s", age),
			});
		}

		let url = format!("{}/sor/assemble", self.config.base_url);
		let body = json!({
			"userAddr": request.taker,
			"pathId": path.path_id,
			"simulate": false,
		});

		let response =
			send_checked(&self.config.name, self.client.post(&url).json(&body)).await?;
		let payload: OdosAssembleResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		Ok(payload.transaction)
	}

	/// Quote + assemble, re-quoting the path exactly once when it expired
	/// between the two calls.
	async fn quote_and_assemble(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.ensure_chain(request.chain_id)?;

		let mut path = self.quote_path(request).await?;
		let transaction = match self.assemble(request, &path).await {
			Ok(tx) => tx,
			Err(e) if is_path_expired(&e) => {
				warn!(error = %e, "odos path expired, re-quoting once");
				path = self.quote_path(request).await?;
				self.assemble(request, &path).await?
			},
			Err(e) => return Err(e),
		};

		let min_buy_amount = match request.slippage_bps {
			Some(bps) => path
				.out_amount
				.apply_slippage_bps(bps)
				.map_err(|e| ProviderError::InvalidResponse {
					provider: self.config.name.clone(),
					reason: e.to_string(),
				})?,
			None => path.out_amount.clone(),
		};

		Ok(SwapQuote {
			sell_token: request.sell_token.clone(),
			buy_token: request.buy_token.clone(),
			sell_amount: request.sell_amount.clone(),
			buy_amount: path.out_amount.clone(),
			min_buy_amount,
			to: transaction.to,
			data: transaction.data,
			value: transaction.value.unwrap_or_default(),
			gas: transaction.gas.unwrap_or_default(),
			gas_price: transaction.gas_price,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
			allowance_target: None,
			aggregator: "odos".to_string(),
			price_impact: path.price_impact,
			estimated_gas: path.gas_estimate,
			permit2: None,
			approval_strategy: request.approval_strategy,
		})
	}
}

fn is_path_expired(error: &ProviderError) -> bool {
	match error {
		ProviderError::QuoteExpired { .. } => true,
		ProviderError::Upstream { message, .. } => {
			message.to_lowercase().contains("expired")
		},
		_ => false,
	}
}

#[async_trait]
impl Provider for OdosAdapter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		let url = format!("{}/info/chains", self.config.base_url);
		let started = Utc::now();

		send_checked(&self.config.name, self.client.get(&url)).await?;

		let latency = Utc::now()
			.signed_duration_since(started)
			.num_milliseconds()
			.max(0) as u64;
		Ok(ProviderHealth::healthy(self.name(), latency))
	}
}

#[async_trait]
impl OnChainAggregator for OdosAdapter {
	async fn get_quote(&self, request: &SwapRequest, _strict: bool) -> ProviderResult<SwapQuote> {
		// Odos quotes are always binding once assembled
		self.quote_and_assemble(request).await
	}

	async fn build_transaction(&self, request: &SwapRequest) -> ProviderResult<TransactionData> {
		let quote = self.quote_and_assemble(request).await?;
		Ok(TransactionData::from(&quote))
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OdosQuoteResponse {
	path_id: String,
	out_amounts: Vec<Amount>,
	#[serde(default)]
	price_impact: Option<f64>,
	#[serde(default)]
	gas_estimate: Option<Amount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OdosAssembleResponse {
	transaction: OdosTransaction,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct OdosTransaction {
	to: String,
	data: String,
	#[serde(default)]
	value: Option<Amount>,
	#[serde(default)]
	gas: Option<Amount>,
	#[serde(default)]
	gas_price: Option<Amount>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	fn adapter() -> OdosAdapter {
		OdosAdapter::from_settings(&Settings::default()).unwrap()
	}

	#[test]
	fn chain_support_table() {
		let adapter = adapter();
		assert!(adapter.supports_chain(137));
		assert!(adapter.supports_chain(5000));
		assert!(!adapter.supports_chain(100));
	}

	#[tokio::test]
	async fn stale_path_is_rejected_before_assembly() {
		let adapter = adapter();
		let path = QuotedPath {
			path_id: "stale".to_string(),
			out_amount: Amount::from("1"),
			price_impact: None,
			gas_estimate: None,
			// one second past the validity window
			quoted_at: Utc::now() - Duration::seconds(ODOS_PATH_VALIDITY_SECONDS + 1),
		};

		let request = omniswap_types::test_utils::sample_request(1);
		let result = adapter.assemble(&request, &path).await;
		assert!(matches!(result, Err(ProviderError::QuoteExpired { .. })));
	}

	#[test]
	fn expiry_detection_covers_upstream_messages() {
		assert!(is_path_expired(&ProviderError::QuoteExpired {
			reason: "aged".to_string()
		}));
		assert!(is_path_expired(&ProviderError::Upstream {
			provider: "odos".to_string(),
			status: 400,
			message: "Path has EXPIRED, request a new quote".to_string(),
		}));
		assert!(!is_path_expired(&ProviderError::Timeout { timeout_ms: 1 }));
	}

	#[test]
	fn quote_response_parses() {
		let payload: OdosQuoteResponse = serde_json::from_str(
			r#"{"pathId": "abc123", "outAmounts": ["2500000000"], "priceImpact": 0.01, "gasEstimate": "185000"}"#,
		)
		.unwrap();
		assert_eq!(payload.path_id, "abc123");
		assert_eq!(payload.out_amounts[0].as_str(), "2500000000");
	}
}
