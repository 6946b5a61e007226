//! THORChain native router adapter
//!
//! Quotes native-L1 swaps through a THORNode and tracks deposits through
//! their settlement. Swaps settle by sending the inbound deposit with the
//! returned memo; no contract call is involved.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;
use omniswap_types::{
	Amount, ExecutionStatus, NativeRouter, Provider, ProviderConfig, ProviderError,
	ProviderHealth, ProviderResult, RouteFees, RouteQuote, RouteStep, StepKind,
	UniversalSwapRequest,
};

use crate::http::{build_client, send_checked};

const BASE_URL: &str = "https://thornode.ninerealms.com";

const DESTINATIONS: [&str; 8] = [
	"BTC.BTC",
	"ETH.ETH",
	"BNB.BNB",
	"GAIA.ATOM",
	"AVAX.AVAX",
	"DOGE.DOGE",
	"LTC.LTC",
	"BCH.BCH",
];

pub fn init(registry: &ProviderRegistry, settings: &Settings) {
	match ThorchainAdapter::from_settings(settings) {
		Ok(adapter) => {
			registry.register_native(Arc::new(adapter) as Arc<dyn NativeRouter>);
		},
		Err(e) => {
			tracing::error!(error = %e, "thorchain adapter failed to initialize");
		},
	}
}

#[derive(Debug)]
pub struct ThorchainAdapter {
	config: ProviderConfig,
	client: reqwest::Client,
}

impl ThorchainAdapter {
	pub fn from_settings(_settings: &Settings) -> ProviderResult<Self> {
		let config = ProviderConfig::new("thorchain", BASE_URL);
		let client = build_client(config.timeout_ms, &config.headers)?;
		Ok(Self { config, client })
	}
}

#[async_trait]
impl Provider for ThorchainAdapter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		let url = format!("{}/thorchain/ping", self.config.base_url);
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
impl NativeRouter for ThorchainAdapter {
	async fn quote_btc(&self, request: &UniversalSwapRequest) -> ProviderResult<RouteQuote> {
		let url = format!("{}/thorchain/quote/swap", self.config.base_url);

		let response = send_checked(
			&self.config.name,
			self.client.get(&url).query(&[
				("from_asset", request.sell_token.as_str()),
				("to_asset", request.buy_token.as_str()),
				("amount", request.sell_amount.as_str()),
				("destination", request.recipient()),
			]),
		)
		.await?;

		let payload: ThorQuoteResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		debug!(
			expected_out = %payload.expected_amount_out,
			eta = ?payload.total_swap_seconds,
			"thorchain quote received"
		);

		Ok(payload.into_route_quote())
	}

	async fn deposit_and_track(&self, txid: &str, _memo: &str) -> ProviderResult<ExecutionStatus> {
		let url = format!("{}/thorchain/tx/{}", self.config.base_url, txid);

		let response = match send_checked(&self.config.name, self.client.get(&url)).await {
			Ok(response) => response,
			Err(ProviderError::Upstream { status: 404, .. }) => {
				// the node has not observed the deposit yet
				return Ok(ExecutionStatus::Pending);
			},
			Err(e) => return Err(e),
		};

		let payload: ThorTxResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		Ok(match payload.observed_tx.status.as_deref() {
			Some("done") => ExecutionStatus::Success,
			Some("refunded") => ExecutionStatus::Failed,
			_ => ExecutionStatus::Pending,
		})
	}

	fn supported_destinations(&self) -> Vec<String> {
		DESTINATIONS.iter().map(|d| d.to_string()).collect()
	}
}

#[derive(Debug, Deserialize)]
struct ThorQuoteResponse {
	expected_amount_out: Amount,
	#[serde(default)]
	fees: Option<ThorFees>,
	#[serde(default)]
	total_swap_seconds: Option<u64>,
	#[serde(default)]
	memo: Option<String>,
	#[serde(default)]
	inbound_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThorFees {
	#[serde(default)]
	outbound: Option<Amount>,
	#[serde(default)]
	liquidity: Option<Amount>,
}

#[derive(Debug, Deserialize)]
struct ThorTxResponse {
	observed_tx: ThorObservedTx,
}

#[derive(Debug, Deserialize)]
struct ThorObservedTx {
	#[serde(default)]
	status: Option<String>,
}

impl ThorQuoteResponse {
	fn into_route_quote(self) -> RouteQuote {
		let fees = self
			.fees
			.map(|fees| RouteFees {
				gas: fees.outbound.unwrap_or_default(),
				provider: fees.liquidity.unwrap_or_default(),
				bridge: None,
				app: None,
			})
			.unwrap_or_default();

		let details = serde_json::json!({
			"memo": self.memo,
			"inboundAddress": self.inbound_address,
		});

		RouteQuote {
			steps: vec![RouteStep {
				kind: StepKind::Native,
				chain_id: 0,
				details,
				protocol: Some("thorchain".to_string()),
				estimated_time: self.total_swap_seconds,
			}],
			total_estimated_out: self.expected_amount_out,
			fees,
			eta_seconds: self.total_swap_seconds,
			route_id: None,
			price_impact: None,
			confidence: 0.85,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quote_maps_memo_and_inbound_address() {
		let payload: ThorQuoteResponse = serde_json::from_str(
			r#"{
				"expected_amount_out": "4995000",
				"fees": {"outbound": "15000", "liquidity": "5000"},
				"total_swap_seconds": 720,
				"memo": "=:ETH.ETH:0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
				"inbound_address": "bc1qexample"
			}"#,
		)
		.unwrap();

		let route = payload.into_route_quote();
		assert_eq!(route.total_estimated_out.as_str(), "4995000");
		assert_eq!(route.eta_seconds, Some(720));
		assert_eq!(route.fees.gas.as_str(), "15000");
		assert_eq!(route.steps[0].kind, StepKind::Native);
		assert!(route.steps[0].details["memo"]
			.as_str()
			.unwrap()
			.starts_with("=:ETH.ETH"));
		assert!(route.validate().is_ok());
	}

	#[test]
	fn destination_catalogue_is_static() {
		let adapter = ThorchainAdapter::from_settings(&Settings::default()).unwrap();
		let destinations = adapter.supported_destinations();
		assert!(destinations.contains(&"BTC.BTC".to_string()));
		assert!(destinations.contains(&"GAIA.ATOM".to_string()));
	}
}
