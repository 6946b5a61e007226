//! LiFi meta-aggregator adapter
//!
//! Cross-chain route discovery through `/advanced/routes` and execution
//! status through `/status`. Route execution is settled by LiFi's own
//! contracts; submitting the generated transactions is not wired yet.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;
use omniswap_types::{
	Amount, ChainSupport, ExecutionStatus, MetaAggregator, Provider, ProviderConfig,
	ProviderError, ProviderHealth, ProviderResult, RouteFees, RouteQuote, RouteStep, SignerContext,
	StepKind, UniversalSwapRequest,
};

use crate::http::{build_client, send_checked};

const BASE_URL: &str = "https://li.quest/v1";

const SUPPORTED_CHAINS: [u64; 12] = [1, 10, 56, 100, 137, 250, 324, 1101, 8453, 42161, 43114, 59144];

/// Confidence assigned to discovered routes; LiFi does not publish one
const DEFAULT_CONFIDENCE: f64 = 0.9;

pub fn init(registry: &ProviderRegistry, settings: &Settings) {
	match LifiAdapter::from_settings(settings) {
		Ok(adapter) => {
			registry.register_meta(Arc::new(adapter) as Arc<dyn MetaAggregator>);
		},
		Err(e) => {
			tracing::error!(error = %e, "lifi adapter failed to initialize");
		},
	}
}

#[derive(Debug)]
pub struct LifiAdapter {
	config: ProviderConfig,
	client: reqwest::Client,
}

impl LifiAdapter {
	pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
		let mut config = ProviderConfig::new("lifi", BASE_URL)
			.with_chains(&SUPPORTED_CHAINS)
			.with_api_key(settings.aggregators.lifi_api_key.clone());

		if let Some(key) = &config.api_key {
			config
				.headers
				.insert("x-lifi-api-key".to_string(), key.expose().to_string());
		}

		let client = build_client(config.timeout_ms, &config.headers)?;
		Ok(Self { config, client })
	}
}

#[async_trait]
impl Provider for LifiAdapter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		let url = format!("{}/chains", self.config.base_url);
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
impl MetaAggregator for LifiAdapter {
	async fn get_routes(&self, request: &UniversalSwapRequest) -> ProviderResult<Vec<RouteQuote>> {
		let from_chain = request
			.source
			.chain_id()
			.ok_or_else(|| ProviderError::Validation {
				reason: format!("source chain is not numeric: {}", request.source.chain),
			})?;
		let to_chain = request
			.destination
			.chain_id()
			.ok_or_else(|| ProviderError::Validation {
				reason: format!(
					"destination chain is not numeric: {}",
					request.destination.chain
				),
			})?;

		let url = format!("{}/advanced/routes", self.config.base_url);
		let body = json!({
			"fromChainId": from_chain,
			"toChainId": to_chain,
			"fromTokenAddress": request.sell_token,
			"toTokenAddress": request.buy_token,
			"fromAmount": request.sell_amount,
			"fromAddress": request.taker,
		});

		let response =
			send_checked(&self.config.name, self.client.post(&url).json(&body)).await?;
		let payload: LifiRoutesResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		debug!(
			from_chain,
			to_chain,
			routes = payload.routes.len(),
			"lifi routes discovered"
		);

		Ok(payload
			.routes
			.into_iter()
			.map(|route| route.into_route_quote(from_chain, to_chain))
			.collect())
	}

	async fn execute(
		&self,
		_route_id: &str,
		_signer: &SignerContext,
	) -> ProviderResult<Vec<String>> {
		// Transaction submission for LiFi routes is a future adapter concern;
		// the generated step transactions must be signed per chain.
		Err(ProviderError::NotImplemented(
			"lifi route execution".to_string(),
		))
	}

	async fn status(&self, route_id: &str) -> ProviderResult<ExecutionStatus> {
		let url = format!("{}/status", self.config.base_url);
		let response = send_checked(
			&self.config.name,
			self.client.get(&url).query(&[("txHash", route_id)]),
		)
		.await?;

		let payload: LifiStatusResponse =
			response.json().await.map_err(|e| ProviderError::InvalidResponse {
				provider: self.config.name.clone(),
				reason: e.to_string(),
			})?;

		Ok(match payload.status.as_str() {
			"DONE" => ExecutionStatus::Success,
			"FAILED" => ExecutionStatus::Failed,
			"PARTIAL" => ExecutionStatus::Partial,
			_ => ExecutionStatus::Pending,
		})
	}

	fn supported_chains(&self) -> ChainSupport {
		ChainSupport {
			from: SUPPORTED_CHAINS.to_vec(),
			to: SUPPORTED_CHAINS.to_vec(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct LifiRoutesResponse {
	#[serde(default)]
	routes: Vec<LifiRoute>,
}

#[derive(Debug, Deserialize)]
struct LifiStatusResponse {
	status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiRoute {
	id: String,
	to_amount: Amount,
	#[serde(default)]
	steps: Vec<LifiStep>,
	#[serde(default)]
	gas_cost_usd: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiStep {
	#[serde(rename = "type")]
	kind: String,
	#[serde(default)]
	tool: Option<String>,
	#[serde(default)]
	estimate: Option<LifiEstimate>,
	#[serde(flatten)]
	raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiEstimate {
	#[serde(default)]
	execution_duration: Option<f64>,
}

impl LifiRoute {
	fn into_route_quote(self, from_chain: u64, to_chain: u64) -> RouteQuote {
		let eta_seconds = self
			.steps
			.iter()
			.filter_map(|step| {
				step.estimate
					.as_ref()
					.and_then(|estimate| estimate.execution_duration)
			})
			.sum::<f64>() as u64;

		let steps = self
			.steps
			.into_iter()
			.map(|step| {
				let kind = match step.kind.as_str() {
					"swap" => StepKind::Swap,
					"cross" | "lifi" => StepKind::Bridge,
					_ => StepKind::Bridge,
				};
				let chain_id = if kind == StepKind::Swap { from_chain } else { to_chain };
				RouteStep {
					kind,
					chain_id,
					details: step.raw,
					protocol: step.tool,
					estimated_time: step
						.estimate
						.and_then(|estimate| estimate.execution_duration.map(|d| d as u64)),
				}
			})
			.collect();

		RouteQuote {
			steps,
			total_estimated_out: self.to_amount,
			fees: RouteFees::default(),
			eta_seconds: (eta_seconds > 0).then_some(eta_seconds),
			route_id: Some(self.id),
			price_impact: None,
			confidence: DEFAULT_CONFIDENCE,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn route_mapping_preserves_id_and_amount() {
		let route: LifiRoute = serde_json::from_value(json!({
			"id": "route-1",
			"toAmount": "995000000",
			"steps": [
				{"type": "swap", "tool": "uniswap", "estimate": {"executionDuration": 30.0}},
				{"type": "cross", "tool": "stargate", "estimate": {"executionDuration": 120.0}}
			]
		}))
		.unwrap();

		let quote = route.into_route_quote(1, 42161);
		assert_eq!(quote.route_id.as_deref(), Some("route-1"));
		assert_eq!(quote.total_estimated_out.as_str(), "995000000");
		assert_eq!(quote.steps.len(), 2);
		assert_eq!(quote.steps[0].kind, StepKind::Swap);
		assert_eq!(quote.steps[1].kind, StepKind::Bridge);
		assert_eq!(quote.eta_seconds, Some(150));
		assert!(quote.validate().is_ok());
	}

	#[test]
	fn directional_support_is_symmetric() {
		let adapter = LifiAdapter::from_settings(&Settings::default()).unwrap();
		let support = adapter.supported_chains();
		assert_eq!(support.from, support.to);
		assert!(support.from.contains(&1));
		assert!(support.from.contains(&42161));
	}
}
