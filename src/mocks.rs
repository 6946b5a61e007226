//! Mock providers for tests and examples
//!
//! Deterministic, configurable implementations of every category trait.
//! They never touch the network.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use omniswap_types::{
	Amount, ChainSupport, EvmSpenderProvider, ExecutionStatus, MetaAggregator, NativeRouter,
	OnChainAggregator, Permit2Data, Provider, ProviderConfig, ProviderError, ProviderHealth,
	ProviderResult, RouteFees, RouteQuote, RouteStep, Secret, SignedSolanaTx, SignerContext,
	SolanaRouter, StepKind, SwapQuote, SwapRequest, TransactionData, TypedDataBundle,
	UniversalSwapRequest,
};

/// Configurable mock EVM aggregator
#[derive(Debug)]
pub struct MockEvmAggregator {
	config: ProviderConfig,
	buy_amount: String,
	to_address: String,
	healthy: bool,
	fail_quotes: bool,
	attach_permit2: bool,
}

impl MockEvmAggregator {
	pub fn new(name: &str, chains: &[u64]) -> Self {
		Self {
			config: ProviderConfig::new(name, "https://mock.invalid").with_chains(chains),
			buy_amount: "2500000000".to_string(),
			to_address: format!("0x{:040x}", name.len()),
			healthy: true,
			fail_quotes: false,
			attach_permit2: false,
		}
	}

	pub fn with_buy_amount(mut self, amount: &str) -> Self {
		self.buy_amount = amount.to_string();
		self
	}

	pub fn with_to_address(mut self, to: &str) -> Self {
		self.to_address = to.to_string();
		self
	}

	pub fn unhealthy(mut self) -> Self {
		self.healthy = false;
		self
	}

	pub fn failing(mut self) -> Self {
		self.fail_quotes = true;
		self
	}

	pub fn with_permit2(mut self) -> Self {
		self.attach_permit2 = true;
		self
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}

	fn quote_for(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		if self.fail_quotes {
			return Err(ProviderError::Upstream {
				provider: self.config.name.clone(),
				status: 500,
				message: format!("{} upstream exploded", self.config.name),
			});
		}

		let permit2 = self.attach_permit2.then(|| Permit2Data {
			kind: "Permit2".to_string(),
			hash: "0x1234".to_string(),
			eip712: TypedDataBundle {
				types: json!({
					"EIP712Domain": [
						{"name": "name", "type": "string"},
						{"name": "chainId", "type": "uint256"},
						{"name": "verifyingContract", "type": "address"}
					],
					"PermitTransferFrom": [
						{"name": "spender", "type": "address"},
						{"name": "nonce", "type": "uint256"},
						{"name": "deadline", "type": "uint256"}
					]
				}),
				domain: json!({
					"name": "Permit2",
					"chainId": request.chain_id,
					"verifyingContract": "0x000000000022D473030F116dDEE9F6B43aC78BA3"
				}),
				message: json!({
					"spender": "0x0000000000001fF3684f28c67538d4D072C22734",
					"nonce": "0",
					"deadline": "1900000000"
				}),
				primary_type: "PermitTransferFrom".to_string(),
			},
		});

		Ok(SwapQuote {
			sell_token: request.sell_token.clone(),
			buy_token: request.buy_token.clone(),
			sell_amount: request.sell_amount.clone(),
			buy_amount: Amount::from(self.buy_amount.as_str()),
			min_buy_amount: Amount::from(self.buy_amount.as_str()),
			to: self.to_address.clone(),
			data: "0xabcd".to_string(),
			value: Amount::from("0"),
			gas: Amount::from("210000"),
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
			allowance_target: Some(self.to_address.clone()),
			aggregator: self.config.name.clone(),
			price_impact: None,
			estimated_gas: None,
			permit2,
			approval_strategy: request.approval_strategy,
		})
	}
}

#[async_trait]
impl Provider for MockEvmAggregator {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		if self.healthy {
			Ok(ProviderHealth::healthy(self.name(), 20))
		} else {
			Err(ProviderError::Timeout { timeout_ms: 5_000 })
		}
	}
}

#[async_trait]
impl OnChainAggregator for MockEvmAggregator {
	async fn get_quote(&self, request: &SwapRequest, _strict: bool) -> ProviderResult<SwapQuote> {
		self.quote_for(request)
	}

	async fn build_transaction(&self, request: &SwapRequest) -> ProviderResult<TransactionData> {
		Ok(TransactionData::from(&self.quote_for(request)?))
	}
}

#[async_trait]
impl EvmSpenderProvider for MockEvmAggregator {
	async fn spender_address(
		&self,
		_chain_id: u64,
		_strategy: omniswap_types::ApprovalStrategy,
	) -> ProviderResult<String> {
		Ok(self.to_address.clone())
	}

	async fn allowance_holder_quote(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.quote_for(request)
	}

	async fn permit2_quote(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.quote_for(request)
	}

	async fn permit2_price(&self, request: &SwapRequest) -> ProviderResult<SwapQuote> {
		self.quote_for(request)
	}
}

/// Mock meta-aggregator producing a single two-step route
#[derive(Debug)]
pub struct MockMetaAggregator {
	config: ProviderConfig,
	out_amount: String,
	fail_routes: bool,
}

impl MockMetaAggregator {
	pub fn new(name: &str) -> Self {
		Self {
			config: ProviderConfig::new(name, "https://mock.invalid")
				.with_chains(&[1, 10, 137, 42161, 8453]),
			out_amount: "995000000".to_string(),
			fail_routes: false,
		}
	}

	pub fn with_out_amount(mut self, amount: &str) -> Self {
		self.out_amount = amount.to_string();
		self
	}

	pub fn failing(mut self) -> Self {
		self.fail_routes = true;
		self
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}
}

#[async_trait]
impl Provider for MockMetaAggregator {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		Ok(ProviderHealth::healthy(self.name(), 35))
	}
}

#[async_trait]
impl MetaAggregator for MockMetaAggregator {
	async fn get_routes(&self, request: &UniversalSwapRequest) -> ProviderResult<Vec<RouteQuote>> {
		if self.fail_routes {
			return Err(ProviderError::Upstream {
				provider: self.config.name.clone(),
				status: 503,
				message: "route discovery unavailable".to_string(),
			});
		}

		let from_chain = request.source.chain_id().unwrap_or(1);
		let to_chain = request.destination.chain_id().unwrap_or(42161);

		Ok(vec![RouteQuote {
			steps: vec![
				RouteStep {
					kind: StepKind::Swap,
					chain_id: from_chain,
					details: json!({"tool": "mock-dex"}),
					protocol: Some("mock-dex".to_string()),
					estimated_time: Some(30),
				},
				RouteStep {
					kind: StepKind::Bridge,
					chain_id: to_chain,
					details: json!({"tool": "mock-bridge"}),
					protocol: Some("mock-bridge".to_string()),
					estimated_time: Some(300),
				},
			],
			total_estimated_out: Amount::from(self.out_amount.as_str()),
			fees: RouteFees::default(),
			eta_seconds: Some(330),
			route_id: Some(format!("{}-route-1", self.config.name)),
			price_impact: None,
			confidence: 0.9,
		}])
	}

	async fn execute(
		&self,
		_route_id: &str,
		_signer: &SignerContext,
	) -> ProviderResult<Vec<String>> {
		Ok(vec!["0xmock-txid".to_string()])
	}

	async fn status(&self, _route_id: &str) -> ProviderResult<ExecutionStatus> {
		Ok(ExecutionStatus::Success)
	}

	fn supported_chains(&self) -> ChainSupport {
		ChainSupport {
			from: self.config.supported_chains.clone(),
			to: self.config.supported_chains.clone(),
		}
	}
}

/// Mock Solana router with a single-hop route
#[derive(Debug)]
pub struct MockSolanaRouter {
	config: ProviderConfig,
}

impl MockSolanaRouter {
	pub fn new(name: &str) -> Self {
		Self {
			config: ProviderConfig::new(name, "https://mock.invalid"),
		}
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}
}

#[async_trait]
impl Provider for MockSolanaRouter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		Ok(ProviderHealth::healthy(self.name(), 15))
	}
}

#[async_trait]
impl SolanaRouter for MockSolanaRouter {
	async fn quote(&self, request: &UniversalSwapRequest) -> ProviderResult<RouteQuote> {
		Ok(RouteQuote {
			steps: vec![RouteStep {
				kind: StepKind::Swap,
				chain_id: 101,
				details: json!({"inputMint": request.sell_token, "outputMint": request.buy_token}),
				protocol: Some(self.config.name.clone()),
				estimated_time: Some(5),
			}],
			total_estimated_out: Amount::from("2500000"),
			fees: RouteFees::default(),
			eta_seconds: Some(5),
			route_id: None,
			price_impact: None,
			confidence: 0.95,
		})
	}

	async fn build_and_sign(
		&self,
		_quote: &RouteQuote,
		_keypair: Option<&Secret>,
	) -> ProviderResult<SignedSolanaTx> {
		Ok(SignedSolanaTx {
			raw_tx: "bW9jay10cmFuc2FjdGlvbg==".to_string(),
			txid: None,
			instructions: None,
		})
	}

	async fn supports_token_pair(
		&self,
		sell_mint: &str,
		buy_mint: &str,
	) -> ProviderResult<bool> {
		Ok(!sell_mint.is_empty() && !buy_mint.is_empty() && sell_mint != buy_mint)
	}
}

/// Mock native-L1 router
#[derive(Debug)]
pub struct MockNativeRouter {
	config: ProviderConfig,
}

impl MockNativeRouter {
	pub fn new(name: &str) -> Self {
		Self {
			config: ProviderConfig::new(name, "https://mock.invalid"),
		}
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}
}

#[async_trait]
impl Provider for MockNativeRouter {
	fn name(&self) -> &str {
		&self.config.name
	}

	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn health(&self) -> ProviderResult<ProviderHealth> {
		Ok(ProviderHealth::healthy(self.name(), 60))
	}
}

#[async_trait]
impl NativeRouter for MockNativeRouter {
	async fn quote_btc(&self, _request: &UniversalSwapRequest) -> ProviderResult<RouteQuote> {
		Ok(RouteQuote {
			steps: vec![RouteStep {
				kind: StepKind::Native,
				chain_id: 0,
				details: json!({"memo": "=:ETH.ETH:0xf39F", "inboundAddress": "bc1qmock"}),
				protocol: Some(self.config.name.clone()),
				estimated_time: Some(720),
			}],
			total_estimated_out: Amount::from("4995000"),
			fees: RouteFees::default(),
			eta_seconds: Some(720),
			route_id: None,
			price_impact: None,
			confidence: 0.85,
		})
	}

	async fn deposit_and_track(
		&self,
		_txid: &str,
		_memo: &str,
	) -> ProviderResult<ExecutionStatus> {
		Ok(ExecutionStatus::Pending)
	}

	fn supported_destinations(&self) -> Vec<String> {
		vec!["BTC.BTC".to_string(), "ETH.ETH".to_string()]
	}
}
