//! Universal pre-check
//!
//! Five independent probes run before execution: parameters, liquidity,
//! approval status, wallet balance and provider health. None of them
//! short-circuits the others; each failure is recorded with a warning and
//! the composite report is returned either way.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use omniswap_types::constants::evm::is_native_token;
use omniswap_types::{Amount, ApprovalStrategy, Provider, UniversalSwapRequest};

use crate::approval::ApprovalService;
use crate::classifier::RoutingClassifier;
use crate::evm::{parse_address, EvmChains};
use crate::health::HealthMonitor;
use crate::orchestrator::QuoteOrchestrator;
use omniswap_registry::ProviderRegistry;

/// Composite pre-check outcome.
///
/// `approval_required` is `None` when the spender could not be resolved and
/// the probe was skipped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecheckReport {
	pub parameters_valid: bool,
	pub liquidity_available: bool,
	pub approval_required: Option<bool>,
	pub sufficient_balance: bool,
	pub provider_healthy: bool,
	pub warnings: Vec<String>,
	pub details: serde_json::Value,
}

impl PrecheckReport {
	/// Whether every probe that ran came back clean
	pub fn all_clear(&self) -> bool {
		self.parameters_valid
			&& self.liquidity_available
			&& self.sufficient_balance
			&& self.provider_healthy
	}
}

pub struct PrecheckService {
	classifier: Arc<RoutingClassifier>,
	orchestrator: Arc<QuoteOrchestrator>,
	approval: Arc<ApprovalService>,
	chains: Arc<EvmChains>,
	registry: Arc<ProviderRegistry>,
	health: Arc<HealthMonitor>,
}

impl PrecheckService {
	pub fn new(
		classifier: Arc<RoutingClassifier>,
		orchestrator: Arc<QuoteOrchestrator>,
		approval: Arc<ApprovalService>,
		chains: Arc<EvmChains>,
		registry: Arc<ProviderRegistry>,
		health: Arc<HealthMonitor>,
	) -> Self {
		Self {
			classifier,
			orchestrator,
			approval,
			chains,
			registry,
			health,
		}
	}

	pub async fn run(&self, request: &UniversalSwapRequest) -> PrecheckReport {
		let mut warnings = Vec::new();
		let is_evm = request.source.ecosystem.is_evm_compatible();

		// 1. parameters
		let parameters_valid = match request.validate() {
			Ok(()) => {
				let compatible = self.classifier.validate_compatibility(request);
				if !compatible {
					warnings.push("source or destination chain is not supported".to_string());
				}
				compatible
			},
			Err(e) => {
				warnings.push(format!("invalid parameters: {}", e));
				false
			},
		};

		// 2. liquidity
		let liquidity_available = self.probe_liquidity(request, &mut warnings).await;

		// 3. approval
		let approval_required = self.probe_approval(request, &mut warnings).await;

		// 4. balance
		let sufficient_balance = self.probe_balance(request, &mut warnings).await;

		// 5. provider health
		let provider_healthy = self.probe_provider_health(&mut warnings).await;

		let details = json!({
			"swapType": self.classifier.determine_swap_type(request).ok(),
			"sourceEcosystem": request.source.ecosystem,
			"destinationEcosystem": request.destination.ecosystem,
			"evmChecksApplied": is_evm,
		});

		PrecheckReport {
			parameters_valid,
			liquidity_available,
			approval_required,
			sufficient_balance,
			provider_healthy,
			warnings,
			details,
		}
	}

	/// Best-effort multi-quote fan-out; liquid iff at least one quote pays
	/// out. Success populates the supported-quote cache as a side effect of
	/// the orchestrator call. Non-EVM ecosystems are not probed yet.
	async fn probe_liquidity(
		&self,
		request: &UniversalSwapRequest,
		warnings: &mut Vec<String>,
	) -> bool {
		if !request.is_same_evm_chain() {
			debug!("liquidity probe skipped for non-EVM or cross-chain request");
			return true;
		}

		let legacy = match request.to_legacy() {
			Ok(legacy) => legacy,
			Err(e) => {
				warnings.push(format!("liquidity probe skipped: {}", e));
				return false;
			},
		};

		match self.orchestrator.get_multiple_quotes(&legacy).await {
			Ok(comparison) => {
				let liquid = comparison
					.quotes
					.iter()
					.any(|quote| !quote.buy_amount.is_zero());
				if !liquid {
					warnings.push("no quote returned a positive buy amount".to_string());
				}
				liquid
			},
			Err(e) => {
				warnings.push(format!("liquidity unavailable: {}", e));
				false
			},
		}
	}

	/// Resolve the spender and query the allowance. When the spender cannot
	/// be determined the probe records *skipped* rather than a verdict.
	async fn probe_approval(
		&self,
		request: &UniversalSwapRequest,
		warnings: &mut Vec<String>,
	) -> Option<bool> {
		if !request.source.ecosystem.is_evm_compatible() {
			return Some(false);
		}
		if is_native_token(&request.sell_token) {
			return Some(false);
		}

		let chain_id = request.source.chain_id()?;
		let strategy = request
			.approval_strategy
			.unwrap_or(ApprovalStrategy::AllowanceHolder);

		let spender = match self.approval.resolve_spender(chain_id, strategy).await {
			Ok(spender) => spender,
			Err(e) => {
				warnings.push(format!("approval check skipped, spender unknown: {}", e));
				return None;
			},
		};

		match self
			.approval
			.is_approval_needed(
				chain_id,
				&request.sell_token,
				&request.taker,
				&spender,
				&request.sell_amount,
			)
			.await
		{
			Ok(needed) => Some(needed),
			Err(e) => {
				warnings.push(format!("approval check failed: {}", e));
				None
			},
		}
	}

	async fn probe_balance(
		&self,
		request: &UniversalSwapRequest,
		warnings: &mut Vec<String>,
	) -> bool {
		if !request.source.ecosystem.is_evm_compatible() {
			return true;
		}

		let Some(chain_id) = request.source.chain_id() else {
			warnings.push("balance probe skipped: source chain id unavailable".to_string());
			return false;
		};

		let result: Result<bool, String> = async {
			let chain = self.chains.get(chain_id).map_err(|e| e.to_string())?;
			let owner = parse_address(&request.taker).map_err(|e| e.to_string())?;
			let required = request.sell_amount.to_u256().map_err(|e| e.to_string())?;

			let balance = if is_native_token(&request.sell_token) {
				chain.native_balance(owner).await.map_err(|e| e.to_string())?
			} else {
				let token = parse_address(&request.sell_token).map_err(|e| e.to_string())?;
				chain
					.erc20_balance(token, owner)
					.await
					.map_err(|e| e.to_string())?
			};

			Ok(balance >= required)
		}
		.await;

		match result {
			Ok(sufficient) => {
				if !sufficient {
					warnings.push(format!(
						"balance below sell amount {}",
						Amount::from(request.sell_amount.as_str())
					));
				}
				sufficient
			},
			Err(e) => {
				warnings.push(format!("balance check failed: {}", e));
				false
			},
		}
	}

	/// Every registered EVM adapter must currently report healthy
	async fn probe_provider_health(&self, warnings: &mut Vec<String>) -> bool {
		let providers = self.registry.evm_providers();
		if providers.is_empty() {
			warnings.push("no EVM providers registered".to_string());
			return false;
		}

		let mut all_healthy = true;
		for provider in &providers {
			let health = self.health.health_for(provider.as_ref() as &dyn Provider).await;
			if !health.is_healthy() {
				warnings.push(format!("provider {} is {:?}", provider.name(), health.status));
				all_healthy = false;
			}
		}
		all_healthy
	}
}

impl std::fmt::Debug for PrecheckService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PrecheckService").finish()
	}
}
