//! EVM approval workflow
//!
//! Decides whether the caller must grant an ERC-20 allowance or can rely on
//! an existing Permit2 grant, and resolves the spender contract for each
//! approval strategy.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use omniswap_registry::ProviderRegistry;
use omniswap_types::constants::evm::{
	allowance_holder_fallback, is_native_token, is_permit2_chain, PERMIT2_ADDRESS,
};
use omniswap_types::constants::limits::SPENDER_CACHE_TTL_SECONDS;
use omniswap_types::{Amount, ApprovalStrategy, SwapRequest, TransactionData};

use crate::evm::{encode_approve, parse_address, EvmChainError, EvmChains};

/// Probe taker used for spender-discovery quotes
const PROBE_TAKER: &str = "0x0000000000000000000000000000000000000001";

/// Probe sell amount: 0.1 of the native token
const PROBE_SELL_AMOUNT: &str = "100000000000000000";

/// Canonical USDC per chain, the buy side of spender-discovery probes
const PROBE_USDC: [(u64, &str); 7] = [
	(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
	(10, "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
	(56, "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
	(137, "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
	(8453, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
	(42161, "0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
	(43114, "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
];

/// Native token sentinel used on the sell side of probes
const PROBE_NATIVE: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

#[derive(Error, Debug)]
pub enum ApprovalError {
	#[error(transparent)]
	Evm(#[from] EvmChainError),

	#[error("no known spender for strategy {strategy} on chain {chain_id}")]
	UnsupportedChain {
		chain_id: u64,
		strategy: ApprovalStrategy,
	},

	#[error("invalid amount: {reason}")]
	InvalidAmount { reason: String },
}

/// Allowance state reported by the approval-status endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatusReport {
	pub approval_required: bool,
	pub spender: String,
	pub current_allowance: Amount,
	pub strategy: ApprovalStrategy,
}

#[derive(Debug, Clone)]
struct CachedSpender {
	address: String,
	cached_at: DateTime<Utc>,
}

pub struct ApprovalService {
	chains: Arc<EvmChains>,
	registry: Arc<ProviderRegistry>,
	/// Dynamically discovered allowance-holder spenders, per chain
	spender_cache: DashMap<u64, CachedSpender>,
}

impl ApprovalService {
	pub fn new(chains: Arc<EvmChains>, registry: Arc<ProviderRegistry>) -> Self {
		Self {
			chains,
			registry,
			spender_cache: DashMap::new(),
		}
	}

	/// Whether the owner must grant an approval before `spender` can move
	/// `amount` of `token`.
	///
	/// Native tokens never need approval. On Permit2 chains, tokens that can
	/// ride Permit2 are checked against the Permit2 contract's allowance
	/// record; everything else reads the plain ERC-20 allowance.
	pub async fn is_approval_needed(
		&self,
		chain_id: u64,
		token: &str,
		owner: &str,
		spender: &str,
		amount: &Amount,
	) -> Result<bool, ApprovalError> {
		if is_native_token(token) {
			return Ok(false);
		}

		if is_permit2_chain(chain_id) && Self::is_token_permit2_compatible(token) {
			return Ok(self
				.is_permit2_approval_needed(chain_id, token, owner, spender, amount)
				.await);
		}

		let chain = self.chains.get(chain_id)?;
		let required = amount.to_u256().map_err(|e| ApprovalError::InvalidAmount {
			reason: e.to_string(),
		})?;

		let allowance = chain
			.erc20_allowance(
				parse_address(token)?,
				parse_address(owner)?,
				parse_address(spender)?,
			)
			.await?;

		Ok(allowance < required)
	}

	/// Permit2-contract allowance check.
	///
	/// Errors resolve to `true` (assume an approval is needed); that
	/// conservative default can mask a misconfigured Permit2 address, so the
	/// failing call is logged with its cause.
	pub async fn is_permit2_approval_needed(
		&self,
		chain_id: u64,
		token: &str,
		owner: &str,
		spender: &str,
		amount: &Amount,
	) -> bool {
		let result: Result<bool, ApprovalError> = async {
			let chain = self.chains.get(chain_id)?;
			let required = amount.to_u256().map_err(|e| ApprovalError::InvalidAmount {
				reason: e.to_string(),
			})?;

			let allowance = chain
				.permit2_allowance(
					parse_address(owner)?,
					parse_address(token)?,
					parse_address(spender)?,
				)
				.await?;

			let now = Utc::now().timestamp() as u64;
			Ok(allowance.expiration < now || allowance.amount < required)
		}
		.await;

		match result {
			Ok(needed) => needed,
			Err(e) => {
				warn!(
					chain_id,
					token,
					error = %e,
					"permit2 allowance check failed, assuming approval needed"
				);
				true
			},
		}
	}

	/// Whether a token can ride Permit2 at all. Native sentinels cannot;
	/// ERC-20s are assumed compatible until a token proves otherwise.
	pub fn is_token_permit2_compatible(token: &str) -> bool {
		!is_native_token(token)
	}

	/// Resolve the spender contract for an approval strategy on a chain.
	///
	/// Permit2 is a constant address. The allowance-holder spender is
	/// discovered by probing a quote and reading its `allowanceTarget`,
	/// cached for 24 hours per chain; when the probe fails, a hard-coded
	/// table keyed by hardfork family is the fallback.
	pub async fn resolve_spender(
		&self,
		chain_id: u64,
		strategy: ApprovalStrategy,
	) -> Result<String, ApprovalError> {
		match strategy {
			ApprovalStrategy::Permit2 => Ok(PERMIT2_ADDRESS.to_string()),
			ApprovalStrategy::AllowanceHolder => {
				if let Some(cached) = self.fresh_cached_spender(chain_id) {
					return Ok(cached);
				}

				match self.probe_spender(chain_id).await {
					Some(address) => {
						self.spender_cache.insert(
							chain_id,
							CachedSpender {
								address: address.clone(),
								cached_at: Utc::now(),
							},
						);
						Ok(address)
					},
					None => allowance_holder_fallback(chain_id)
						.map(|address| address.to_string())
						.ok_or(ApprovalError::UnsupportedChain { chain_id, strategy }),
				}
			},
		}
	}

	/// Allowance state for the approval-status endpoint
	pub async fn approval_status(
		&self,
		chain_id: u64,
		token: &str,
		owner: &str,
		amount: &Amount,
		strategy: ApprovalStrategy,
	) -> Result<ApprovalStatusReport, ApprovalError> {
		let spender = self.resolve_spender(chain_id, strategy).await?;

		if is_native_token(token) {
			return Ok(ApprovalStatusReport {
				approval_required: false,
				spender,
				current_allowance: Amount::from("0"),
				strategy,
			});
		}

		let chain = self.chains.get(chain_id)?;
		let current = chain
			.erc20_allowance(
				parse_address(token)?,
				parse_address(owner)?,
				parse_address(&spender)?,
			)
			.await?;

		let approval_required = self
			.is_approval_needed(chain_id, token, owner, &spender, amount)
			.await?;

		Ok(ApprovalStatusReport {
			approval_required,
			spender,
			current_allowance: Amount::from_u256(current),
			strategy,
		})
	}

	/// ERC-20 approve transaction for the resolved spender
	pub fn build_approval_transaction(
		&self,
		token: &str,
		spender: &str,
		amount: &Amount,
	) -> Result<TransactionData, ApprovalError> {
		let value = amount.to_u256().map_err(|e| ApprovalError::InvalidAmount {
			reason: e.to_string(),
		})?;

		Ok(TransactionData {
			to: token.to_string(),
			data: encode_approve(parse_address(spender)?, value),
			value: Amount::from("0"),
			gas_limit: None,
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		})
	}

	fn fresh_cached_spender(&self, chain_id: u64) -> Option<String> {
		self.spender_cache.get(&chain_id).and_then(|entry| {
			let age = Utc::now().signed_duration_since(entry.cached_at);
			if age < Duration::seconds(SPENDER_CACHE_TTL_SECONDS as i64) {
				Some(entry.address.clone())
			} else {
				None
			}
		})
	}

	/// Issue a small probe quote and read its `allowanceTarget`
	async fn probe_spender(&self, chain_id: u64) -> Option<String> {
		let provider = self.registry.any_spender_provider()?;
		let buy_token = PROBE_USDC
			.iter()
			.find(|(id, _)| *id == chain_id)
			.map(|(_, usdc)| usdc.to_string())?;

		let probe = SwapRequest {
			chain_id,
			sell_token: PROBE_NATIVE.to_string(),
			buy_token,
			sell_amount: Amount::from(PROBE_SELL_AMOUNT),
			taker: PROBE_TAKER.to_string(),
			recipient: None,
			slippage_bps: None,
			deadline: None,
			aggregator: None,
			approval_strategy: Some(ApprovalStrategy::AllowanceHolder),
		};

		match provider.allowance_holder_quote(&probe).await {
			Ok(quote) => {
				debug!(chain_id, target = ?quote.allowance_target, "spender probe succeeded");
				quote.allowance_target
			},
			Err(e) => {
				warn!(chain_id, error = %e, "spender probe failed, using fallback table");
				None
			},
		}
	}
}

impl std::fmt::Debug for ApprovalService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ApprovalService")
			.field("cached_spenders", &self.spender_cache.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::evm::{EvmChain, MockEvmChain, Permit2Allowance};
	use alloy::primitives::U256;
	use omniswap_types::test_utils::{TAKER, USDC, WETH};

	fn chains_with(chain_id: u64, mock: MockEvmChain) -> Arc<EvmChains> {
		let mut chains = EvmChains::default();
		chains.insert(chain_id, Arc::new(mock) as Arc<dyn EvmChain>);
		Arc::new(chains)
	}

	fn service(chains: Arc<EvmChains>) -> ApprovalService {
		ApprovalService::new(chains, Arc::new(ProviderRegistry::new()))
	}

	#[tokio::test]
	async fn native_token_never_needs_approval() {
		// no chain client registered at all: the check must not touch RPC
		let service = service(Arc::new(EvmChains::default()));
		let needed = service
			.is_approval_needed(
				1,
				"0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
				TAKER,
				PERMIT2_ADDRESS,
				&Amount::from("1000"),
			)
			.await
			.unwrap();
		assert!(!needed);
	}

	#[tokio::test]
	async fn erc20_allowance_comparison_off_permit2_chains() {
		let mut mock = MockEvmChain::new();
		mock.expect_erc20_allowance()
			.returning(|_, _, _| Ok(U256::from(500u64)));

		// chain 100 is not a Permit2 chain, so the ERC-20 path is used
		let service = service(chains_with(100, mock));

		assert!(service
			.is_approval_needed(100, WETH, TAKER, PERMIT2_ADDRESS, &Amount::from("1000"))
			.await
			.unwrap());
		assert!(!service
			.is_approval_needed(100, WETH, TAKER, PERMIT2_ADDRESS, &Amount::from("400"))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn permit2_grant_expiry_forces_approval() {
		let mut mock = MockEvmChain::new();
		mock.expect_permit2_allowance().returning(|_, _, _| {
			Ok(Permit2Allowance {
				amount: U256::MAX,
				expiration: 1, // long expired
				nonce: 0,
			})
		});

		let service = service(chains_with(1, mock));
		assert!(service
			.is_approval_needed(1, WETH, TAKER, PERMIT2_ADDRESS, &Amount::from("1000"))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn permit2_valid_grant_skips_approval() {
		let far_future = (Utc::now().timestamp() as u64) + 86_400;
		let mut mock = MockEvmChain::new();
		mock.expect_permit2_allowance().returning(move |_, _, _| {
			Ok(Permit2Allowance {
				amount: U256::MAX,
				expiration: far_future,
				nonce: 0,
			})
		});

		let service = service(chains_with(1, mock));
		assert!(!service
			.is_approval_needed(1, WETH, TAKER, PERMIT2_ADDRESS, &Amount::from("1000"))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn permit2_check_errors_assume_approval_needed() {
		// no chain client for chain 1: the permit2 read fails internally
		let service = service(Arc::new(EvmChains::default()));
		let needed = service
			.is_permit2_approval_needed(1, WETH, TAKER, PERMIT2_ADDRESS, &Amount::from("1"))
			.await;
		assert!(needed);
	}

	#[tokio::test]
	async fn permit2_spender_is_the_constant() {
		let service = service(Arc::new(EvmChains::default()));
		let spender = service
			.resolve_spender(1, ApprovalStrategy::Permit2)
			.await
			.unwrap();
		assert_eq!(spender, PERMIT2_ADDRESS);
	}

	#[tokio::test]
	async fn allowance_holder_falls_back_to_hardfork_table() {
		// empty registry: the probe cannot run, the fallback table answers
		let service = service(Arc::new(EvmChains::default()));
		let spender = service
			.resolve_spender(1, ApprovalStrategy::AllowanceHolder)
			.await
			.unwrap();
		assert_eq!(spender, "0x0000000000001fF3684f28c67538d4D072C22734");

		// chains outside every group are unsupported
		let err = service
			.resolve_spender(7777, ApprovalStrategy::AllowanceHolder)
			.await
			.unwrap_err();
		assert!(matches!(err, ApprovalError::UnsupportedChain { .. }));
	}

	#[test]
	fn approval_transaction_targets_the_token() {
		let service = service(Arc::new(EvmChains::default()));
		let tx = service
			.build_approval_transaction(USDC, PERMIT2_ADDRESS, &Amount::from("1000"))
			.unwrap();
		assert_eq!(tx.to, USDC);
		assert!(tx.data.starts_with("0x095ea7b3"));
		assert!(tx.value.is_zero());
	}
}
