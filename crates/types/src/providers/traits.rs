//! Capability traits provider adapters implement
//!
//! Every adapter exposes the universal [`Provider`] capability; each
//! category adds its own set. An adapter may additionally implement
//! [`EvmSpenderProvider`], which call sites probe through a dedicated
//! registry map rather than downcasting.

use async_trait::async_trait;
use std::fmt::Debug;

use super::{ChainSupport, ProviderConfig, ProviderResult, SignedSolanaTx, SignerContext};
use crate::models::{ProviderHealth, Secret};
use crate::quotes::{RouteQuote, SwapQuote, TransactionData};
use crate::swaps::{ApprovalStrategy, ExecutionStatus, SwapRequest, UniversalSwapRequest};

/// Universal capability set every provider exposes
#[async_trait]
pub trait Provider: Send + Sync + Debug {
	/// Registry name, unique within a category
	fn name(&self) -> &str;

	/// Runtime configuration
	fn config(&self) -> &ProviderConfig;

	/// Probe upstream liveness. Implementations keep this cheap; callers
	/// bound it with a timeout and cache the result.
	async fn health(&self) -> ProviderResult<ProviderHealth>;
}

/// Single-chain EVM DEX aggregator
#[async_trait]
pub trait OnChainAggregator: Provider {
	/// Get an executable quote. `strict` asks the upstream for a binding
	/// quote rather than an indicative price.
	async fn get_quote(&self, request: &SwapRequest, strict: bool) -> ProviderResult<SwapQuote>;

	/// Build a bare transaction payload for the request
	async fn build_transaction(&self, request: &SwapRequest) -> ProviderResult<TransactionData>;

	/// Whether the adapter serves `chain_id`
	fn supports_chain(&self, chain_id: u64) -> bool {
		self.config().supported_chains.contains(&chain_id)
	}

	/// Chains the adapter has declared support for
	fn supported_chains(&self) -> Vec<u64> {
		self.config().supported_chains.clone()
	}
}

/// Cross-chain meta-aggregator composing DEXes and bridges
#[async_trait]
pub trait MetaAggregator: Provider {
	/// Discover candidate routes for a cross-chain request
	async fn get_routes(&self, request: &UniversalSwapRequest) -> ProviderResult<Vec<RouteQuote>>;

	/// Execute a previously quoted route
	async fn execute(&self, route_id: &str, signer: &SignerContext) -> ProviderResult<Vec<String>>;

	/// Poll execution progress for a route
	async fn status(&self, route_id: &str) -> ProviderResult<ExecutionStatus>;

	/// Directional chain support
	fn supported_chains(&self) -> ChainSupport;
}

/// Solana swap router
#[async_trait]
pub trait SolanaRouter: Provider {
	async fn quote(&self, request: &UniversalSwapRequest) -> ProviderResult<RouteQuote>;

	/// Build and, when a keypair is supplied, sign the swap transaction
	async fn build_and_sign(
		&self,
		quote: &RouteQuote,
		keypair: Option<&Secret>,
	) -> ProviderResult<SignedSolanaTx>;

	async fn supports_token_pair(&self, sell_mint: &str, buy_mint: &str) -> ProviderResult<bool>;
}

/// Native-L1 router (THORChain-style deposit + memo settlement)
#[async_trait]
pub trait NativeRouter: Provider {
	async fn quote_btc(&self, request: &UniversalSwapRequest) -> ProviderResult<RouteQuote>;

	/// Track a deposit transaction through the router's settlement
	async fn deposit_and_track(&self, txid: &str, memo: &str) -> ProviderResult<ExecutionStatus>;

	/// Destination chains the router can settle to, as asset-path
	/// identifiers ("BTC.BTC", "ETH.ETH", ...)
	fn supported_destinations(&self) -> Vec<String>;
}

/// Optional EVM extension: adapters that can name their spender contract and
/// serve strategy-specific quotes.
#[async_trait]
pub trait EvmSpenderProvider: OnChainAggregator {
	/// Contract the taker must grant allowance to under `strategy`
	async fn spender_address(
		&self,
		chain_id: u64,
		strategy: ApprovalStrategy,
	) -> ProviderResult<String>;

	/// Quote through the allowance-holder flow
	async fn allowance_holder_quote(&self, request: &SwapRequest) -> ProviderResult<SwapQuote>;

	/// Quote through the gas-less Permit2 flow; the result carries a
	/// typed-data block
	async fn permit2_quote(&self, request: &SwapRequest) -> ProviderResult<SwapQuote>;

	/// Indicative Permit2 price without committing upstream resources
	async fn permit2_price(&self, request: &SwapRequest) -> ProviderResult<SwapQuote>;
}
