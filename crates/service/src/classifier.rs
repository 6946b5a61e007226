//! Routing classifier
//!
//! Decides, from a request's source/destination pair, what kind of swap is
//! being asked for and which provider category must service it.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use omniswap_registry::{ProviderRegistry, SupportedQuoteCache};
use omniswap_types::constants::evm::{EVM_L1_CHAINS, EVM_L2_CHAINS};
use omniswap_types::{Ecosystem, ProviderCategory, SwapType, UniversalSwapRequest};

#[derive(Error, Debug, PartialEq)]
pub enum ClassifyError {
	#[error("unroutable request: {reason}")]
	Unroutable { reason: String },

	#[error("no provider category serves {swap_type} swaps from {ecosystem}")]
	UnsupportedEcosystem {
		swap_type: SwapType,
		ecosystem: Ecosystem,
	},
}

/// Classification preview returned by the analysis endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapAnalysis {
	pub swap_type: SwapType,
	pub category: ProviderCategory,
	pub providers: Vec<String>,
	pub compatible: bool,
	pub warnings: Vec<String>,
}

pub struct RoutingClassifier {
	registry: Arc<ProviderRegistry>,
	supported_cache: Arc<SupportedQuoteCache>,
}

impl RoutingClassifier {
	pub fn new(registry: Arc<ProviderRegistry>, supported_cache: Arc<SupportedQuoteCache>) -> Self {
		Self {
			registry,
			supported_cache,
		}
	}

	/// Infer the swap type.
	///
	/// A caller-asserted `swapType` is accepted only when it matches the
	/// derived result; otherwise the derivation wins and the override is
	/// logged. This keeps the classification idempotent: feeding the result
	/// back as an override never changes the answer.
	pub fn determine_swap_type(
		&self,
		request: &UniversalSwapRequest,
	) -> Result<SwapType, ClassifyError> {
		let derived = Self::derive(request)?;

		if let Some(asserted) = request.swap_type {
			if asserted != derived {
				warn!(
					asserted = %asserted,
					derived = %derived,
					"swapType override inconsistent with route, re-derived"
				);
			}
		}

		Ok(derived)
	}

	fn derive(request: &UniversalSwapRequest) -> Result<SwapType, ClassifyError> {
		let source = &request.source;
		let destination = &request.destination;

		if source.ecosystem == destination.ecosystem {
			if source.chain == destination.chain {
				return Ok(SwapType::OnChain);
			}

			// Same ecosystem, different chains
			if source.ecosystem == Ecosystem::Evm {
				let from = source.chain_id().ok_or_else(|| ClassifyError::Unroutable {
					reason: format!("source chain is not a numeric id: {}", source.chain),
				})?;
				let to = destination
					.chain_id()
					.ok_or_else(|| ClassifyError::Unroutable {
						reason: format!(
							"destination chain is not a numeric id: {}",
							destination.chain
						),
					})?;
				return Ok(Self::evm_layer_route(from, to));
			}

			return Ok(SwapType::CrossChain);
		}

		// Different ecosystems
		if source.ecosystem.is_native_family() || destination.ecosystem.is_native_family() {
			return Ok(SwapType::NativeSwap);
		}

		Ok(SwapType::CrossChain)
	}

	fn evm_layer_route(from: u64, to: u64) -> SwapType {
		let from_l1 = EVM_L1_CHAINS.contains(&from);
		let from_l2 = EVM_L2_CHAINS.contains(&from);
		let to_l1 = EVM_L1_CHAINS.contains(&to);
		let to_l2 = EVM_L2_CHAINS.contains(&to);

		match (from_l1, from_l2, to_l1, to_l2) {
			(true, _, _, true) => SwapType::L1ToL2,
			(_, true, true, _) => SwapType::L2ToL1,
			(_, true, _, true) => SwapType::L2ToL2,
			_ => SwapType::CrossChain,
		}
	}

	/// Map a swap type onto the provider category that services it
	pub fn category_for(
		&self,
		swap_type: SwapType,
		request: &UniversalSwapRequest,
	) -> Result<ProviderCategory, ClassifyError> {
		match swap_type {
			SwapType::OnChain => {
				let ecosystem = request.source.ecosystem;
				if ecosystem.is_evm_compatible() {
					Ok(ProviderCategory::EvmAggregator)
				} else if ecosystem == Ecosystem::Solana {
					Ok(ProviderCategory::SolanaRouter)
				} else {
					Err(ClassifyError::UnsupportedEcosystem {
						swap_type,
						ecosystem,
					})
				}
			},
			SwapType::CrossChain | SwapType::L1ToL2 | SwapType::L2ToL1 | SwapType::L2ToL2 => {
				Ok(ProviderCategory::MetaAggregator)
			},
			SwapType::NativeSwap => Ok(ProviderCategory::NativeRouter),
		}
	}

	/// Chain-compatibility check for one EVM chain.
	///
	/// True when a registered adapter claims the chain, or the
	/// supported-quote cache has any entry for it. An empty registry is the
	/// bootstrap case: the check passes so the first successful quote can
	/// populate the cache.
	pub fn is_chain_supported(&self, chain_id: u64) -> bool {
		if self.registry.is_empty() {
			debug!(chain_id, "registry empty, bootstrap chain-support check passes");
			return true;
		}

		if !self.registry.evm_providers_for_chain(chain_id).is_empty() {
			return true;
		}

		self.supported_cache.has_chain(chain_id)
	}

	/// Whole-request compatibility: both ecosystems known, and each EVM side
	/// on a supported chain.
	pub fn validate_compatibility(&self, request: &UniversalSwapRequest) -> bool {
		for side in [&request.source, &request.destination] {
			if side.ecosystem == Ecosystem::Evm {
				match side.chain_id() {
					Some(chain_id) if self.is_chain_supported(chain_id) => {},
					_ => return false,
				}
			}
		}
		true
	}

	/// Full classification preview for the analysis endpoint
	pub fn analyze(&self, request: &UniversalSwapRequest) -> Result<SwapAnalysis, ClassifyError> {
		let mut warnings = Vec::new();

		let swap_type = self.determine_swap_type(request)?;
		if let Some(asserted) = request.swap_type {
			if asserted != swap_type {
				warnings.push(format!(
					"requested swapType {} is inconsistent with the route, using {}",
					asserted, swap_type
				));
			}
		}

		let category = self.category_for(swap_type, request)?;
		let providers = self.registry.provider_names(category);
		if providers.is_empty() {
			warnings.push(format!("no providers registered for category {}", category));
		}

		Ok(SwapAnalysis {
			swap_type,
			category,
			providers,
			compatible: self.validate_compatibility(request),
			warnings,
		})
	}
}

impl std::fmt::Debug for RoutingClassifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RoutingClassifier").finish()
	}
}
