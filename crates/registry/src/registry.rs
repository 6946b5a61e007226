//! Provider registry with self-registration
//!
//! Adapters register themselves at startup through their `init` entry
//! points; the registry has no central knowledge of which adapters exist.
//! Maps are written only during the registration window and read-only once
//! the host signals completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use omniswap_types::{
	AggregatorType, EvmSpenderProvider, MetaAggregator, NativeRouter, OnChainAggregator,
	ProviderCategory, SolanaRouter,
};

#[derive(Error, Debug)]
pub enum RegistryError {
	#[error("no provider named {name} in category {category}")]
	NotFound {
		category: ProviderCategory,
		name: String,
	},

	#[error("no providers registered in category {category}")]
	EmptyCategory { category: ProviderCategory },
}

/// Name-keyed provider maps, one per category.
///
/// Duplicate registration of a name within a category is ignored with a
/// warning, so adapter `init` functions are idempotent.
#[derive(Default)]
pub struct ProviderRegistry {
	evm: DashMap<String, Arc<dyn OnChainAggregator>>,
	meta: DashMap<String, Arc<dyn MetaAggregator>>,
	solana: DashMap<String, Arc<dyn SolanaRouter>>,
	native: DashMap<String, Arc<dyn NativeRouter>>,
	/// EVM adapters that additionally expose the spender capability
	spenders: DashMap<String, Arc<dyn EvmSpenderProvider>>,
	/// Legacy map for callers that still address adapters by enum
	legacy: DashMap<AggregatorType, Arc<dyn OnChainAggregator>>,
	registration_complete: AtomicBool,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register an EVM aggregator. `"0x"` and `"odos"` are additionally
	/// mirrored into the legacy [`AggregatorType`] map.
	pub fn register_evm(&self, provider: Arc<dyn OnChainAggregator>) {
		let name = provider.name().to_string();
		if self.evm.contains_key(&name) {
			warn!(
				provider = %name,
				category = %ProviderCategory::EvmAggregator,
				"duplicate registration ignored"
			);
			return;
		}

		match name.as_str() {
			"0x" => {
				self.legacy.insert(AggregatorType::Zerox, Arc::clone(&provider));
			},
			"odos" => {
				self.legacy.insert(AggregatorType::Odos, Arc::clone(&provider));
			},
			_ => {},
		}

		self.announce(&name, ProviderCategory::EvmAggregator);
		self.evm.insert(name, provider);
	}

	/// Register the spender capability for an EVM adapter. Typically called
	/// right after [`register_evm`](Self::register_evm) with the same
	/// instance.
	pub fn register_evm_spender(&self, provider: Arc<dyn EvmSpenderProvider>) {
		let name = provider.name().to_string();
		if self.spenders.contains_key(&name) {
			warn!(provider = %name, "duplicate spender capability ignored");
			return;
		}
		self.spenders.insert(name, provider);
	}

	pub fn register_meta(&self, provider: Arc<dyn MetaAggregator>) {
		let name = provider.name().to_string();
		if self.meta.contains_key(&name) {
			warn!(
				provider = %name,
				category = %ProviderCategory::MetaAggregator,
				"duplicate registration ignored"
			);
			return;
		}
		self.announce(&name, ProviderCategory::MetaAggregator);
		self.meta.insert(name, provider);
	}

	pub fn register_solana(&self, provider: Arc<dyn SolanaRouter>) {
		let name = provider.name().to_string();
		if self.solana.contains_key(&name) {
			warn!(
				provider = %name,
				category = %ProviderCategory::SolanaRouter,
				"duplicate registration ignored"
			);
			return;
		}
		self.announce(&name, ProviderCategory::SolanaRouter);
		self.solana.insert(name, provider);
	}

	pub fn register_native(&self, provider: Arc<dyn NativeRouter>) {
		let name = provider.name().to_string();
		if self.native.contains_key(&name) {
			warn!(
				provider = %name,
				category = %ProviderCategory::NativeRouter,
				"duplicate registration ignored"
			);
			return;
		}
		self.announce(&name, ProviderCategory::NativeRouter);
		self.native.insert(name, provider);
	}

	/// Transitioned exactly once by the host when every adapter had its
	/// chance to register. Later registrations remain valid but are no
	/// longer announced at info level.
	pub fn on_registration_complete(&self) {
		if self.registration_complete.swap(true, Ordering::SeqCst) {
			warn!("registration completion signalled twice");
			return;
		}

		info!(
			evm = self.evm.len(),
			meta = self.meta.len(),
			solana = self.solana.len(),
			native = self.native.len(),
			"provider registration complete"
		);
	}

	pub fn is_registration_complete(&self) -> bool {
		self.registration_complete.load(Ordering::SeqCst)
	}

	/// True when no provider of any category has registered
	pub fn is_empty(&self) -> bool {
		self.evm.is_empty() && self.meta.is_empty() && self.solana.is_empty() && self.native.is_empty()
	}

	pub fn evm_provider(&self, name: &str) -> Option<Arc<dyn OnChainAggregator>> {
		self.evm.get(name).map(|entry| Arc::clone(entry.value()))
	}

	/// Legacy enum-addressed lookup
	pub fn legacy_provider(&self, kind: AggregatorType) -> Option<Arc<dyn OnChainAggregator>> {
		self.legacy.get(&kind).map(|entry| Arc::clone(entry.value()))
	}

	pub fn spender_provider(&self, name: &str) -> Option<Arc<dyn EvmSpenderProvider>> {
		self.spenders.get(name).map(|entry| Arc::clone(entry.value()))
	}

	/// Any registered spender-capable adapter, preferring "0x"
	pub fn any_spender_provider(&self) -> Option<Arc<dyn EvmSpenderProvider>> {
		self.spender_provider("0x").or_else(|| {
			self.spenders
				.iter()
				.next()
				.map(|entry| Arc::clone(entry.value()))
		})
	}

	pub fn evm_providers(&self) -> Vec<Arc<dyn OnChainAggregator>> {
		self.evm.iter().map(|entry| Arc::clone(entry.value())).collect()
	}

	pub fn meta_providers(&self) -> Vec<Arc<dyn MetaAggregator>> {
		self.meta.iter().map(|entry| Arc::clone(entry.value())).collect()
	}

	pub fn solana_providers(&self) -> Vec<Arc<dyn SolanaRouter>> {
		self.solana.iter().map(|entry| Arc::clone(entry.value())).collect()
	}

	pub fn native_providers(&self) -> Vec<Arc<dyn NativeRouter>> {
		self.native.iter().map(|entry| Arc::clone(entry.value())).collect()
	}

	/// Names registered under a category
	pub fn provider_names(&self, category: ProviderCategory) -> Vec<String> {
		match category {
			ProviderCategory::EvmAggregator => self.evm.iter().map(|e| e.key().clone()).collect(),
			ProviderCategory::MetaAggregator => self.meta.iter().map(|e| e.key().clone()).collect(),
			ProviderCategory::SolanaRouter => self.solana.iter().map(|e| e.key().clone()).collect(),
			ProviderCategory::NativeRouter => self.native.iter().map(|e| e.key().clone()).collect(),
		}
	}

	/// EVM providers claiming support for `chain_id`.
	///
	/// Every returned provider satisfies `supports_chain(chain_id)`.
	pub fn evm_providers_for_chain(&self, chain_id: u64) -> Vec<Arc<dyn OnChainAggregator>> {
		self.evm
			.iter()
			.filter(|entry| entry.value().supports_chain(chain_id))
			.map(|entry| Arc::clone(entry.value()))
			.collect()
	}

	/// Union of chains declared by all EVM providers, sorted and deduplicated
	pub fn evm_supported_chains(&self) -> Vec<u64> {
		let mut chains: Vec<u64> = self
			.evm
			.iter()
			.flat_map(|entry| entry.value().supported_chains())
			.collect();
		chains.sort_unstable();
		chains.dedup();
		chains
	}

	fn announce(&self, name: &str, category: ProviderCategory) {
		if self.is_registration_complete() {
			debug!(provider = name, category = %category, "late registration");
		} else {
			info!(provider = name, category = %category, "provider registered");
		}
	}
}

impl std::fmt::Debug for ProviderRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderRegistry")
			.field("evm", &self.evm.len())
			.field("meta", &self.meta.len())
			.field("solana", &self.solana.len())
			.field("native", &self.native.len())
			.field("registration_complete", &self.is_registration_complete())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use omniswap_types::{
		Provider, ProviderConfig, ProviderHealth, ProviderResult, SwapQuote, SwapRequest,
		TransactionData,
	};

	#[derive(Debug)]
	struct StubAggregator {
		config: ProviderConfig,
	}

	impl StubAggregator {
		fn new(name: &str, chains: &[u64]) -> Arc<Self> {
			Arc::new(Self {
				config: ProviderConfig::new(name, "https://stub.invalid").with_chains(chains),
			})
		}
	}

	#[async_trait]
	impl Provider for StubAggregator {
		fn name(&self) -> &str {
			&self.config.name
		}

		fn config(&self) -> &ProviderConfig {
			&self.config
		}

		async fn health(&self) -> ProviderResult<ProviderHealth> {
			Ok(ProviderHealth::healthy(self.name(), 1))
		}
	}

	#[async_trait]
	impl OnChainAggregator for StubAggregator {
		async fn get_quote(&self, _request: &SwapRequest, _strict: bool) -> ProviderResult<SwapQuote> {
			unimplemented!("not exercised by registry tests")
		}

		async fn build_transaction(
			&self,
			_request: &SwapRequest,
		) -> ProviderResult<TransactionData> {
			unimplemented!("not exercised by registry tests")
		}
	}

	#[test]
	fn duplicate_registration_is_ignored() {
		let registry = ProviderRegistry::new();
		registry.register_evm(StubAggregator::new("0x", &[1]));
		registry.register_evm(StubAggregator::new("0x", &[1, 137]));

		let names = registry.provider_names(ProviderCategory::EvmAggregator);
		assert_eq!(names, vec!["0x".to_string()]);
		// the first registration wins
		assert_eq!(
			registry.evm_provider("0x").unwrap().supported_chains(),
			vec![1]
		);
	}

	#[test]
	fn known_names_are_mirrored_into_legacy_map() {
		let registry = ProviderRegistry::new();
		registry.register_evm(StubAggregator::new("0x", &[1]));
		registry.register_evm(StubAggregator::new("odos", &[137]));
		registry.register_evm(StubAggregator::new("kyber", &[1]));

		assert!(registry.legacy_provider(AggregatorType::Zerox).is_some());
		assert!(registry.legacy_provider(AggregatorType::Odos).is_some());
	}

	#[test]
	fn chain_filter_only_returns_supporting_providers() {
		let registry = ProviderRegistry::new();
		registry.register_evm(StubAggregator::new("0x", &[1, 137]));
		registry.register_evm(StubAggregator::new("odos", &[137]));

		let on_mainnet = registry.evm_providers_for_chain(1);
		assert_eq!(on_mainnet.len(), 1);
		assert!(on_mainnet.iter().all(|p| p.supports_chain(1)));

		assert_eq!(registry.evm_supported_chains(), vec![1, 137]);
	}

	#[test]
	fn completion_latch_transitions_once() {
		let registry = ProviderRegistry::new();
		assert!(!registry.is_registration_complete());
		registry.on_registration_complete();
		assert!(registry.is_registration_complete());
		// second call warns but does not panic or reset
		registry.on_registration_complete();
		assert!(registry.is_registration_complete());
	}
}
