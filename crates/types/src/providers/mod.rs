//! Provider domain model: categories, configuration, capability traits

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Secret;

pub mod errors;
pub mod traits;

pub use errors::{ProviderError, ProviderResult};
pub use traits::{
	EvmSpenderProvider, MetaAggregator, NativeRouter, OnChainAggregator, Provider, SolanaRouter,
};

/// Category a provider registers under; one registry map per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum ProviderCategory {
	EvmAggregator,
	MetaAggregator,
	SolanaRouter,
	NativeRouter,
}

impl std::fmt::Display for ProviderCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::EvmAggregator => "evm-aggregator",
			Self::MetaAggregator => "meta-aggregator",
			Self::SolanaRouter => "solana-router",
			Self::NativeRouter => "native-router",
		};
		write!(f, "{}", name)
	}
}

/// Runtime configuration every adapter carries.
///
/// Adapters own their HTTP clients and credentials; the config is the only
/// part the rest of the system may inspect.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
	/// Registry name, e.g. "0x", "odos", "lifi"
	pub name: String,
	pub base_url: String,
	pub api_key: Option<Secret>,
	pub timeout_ms: u64,
	/// Chains the adapter has declared support for
	pub supported_chains: Vec<u64>,
	/// Static headers sent with every request
	pub headers: HashMap<String, String>,
}

impl ProviderConfig {
	pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			base_url: base_url.into(),
			api_key: None,
			timeout_ms: crate::constants::limits::QUOTE_TIMEOUT_MS,
			supported_chains: Vec::new(),
			headers: HashMap::new(),
		}
	}

	pub fn with_api_key(mut self, api_key: Option<Secret>) -> Self {
		self.api_key = api_key;
		self
	}

	pub fn with_chains(mut self, chains: &[u64]) -> Self {
		self.supported_chains = chains.to_vec();
		self
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}
}

/// Directional chain support declared by a meta-aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChainSupport {
	pub from: Vec<u64>,
	pub to: Vec<u64>,
}

/// Per-request signing context.
///
/// Holds the caller's signing secret for exactly one request; the secret is
/// zeroized on drop and is never logged or serialized.
#[derive(Debug, Clone)]
pub struct SignerContext {
	secret: Secret,
}

impl SignerContext {
	pub fn new(secret: Secret) -> Self {
		Self { secret }
	}

	pub fn secret(&self) -> &Secret {
		&self.secret
	}
}

/// Signed Solana transaction bundle from a Solana router
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SignedSolanaTx {
	/// Base64-encoded raw transaction
	pub raw_tx: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub txid: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub instructions: Option<serde_json::Value>,
}
