//! Ecosystem, token-standard and chain-reference models

use serde::{Deserialize, Serialize};

/// Blockchain ecosystems the gateway can route between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
	Evm,
	Solana,
	Cosmos,
	Bitcoin,
	Substrate,
	Near,
	Terra,
	Avalanche,
	Thorchain,
	Maya,
}

impl Ecosystem {
	/// Ecosystems whose swaps settle through a native-L1 router
	/// (THORChain-style deposit + memo) rather than a contract call.
	pub fn is_native_family(&self) -> bool {
		matches!(
			self,
			Self::Bitcoin | Self::Thorchain | Self::Maya | Self::Cosmos
		)
	}

	/// Ecosystems served by EVM aggregators
	pub fn is_evm_compatible(&self) -> bool {
		matches!(self, Self::Evm | Self::Avalanche)
	}

	/// Every ecosystem the gateway knows about
	pub fn all() -> &'static [Ecosystem] {
		&[
			Self::Evm,
			Self::Solana,
			Self::Cosmos,
			Self::Bitcoin,
			Self::Substrate,
			Self::Near,
			Self::Terra,
			Self::Avalanche,
			Self::Thorchain,
			Self::Maya,
		]
	}
}

impl std::fmt::Display for Ecosystem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Evm => "evm",
			Self::Solana => "solana",
			Self::Cosmos => "cosmos",
			Self::Bitcoin => "bitcoin",
			Self::Substrate => "substrate",
			Self::Near => "near",
			Self::Terra => "terra",
			Self::Avalanche => "avalanche",
			Self::Thorchain => "thorchain",
			Self::Maya => "maya",
		};
		write!(f, "{}", name)
	}
}

/// Token standards carried on swap requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum TokenStandard {
	Native,
	Erc20,
	Spl,
	Bep20,
	CosmosNative,
	Rune,
	Cacao,
}

/// One side of a universal swap: the chain, its ecosystem and the token
/// standard in play.
///
/// `chain` is the ecosystem-native identifier: a decimal chain id for EVM
/// chains, a well-known name elsewhere ("solana", "BTC", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChainRef {
	pub chain: String,
	pub ecosystem: Ecosystem,
	pub standard: TokenStandard,
}

impl ChainRef {
	pub fn new(chain: impl Into<String>, ecosystem: Ecosystem, standard: TokenStandard) -> Self {
		Self {
			chain: chain.into(),
			ecosystem,
			standard,
		}
	}

	/// Numeric chain id, when the identifier is one (EVM chains)
	pub fn chain_id(&self) -> Option<u64> {
		self.chain.parse().ok()
	}

	pub fn evm(chain_id: u64) -> Self {
		Self::new(chain_id.to_string(), Ecosystem::Evm, TokenStandard::Erc20)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ecosystem_wire_names_are_lowercase() {
		assert_eq!(serde_json::to_string(&Ecosystem::Evm).unwrap(), "\"evm\"");
		assert_eq!(
			serde_json::to_string(&Ecosystem::Thorchain).unwrap(),
			"\"thorchain\""
		);
		let parsed: Ecosystem = serde_json::from_str("\"bitcoin\"").unwrap();
		assert_eq!(parsed, Ecosystem::Bitcoin);
	}

	#[test]
	fn token_standard_wire_names_are_kebab_case() {
		assert_eq!(
			serde_json::to_string(&TokenStandard::CosmosNative).unwrap(),
			"\"cosmos-native\""
		);
		assert_eq!(
			serde_json::to_string(&TokenStandard::Erc20).unwrap(),
			"\"erc20\""
		);
	}

	#[test]
	fn native_family_membership() {
		assert!(Ecosystem::Bitcoin.is_native_family());
		assert!(Ecosystem::Cosmos.is_native_family());
		assert!(!Ecosystem::Evm.is_native_family());
		assert!(!Ecosystem::Solana.is_native_family());
	}

	#[test]
	fn chain_ref_parses_evm_chain_id() {
		let side = ChainRef::evm(42161);
		assert_eq!(side.chain_id(), Some(42161));

		let btc = ChainRef::new("BTC", Ecosystem::Bitcoin, TokenStandard::Native);
		assert_eq!(btc.chain_id(), None);
	}
}
