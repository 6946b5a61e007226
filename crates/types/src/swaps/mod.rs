//! Swap request models and the closed enum sets that classify them

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod request;

pub use request::{SwapRequest, UniversalSwapRequest};

/// Kind of swap, inferred by the routing classifier or asserted by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum SwapType {
	OnChain,
	CrossChain,
	L1ToL2,
	L2ToL1,
	L2ToL2,
	NativeSwap,
}

impl std::fmt::Display for SwapType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::OnChain => "on-chain",
			Self::CrossChain => "cross-chain",
			Self::L1ToL2 => "l1-to-l2",
			Self::L2ToL1 => "l2-to-l1",
			Self::L2ToL2 => "l2-to-l2",
			Self::NativeSwap => "native-swap",
		};
		write!(f, "{}", name)
	}
}

/// How an EVM swap obtains spend permission for the sell token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStrategy {
	AllowanceHolder,
	Permit2,
}

impl std::fmt::Display for ApprovalStrategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::AllowanceHolder => write!(f, "allowance-holder"),
			Self::Permit2 => write!(f, "permit2"),
		}
	}
}

/// Terminal and in-flight states of a swap execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
	Pending,
	Success,
	Failed,
	Partial,
}

/// Legacy aggregator identifiers kept for callers that predate the
/// name-keyed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregatorType {
	Zerox,
	Odos,
}

impl AggregatorType {
	/// Map a registry provider name onto the legacy identifier.
	///
	/// Unknown names fall back to [`AggregatorType::Zerox`]; the fallback is
	/// logged because it usually means a new adapter was registered without
	/// extending the legacy mapping.
	pub fn from_provider_name(name: &str) -> Self {
		match name {
			"0x" => Self::Zerox,
			"odos" => Self::Odos,
			other => {
				warn!(provider = other, "unexpected provider name in legacy mapping, defaulting to 0x");
				Self::Zerox
			},
		}
	}
}

/// Validation errors for swap requests
#[derive(Error, Debug, PartialEq)]
pub enum SwapValidationError {
	#[error("missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("invalid amount in {field}: {reason}")]
	InvalidAmount { field: String, reason: String },

	#[error("sell and buy token must differ: {token}")]
	IdenticalTokens { token: String },

	#[error("invalid address in {field}: {value}")]
	InvalidAddress { field: String, value: String },

	#[error("invalid slippage: {reason}")]
	InvalidSlippage { reason: String },

	#[error("invalid chain reference in {field}: {reason}")]
	InvalidChain { field: String, reason: String },
}

pub type SwapValidationResult<T> = Result<T, SwapValidationError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn swap_type_wire_names() {
		assert_eq!(serde_json::to_string(&SwapType::OnChain).unwrap(), "\"on-chain\"");
		assert_eq!(serde_json::to_string(&SwapType::L1ToL2).unwrap(), "\"l1-to-l2\"");
		assert_eq!(
			serde_json::to_string(&SwapType::NativeSwap).unwrap(),
			"\"native-swap\""
		);
	}

	#[test]
	fn execution_status_is_uppercase() {
		assert_eq!(
			serde_json::to_string(&ExecutionStatus::Pending).unwrap(),
			"\"PENDING\""
		);
		assert_eq!(
			serde_json::to_string(&ExecutionStatus::Partial).unwrap(),
			"\"PARTIAL\""
		);
	}

	#[test]
	fn legacy_mapping_covers_known_names() {
		assert_eq!(AggregatorType::from_provider_name("0x"), AggregatorType::Zerox);
		assert_eq!(AggregatorType::from_provider_name("odos"), AggregatorType::Odos);
		// unknown names fall back rather than fail
		assert_eq!(
			AggregatorType::from_provider_name("mystery"),
			AggregatorType::Zerox
		);
	}
}
