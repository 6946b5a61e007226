//! Swap request models and validation

use serde::{Deserialize, Serialize};

use super::{ApprovalStrategy, SwapType, SwapValidationError, SwapValidationResult};
use crate::models::{Amount, ChainRef, Ecosystem};

/// Single-chain EVM swap request (legacy form).
///
/// This is the shape every on-chain aggregator adapter consumes; the
/// universal entry point collapses to it when both sides land on the same
/// EVM chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SwapRequest {
	pub chain_id: u64,
	/// Sell-token address, or a native sentinel
	pub sell_token: String,
	/// Buy-token address, or a native sentinel
	pub buy_token: String,
	/// Base-unit sell amount as a decimal string
	pub sell_amount: Amount,
	/// Address the transaction will be broadcast from
	pub taker: String,
	/// Defaults to `taker` when absent
	#[serde(skip_serializing_if = "Option::is_none")]
	pub recipient: Option<String>,
	/// Slippage tolerance in basis points
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slippage_bps: Option<u32>,
	/// Unix deadline in seconds
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deadline: Option<u64>,
	/// Preferred aggregator name, attempted before dynamic selection
	#[serde(skip_serializing_if = "Option::is_none")]
	pub aggregator: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub approval_strategy: Option<ApprovalStrategy>,
}

impl SwapRequest {
	/// Effective recipient: explicit or the taker
	pub fn recipient(&self) -> &str {
		self.recipient.as_deref().unwrap_or(&self.taker)
	}

	/// Lift into the universal form, both sides on this EVM chain
	pub fn to_universal(&self) -> UniversalSwapRequest {
		UniversalSwapRequest {
			source: ChainRef::evm(self.chain_id),
			destination: ChainRef::evm(self.chain_id),
			sell_token: self.sell_token.clone(),
			buy_token: self.buy_token.clone(),
			sell_amount: self.sell_amount.clone(),
			taker: self.taker.clone(),
			recipient: self.recipient.clone(),
			slippage_bps: self.slippage_bps,
			deadline: self.deadline,
			aggregator: self.aggregator.clone(),
			approval_strategy: self.approval_strategy,
			swap_type: None,
		}
	}

	/// Validate the request.
	///
	/// Applied validations:
	/// - sell/buy token present, well-formed hex addresses or native sentinels
	/// - `sellToken != buyToken` (case-insensitive)
	/// - `sellAmount` a positive decimal integer
	/// - slippage below 100%
	pub fn validate(&self) -> SwapValidationResult<()> {
		validate_evm_address("sellToken", &self.sell_token)?;
		validate_evm_address("buyToken", &self.buy_token)?;
		validate_evm_address("taker", &self.taker)?;
		if let Some(recipient) = &self.recipient {
			validate_evm_address("recipient", recipient)?;
		}

		if self.sell_token.eq_ignore_ascii_case(&self.buy_token) {
			return Err(SwapValidationError::IdenticalTokens {
				token: self.sell_token.clone(),
			});
		}

		self.sell_amount
			.validate()
			.map_err(|e| SwapValidationError::InvalidAmount {
				field: "sellAmount".to_string(),
				reason: e.to_string(),
			})?;

		if self.sell_amount.is_zero() {
			return Err(SwapValidationError::InvalidAmount {
				field: "sellAmount".to_string(),
				reason: "amount must be greater than zero".to_string(),
			});
		}

		if let Some(bps) = self.slippage_bps {
			if bps >= 10_000 {
				return Err(SwapValidationError::InvalidSlippage {
					reason: format!("{} bps is a full-range slippage", bps),
				});
			}
		}

		Ok(())
	}
}

/// Gateway entry-point request carrying explicit source and destination
/// chain tuples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UniversalSwapRequest {
	pub source: ChainRef,
	pub destination: ChainRef,
	pub sell_token: String,
	pub buy_token: String,
	pub sell_amount: Amount,
	pub taker: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub recipient: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slippage_bps: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deadline: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub aggregator: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub approval_strategy: Option<ApprovalStrategy>,
	/// Caller-asserted swap type; re-derived when inconsistent
	#[serde(skip_serializing_if = "Option::is_none")]
	pub swap_type: Option<SwapType>,
}

impl UniversalSwapRequest {
	/// Effective recipient: explicit or the taker
	pub fn recipient(&self) -> &str {
		self.recipient.as_deref().unwrap_or(&self.taker)
	}

	/// True when both sides land on the same EVM chain
	pub fn is_same_evm_chain(&self) -> bool {
		self.source.ecosystem.is_evm_compatible()
			&& self.destination.ecosystem == self.source.ecosystem
			&& self.source.chain == self.destination.chain
	}

	/// Collapse to the legacy single-chain form.
	///
	/// Only meaningful when [`is_same_evm_chain`](Self::is_same_evm_chain)
	/// holds; the chain id must parse.
	pub fn to_legacy(&self) -> SwapValidationResult<SwapRequest> {
		let chain_id = self
			.source
			.chain_id()
			.ok_or_else(|| SwapValidationError::InvalidChain {
				field: "source.chain".to_string(),
				reason: format!("not a numeric chain id: {}", self.source.chain),
			})?;

		Ok(SwapRequest {
			chain_id,
			sell_token: self.sell_token.clone(),
			buy_token: self.buy_token.clone(),
			sell_amount: self.sell_amount.clone(),
			taker: self.taker.clone(),
			recipient: self.recipient.clone(),
			slippage_bps: self.slippage_bps,
			deadline: self.deadline,
			aggregator: self.aggregator.clone(),
			approval_strategy: self.approval_strategy,
		})
	}

	/// Validate the request.
	///
	/// Address shape is only enforced for EVM sides; other ecosystems carry
	/// ecosystem-native identifiers the adapters validate themselves.
	pub fn validate(&self) -> SwapValidationResult<()> {
		if self.sell_token.is_empty() {
			return Err(SwapValidationError::MissingRequiredField {
				field: "sellToken".to_string(),
			});
		}
		if self.buy_token.is_empty() {
			return Err(SwapValidationError::MissingRequiredField {
				field: "buyToken".to_string(),
			});
		}
		if self.taker.is_empty() {
			return Err(SwapValidationError::MissingRequiredField {
				field: "taker".to_string(),
			});
		}

		if self.source == self.destination && self.sell_token.eq_ignore_ascii_case(&self.buy_token)
		{
			return Err(SwapValidationError::IdenticalTokens {
				token: self.sell_token.clone(),
			});
		}

		if self.source.ecosystem == Ecosystem::Evm && self.source.chain_id().is_none() {
			return Err(SwapValidationError::InvalidChain {
				field: "source.chain".to_string(),
				reason: format!("not a numeric chain id: {}", self.source.chain),
			});
		}
		if self.destination.ecosystem == Ecosystem::Evm && self.destination.chain_id().is_none() {
			return Err(SwapValidationError::InvalidChain {
				field: "destination.chain".to_string(),
				reason: format!("not a numeric chain id: {}", self.destination.chain),
			});
		}

		if self.source.ecosystem.is_evm_compatible() {
			validate_evm_address("sellToken", &self.sell_token)?;
			validate_evm_address("taker", &self.taker)?;
		}
		if self.destination.ecosystem.is_evm_compatible() {
			validate_evm_address("buyToken", &self.buy_token)?;
		}

		self.sell_amount
			.validate()
			.map_err(|e| SwapValidationError::InvalidAmount {
				field: "sellAmount".to_string(),
				reason: e.to_string(),
			})?;

		if self.sell_amount.is_zero() {
			return Err(SwapValidationError::InvalidAmount {
				field: "sellAmount".to_string(),
				reason: "amount must be greater than zero".to_string(),
			});
		}

		if let Some(bps) = self.slippage_bps {
			if bps >= 10_000 {
				return Err(SwapValidationError::InvalidSlippage {
					reason: format!("{} bps is a full-range slippage", bps),
				});
			}
		}

		Ok(())
	}
}

fn validate_evm_address(field: &str, value: &str) -> SwapValidationResult<()> {
	let hex = value.strip_prefix("0x").unwrap_or("");
	if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(SwapValidationError::InvalidAddress {
			field: field.to_string(),
			value: value.to_string(),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::TokenStandard;

	fn weth_usdc_request() -> SwapRequest {
		SwapRequest {
			chain_id: 1,
			sell_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
			buy_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			sell_amount: Amount::from("100000000000000"),
			taker: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
			recipient: None,
			slippage_bps: Some(100),
			deadline: None,
			aggregator: None,
			approval_strategy: None,
		}
	}

	#[test]
	fn valid_request_passes() {
		assert!(weth_usdc_request().validate().is_ok());
	}

	#[test]
	fn recipient_defaults_to_taker() {
		let request = weth_usdc_request();
		assert_eq!(request.recipient(), request.taker);

		let mut with_recipient = weth_usdc_request();
		with_recipient.recipient = Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string());
		assert_eq!(
			with_recipient.recipient(),
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
		);
	}

	#[test]
	fn identical_tokens_rejected() {
		let mut request = weth_usdc_request();
		request.buy_token = request.sell_token.to_lowercase();
		assert!(matches!(
			request.validate(),
			Err(SwapValidationError::IdenticalTokens { .. })
		));
	}

	#[test]
	fn zero_amount_rejected() {
		let mut request = weth_usdc_request();
		request.sell_amount = Amount::from("0");
		assert!(matches!(
			request.validate(),
			Err(SwapValidationError::InvalidAmount { .. })
		));
	}

	#[test]
	fn malformed_address_rejected() {
		let mut request = weth_usdc_request();
		request.taker = "not-an-address".to_string();
		assert!(matches!(
			request.validate(),
			Err(SwapValidationError::InvalidAddress { .. })
		));
	}

	#[test]
	fn universal_collapses_to_legacy_on_same_evm_chain() {
		let request = UniversalSwapRequest {
			source: ChainRef::evm(1),
			destination: ChainRef::evm(1),
			sell_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
			buy_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			sell_amount: Amount::from("100000000000000"),
			taker: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
			recipient: None,
			slippage_bps: None,
			deadline: None,
			aggregator: None,
			approval_strategy: None,
			swap_type: None,
		};

		assert!(request.is_same_evm_chain());
		let legacy = request.to_legacy().unwrap();
		assert_eq!(legacy.chain_id, 1);
		assert_eq!(legacy.sell_token, request.sell_token);
	}

	#[test]
	fn universal_rejects_non_numeric_evm_chain() {
		let request = UniversalSwapRequest {
			source: ChainRef::new("mainnet", Ecosystem::Evm, TokenStandard::Erc20),
			destination: ChainRef::evm(1),
			sell_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
			buy_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			sell_amount: Amount::from("1"),
			taker: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
			recipient: None,
			slippage_bps: None,
			deadline: None,
			aggregator: None,
			approval_strategy: None,
			swap_type: None,
		};

		assert!(matches!(
			request.validate(),
			Err(SwapValidationError::InvalidChain { .. })
		));
	}
}
