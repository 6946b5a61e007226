//! Quote models returned by provider adapters

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{Amount, AmountError};

/// Validation errors for quotes
#[derive(Error, Debug)]
pub enum QuoteValidationError {
	#[error("minBuyAmount {min} exceeds buyAmount {buy}")]
	MinAboveBuy { min: String, buy: String },

	#[error("invalid amount in {field}: {source}")]
	InvalidAmount { field: String, source: AmountError },

	#[error("route confidence {confidence} outside [0.1, 1.0]")]
	ConfidenceOutOfRange { confidence: f64 },

	#[error("route has no steps")]
	EmptyRoute,
}

/// EIP-712 typed-data bundle attached to a Permit2-capable quote.
///
/// `types` and `domain` are opaque to the gateway; they are forwarded to the
/// signer exactly as the aggregator produced them. Some upstreams include an
/// `EIP712Domain` entry inside `types`; the signer tolerates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TypedDataBundle {
	pub types: Value,
	pub domain: Value,
	pub message: Value,
	pub primary_type: String,
}

/// Permit2 block a quote may carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Permit2Data {
	#[serde(rename = "type")]
	pub kind: String,
	pub hash: String,
	pub eip712: TypedDataBundle,
}

/// Executable single-chain quote from an on-chain aggregator.
///
/// `data`/`value` form the transaction payload the aggregator expects to be
/// broadcast from `taker`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
	pub sell_token: String,
	pub buy_token: String,
	pub sell_amount: Amount,
	pub buy_amount: Amount,
	pub min_buy_amount: Amount,
	pub to: String,
	pub data: String,
	pub value: Amount,
	pub gas: Amount,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_fee_per_gas: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_priority_fee_per_gas: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub allowance_target: Option<String>,
	/// Registry name of the adapter that produced the quote
	pub aggregator: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_impact: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_gas: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub permit2: Option<Permit2Data>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub approval_strategy: Option<crate::swaps::ApprovalStrategy>,
}

impl SwapQuote {
	/// Enforce `minBuyAmount <= buyAmount` in 256-bit integer arithmetic
	pub fn validate(&self) -> Result<(), QuoteValidationError> {
		let buy = self
			.buy_amount
			.to_u256()
			.map_err(|source| QuoteValidationError::InvalidAmount {
				field: "buyAmount".to_string(),
				source,
			})?;
		let min = self
			.min_buy_amount
			.to_u256()
			.map_err(|source| QuoteValidationError::InvalidAmount {
				field: "minBuyAmount".to_string(),
				source,
			})?;

		if min > buy {
			return Err(QuoteValidationError::MinAboveBuy {
				min: self.min_buy_amount.to_string(),
				buy: self.buy_amount.to_string(),
			});
		}

		Ok(())
	}

	/// True when the adapter attached a Permit2 typed-data block
	pub fn has_permit2(&self) -> bool {
		self.permit2.is_some()
	}
}

/// Kind of a route step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
	Swap,
	Bridge,
	Native,
}

/// One hop of a cross-chain route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
	pub kind: StepKind,
	pub chain_id: u64,
	/// Provider-specific step payload, passed through untouched
	pub details: Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub protocol: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_time: Option<u64>,
}

/// Fee breakdown of a route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RouteFees {
	pub gas: Amount,
	pub provider: Amount,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bridge: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app: Option<Amount>,
}

/// Multi-step route from a meta-aggregator or native router
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RouteQuote {
	pub steps: Vec<RouteStep>,
	pub total_estimated_out: Amount,
	pub fees: RouteFees,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub eta_seconds: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub route_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_impact: Option<f64>,
	/// Provider confidence in the route, clamped to [0.1, 1.0]
	pub confidence: f64,
}

impl RouteQuote {
	pub fn validate(&self) -> Result<(), QuoteValidationError> {
		if self.steps.is_empty() {
			return Err(QuoteValidationError::EmptyRoute);
		}
		if !(0.1..=1.0).contains(&self.confidence) {
			return Err(QuoteValidationError::ConfidenceOutOfRange {
				confidence: self.confidence,
			});
		}
		Ok(())
	}
}

/// Tagged quote shape: single-chain aggregator quotes and multi-step routes
/// flow through the same orchestration paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuoteResult {
	Legacy(SwapQuote),
	Route(RouteQuote),
}

impl QuoteResult {
	/// Adapt a legacy quote into the route shape for mixed responses
	pub fn as_route(&self) -> Option<&RouteQuote> {
		match self {
			Self::Route(route) => Some(route),
			Self::Legacy(_) => None,
		}
	}

	pub fn aggregator(&self) -> Option<&str> {
		match self {
			Self::Legacy(quote) => Some(&quote.aggregator),
			Self::Route(_) => None,
		}
	}
}

/// Bare transaction payload an adapter asks the wallet to broadcast
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
	pub to: String,
	pub data: String,
	pub value: Amount,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_limit: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_fee_per_gas: Option<Amount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_priority_fee_per_gas: Option<Amount>,
}

impl From<&SwapQuote> for TransactionData {
	fn from(quote: &SwapQuote) -> Self {
		Self {
			to: quote.to.clone(),
			data: quote.data.clone(),
			value: quote.value.clone(),
			gas_limit: Some(quote.gas.clone()),
			gas_price: quote.gas_price.clone(),
			max_fee_per_gas: quote.max_fee_per_gas.clone(),
			max_priority_fee_per_gas: quote.max_priority_fee_per_gas.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	pub fn sample_quote(aggregator: &str, buy_amount: &str) -> SwapQuote {
		SwapQuote {
			sell_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
			buy_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			sell_amount: Amount::from("100000000000000"),
			buy_amount: Amount::from(buy_amount),
			min_buy_amount: Amount::from(buy_amount),
			to: "0x0000000000001fF3684f28c67538d4D072C22734".to_string(),
			data: "0xabcd".to_string(),
			value: Amount::from("0"),
			gas: Amount::from("210000"),
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
			allowance_target: None,
			aggregator: aggregator.to_string(),
			price_impact: None,
			estimated_gas: None,
			permit2: None,
			approval_strategy: None,
		}
	}

	#[test]
	fn min_above_buy_is_rejected() {
		let mut quote = sample_quote("0x", "1000");
		quote.min_buy_amount = Amount::from("1001");
		assert!(matches!(
			quote.validate(),
			Err(QuoteValidationError::MinAboveBuy { .. })
		));

		quote.min_buy_amount = Amount::from("1000");
		assert!(quote.validate().is_ok());
	}

	#[test]
	fn route_confidence_bounds() {
		let mut route = RouteQuote {
			steps: vec![RouteStep {
				kind: StepKind::Bridge,
				chain_id: 1,
				details: json!({}),
				protocol: None,
				estimated_time: None,
			}],
			total_estimated_out: Amount::from("1"),
			fees: RouteFees::default(),
			eta_seconds: None,
			route_id: None,
			price_impact: None,
			confidence: 0.8,
		};
		assert!(route.validate().is_ok());

		route.confidence = 0.05;
		assert!(route.validate().is_err());

		route.confidence = 1.0;
		route.steps.clear();
		assert!(matches!(
			route.validate(),
			Err(QuoteValidationError::EmptyRoute)
		));
	}

	#[test]
	fn permit2_block_round_trips() {
		let json_block = json!({
			"type": "Permit2",
			"hash": "0x1234",
			"eip712": {
				"types": {"PermitTransferFrom": []},
				"domain": {"name": "Permit2", "chainId": 1},
				"message": {"spender": "0x0"},
				"primaryType": "PermitTransferFrom"
			}
		});

		let permit2: Permit2Data = serde_json::from_value(json_block.clone()).unwrap();
		assert_eq!(permit2.kind, "Permit2");
		assert_eq!(permit2.eip712.primary_type, "PermitTransferFrom");

		let back = serde_json::to_value(&permit2).unwrap();
		assert_eq!(back["type"], "Permit2");
		assert_eq!(back["eip712"]["primaryType"], "PermitTransferFrom");
	}
}
