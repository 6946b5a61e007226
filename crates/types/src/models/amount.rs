//! Base-unit amount model carried as a decimal string

use alloy::primitives::U256;
use serde;
use thiserror::Error;

use crate::constants::limits::BPS_DENOMINATOR;

/// Errors raised when parsing or operating on an [`Amount`]
#[derive(Error, Debug, PartialEq)]
pub enum AmountError {
	#[error("amount cannot be empty")]
	Empty,

	#[error("amount must contain only digits: {value}")]
	NonNumeric { value: String },

	#[error("amount exceeds 256 bits: {value}")]
	Overflow { value: String },

	#[error("slippage must be below {max} bps, got {bps}")]
	InvalidSlippage { bps: u32, max: u64 },
}

/// Token amount in base units, represented as a base-10 decimal string.
///
/// Amounts routinely exceed 64-bit range, so they cross every boundary as
/// strings and are converted to 256-bit integers for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Amount(pub String);

impl Amount {
	/// Create a new amount from a string
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// Get the raw string value
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Check if the value is zero
	pub fn is_zero(&self) -> bool {
		!self.0.is_empty() && self.0.chars().all(|c| c == '0')
	}

	/// Validate that the string is a non-empty digit sequence
	pub fn validate(&self) -> Result<(), AmountError> {
		if self.0.is_empty() {
			return Err(AmountError::Empty);
		}

		if !self.0.chars().all(|c| c.is_ascii_digit()) {
			return Err(AmountError::NonNumeric {
				value: self.0.clone(),
			});
		}

		Ok(())
	}

	/// Parse into an unbounded 256-bit integer
	pub fn to_u256(&self) -> Result<U256, AmountError> {
		self.validate()?;
		U256::from_str_radix(&self.0, 10).map_err(|_| AmountError::Overflow {
			value: self.0.clone(),
		})
	}

	/// Build from a 256-bit integer
	pub fn from_u256(value: U256) -> Self {
		Self(value.to_string())
	}

	/// Apply a slippage tolerance: `value * (10_000 - bps) / 10_000`.
	///
	/// Integer arithmetic end to end; amounts never round-trip through
	/// floating point.
	pub fn apply_slippage_bps(&self, bps: u32) -> Result<Amount, AmountError> {
		if u64::from(bps) >= BPS_DENOMINATOR {
			return Err(AmountError::InvalidSlippage {
				bps,
				max: BPS_DENOMINATOR,
			});
		}

		let value = self.to_u256()?;
		let kept = U256::from(BPS_DENOMINATOR - u64::from(bps));
		let min_out = value * kept / U256::from(BPS_DENOMINATOR);
		Ok(Amount::from_u256(min_out))
	}
}

impl Default for Amount {
	fn default() -> Self {
		Amount("0".to_string())
	}
}

impl std::fmt::Display for Amount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for Amount {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for Amount {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<u64> for Amount {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

impl From<U256> for Amount {
	fn from(value: U256) -> Self {
		Self::from_u256(value)
	}
}

// Custom Serde implementation to serialize/deserialize as string
impl serde::Serialize for Amount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for Amount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		let amount = Self(value);
		amount.validate().map_err(serde::de::Error::custom)?;
		Ok(amount)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_values_beyond_u64() {
		let amount = Amount::from("340282366920938463463374607431768211456");
		let parsed = amount.to_u256().unwrap();
		assert_eq!(parsed, U256::from(1u8) << 128);
	}

	#[test]
	fn rejects_non_numeric_and_empty() {
		assert_eq!(
			Amount::from("12ab").validate(),
			Err(AmountError::NonNumeric {
				value: "12ab".to_string()
			})
		);
		assert_eq!(Amount::from("").validate(), Err(AmountError::Empty));
	}

	#[test]
	fn zero_detection() {
		assert!(Amount::from("0").is_zero());
		assert!(Amount::from("000").is_zero());
		assert!(!Amount::from("10").is_zero());
		assert!(!Amount::from("").is_zero());
	}

	#[test]
	fn slippage_uses_basis_points() {
		// 1% off 1e18
		let amount = Amount::from("1000000000000000000");
		let min_out = amount.apply_slippage_bps(100).unwrap();
		assert_eq!(min_out.as_str(), "990000000000000000");

		// 0 bps is the identity
		assert_eq!(amount.apply_slippage_bps(0).unwrap(), amount);

		// full-range slippage is rejected
		assert!(amount.apply_slippage_bps(10_000).is_err());
	}

	#[test]
	fn serde_round_trips_as_string() {
		let amount = Amount::from("1000000000000000000");
		let json = serde_json::to_string(&amount).unwrap();
		assert_eq!(json, "\"1000000000000000000\"");

		let back: Amount = serde_json::from_str(&json).unwrap();
		assert_eq!(back, amount);

		assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
		assert!(serde_json::from_str::<Amount>("\"\"").is_err());
	}
}
