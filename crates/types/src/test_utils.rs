//! Test utilities for creating common test objects
//!
//! Builder helpers for fixture instances used by unit and e2e tests across
//! the workspace.

use crate::models::{Amount, ChainRef};
use crate::quotes::SwapQuote;
use crate::swaps::{SwapRequest, UniversalSwapRequest};

/// Mainnet WETH
pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
/// Mainnet USDC
pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
/// Well-known test account
pub const TAKER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Executable WETH -> USDC quote with matched buy/min amounts
pub fn sample_quote(aggregator: &str, buy_amount: &str) -> SwapQuote {
	SwapQuote {
		sell_token: WETH.to_string(),
		buy_token: USDC.to_string(),
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

/// WETH -> USDC request on the given chain
pub fn sample_request(chain_id: u64) -> SwapRequest {
	SwapRequest {
		chain_id,
		sell_token: WETH.to_string(),
		buy_token: USDC.to_string(),
		sell_amount: Amount::from("100000000000000"),
		taker: TAKER.to_string(),
		recipient: None,
		slippage_bps: Some(100),
		deadline: None,
		aggregator: None,
		approval_strategy: None,
	}
}

/// Universal request between two chain references
pub fn sample_universal_request(
	source: ChainRef,
	destination: ChainRef,
) -> UniversalSwapRequest {
	UniversalSwapRequest {
		source,
		destination,
		sell_token: WETH.to_string(),
		buy_token: USDC.to_string(),
		sell_amount: Amount::from("100000000000000"),
		taker: TAKER.to_string(),
		recipient: None,
		slippage_bps: Some(100),
		deadline: None,
		aggregator: None,
		approval_strategy: None,
		swap_type: None,
	}
}
