//! EVM chain tables: Permit2 deployment, native-token sentinels, L1/L2 sets

/// Canonical Permit2 contract, deployed at the same address on every
/// supported chain.
pub const PERMIT2_ADDRESS: &str = "0x000000000022D473030F116dDEE9F6B43aC78BA3";

/// Chains with a live Permit2 deployment
pub const PERMIT2_CHAINS: [u64; 7] = [1, 10, 56, 137, 42161, 8453, 43114];

/// Zero-address sentinel for the chain's gas token
pub const NATIVE_TOKEN_ZERO: &str = "0x0000000000000000000000000000000000000000";

/// 0xeee... sentinel for the chain's gas token
pub const NATIVE_TOKEN_EEE: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// EVM chains treated as L1 for layer classification
pub const EVM_L1_CHAINS: [u64; 3] = [1, 56, 137];

/// EVM chains treated as L2 for layer classification
pub const EVM_L2_CHAINS: [u64; 4] = [10, 42161, 8453, 324];

/// 0x AllowanceHolder deployment for chains on the Cancun hardfork
pub const ALLOWANCE_HOLDER_CANCUN: &str = "0x0000000000001fF3684f28c67538d4D072C22734";

/// 0x AllowanceHolder deployment for chains on the Shanghai hardfork
pub const ALLOWANCE_HOLDER_SHANGHAI: &str = "0x0000000000005E88410CcDFaDe4a5EfaE4b49562";

/// 0x AllowanceHolder deployment for chains on the London hardfork
pub const ALLOWANCE_HOLDER_LONDON: &str = "0x000000000000175a8b9bC6d539B3708EEd92EA6c";

/// Chains served by the Cancun AllowanceHolder deployment
pub const CANCUN_CHAINS: [u64; 7] = [1, 10, 56, 137, 8453, 42161, 43114];

/// Chains served by the Shanghai AllowanceHolder deployment
pub const SHANGHAI_CHAINS: [u64; 2] = [324, 534352];

/// Chains served by the London AllowanceHolder deployment
pub const LONDON_CHAINS: [u64; 1] = [59144];

/// True when `token` is one of the native-token sentinels, compared
/// case-insensitively.
pub fn is_native_token(token: &str) -> bool {
	token.eq_ignore_ascii_case(NATIVE_TOKEN_ZERO) || token.eq_ignore_ascii_case(NATIVE_TOKEN_EEE)
}

/// True when `chain_id` has a live Permit2 deployment
pub fn is_permit2_chain(chain_id: u64) -> bool {
	PERMIT2_CHAINS.contains(&chain_id)
}

/// Hard-coded AllowanceHolder fallback keyed by hardfork family.
///
/// Used only when the dynamic spender probe fails; chains outside the three
/// groups have no known deployment.
pub fn allowance_holder_fallback(chain_id: u64) -> Option<&'static str> {
	if CANCUN_CHAINS.contains(&chain_id) {
		Some(ALLOWANCE_HOLDER_CANCUN)
	} else if SHANGHAI_CHAINS.contains(&chain_id) {
		Some(ALLOWANCE_HOLDER_SHANGHAI)
	} else if LONDON_CHAINS.contains(&chain_id) {
		Some(ALLOWANCE_HOLDER_LONDON)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn native_sentinels_match_case_insensitively() {
		assert!(is_native_token("0x0000000000000000000000000000000000000000"));
		assert!(is_native_token("0xEEeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"));
		assert!(is_native_token("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"));
		assert!(!is_native_token("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
	}

	#[test]
	fn permit2_chain_table() {
		assert!(is_permit2_chain(1));
		assert!(is_permit2_chain(8453));
		assert!(!is_permit2_chain(324));
	}

	#[test]
	fn allowance_holder_groups() {
		assert_eq!(allowance_holder_fallback(1), Some(ALLOWANCE_HOLDER_CANCUN));
		assert_eq!(allowance_holder_fallback(324), Some(ALLOWANCE_HOLDER_SHANGHAI));
		assert_eq!(allowance_holder_fallback(59144), Some(ALLOWANCE_HOLDER_LONDON));
		assert_eq!(allowance_holder_fallback(7777), None);
	}
}
