//! Supported-quote cache
//!
//! Remembers chain and token pairs that have historically returned a
//! successful quote. The routing classifier consults it as a fallback
//! chain-support signal before any adapter has declared the chain.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

/// Tokens seen in successful quotes on one chain, lower-cased hex
#[derive(Debug, Default, Clone)]
pub struct ChainTokenSupport {
	pub sell_tokens: HashSet<String>,
	pub buy_tokens: HashSet<String>,
}

/// Append-only cache of `chainId -> {sellTokens, buyTokens}`.
///
/// Grows monotonically during normal operation; `clear` exists for
/// administrative resets only.
#[derive(Debug, Default)]
pub struct SupportedQuoteCache {
	entries: DashMap<u64, ChainTokenSupport>,
}

impl SupportedQuoteCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a successful quote for the pair
	pub fn record(&self, chain_id: u64, sell_token: &str, buy_token: &str) {
		let mut entry = self.entries.entry(chain_id).or_default();
		entry.sell_tokens.insert(sell_token.to_lowercase());
		entry.buy_tokens.insert(buy_token.to_lowercase());
		debug!(chain_id, sell_token, buy_token, "supported-quote cache updated");
	}

	/// Whether any pair on the chain ever quoted successfully
	pub fn has_chain(&self, chain_id: u64) -> bool {
		self.entries.contains_key(&chain_id)
	}

	/// Whether this exact pair quoted successfully before
	pub fn has_pair(&self, chain_id: u64, sell_token: &str, buy_token: &str) -> bool {
		self.entries
			.get(&chain_id)
			.map(|entry| {
				entry.sell_tokens.contains(&sell_token.to_lowercase())
					&& entry.buy_tokens.contains(&buy_token.to_lowercase())
			})
			.unwrap_or(false)
	}

	/// Chains with at least one recorded pair
	pub fn chains(&self) -> Vec<u64> {
		let mut chains: Vec<u64> = self.entries.iter().map(|e| *e.key()).collect();
		chains.sort_unstable();
		chains
	}

	/// Administrative reset
	pub fn clear(&self) {
		self.entries.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn records_lowercase_and_grows_monotonically() {
		let cache = SupportedQuoteCache::new();
		assert!(!cache.has_chain(1));

		cache.record(
			1,
			"0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
			"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
		);

		assert!(cache.has_chain(1));
		assert!(cache.has_pair(
			1,
			"0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
			"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
		));
		assert!(!cache.has_pair(1, "0xdead", "0xbeef"));

		cache.record(137, "0x1111", "0x2222");
		assert_eq!(cache.chains(), vec![1, 137]);
	}

	#[test]
	fn clear_resets_everything() {
		let cache = SupportedQuoteCache::new();
		cache.record(1, "0xaaaa", "0xbbbb");
		cache.clear();
		assert!(!cache.has_chain(1));
		assert!(cache.chains().is_empty());
	}
}
