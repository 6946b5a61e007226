//! EVM chain access
//!
//! Thin RPC layer the approval workflow, pre-check and execution coordinator
//! read and write chains through. The [`EvmChain`] trait exists so those
//! services can be unit-tested without an RPC endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use omniswap_config::RpcSettings;
use omniswap_types::constants::evm::PERMIT2_ADDRESS;
use omniswap_types::constants::limits::CONFIRMATION_TIMEOUT_SECONDS;
use omniswap_types::{Secret, TransactionData};

sol! {
	#[sol(rpc)]
	interface IERC20 {
		function allowance(address owner, address spender) external view returns (uint256);
		function balanceOf(address account) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
		event Transfer(address indexed from, address indexed to, uint256 value);
	}

	#[sol(rpc)]
	interface IPermit2 {
		function allowance(address user, address token, address spender)
			external
			view
			returns (uint160 amount, uint48 expiration, uint48 nonce);
	}
}

#[derive(Error, Debug)]
pub enum EvmChainError {
	#[error("no RPC endpoint configured for chain {chain_id}")]
	NoRpcEndpoint { chain_id: u64 },

	#[error("invalid address: {value}")]
	InvalidAddress { value: String },

	#[error("invalid calldata: {reason}")]
	InvalidCalldata { reason: String },

	#[error("invalid signing secret")]
	InvalidSigner,

	#[error("RPC error on chain {chain_id}: {reason}")]
	Rpc { chain_id: u64, reason: String },

	#[error("transaction {tx_hash} not confirmed within {seconds}s")]
	ConfirmationTimeout { tx_hash: String, seconds: u64 },
}

/// Permit2 contract allowance record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit2Allowance {
	pub amount: U256,
	/// Unix expiry in seconds
	pub expiration: u64,
	pub nonce: u64,
}

/// ERC-20 Transfer observed in a receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
	pub token: Address,
	pub from: Address,
	pub to: Address,
	pub amount: U256,
}

/// Parsed transaction receipt
#[derive(Debug, Clone)]
pub struct EvmReceipt {
	pub tx_hash: String,
	pub success: bool,
	pub block_number: Option<u64>,
	pub transfers: Vec<TokenTransfer>,
}

/// Chain read/write operations the services depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvmChain: Send + Sync {
	fn chain_id(&self) -> u64;

	async fn erc20_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, EvmChainError>;

	async fn permit2_allowance(
		&self,
		owner: Address,
		token: Address,
		spender: Address,
	) -> Result<Permit2Allowance, EvmChainError>;

	async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, EvmChainError>;

	async fn native_balance(&self, owner: Address) -> Result<U256, EvmChainError>;

	/// Sign and broadcast; returns the transaction hash without waiting for
	/// inclusion.
	async fn submit_transaction(
		&self,
		secret: &Secret,
		tx: &TransactionData,
	) -> Result<String, EvmChainError>;

	/// Single receipt lookup; `None` while the transaction is pending
	async fn receipt(&self, tx_hash: &str) -> Result<Option<EvmReceipt>, EvmChainError>;

	/// Poll until the transaction is mined, bounded by the confirmation
	/// ceiling.
	async fn wait_for_receipt(&self, tx_hash: &str) -> Result<EvmReceipt, EvmChainError>;
}

/// Parse a hex address, accepting either checksum or lowercase form
pub fn parse_address(value: &str) -> Result<Address, EvmChainError> {
	value.parse().map_err(|_| EvmChainError::InvalidAddress {
		value: value.to_string(),
	})
}

/// Live RPC-backed chain client
pub struct RpcEvmChain {
	chain_id: u64,
	rpc_url: String,
	provider: DynProvider,
	permit2: Address,
}

impl RpcEvmChain {
	pub fn new(chain_id: u64, rpc_url: &str) -> Result<Self, EvmChainError> {
		let url = rpc_url.parse().map_err(|_| EvmChainError::Rpc {
			chain_id,
			reason: format!("invalid RPC URL: {}", rpc_url),
		})?;
		let provider = ProviderBuilder::new().connect_http(url).erased();

		Ok(Self {
			chain_id,
			rpc_url: rpc_url.to_string(),
			provider,
			permit2: PERMIT2_ADDRESS.parse().expect("constant address"),
		})
	}

	fn rpc_error(&self, err: impl std::fmt::Display) -> EvmChainError {
		EvmChainError::Rpc {
			chain_id: self.chain_id,
			reason: err.to_string(),
		}
	}

	fn extract_transfers(logs: &[alloy::rpc::types::Log]) -> Vec<TokenTransfer> {
		logs.iter()
			.filter_map(|log| {
				let topics = log.inner.data.topics();
				if topics.len() != 3 || topics[0] != IERC20::Transfer::SIGNATURE_HASH {
					return None;
				}
				Some(TokenTransfer {
					token: log.inner.address,
					from: Address::from_word(topics[1]),
					to: Address::from_word(topics[2]),
					amount: U256::from_be_slice(log.inner.data.data.as_ref()),
				})
			})
			.collect()
	}
}

#[async_trait]
impl EvmChain for RpcEvmChain {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	async fn erc20_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, EvmChainError> {
		let erc20 = IERC20::new(token, self.provider.clone());
		erc20
			.allowance(owner, spender)
			.call()
			.await
			.map_err(|e| self.rpc_error(e))
	}

	async fn permit2_allowance(
		&self,
		owner: Address,
		token: Address,
		spender: Address,
	) -> Result<Permit2Allowance, EvmChainError> {
		let permit2 = IPermit2::new(self.permit2, self.provider.clone());
		let result = permit2
			.allowance(owner, token, spender)
			.call()
			.await
			.map_err(|e| self.rpc_error(e))?;

		Ok(Permit2Allowance {
			amount: result.amount.to::<U256>(),
			expiration: result.expiration.to::<u64>(),
			nonce: result.nonce.to::<u64>(),
		})
	}

	async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, EvmChainError> {
		let erc20 = IERC20::new(token, self.provider.clone());
		erc20.balanceOf(owner).call().await.map_err(|e| self.rpc_error(e))
	}

	async fn native_balance(&self, owner: Address) -> Result<U256, EvmChainError> {
		self.provider
			.get_balance(owner)
			.await
			.map_err(|e| self.rpc_error(e))
	}

	async fn submit_transaction(
		&self,
		secret: &Secret,
		tx: &TransactionData,
	) -> Result<String, EvmChainError> {
		let signer: PrivateKeySigner = secret
			.expose()
			.parse()
			.map_err(|_| EvmChainError::InvalidSigner)?;
		let wallet = EthereumWallet::from(signer);

		let url = self.rpc_url.parse().map_err(|_| EvmChainError::Rpc {
			chain_id: self.chain_id,
			reason: format!("invalid RPC URL: {}", self.rpc_url),
		})?;
		let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

		let to = parse_address(&tx.to)?;
		let data = decode_hex(&tx.data)?;
		let value = tx
			.value
			.to_u256()
			.map_err(|e| EvmChainError::InvalidCalldata {
				reason: e.to_string(),
			})?;

		let mut request = TransactionRequest::default()
			.with_to(to)
			.with_input(Bytes::from(data))
			.with_value(value);

		if let Some(gas) = &tx.gas_limit {
			if let Ok(gas) = gas.to_u256() {
				request = request.with_gas_limit(gas.to::<u64>());
			}
		}

		let pending = provider
			.send_transaction(request)
			.await
			.map_err(|e| self.rpc_error(e))?;
		let tx_hash = *pending.tx_hash();

		debug!(chain_id = self.chain_id, %tx_hash, "transaction submitted");
		Ok(format!("{:#x}", tx_hash))
	}

	async fn receipt(&self, tx_hash: &str) -> Result<Option<EvmReceipt>, EvmChainError> {
		let hash: B256 = tx_hash.parse().map_err(|_| EvmChainError::InvalidAddress {
			value: tx_hash.to_string(),
		})?;

		let receipt = self
			.provider
			.get_transaction_receipt(hash)
			.await
			.map_err(|e| self.rpc_error(e))?;

		Ok(receipt.map(|receipt| EvmReceipt {
			tx_hash: tx_hash.to_string(),
			success: receipt.status(),
			block_number: receipt.block_number,
			transfers: Self::extract_transfers(receipt.inner.logs()),
		}))
	}

	async fn wait_for_receipt(&self, tx_hash: &str) -> Result<EvmReceipt, EvmChainError> {
		let deadline = Instant::now() + Duration::from_secs(CONFIRMATION_TIMEOUT_SECONDS);
		loop {
			match self.receipt(tx_hash).await {
				Ok(Some(receipt)) => return Ok(receipt),
				Ok(None) => {},
				Err(EvmChainError::InvalidAddress { value }) => {
					return Err(EvmChainError::InvalidAddress { value });
				},
				Err(e) => {
					// transient RPC failures are retried until the ceiling
					warn!(chain_id = self.chain_id, error = %e, "receipt poll failed");
				},
			}

			if Instant::now() >= deadline {
				return Err(EvmChainError::ConfirmationTimeout {
					tx_hash: tx_hash.to_string(),
					seconds: CONFIRMATION_TIMEOUT_SECONDS,
				});
			}
			sleep(Duration::from_secs(3)).await;
		}
	}
}

impl std::fmt::Debug for RpcEvmChain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RpcEvmChain")
			.field("chain_id", &self.chain_id)
			.finish()
	}
}

/// Per-chain client map built from the RPC settings
#[derive(Default)]
pub struct EvmChains {
	inner: HashMap<u64, Arc<dyn EvmChain>>,
}

impl EvmChains {
	pub fn from_settings(rpc: &RpcSettings) -> Self {
		let mut inner: HashMap<u64, Arc<dyn EvmChain>> = HashMap::new();
		for (chain_id, url) in &rpc.endpoints {
			match RpcEvmChain::new(*chain_id, url) {
				Ok(chain) => {
					inner.insert(*chain_id, Arc::new(chain));
				},
				Err(e) => {
					warn!(chain_id, error = %e, "skipping misconfigured RPC endpoint");
				},
			}
		}
		Self { inner }
	}

	/// Test and composition hook for injecting custom chain clients
	pub fn insert(&mut self, chain_id: u64, chain: Arc<dyn EvmChain>) {
		self.inner.insert(chain_id, chain);
	}

	pub fn get(&self, chain_id: u64) -> Result<Arc<dyn EvmChain>, EvmChainError> {
		self.inner
			.get(&chain_id)
			.cloned()
			.ok_or(EvmChainError::NoRpcEndpoint { chain_id })
	}

	pub fn has(&self, chain_id: u64) -> bool {
		self.inner.contains_key(&chain_id)
	}
}

impl std::fmt::Debug for EvmChains {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EvmChains")
			.field("chains", &self.inner.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// ERC-20 approve calldata for `spender`/`amount`
pub fn encode_approve(spender: Address, amount: U256) -> String {
	use alloy::sol_types::SolCall;
	let call = IERC20::approveCall { spender, amount };
	format!("0x{}", alloy::hex::encode(call.abi_encode()))
}

/// Decode 0x-prefixed hex into bytes
pub fn decode_hex(data: &str) -> Result<Vec<u8>, EvmChainError> {
	let stripped = data.strip_prefix("0x").unwrap_or(data);
	alloy::hex::decode(stripped).map_err(|_| EvmChainError::InvalidCalldata {
		reason: format!("not hex: {}", data),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn approve_calldata_has_selector_and_args() {
		let spender: Address = "0x000000000022D473030F116dDEE9F6B43aC78BA3"
			.parse()
			.unwrap();
		let calldata = encode_approve(spender, U256::from(1000u64));

		// approve(address,uint256) selector
		assert!(calldata.starts_with("0x095ea7b3"));
		// 4-byte selector + two 32-byte words
		assert_eq!(calldata.len(), 2 + 8 + 64 + 64);
		assert!(calldata.to_lowercase().contains("22d473030f116ddee9f6b43ac78ba3"));
	}

	#[test]
	fn hex_decoding_accepts_both_prefixes() {
		assert_eq!(decode_hex("0xabcd").unwrap(), vec![0xab, 0xcd]);
		assert_eq!(decode_hex("abcd").unwrap(), vec![0xab, 0xcd]);
		assert!(decode_hex("0xzz").is_err());
	}

	#[test]
	fn address_parsing() {
		assert!(parse_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_ok());
		assert!(parse_address("not-an-address").is_err());
	}
}
