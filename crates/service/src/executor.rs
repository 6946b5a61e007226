//! Execution coordinator
//!
//! Drives a full EVM swap: pre-flight checks, retrying quote acquisition,
//! approval dispatch, transaction submission, confirmation wait and receipt
//! parsing, with upstream errors translated for the caller.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use omniswap_types::constants::evm::is_native_token;
use omniswap_types::constants::limits::{
	MAX_QUOTE_ATTEMPTS, MAX_SUBMIT_ATTEMPTS, RETRY_BASE_DELAY_MS,
};
use omniswap_types::{
	Amount, ApprovalStrategy, ExecutionStatus, Secret, SwapQuote, SwapRequest,
	SwapValidationError, TransactionData,
};

use crate::approval::{ApprovalError, ApprovalService};
use crate::evm::{parse_address, EvmChainError, EvmChains, EvmReceipt};
use crate::orchestrator::QuoteOrchestrator;
use crate::permit2::{Permit2Error, Permit2Signer};
use crate::precheck::PrecheckService;

#[derive(Error, Debug)]
pub enum ExecutionError {
	#[error("invalid request: {0}")]
	Validation(#[from] SwapValidationError),

	#[error("pre-flight checks failed: {warnings:?}")]
	PrecheckFailed { warnings: Vec<String> },

	#[error("no quote after {attempts} attempts: {last_error}")]
	QuoteUnavailable { attempts: u32, last_error: String },

	#[error(transparent)]
	Approval(#[from] ApprovalError),

	#[error(transparent)]
	Permit2(#[from] Permit2Error),

	#[error("submission failed after {attempts} attempts: {reason}")]
	Submission { attempts: u32, reason: String },

	#[error(transparent)]
	Evm(#[from] EvmChainError),

	#[error("swap transaction {tx_hash} reverted")]
	SwapReverted { tx_hash: String },
}

impl ExecutionError {
	/// User-facing message, matched on upstream message substrings
	pub fn user_message(&self) -> String {
		translate_error(&self.to_string())
	}
}

/// Translate raw upstream errors into user-facing messages
pub fn translate_error(raw: &str) -> String {
	let lower = raw.to_lowercase();

	if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
		"Insufficient funds to cover the swap amount and gas".to_string()
	} else if lower.contains("replacement") {
		"A replacement transaction was underpriced; retry with a higher gas price".to_string()
	} else if lower.contains("nonce") {
		"Transaction nonce conflict; a pending transaction may be in the way".to_string()
	} else if lower.contains("gas") {
		"Gas estimation failed; the swap would likely revert on-chain".to_string()
	} else if lower.contains("slippage") || lower.contains("min return") {
		"Price moved beyond the slippage tolerance; re-quote and try again".to_string()
	} else if lower.contains("deadline") || lower.contains("expired") {
		"The quote or deadline expired before execution; request a fresh quote".to_string()
	} else if lower.contains("network") || lower.contains("connection") || lower.contains("timeout")
	{
		"A network error interrupted the swap; the transaction may still confirm".to_string()
	} else {
		format!("Swap failed: {}", raw)
	}
}

/// Outcome of a completed execution attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
	pub status: ExecutionStatus,
	pub tx_hash: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub approval_tx_hash: Option<String>,
	/// Amount observed in Transfer events to the recipient, or the quoted
	/// amount when no event matched
	pub received_amount: Amount,
	pub quoted_amount: Amount,
	pub aggregator: String,
}

pub struct ExecutionCoordinator {
	orchestrator: Arc<QuoteOrchestrator>,
	approval: Arc<ApprovalService>,
	precheck: Arc<PrecheckService>,
	chains: Arc<EvmChains>,
}

impl ExecutionCoordinator {
	pub fn new(
		orchestrator: Arc<QuoteOrchestrator>,
		approval: Arc<ApprovalService>,
		precheck: Arc<PrecheckService>,
		chains: Arc<EvmChains>,
	) -> Self {
		Self {
			orchestrator,
			approval,
			precheck,
			chains,
		}
	}

	/// Execute an EVM swap end to end.
	///
	/// Steps are strictly ordered: validate, pre-flight, quote, approval,
	/// swap submission, confirmation, receipt parsing. An allowance-holder
	/// approval transaction is observed confirmed before the swap is built.
	pub async fn execute(
		&self,
		request: &SwapRequest,
		secret: &Secret,
	) -> Result<ExecutionReport, ExecutionError> {
		request.validate()?;

		let report = self.precheck.run(&request.to_universal()).await;
		if !report.all_clear() {
			return Err(ExecutionError::PrecheckFailed {
				warnings: report.warnings,
			});
		}

		let mut quote = self.acquire_quote(request).await?;
		info!(
			aggregator = %quote.aggregator,
			buy_amount = %quote.buy_amount,
			"quote acquired for execution"
		);

		let mut approval_tx_hash = None;
		if !is_native_token(&request.sell_token) {
			approval_tx_hash = self.ensure_approval(request, &mut quote, secret).await?;
		}

		let chain = self.chains.get(request.chain_id)?;
		let tx = TransactionData::from(&quote);
		let tx_hash = self.submit_with_retry(request.chain_id, &tx, secret).await?;

		let receipt = chain.wait_for_receipt(&tx_hash).await?;
		if !receipt.success {
			return Err(ExecutionError::SwapReverted { tx_hash });
		}

		let received_amount = received_amount(request, &quote, &receipt);

		Ok(ExecutionReport {
			status: ExecutionStatus::Success,
			tx_hash,
			approval_tx_hash,
			received_amount,
			quoted_amount: quote.buy_amount.clone(),
			aggregator: quote.aggregator.clone(),
		})
	}

	/// Poll a previously submitted execution
	pub async fn status(
		&self,
		chain_id: u64,
		tx_hash: &str,
	) -> Result<ExecutionStatus, ExecutionError> {
		let chain = self.chains.get(chain_id)?;
		match chain.receipt(tx_hash).await? {
			Some(receipt) if receipt.success => Ok(ExecutionStatus::Success),
			Some(_) => Ok(ExecutionStatus::Failed),
			None => Ok(ExecutionStatus::Pending),
		}
	}

	/// Quote acquisition with exponential backoff
	async fn acquire_quote(&self, request: &SwapRequest) -> Result<SwapQuote, ExecutionError> {
		let mut last_error = String::new();

		for attempt in 0..MAX_QUOTE_ATTEMPTS {
			if attempt > 0 {
				let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
				debug!(attempt, delay_ms = delay, "retrying quote acquisition");
				sleep(Duration::from_millis(delay)).await;
			}

			match self
				.orchestrator
				.get_quote(request, request.aggregator.as_deref(), true)
				.await
			{
				Ok(quote) => return Ok(quote),
				Err(e) => {
					warn!(attempt, error = %e, "quote attempt failed");
					last_error = e.to_string();
				},
			}
		}

		Err(ExecutionError::QuoteUnavailable {
			attempts: MAX_QUOTE_ATTEMPTS,
			last_error,
		})
	}

	/// Grant spend permission for the sell token.
	///
	/// Permit2 quotes are signed off-chain and the signature is spliced into
	/// the swap calldata; no transaction is sent. The allowance-holder path
	/// submits an approve transaction and waits for its confirmation.
	async fn ensure_approval(
		&self,
		request: &SwapRequest,
		quote: &mut SwapQuote,
		secret: &Secret,
	) -> Result<Option<String>, ExecutionError> {
		if quote.has_permit2() {
			let signed = Permit2Signer::create_signed_quote(request.chain_id, quote, secret).await?;
			*quote = signed;
			debug!("permit2 signature bound into swap calldata");
			return Ok(None);
		}

		let strategy = quote
			.approval_strategy
			.or(request.approval_strategy)
			.unwrap_or(ApprovalStrategy::AllowanceHolder);

		let spender = match &quote.allowance_target {
			Some(target) => target.clone(),
			None => self.approval.resolve_spender(request.chain_id, strategy).await?,
		};

		let needed = self
			.approval
			.is_approval_needed(
				request.chain_id,
				&request.sell_token,
				&request.taker,
				&spender,
				&request.sell_amount,
			)
			.await?;

		if !needed {
			return Ok(None);
		}

		let approval_tx = self.approval.build_approval_transaction(
			&request.sell_token,
			&spender,
			&request.sell_amount,
		)?;

		let chain = self.chains.get(request.chain_id)?;
		let tx_hash = self
			.submit_with_retry(request.chain_id, &approval_tx, secret)
			.await?;

		info!(%tx_hash, spender = %spender, "approval submitted, awaiting confirmation");
		let receipt = chain.wait_for_receipt(&tx_hash).await?;
		if !receipt.success {
			return Err(ExecutionError::Submission {
				attempts: 1,
				reason: format!("approval transaction {} reverted", tx_hash),
			});
		}

		Ok(Some(tx_hash))
	}

	async fn submit_with_retry(
		&self,
		chain_id: u64,
		tx: &TransactionData,
		secret: &Secret,
	) -> Result<String, ExecutionError> {
		let chain = self.chains.get(chain_id)?;
		let mut last_error = String::new();

		for attempt in 0..MAX_SUBMIT_ATTEMPTS {
			if attempt > 0 {
				let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
				sleep(Duration::from_millis(delay)).await;
			}

			match chain.submit_transaction(secret, tx).await {
				Ok(tx_hash) => return Ok(tx_hash),
				Err(e) => {
					warn!(attempt, error = %e, "transaction submission failed");
					last_error = e.to_string();
				},
			}
		}

		Err(ExecutionError::Submission {
			attempts: MAX_SUBMIT_ATTEMPTS,
			reason: last_error,
		})
	}

}

/// Actual received amount: the sum of buy-token Transfers to the recipient,
/// falling back to the quoted amount when none matched (native-token payouts
/// emit no Transfer event).
fn received_amount(request: &SwapRequest, quote: &SwapQuote, receipt: &EvmReceipt) -> Amount {
	let Ok(buy_token) = parse_address(&request.buy_token) else {
		return quote.buy_amount.clone();
	};
	let Ok(recipient) = parse_address(request.recipient()) else {
		return quote.buy_amount.clone();
	};

	let total: U256 = receipt
		.transfers
		.iter()
		.filter(|transfer| transfer.token == buy_token && transfer.to == recipient)
		.map(|transfer| transfer.amount)
		.fold(U256::ZERO, |acc, amount| acc + amount);

	if total.is_zero() {
		quote.buy_amount.clone()
	} else {
		Amount::from_u256(total)
	}
}

impl std::fmt::Debug for ExecutionCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExecutionCoordinator").finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_translation_table() {
		assert!(translate_error("execution reverted: insufficient funds for gas * price")
			.contains("Insufficient funds"));
		assert!(translate_error("cannot estimate gas").contains("Gas estimation"));
		assert!(translate_error("Return amount below slippage limit")
			.contains("slippage tolerance"));
		assert!(translate_error("order deadline passed").contains("expired"));
		assert!(translate_error("nonce too low").contains("nonce conflict"));
		assert!(translate_error("replacement transaction underpriced")
			.contains("replacement transaction"));
		assert!(translate_error("connection reset by peer").contains("network error"));
		// unknown messages pass through
		assert!(translate_error("mysterious failure").contains("mysterious failure"));
	}

	#[test]
	fn received_amount_sums_matching_transfers() {
		use crate::evm::TokenTransfer;
		use omniswap_types::test_utils::{sample_quote, sample_request, TAKER, USDC};

		let request = sample_request(1);
		let quote = sample_quote("0x", "5000000");

		let buy_token = parse_address(USDC).unwrap();
		let recipient = parse_address(TAKER).unwrap();
		let other = parse_address("0x0000000000000000000000000000000000000002").unwrap();

		let receipt = EvmReceipt {
			tx_hash: "0xabc".to_string(),
			success: true,
			block_number: Some(1),
			transfers: vec![
				TokenTransfer {
					token: buy_token,
					from: other,
					to: recipient,
					amount: U256::from(3_000_000u64),
				},
				TokenTransfer {
					token: buy_token,
					from: other,
					to: recipient,
					amount: U256::from(1_500_000u64),
				},
				// different token, ignored
				TokenTransfer {
					token: other,
					from: other,
					to: recipient,
					amount: U256::from(999u64),
				},
			],
		};

		let received = received_amount(&request, &quote, &receipt);
		assert_eq!(received.as_str(), "4500000");

		// no matching transfers: quoted amount wins
		let empty = EvmReceipt {
			tx_hash: "0xdef".to_string(),
			success: true,
			block_number: Some(2),
			transfers: vec![],
		};
		let fallback = received_amount(&request, &quote, &empty);
		assert_eq!(fallback.as_str(), "5000000");
	}
}
