//! Error taxonomy for provider operations

use thiserror::Error;

/// Errors raised by provider adapters and the services that drive them
#[derive(Error, Debug)]
pub enum ProviderError {
	#[error("validation failed: {reason}")]
	Validation { reason: String },

	#[error("chain {chain_id} not supported by {provider}")]
	ChainNotSupported { provider: String, chain_id: u64 },

	#[error("unsupported operation: {operation} on {provider}")]
	UnsupportedOperation { provider: String, operation: String },

	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("upstream {provider} returned {status}: {message}")]
	Upstream {
		provider: String,
		status: u16,
		message: String,
	},

	#[error("rate limited by {provider}")]
	RateLimited { provider: String },

	#[error("quote expired: {reason}")]
	QuoteExpired { reason: String },

	#[error("timeout after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("invalid response from {provider}: {reason}")]
	InvalidResponse { provider: String, reason: String },

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("configuration error: {reason}")]
	Config { reason: String },

	#[error("not implemented: {0}")]
	NotImplemented(String),

	#[error("no liquidity for pair {sell}/{buy} on chain {chain_id}")]
	NoLiquidity {
		chain_id: u64,
		sell: String,
		buy: String,
	},
}

impl ProviderError {
	/// Classify an upstream HTTP status into the taxonomy.
	///
	/// 429 becomes [`ProviderError::RateLimited`] so the adapter's retry
	/// layer can react; everything else is carried with its status.
	pub fn from_status(provider: &str, status: u16, message: impl Into<String>) -> Self {
		match status {
			429 => Self::RateLimited {
				provider: provider.to_string(),
			},
			_ => Self::Upstream {
				provider: provider.to_string(),
				status,
				message: message.into(),
			},
		}
	}

	/// Whether a retry with backoff can plausibly succeed
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::RateLimited { .. } | Self::Timeout { .. } => true,
			Self::Upstream { status, .. } => matches!(status, 500 | 502 | 503 | 504),
			Self::Http(e) => e.is_timeout() || e.is_connect(),
			_ => false,
		}
	}

	/// Whether the caller sent something the upstream rejected outright
	pub fn is_client_error(&self) -> bool {
		match self {
			Self::Validation { .. } => true,
			Self::Upstream { status, .. } => matches!(status, 400 | 401 | 403 | 404 | 422),
			_ => false,
		}
	}
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_429_maps_to_rate_limited() {
		let err = ProviderError::from_status("0x", 429, "slow down");
		assert!(matches!(err, ProviderError::RateLimited { .. }));
		assert!(err.is_retryable());
	}

	#[test]
	fn server_errors_are_retryable_client_errors_are_not() {
		assert!(ProviderError::from_status("odos", 503, "down").is_retryable());
		assert!(!ProviderError::from_status("odos", 400, "bad token").is_retryable());
		assert!(ProviderError::from_status("odos", 422, "bad amount").is_client_error());
	}
}
