//! Shared HTTP plumbing for adapters
//!
//! Every adapter owns its own [`reqwest::Client`]; this module builds them
//! with the right timeout and headers and centralizes upstream status
//! handling, including the retry-with-backoff on 429.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use tokio::time::sleep;
use tracing::{debug, warn};

use omniswap_types::{ProviderError, ProviderResult};

/// Retries attempted when the upstream rate-limits us
const MAX_RATE_LIMIT_RETRIES: u32 = 2;

/// Backoff base between rate-limited retries
const RATE_LIMIT_BACKOFF_MS: u64 = 500;

/// Upstream error bodies are truncated to this many characters in error
/// messages
const MAX_ERROR_BODY: usize = 300;

/// Client with the adapter's timeout and static headers baked in
pub fn build_client(timeout_ms: u64, headers: &HashMap<String, String>) -> ProviderResult<Client> {
	let mut header_map = HeaderMap::new();
	for (name, value) in headers {
		let name: HeaderName = name.parse().map_err(|_| ProviderError::Config {
			reason: format!("invalid header name: {}", name),
		})?;
		let value: HeaderValue = value.parse().map_err(|_| ProviderError::Config {
			reason: format!("invalid header value for {}", name),
		})?;
		header_map.insert(name, value);
	}

	Client::builder()
		.timeout(Duration::from_millis(timeout_ms))
		.default_headers(header_map)
		.build()
		.map_err(ProviderError::Http)
}

/// Send a request, mapping non-success statuses into the error taxonomy and
/// retrying 429s with backoff.
pub async fn send_checked(provider: &str, builder: RequestBuilder) -> ProviderResult<Response> {
	let mut attempt = 0u32;

	loop {
		let request = builder.try_clone().ok_or_else(|| ProviderError::Config {
			reason: "request body is not retryable".to_string(),
		})?;

		let response = request.send().await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		let error = ProviderError::from_status(provider, status.as_u16(), truncate(&body));

		if matches!(error, ProviderError::RateLimited { .. }) && attempt < MAX_RATE_LIMIT_RETRIES {
			attempt += 1;
			let delay = RATE_LIMIT_BACKOFF_MS * (1 << (attempt - 1));
			warn!(provider, attempt, delay_ms = delay, "rate limited upstream, backing off");
			sleep(Duration::from_millis(delay)).await;
			continue;
		}

		debug!(provider, status = status.as_u16(), "upstream request failed");
		return Err(error);
	}
}

// Character-based so multi-byte upstream messages never split mid-char
fn truncate(body: &str) -> String {
	let mut truncated: String = body.chars().take(MAX_ERROR_BODY).collect();
	if truncated.len() < body.len() {
		truncated.push_str("...");
	}
	truncated
}
