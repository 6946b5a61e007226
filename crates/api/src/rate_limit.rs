//! Inbound rate limiting
//!
//! Per-client-IP sliding window over the last 60 seconds. The guard is an
//! in-process counter; a background task prunes idle windows on a timer.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::json;
use tracing::{debug, warn};

use omniswap_types::constants::limits::{
	RATE_LIMIT_CLEANUP_INTERVAL_SECONDS, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECONDS,
};

use crate::state::AppState;

/// Sliding-window request counter keyed by client IP
#[derive(Debug)]
pub struct RateLimitGuard {
	windows: DashMap<String, VecDeque<DateTime<Utc>>>,
	max_requests: u32,
	window_seconds: u64,
	enabled: bool,
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
	Allowed,
	/// Denied; retry after this many seconds (at most the window length)
	Limited { retry_after: u64 },
}

impl Default for RateLimitGuard {
	fn default() -> Self {
		Self::new(RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECONDS, true)
	}
}

impl RateLimitGuard {
	pub fn new(max_requests: u32, window_seconds: u64, enabled: bool) -> Self {
		Self {
			windows: DashMap::new(),
			max_requests,
			window_seconds,
			enabled,
		}
	}

	/// Record the request and decide whether it is allowed
	pub fn check(&self, key: &str) -> RateDecision {
		if !self.enabled {
			return RateDecision::Allowed;
		}

		let now = Utc::now();
		let window_start = now - chrono::Duration::seconds(self.window_seconds as i64);

		let mut window = self.windows.entry(key.to_string()).or_default();
		while window.front().is_some_and(|t| *t < window_start) {
			window.pop_front();
		}

		if window.len() >= self.max_requests as usize {
			let retry_after = window
				.front()
				.map(|oldest| {
					let freed = *oldest + chrono::Duration::seconds(self.window_seconds as i64);
					freed.signed_duration_since(now).num_seconds().max(1) as u64
				})
				.unwrap_or(self.window_seconds)
				.min(self.window_seconds);
			return RateDecision::Limited { retry_after };
		}

		window.push_back(now);
		RateDecision::Allowed
	}

	/// Drop windows with no recent requests
	pub fn cleanup_expired(&self) {
		let cutoff = Utc::now() - chrono::Duration::seconds(self.window_seconds as i64);
		self.windows
			.retain(|_, window| window.back().is_some_and(|t| *t >= cutoff));
	}

	/// Spawn the periodic cleanup task
	pub fn spawn_cleanup(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
		let guard = Arc::clone(self);
		tokio::spawn(async move {
			let mut ticker =
				tokio::time::interval(Duration::from_secs(RATE_LIMIT_CLEANUP_INTERVAL_SECONDS));
			loop {
				ticker.tick().await;
				let before = guard.windows.len();
				guard.cleanup_expired();
				debug!(
					before,
					after = guard.windows.len(),
					"rate-limit window cleanup"
				);
			}
		})
	}
}

/// Axum middleware enforcing the guard for every route
pub async fn rate_limit_middleware(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Response {
	let key = client_key(&request);

	match state.rate_limiter.check(&key) {
		RateDecision::Allowed => next.run(request).await,
		RateDecision::Limited { retry_after } => {
			warn!(client = %key, retry_after, "rate limit exceeded");
			(
				StatusCode::TOO_MANY_REQUESTS,
				Json(json!({
					"message": "rate limit exceeded",
					"retryAfter": retry_after,
				})),
			)
				.into_response()
		},
	}
}

/// Client key: the first hop of X-Forwarded-For when present, otherwise the
/// socket address.
fn client_key(request: &Request) -> String {
	if let Some(forwarded) = request
		.headers()
		.get("x-forwarded-for")
		.and_then(|v| v.to_str().ok())
	{
		if let Some(first) = forwarded.split(',').next() {
			let first = first.trim();
			if !first.is_empty() {
				return first.to_string();
			}
		}
	}

	request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ConnectInfo(addr)| addr.ip().to_string())
		.unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn allows_up_to_the_limit_then_denies() {
		let guard = RateLimitGuard::new(100, 60, true);

		for _ in 0..100 {
			assert_eq!(guard.check("10.0.0.1"), RateDecision::Allowed);
		}

		match guard.check("10.0.0.1") {
			RateDecision::Limited { retry_after } => assert!(retry_after <= 60),
			RateDecision::Allowed => panic!("101st request must be limited"),
		}

		// another client is unaffected
		assert_eq!(guard.check("10.0.0.2"), RateDecision::Allowed);
	}

	#[test]
	fn disabled_guard_always_allows() {
		let guard = RateLimitGuard::new(1, 60, false);
		for _ in 0..10 {
			assert_eq!(guard.check("10.0.0.1"), RateDecision::Allowed);
		}
	}

	#[test]
	fn cleanup_drops_idle_windows() {
		let guard = RateLimitGuard::new(100, 60, true);
		guard.check("10.0.0.1");
		assert_eq!(guard.windows.len(), 1);

		// nothing expires within the window
		guard.cleanup_expired();
		assert_eq!(guard.windows.len(), 1);
	}
}
