//! Security response headers
//!
//! Quote and approval responses carry executable transaction payloads and
//! expire within seconds, so every response leaves with conservative cache
//! and embedding policies unless a handler already set its own.

use axum::extract::Request;
use axum::http::header::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

/// Headers stamped on every response when absent
const SECURITY_HEADERS: [(&str, &str); 5] = [
	("strict-transport-security", "max-age=31536000; includeSubDomains"),
	("x-content-type-options", "nosniff"),
	("x-frame-options", "DENY"),
	("referrer-policy", "no-referrer"),
	// quotes go stale in seconds; intermediaries must never replay them
	("cache-control", "no-store"),
];

/// Axum middleware applying the header table to each response
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
	let mut response = next.run(request).await;

	let headers = response.headers_mut();
	for (name, value) in SECURITY_HEADERS {
		let name = HeaderName::from_static(name);
		if !headers.contains_key(&name) {
			headers.insert(name, HeaderValue::from_static(value));
		}
	}

	response
}
