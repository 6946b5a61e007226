//! Inbound rate-limit guard, end to end

mod mocks;

use mocks::TestServer;
use reqwest::Client;
use serde_json::Value;

#[tokio::test]
async fn the_101st_request_from_one_ip_is_limited() {
	let server = TestServer::spawn_minimal().await.unwrap();
	let client = Client::new();
	let url = server.url("/universal-swap/health");

	for i in 0..100 {
		let response = client
			.get(&url)
			.header("x-forwarded-for", "203.0.113.7")
			.send()
			.await
			.unwrap();
		assert_eq!(response.status(), 200, "request {} should pass", i + 1);
	}

	let response = client
		.get(&url)
		.header("x-forwarded-for", "203.0.113.7")
		.send()
		.await
		.unwrap();
	assert_eq!(response.status(), 429);

	let body: Value = response.json().await.unwrap();
	assert!(body["message"].as_str().unwrap().contains("rate limit"));
	let retry_after = body["retryAfter"].as_u64().unwrap();
	assert!(retry_after >= 1 && retry_after <= 60);
}

#[tokio::test]
async fn different_clients_have_independent_windows() {
	let server = TestServer::spawn_minimal().await.unwrap();
	let client = Client::new();
	let url = server.url("/universal-swap/health");

	for _ in 0..100 {
		client
			.get(&url)
			.header("x-forwarded-for", "198.51.100.1")
			.send()
			.await
			.unwrap();
	}

	// a different client is still allowed
	let response = client
		.get(&url)
		.header("x-forwarded-for", "198.51.100.2")
		.send()
		.await
		.unwrap();
	assert_eq!(response.status(), 200);
}
