//! Provider health monitor
//!
//! Caches the most recent [`ProviderHealth`] per provider and refreshes on
//! lookup once an entry is older than the TTL. The monitor is the sole
//! writer of the cache; readers get snapshots.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use omniswap_types::constants::limits::{HEALTH_CACHE_TTL_SECONDS, HEALTH_PROBE_TIMEOUT_MS};
use omniswap_types::{Provider, ProviderHealth};

pub struct HealthMonitor {
	cache: DashMap<String, ProviderHealth>,
	/// Per-provider refresh locks so concurrent lookups trigger one probe
	inflight: DashMap<String, Arc<Mutex<()>>>,
	ttl_seconds: i64,
	probe_timeout: Duration,
}

impl Default for HealthMonitor {
	fn default() -> Self {
		Self::new()
	}
}

impl HealthMonitor {
	pub fn new() -> Self {
		Self {
			cache: DashMap::new(),
			inflight: DashMap::new(),
			ttl_seconds: HEALTH_CACHE_TTL_SECONDS as i64,
			probe_timeout: Duration::from_millis(HEALTH_PROBE_TIMEOUT_MS),
		}
	}

	/// Monitor with a custom TTL, used by tests to force refreshes
	pub fn with_ttl_seconds(ttl_seconds: i64) -> Self {
		Self {
			ttl_seconds,
			..Self::new()
		}
	}

	/// Current health for the provider, probing when the cached entry is
	/// missing or stale.
	pub async fn health_for(&self, provider: &dyn Provider) -> ProviderHealth {
		let name = provider.name().to_string();

		if let Some(fresh) = self.fresh_entry(&name) {
			return fresh;
		}

		// Single-flight: concurrent lookups for the same provider wait on
		// one probe instead of issuing their own.
		let lock = self
			.inflight
			.entry(name.clone())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone();
		let _guard = lock.lock().await;

		if let Some(fresh) = self.fresh_entry(&name) {
			return fresh;
		}

		let health = self.probe(provider).await;
		self.cache.insert(name, health.clone());
		health
	}

	/// Cached snapshot without triggering a probe
	pub fn snapshot(&self, name: &str) -> Option<ProviderHealth> {
		self.cache.get(name).map(|entry| entry.value().clone())
	}

	async fn probe(&self, provider: &dyn Provider) -> ProviderHealth {
		let name = provider.name();
		let started = Utc::now();

		match timeout(self.probe_timeout, provider.health()).await {
			Ok(Ok(mut health)) => {
				if health.latency_ms.is_none() {
					let elapsed = Utc::now()
						.signed_duration_since(started)
						.num_milliseconds()
						.max(0) as u64;
					health.latency_ms = Some(elapsed);
				}
				debug!(provider = name, status = ?health.status, "health probe ok");
				health
			},
			Ok(Err(e)) => {
				warn!(provider = name, error = %e, "health probe failed");
				ProviderHealth::unhealthy(name)
			},
			Err(_) => {
				warn!(
					provider = name,
					timeout_ms = self.probe_timeout.as_millis() as u64,
					"health probe timed out"
				);
				ProviderHealth::unhealthy(name)
			},
		}
	}

	fn fresh_entry(&self, name: &str) -> Option<ProviderHealth> {
		self.cache.get(name).and_then(|entry| {
			if entry.age_seconds() < self.ttl_seconds {
				Some(entry.value().clone())
			} else {
				None
			}
		})
	}
}

impl std::fmt::Debug for HealthMonitor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HealthMonitor")
			.field("cached", &self.cache.len())
			.field("ttl_seconds", &self.ttl_seconds)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use omniswap_types::{ProviderConfig, ProviderError, ProviderResult};
	use std::sync::atomic::{AtomicU32, Ordering};

	#[derive(Debug)]
	struct CountingProvider {
		config: ProviderConfig,
		probes: AtomicU32,
		fail: bool,
	}

	impl CountingProvider {
		fn new(name: &str, fail: bool) -> Self {
			Self {
				config: ProviderConfig::new(name, "https://probe.invalid"),
				probes: AtomicU32::new(0),
				fail,
			}
		}
	}

	#[async_trait]
	impl Provider for CountingProvider {
		fn name(&self) -> &str {
			&self.config.name
		}

		fn config(&self) -> &ProviderConfig {
			&self.config
		}

		async fn health(&self) -> ProviderResult<ProviderHealth> {
			self.probes.fetch_add(1, Ordering::SeqCst);
			if self.fail {
				Err(ProviderError::Timeout { timeout_ms: 1 })
			} else {
				Ok(ProviderHealth::healthy(self.name(), 12))
			}
		}
	}

	#[tokio::test]
	async fn cached_entry_is_reused_within_ttl() {
		let monitor = HealthMonitor::new();
		let provider = CountingProvider::new("0x", false);

		let first = monitor.health_for(&provider).await;
		let second = monitor.health_for(&provider).await;

		assert!(first.is_healthy());
		assert_eq!(second.latency_ms, first.latency_ms);
		assert_eq!(provider.probes.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn failed_probe_yields_unhealthy_with_full_error_rate() {
		let monitor = HealthMonitor::new();
		let provider = CountingProvider::new("odos", true);

		let health = monitor.health_for(&provider).await;
		assert!(!health.is_healthy());
		assert_eq!(health.error_rate, Some(1.0));
	}

	#[tokio::test]
	async fn stale_entry_triggers_refresh() {
		let monitor = HealthMonitor::with_ttl_seconds(0);
		let provider = CountingProvider::new("lifi", false);

		monitor.health_for(&provider).await;
		monitor.health_for(&provider).await;
		assert_eq!(provider.probes.load(Ordering::SeqCst), 2);
	}
}
