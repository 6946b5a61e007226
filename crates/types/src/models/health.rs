//! Provider health model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness classification for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
}

/// Most recent liveness observation for a provider.
///
/// Created on first probe, refreshed when older than the cache TTL, and
/// mutated only by the health monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProviderHealth {
	pub name: String,
	pub status: HealthStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub latency_ms: Option<u64>,
	pub last_check: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_rate: Option<f64>,
}

impl ProviderHealth {
	/// Successful probe with an observed round-trip latency
	pub fn healthy(name: impl Into<String>, latency_ms: u64) -> Self {
		Self {
			name: name.into(),
			status: HealthStatus::Healthy,
			latency_ms: Some(latency_ms),
			last_check: Utc::now(),
			error_rate: Some(0.0),
		}
	}

	/// Reachable but slow or partially failing
	pub fn degraded(name: impl Into<String>, latency_ms: u64, error_rate: f64) -> Self {
		Self {
			name: name.into(),
			status: HealthStatus::Degraded,
			latency_ms: Some(latency_ms),
			last_check: Utc::now(),
			error_rate: Some(error_rate),
		}
	}

	/// Failed or timed-out probe
	pub fn unhealthy(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			status: HealthStatus::Unhealthy,
			latency_ms: None,
			last_check: Utc::now(),
			error_rate: Some(1.0),
		}
	}

	pub fn is_healthy(&self) -> bool {
		self.status == HealthStatus::Healthy
	}

	/// Age of the observation relative to now
	pub fn age_seconds(&self) -> i64 {
		Utc::now().signed_duration_since(self.last_check).num_seconds()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unhealthy_probe_reports_full_error_rate() {
		let health = ProviderHealth::unhealthy("0x");
		assert_eq!(health.status, HealthStatus::Unhealthy);
		assert_eq!(health.error_rate, Some(1.0));
		assert_eq!(health.latency_ms, None);
	}

	#[test]
	fn status_serializes_lowercase() {
		let health = ProviderHealth::healthy("odos", 42);
		let json = serde_json::to_value(&health).unwrap();
		assert_eq!(json["status"], "healthy");
		assert_eq!(json["latencyMs"], 42);
	}
}
