use std::sync::Arc;

use omniswap_config::Settings;
use omniswap_registry::ProviderRegistry;
use omniswap_service::{
	ApprovalService, ExecutionCoordinator, HealthMonitor, PrecheckService, QuoteOrchestrator,
	RoutingClassifier, SwapGateway,
};

use crate::rate_limit::RateLimitGuard;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub registry: Arc<ProviderRegistry>,
	pub classifier: Arc<RoutingClassifier>,
	pub orchestrator: Arc<QuoteOrchestrator>,
	pub gateway: Arc<SwapGateway>,
	pub precheck: Arc<PrecheckService>,
	pub approval: Arc<ApprovalService>,
	pub executor: Arc<ExecutionCoordinator>,
	pub health: Arc<HealthMonitor>,
	pub rate_limiter: Arc<RateLimitGuard>,
	pub settings: Arc<Settings>,
}
