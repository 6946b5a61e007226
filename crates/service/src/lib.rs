//! Omniswap Service
//!
//! Core orchestration services for the gateway: the routing classifier, the
//! quote orchestrator, the health monitor, the Permit2 and approval
//! workflows, the execution coordinator and the universal pre-check.

pub mod approval;
pub mod classifier;
pub mod evm;
pub mod executor;
pub mod gateway;
pub mod health;
pub mod orchestrator;
pub mod permit2;
pub mod precheck;

pub use approval::{ApprovalError, ApprovalService, ApprovalStatusReport};
pub use classifier::{ClassifyError, RoutingClassifier, SwapAnalysis};
pub use evm::{EvmChain, EvmChainError, EvmChains, EvmReceipt, RpcEvmChain, TokenTransfer};
pub use executor::{translate_error, ExecutionCoordinator, ExecutionError, ExecutionReport};
pub use gateway::{GatewayError, GatewayRoute, SwapGateway, UniversalQuoteResponse};
pub use health::HealthMonitor;
pub use orchestrator::{
	MultiQuoteComparison, OrchestratorError, ProviderRoute, QuoteOrchestrator,
};
pub use permit2::{Permit2Error, Permit2Execution, Permit2Info, Permit2Signer};
pub use precheck::{PrecheckReport, PrecheckService};
