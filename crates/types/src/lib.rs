//! Omniswap Types
//!
//! Shared models and traits for the universal swap aggregation gateway.
//! This crate contains all domain models organized by business entity.

pub mod constants;
pub mod models;
pub mod providers;
pub mod quotes;
pub mod swaps;
pub mod test_utils;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use models::{
	Amount, AmountError, ChainRef, Ecosystem, HealthStatus, ProviderHealth, Secret, TokenStandard,
};

pub use swaps::{
	AggregatorType, ApprovalStrategy, ExecutionStatus, SwapRequest, SwapType, SwapValidationError,
	SwapValidationResult, UniversalSwapRequest,
};

pub use quotes::{
	Permit2Data, QuoteResult, RouteFees, RouteQuote, RouteStep, StepKind, SwapQuote,
	TransactionData, TypedDataBundle,
};

pub use providers::{
	ChainSupport, EvmSpenderProvider, MetaAggregator, NativeRouter, OnChainAggregator, Provider,
	ProviderCategory, ProviderConfig, ProviderError, ProviderResult, SignedSolanaTx, SignerContext,
	SolanaRouter,
};
