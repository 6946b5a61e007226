//! Chain catalogue and service health handlers

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::handlers::common::{ApiError, ApiResponse};
use crate::state::AppState;

/// Human-readable names for the chains adapters commonly declare
const CHAIN_NAMES: [(u64, &str); 12] = [
	(1, "Ethereum"),
	(10, "Optimism"),
	(56, "BNB Smart Chain"),
	(100, "Gnosis"),
	(137, "Polygon"),
	(250, "Fantom"),
	(324, "zkSync Era"),
	(5000, "Mantle"),
	(8453, "Base"),
	(42161, "Arbitrum One"),
	(43114, "Avalanche C-Chain"),
	(59144, "Linea"),
];

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
	pub chain_id: u64,
	pub name: String,
	pub providers: Vec<String>,
}

/// GET /universal-swap/supported-chains
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/universal-swap/supported-chains",
	responses((status = 200, description = "Union of adapter-declared chains")),
	tag = "universal-swap"
))]
pub async fn get_supported_chains(
	State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ChainInfo>>> {
	let chains = state
		.registry
		.evm_supported_chains()
		.into_iter()
		.map(|chain_id| {
			let providers = state
				.registry
				.evm_providers_for_chain(chain_id)
				.iter()
				.map(|provider| provider.name().to_string())
				.collect();
			ChainInfo {
				chain_id,
				name: chain_name(chain_id),
				providers,
			}
		})
		.collect();

	ApiResponse::ok(chains)
}

fn chain_name(chain_id: u64) -> String {
	CHAIN_NAMES
		.iter()
		.find(|(id, _)| *id == chain_id)
		.map(|(_, name)| name.to_string())
		.unwrap_or_else(|| format!("chain-{}", chain_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorsQuery {
	pub chain_id: u64,
}

/// GET /universal-swap/aggregators?chainId=
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/universal-swap/aggregators",
	responses((status = 200, description = "EVM adapter names for a chain")),
	tag = "universal-swap"
))]
pub async fn get_aggregators(
	State(state): State<AppState>,
	Query(query): Query<AggregatorsQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
	let names: Vec<String> = state
		.registry
		.evm_providers_for_chain(query.chain_id)
		.iter()
		.map(|provider| provider.name().to_string())
		.collect();

	Ok(ApiResponse::ok(names))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceHealth {
	pub status: String,
	pub timestamp: i64,
}

/// GET /universal-swap/health
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/universal-swap/health",
	responses((status = 200, description = "Service liveness")),
	tag = "universal-swap"
))]
pub async fn get_health() -> Json<ApiResponse<ServiceHealth>> {
	ApiResponse::ok(ServiceHealth {
		status: "healthy".to_string(),
		timestamp: chrono::Utc::now().timestamp(),
	})
}
