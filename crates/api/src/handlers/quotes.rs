//! Quote, pre-check, execute and status handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use omniswap_service::{ExecutionReport, PrecheckReport, UniversalQuoteResponse};
use omniswap_types::{ExecutionStatus, Secret, SwapRequest, UniversalSwapRequest};

use crate::handlers::common::{ApiError, ApiResponse};
use crate::state::AppState;

/// POST /universal-swap/quote
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/universal-swap/quote",
	request_body = UniversalSwapRequest,
	responses(
		(status = 200, description = "Ranked routes with a recommended route"),
		(status = 400, description = "Invalid request"),
		(status = 502, description = "All providers failed")
	),
	tag = "universal-swap"
))]
pub async fn post_universal_quote(
	State(state): State<AppState>,
	Json(request): Json<UniversalSwapRequest>,
) -> Result<Json<ApiResponse<UniversalQuoteResponse>>, ApiError> {
	info!(
		source = %request.source.chain,
		destination = %request.destination.chain,
		"universal quote requested"
	);

	let response = state.gateway.universal_quote(&request).await?;
	Ok(ApiResponse::ok(response))
}

/// POST /universal-swap/pre-check
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/universal-swap/pre-check",
	request_body = UniversalSwapRequest,
	responses((status = 200, description = "Per-check outcome with warnings")),
	tag = "universal-swap"
))]
pub async fn post_pre_check(
	State(state): State<AppState>,
	Json(request): Json<UniversalSwapRequest>,
) -> Result<Json<ApiResponse<PrecheckReport>>, ApiError> {
	let report = state.precheck.run(&request).await;
	Ok(ApiResponse::ok(report))
}

/// Execution request: either a full EVM swap or a previously quoted
/// cross-chain route id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExecuteRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub swap: Option<SwapRequest>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub route_id: Option<String>,
	/// Per-request signing secret; zeroized after use and never logged
	pub signer_secret: Secret,
}

/// POST /universal-swap/execute
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/universal-swap/execute",
	responses(
		(status = 200, description = "Execution report"),
		(status = 501, description = "Route execution not implemented")
	),
	tag = "universal-swap"
))]
pub async fn post_execute(
	State(state): State<AppState>,
	Json(request): Json<ExecuteRequest>,
) -> Result<Json<ApiResponse<ExecutionReport>>, ApiError> {
	if let Some(swap) = &request.swap {
		let report = state.executor.execute(swap, &request.signer_secret).await?;
		return Ok(ApiResponse::ok(report));
	}

	if request.route_id.is_some() {
		// Cross-chain route execution settles through the meta-aggregator's
		// own infrastructure; submission is not wired yet.
		return Err(ApiError::NotImplemented {
			message: "cross-chain route execution is not available yet".to_string(),
		});
	}

	Err(ApiError::bad_request(
		"either swap or routeId must be provided",
	))
}

/// Status poll request
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub route_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
	pub status: ExecutionStatus,
}

/// POST /universal-swap/status
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/universal-swap/status",
	responses((status = 200, description = "Execution status")),
	tag = "universal-swap"
))]
pub async fn post_status(
	State(state): State<AppState>,
	Json(request): Json<StatusRequest>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
	if let (Some(chain_id), Some(tx_hash)) = (request.chain_id, &request.tx_hash) {
		let status = state.executor.status(chain_id, tx_hash).await?;
		return Ok(ApiResponse::ok(StatusResponse { status }));
	}

	if let Some(route_id) = &request.route_id {
		let mut last_error: Option<ApiError> = None;
		for provider in state.registry.meta_providers() {
			match provider.status(route_id).await {
				Ok(status) => return Ok(ApiResponse::ok(StatusResponse { status })),
				Err(e) => last_error = Some(e.into()),
			}
		}
		return Err(last_error.unwrap_or_else(|| {
			ApiError::bad_request("no meta-aggregator could resolve the route id")
		}));
	}

	Err(ApiError::bad_request(
		"either chainId with txHash, or routeId must be provided",
	))
}
