//! Approval status and transaction handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use omniswap_service::ApprovalStatusReport;
use omniswap_types::{Amount, ApprovalStrategy, TransactionData};

use crate::handlers::common::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApprovalRequest {
	pub chain_id: u64,
	pub token: String,
	pub owner: String,
	pub amount: Amount,
	#[serde(default)]
	pub strategy: Option<ApprovalStrategy>,
}

impl ApprovalRequest {
	fn strategy(&self) -> ApprovalStrategy {
		self.strategy.unwrap_or(ApprovalStrategy::AllowanceHolder)
	}
}

/// POST /universal-swap/approval/status
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/universal-swap/approval/status",
	responses((status = 200, description = "Allowance state for the resolved spender")),
	tag = "universal-swap"
))]
pub async fn post_approval_status(
	State(state): State<AppState>,
	Json(request): Json<ApprovalRequest>,
) -> Result<Json<ApiResponse<ApprovalStatusReport>>, ApiError> {
	let report = state
		.approval
		.approval_status(
			request.chain_id,
			&request.token,
			&request.owner,
			&request.amount,
			request.strategy(),
		)
		.await?;
	Ok(ApiResponse::ok(report))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ApprovalTransactionResponse {
	pub spender: String,
	/// Approve transaction for the caller to sign and broadcast
	pub transaction: TransactionData,
}

/// POST /universal-swap/approval/execute
///
/// Resolves the spender and returns the approve transaction. The caller
/// signs and broadcasts it; execution through the coordinator submits
/// approvals itself as part of a swap.
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/universal-swap/approval/execute",
	responses((status = 200, description = "Approve transaction payload")),
	tag = "universal-swap"
))]
pub async fn post_approval_execute(
	State(state): State<AppState>,
	Json(request): Json<ApprovalRequest>,
) -> Result<Json<ApiResponse<ApprovalTransactionResponse>>, ApiError> {
	let strategy = request.strategy();
	let spender = state
		.approval
		.resolve_spender(request.chain_id, strategy)
		.await?;

	let transaction = state
		.approval
		.build_approval_transaction(&request.token, &spender, &request.amount)?;

	Ok(ApiResponse::ok(ApprovalTransactionResponse {
		spender,
		transaction,
	}))
}
