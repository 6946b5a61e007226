//! Response envelope and error mapping shared by handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use omniswap_service::{
	ApprovalError, ClassifyError, ExecutionError, GatewayError, OrchestratorError,
};
use omniswap_types::{ProviderError, SwapValidationError};

/// Uniform success envelope: `{success, data, timestamp}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
	pub success: bool,
	pub data: T,
	pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
	pub fn ok(data: T) -> Json<Self> {
		Json(Self {
			success: true,
			data,
			timestamp: chrono::Utc::now().timestamp(),
		})
	}
}

/// Error body: `{message, error, details}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub message: String,
	pub error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

/// Handler-facing error with its HTTP mapping
#[derive(Debug)]
pub enum ApiError {
	BadRequest { message: String, details: Option<Value> },
	NotFound { message: String },
	NotImplemented { message: String },
	UpstreamFailed { message: String },
	Internal { message: String },
}

impl ApiError {
	pub fn bad_request(message: impl Into<String>) -> Self {
		Self::BadRequest {
			message: message.into(),
			details: None,
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
			Self::NotFound { .. } => StatusCode::NOT_FOUND,
			Self::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
			Self::UpstreamFailed { .. } => StatusCode::BAD_GATEWAY,
			Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn code(&self) -> &'static str {
		match self {
			Self::BadRequest { .. } => "VALIDATION_ERROR",
			Self::NotFound { .. } => "NOT_FOUND",
			Self::NotImplemented { .. } => "NOT_IMPLEMENTED",
			Self::UpstreamFailed { .. } => "UPSTREAM_ERROR",
			Self::Internal { .. } => "INTERNAL_ERROR",
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (message, details) = match &self {
			ApiError::BadRequest { message, details } => (message.clone(), details.clone()),
			ApiError::NotFound { message }
			| ApiError::NotImplemented { message }
			| ApiError::UpstreamFailed { message }
			| ApiError::Internal { message } => (message.clone(), None),
		};

		let body = ErrorBody {
			message,
			error: self.code().to_string(),
			details,
		};

		(self.status(), Json(body)).into_response()
	}
}

impl From<SwapValidationError> for ApiError {
	fn from(e: SwapValidationError) -> Self {
		ApiError::bad_request(e.to_string())
	}
}

impl From<ClassifyError> for ApiError {
	fn from(e: ClassifyError) -> Self {
		ApiError::bad_request(e.to_string())
	}
}

impl From<GatewayError> for ApiError {
	fn from(e: GatewayError) -> Self {
		match e {
			GatewayError::Validation(inner) => inner.into(),
			GatewayError::Classify(inner) => inner.into(),
			GatewayError::Orchestrator(inner) => inner.into(),
			GatewayError::NoProviders { .. } => ApiError::bad_request(e.to_string()),
			GatewayError::CategoryFailed { .. } => ApiError::UpstreamFailed {
				message: e.to_string(),
			},
		}
	}
}

impl From<OrchestratorError> for ApiError {
	fn from(e: OrchestratorError) -> Self {
		match e {
			OrchestratorError::NoProviderForChain { .. } | OrchestratorError::InvalidQuote(_) => {
				ApiError::bad_request(e.to_string())
			},
			OrchestratorError::AllProvidersFailed { .. }
			| OrchestratorError::NoRoutesFound { .. } => ApiError::UpstreamFailed {
				message: e.to_string(),
			},
		}
	}
}

impl From<ApprovalError> for ApiError {
	fn from(e: ApprovalError) -> Self {
		match &e {
			ApprovalError::UnsupportedChain { .. } | ApprovalError::InvalidAmount { .. } => {
				ApiError::bad_request(e.to_string())
			},
			ApprovalError::Evm(_) => ApiError::UpstreamFailed {
				message: e.to_string(),
			},
		}
	}
}

impl From<ExecutionError> for ApiError {
	fn from(e: ExecutionError) -> Self {
		match &e {
			ExecutionError::Validation(_) | ExecutionError::PrecheckFailed { .. } => {
				ApiError::bad_request(e.user_message())
			},
			_ => ApiError::UpstreamFailed {
				message: e.user_message(),
			},
		}
	}
}

impl From<ProviderError> for ApiError {
	fn from(e: ProviderError) -> Self {
		if let ProviderError::NotImplemented(_) = e {
			return ApiError::NotImplemented {
				message: e.to_string(),
			};
		}
		if e.is_client_error() {
			ApiError::bad_request(e.to_string())
		} else {
			ApiError::UpstreamFailed {
				message: e.to_string(),
			}
		}
	}
}
