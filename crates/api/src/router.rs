use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{
	get_aggregators, get_analyze, get_ecosystems, get_health, get_supported_chains,
	post_approval_execute, post_approval_status, post_execute, post_pre_check, post_status,
	post_universal_quote,
};
use crate::rate_limit::rate_limit_middleware;
use crate::security::security_headers_middleware;
use crate::state::AppState;
#[cfg(feature = "openapi")]
use crate::openapi::ApiDoc;
#[cfg(feature = "openapi")]
use utoipa::OpenApi;
#[cfg(feature = "openapi")]
use utoipa_swagger_ui::SwaggerUi;

pub fn create_router(state: AppState) -> Router {
	let cors = if state.settings.server.cors_origin == "*" {
		CorsLayer::permissive()
	} else {
		match state.settings.server.cors_origin.parse::<axum::http::HeaderValue>() {
			Ok(origin) => CorsLayer::new().allow_origin([origin]),
			Err(_) => CorsLayer::permissive(),
		}
	};
	let body_limit = RequestBodyLimitLayer::new(1024 * 1024);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let base_router = Router::new()
		.route("/universal-swap/quote", post(post_universal_quote))
		.route("/universal-swap/pre-check", post(post_pre_check))
		.route("/universal-swap/execute", post(post_execute))
		.route("/universal-swap/status", post(post_status))
		.route("/universal-swap/approval/status", post(post_approval_status))
		.route(
			"/universal-swap/approval/execute",
			post(post_approval_execute),
		)
		.route("/universal-swap/supported-chains", get(get_supported_chains))
		.route("/universal-swap/aggregators", get(get_aggregators))
		.route("/universal-swap/health", get(get_health))
		.route("/swap-analysis/analyze", get(get_analyze))
		.route("/swap-analysis/ecosystems", get(get_ecosystems));

	#[cfg(feature = "openapi")]
	let base_router = base_router
		.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

	base_router
		.layer(middleware::from_fn_with_state(
			state.clone(),
			rate_limit_middleware,
		))
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit)
		.layer(middleware::from_fn(security_headers_middleware))
		.with_state(state)
}
