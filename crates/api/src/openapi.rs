//! OpenAPI document, generated only when the `openapi` feature is enabled

use utoipa::OpenApi;

use crate::handlers::{analysis, approval, chains, quotes};

#[derive(OpenApi)]
#[openapi(
	info(
		title = "Omniswap Gateway API",
		description = "Universal swap aggregation gateway"
	),
	paths(
		quotes::post_universal_quote,
		quotes::post_pre_check,
		quotes::post_execute,
		quotes::post_status,
		approval::post_approval_status,
		approval::post_approval_execute,
		chains::get_supported_chains,
		chains::get_aggregators,
		chains::get_health,
		analysis::get_analyze,
		analysis::get_ecosystems,
	),
	tags(
		(name = "universal-swap", description = "Quoting, pre-checks and execution"),
		(name = "swap-analysis", description = "Routing classification")
	)
)]
pub struct ApiDoc;
