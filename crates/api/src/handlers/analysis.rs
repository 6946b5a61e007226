//! Routing-analysis handlers: classification preview and the ecosystem
//! catalogue

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use omniswap_service::SwapAnalysis;
use omniswap_types::{
	Amount, ChainRef, Ecosystem, SwapType, TokenStandard, UniversalSwapRequest,
};

use crate::handlers::common::{ApiError, ApiResponse};
use crate::state::AppState;

/// Query form of a universal request, enough for classification
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeQuery {
	pub source_chain: String,
	pub source_ecosystem: Ecosystem,
	pub destination_chain: String,
	pub destination_ecosystem: Ecosystem,
	#[serde(default)]
	pub swap_type: Option<SwapType>,
}

/// GET /swap-analysis/analyze
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/swap-analysis/analyze",
	responses((status = 200, description = "Classification preview")),
	tag = "swap-analysis"
))]
pub async fn get_analyze(
	State(state): State<AppState>,
	Query(query): Query<AnalyzeQuery>,
) -> Result<Json<ApiResponse<SwapAnalysis>>, ApiError> {
	// Tokens and amounts are irrelevant to classification; placeholders keep
	// the request shape total.
	let request = UniversalSwapRequest {
		source: ChainRef::new(
			query.source_chain,
			query.source_ecosystem,
			default_standard(query.source_ecosystem),
		),
		destination: ChainRef::new(
			query.destination_chain,
			query.destination_ecosystem,
			default_standard(query.destination_ecosystem),
		),
		sell_token: String::new(),
		buy_token: String::new(),
		sell_amount: Amount::from("1"),
		taker: String::new(),
		recipient: None,
		slippage_bps: None,
		deadline: None,
		aggregator: None,
		approval_strategy: None,
		swap_type: query.swap_type,
	};

	let analysis = state.classifier.analyze(&request)?;
	Ok(ApiResponse::ok(analysis))
}

fn default_standard(ecosystem: Ecosystem) -> TokenStandard {
	match ecosystem {
		Ecosystem::Evm | Ecosystem::Avalanche => TokenStandard::Erc20,
		Ecosystem::Solana => TokenStandard::Spl,
		Ecosystem::Cosmos | Ecosystem::Terra => TokenStandard::CosmosNative,
		Ecosystem::Thorchain => TokenStandard::Rune,
		Ecosystem::Maya => TokenStandard::Cacao,
		Ecosystem::Bitcoin | Ecosystem::Substrate | Ecosystem::Near => TokenStandard::Native,
	}
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EcosystemInfo {
	pub name: Ecosystem,
	pub default_standard: TokenStandard,
	pub native_family: bool,
	pub evm_compatible: bool,
}

/// GET /swap-analysis/ecosystems
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/swap-analysis/ecosystems",
	responses((status = 200, description = "Static ecosystem catalogue")),
	tag = "swap-analysis"
))]
pub async fn get_ecosystems() -> Json<ApiResponse<Vec<EcosystemInfo>>> {
	let catalogue = Ecosystem::all()
		.iter()
		.map(|&ecosystem| EcosystemInfo {
			name: ecosystem,
			default_standard: default_standard(ecosystem),
			native_family: ecosystem.is_native_family(),
			evm_compatible: ecosystem.is_evm_compatible(),
		})
		.collect();

	ApiResponse::ok(catalogue)
}
