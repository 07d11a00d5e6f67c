//! Handler for the session usage and cost summary.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use charstudio_core::usage::UsageTotals;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Token totals plus the derived cost estimate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    #[serde(flatten)]
    pub totals: UsageTotals,
    pub estimated_cost_usd: f64,
}

/// GET /api/v1/usage
///
/// Recomputed from the full image set on every request; images whose
/// usage metadata never arrived count toward `imageCount` only.
pub async fn get(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let totals = UsageTotals::aggregate(store.all_generated_images());
    let report = UsageReport {
        estimated_cost_usd: totals.estimated_cost_usd(),
        totals,
    };
    Ok(Json(DataResponse { data: report }))
}
