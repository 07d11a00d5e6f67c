//! Handlers for standalone generation without a defined character.
//!
//! Results land in the quick-generations bucket; per-image actions
//! (edit, enhance, regenerate, lineage, delete) go through the
//! `/characters` routes using the bucket's id.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use charstudio_core::model::QUICK_GENERATIONS_ID;

use crate::engine;
use crate::error::AppResult;
use crate::handlers::generation::GenerateBody;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/quick-generations
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> AppResult<impl IntoResponse> {
    let images = engine::quick_generate(&state, body.into()).await?;
    tracing::info!(count = images.len(), "Quick generation batch completed");
    Ok((StatusCode::CREATED, Json(DataResponse { data: images })))
}

/// GET /api/v1/quick-generations
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let images = store
        .character(QUICK_GENERATIONS_ID)
        .map(|c| c.generated_images.clone())
        .unwrap_or_default();
    Ok(Json(DataResponse { data: images }))
}
