//! Handlers for generated images under a character: batch generation,
//! edits, enhance, regenerate, and lineage queries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use charstudio_core::aspect::{AspectRatio, ImageCount};
use charstudio_core::error::CoreError;
use charstudio_core::lineage;
use charstudio_core::model::GeneratedImage;
use charstudio_core::types::{CharacterId, ImageId};

use crate::engine::{self, GenerationRequest};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub count: ImageCount,
}

impl From<GenerateBody> for GenerationRequest {
    fn from(body: GenerateBody) -> Self {
        GenerationRequest {
            prompt: body.prompt,
            aspect_ratio: body.aspect_ratio,
            count: body.count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditBody {
    pub instruction: String,
}

/// The focal image's immediate neighbourhood in the derivation forest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageResponse {
    pub parent: Option<GeneratedImage>,
    pub children: Vec<GeneratedImage>,
}

/// POST /api/v1/characters/{id}/generations
pub async fn create(
    State(state): State<AppState>,
    Path(character_id): Path<CharacterId>,
    Json(body): Json<GenerateBody>,
) -> AppResult<impl IntoResponse> {
    let images = engine::generate_for_character(&state, character_id, body.into()).await?;
    tracing::info!(%character_id, count = images.len(), "Generation batch completed");
    Ok((StatusCode::CREATED, Json(DataResponse { data: images })))
}

/// GET /api/v1/characters/{id}/generations
pub async fn list(
    State(state): State<AppState>,
    Path(character_id): Path<CharacterId>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let character = store
        .character(character_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        }))?;
    Ok(Json(DataResponse {
        data: character.generated_images.clone(),
    }))
}

/// DELETE /api/v1/characters/{id}/generations/{image_id}
///
/// Children of the removed image are kept; they become lineage roots.
pub async fn delete(
    State(state): State<AppState>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> AppResult<StatusCode> {
    let mut store = state.store.write().await;
    ensure_image_exists(&store, character_id, image_id)?;
    store.delete_generated_image(character_id, image_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/characters/{id}/generations/{image_id}/edits
pub async fn edit(
    State(state): State<AppState>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
    Json(body): Json<EditBody>,
) -> AppResult<impl IntoResponse> {
    let image = engine::edit_image(&state, character_id, image_id, &body.instruction).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// POST /api/v1/characters/{id}/generations/{image_id}/enhance
pub async fn enhance(
    State(state): State<AppState>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> AppResult<impl IntoResponse> {
    let image = engine::enhance_image(&state, character_id, image_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// POST /api/v1/characters/{id}/generations/{image_id}/regenerate
pub async fn regenerate(
    State(state): State<AppState>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> AppResult<impl IntoResponse> {
    let image = engine::regenerate_image(&state, character_id, image_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// GET /api/v1/characters/{id}/generations/{image_id}/lineage
pub async fn get_lineage(
    State(state): State<AppState>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let character = store
        .character(character_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        }))?;
    if character.generated_image(image_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "GeneratedImage",
            id: image_id,
        }));
    }

    let found = lineage::lineage_of(&character.generated_images, image_id);
    let response = LineageResponse {
        parent: found.parent.cloned(),
        children: found.children.into_iter().cloned().collect(),
    };
    Ok(Json(DataResponse { data: response }))
}

fn ensure_image_exists(
    store: &charstudio_core::store::CharacterStore,
    character_id: CharacterId,
    image_id: ImageId,
) -> AppResult<()> {
    let character = store
        .character(character_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        }))?;
    if character.generated_image(image_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "GeneratedImage",
            id: image_id,
        }));
    }
    Ok(())
}
