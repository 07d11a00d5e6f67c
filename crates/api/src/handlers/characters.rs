//! Handlers for the `/characters` resource.
//!
//! The roster always contains the quick-generations bucket; it is listed
//! alongside regular characters but cannot be deleted.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use charstudio_core::error::CoreError;
use charstudio_core::model::Character;
use charstudio_core::types::CharacterId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCharacter {
    pub name: String,
}

/// Full roster plus the current selection, in one payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterList {
    pub characters: Vec<Character>,
    pub selected_id: Option<CharacterId>,
}

/// GET /api/v1/characters
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let list = CharacterList {
        characters: store.characters().to_vec(),
        selected_id: store.selected_character_id(),
    };
    Ok(Json(DataResponse { data: list }))
}

/// POST /api/v1/characters
///
/// Creates a character with an empty image set and selects it.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCharacter>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.store.write().await;
    let id = store
        .add_character(&input.name)
        .ok_or_else(|| AppError::Core(CoreError::Validation(
            "Character name must not be blank".to_string(),
        )))?;

    tracing::info!(character_id = %id, name = %input.name.trim(), "Character created");

    let character = store
        .character(id)
        .cloned()
        .ok_or_else(|| AppError::InternalError("Character vanished after insert".to_string()))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: character })))
}

/// GET /api/v1/characters/selected
pub async fn get_selected(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    Ok(Json(DataResponse {
        data: store.selected_character().cloned(),
    }))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<CharacterId>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let character = store
        .character(id)
        .cloned()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id,
        }))?;
    Ok(Json(DataResponse { data: character }))
}

/// DELETE /api/v1/characters/{id}
///
/// Deleting a character discards its images; generation results that
/// arrive afterwards are dropped. The quick-generations bucket refuses
/// deletion with a conflict.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<CharacterId>,
) -> AppResult<StatusCode> {
    let mut store = state.store.write().await;
    let character = store.character(id).ok_or(AppError::Core(CoreError::NotFound {
        entity: "Character",
        id,
    }))?;
    if character.is_quick_bucket() {
        return Err(AppError::Core(CoreError::Conflict(
            "The quick-generations bucket cannot be deleted".to_string(),
        )));
    }

    store.delete_character(id);
    tracing::info!(character_id = %id, "Character deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/characters/{id}/select
pub async fn select(
    State(state): State<AppState>,
    Path(id): Path<CharacterId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.store.write().await;
    if !store.select_character(id) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id,
        }));
    }
    let character = store
        .character(id)
        .cloned()
        .ok_or_else(|| AppError::InternalError("Selected character not found".to_string()))?;
    Ok(Json(DataResponse { data: character }))
}
