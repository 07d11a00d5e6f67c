//! Handlers for reference image uploads under a character.
//!
//! Uploads arrive as multipart files and are stored re-encoded as data
//! URLs. A batch is all-or-nothing: every part must be a readable image
//! and the combined total must stay within the per-character cap before
//! anything is applied.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use charstudio_core::data_url;
use charstudio_core::error::CoreError;
use charstudio_core::model::{Image, MAX_REFERENCE_IMAGES};
use charstudio_core::types::{CharacterId, ImageId};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Infer a MIME type when the multipart part carries none.
fn mime_for(content_type: Option<&str>, filename: &str) -> String {
    if let Some(ct) = content_type {
        return ct.to_string();
    }
    match filename.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("webp") => "image/webp".to_string(),
        _ => "image/png".to_string(),
    }
}

/// POST /api/v1/characters/{id}/reference-images
///
/// Accepts one or more image files; returns the character's full
/// reference list after the append.
pub async fn upload(
    State(state): State<AppState>,
    Path(character_id): Path<CharacterId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let existing = {
        let store = state.store.read().await;
        store
            .character(character_id)
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Character",
                id: character_id,
            }))?
            .reference_images
            .len()
    };

    // Decode every part before touching the store.
    let mut images: Vec<Image> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime = mime_for(field.content_type(), &filename);
        if !mime.starts_with("image/") {
            return Err(AppError::Core(CoreError::Validation(format!(
                "'{filename}' is not an image ({mime})"
            ))));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if bytes.is_empty() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "'{filename}' is empty"
            ))));
        }

        images.push(Image {
            id: uuid::Uuid::new_v4(),
            data_url: data_url::encode(&mime, &bytes),
        });
    }

    if images.is_empty() {
        return Err(AppError::BadRequest(
            "No image files in upload".to_string(),
        ));
    }
    if existing + images.len() > MAX_REFERENCE_IMAGES {
        return Err(AppError::Core(CoreError::Validation(format!(
            "A character holds at most {MAX_REFERENCE_IMAGES} reference images ({existing} present, {} uploaded)",
            images.len(),
        ))));
    }

    let added = images.len();
    let mut store = state.store.write().await;
    if !store.add_reference_images(character_id, images) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        }));
    }

    tracing::info!(%character_id, count = added, "Reference images added");

    let references = store
        .character(character_id)
        .map(|c| c.reference_images.clone())
        .unwrap_or_default();
    Ok((StatusCode::CREATED, Json(DataResponse { data: references })))
}

/// DELETE /api/v1/characters/{id}/reference-images/{image_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> AppResult<StatusCode> {
    let mut store = state.store.write().await;
    let character = store
        .character(character_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        }))?;
    if !character.reference_images.iter().any(|img| img.id == image_id) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ReferenceImage",
            id: image_id,
        }));
    }

    store.delete_reference_image(character_id, image_id);
    Ok(StatusCode::NO_CONTENT)
}
