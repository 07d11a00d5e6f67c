//! Handlers for downloading generated images, singly or as a zip archive.

use std::io::Write;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use charstudio_core::data_url;
use charstudio_core::error::CoreError;
use charstudio_core::export;
use charstudio_core::types::{CharacterId, ImageId};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/characters/{id}/generations/{image_id}/download
///
/// Streams the decoded image bytes as an attachment named after the
/// character and the prompt.
pub async fn download_image(
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
    let image = character
        .generated_image(image_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "GeneratedImage",
            id: image_id,
        }))?;

    let (mime, bytes) = data_url::decode(&image.data_url)?;
    let filename = export::download_filename(&character.name, &image.prompt);

    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/characters/{id}/generations/archive
///
/// Bundles every generated image of the character into one zip, entries
/// numbered in display order (most recent first). Image payloads are
/// already compressed, so entries are stored rather than deflated.
pub async fn download_archive(
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
    if character.generated_images.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No generated images to archive".to_string(),
        )));
    }

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut cursor);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (position, image) in character.generated_images.iter().enumerate() {
        let (_, bytes) = data_url::decode(&image.data_url)?;
        writer
            .start_file(export::archive_entry_name(position, &image.prompt), options)
            .map_err(|e| AppError::InternalError(format!("Failed to write archive entry: {e}")))?;
        writer
            .write_all(&bytes)
            .map_err(|e| AppError::InternalError(format!("Failed to write archive entry: {e}")))?;
    }
    writer
        .finish()
        .map_err(|e| AppError::InternalError(format!("Failed to finalize archive: {e}")))?;

    let filename = format!("{}_images.zip", export::character_slug(&character.name));

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        cursor.into_inner(),
    ))
}
