//! Orchestration of generation, edit, enhance, and regenerate requests.
//!
//! Translates one user action into one or more generation API calls and
//! merges the results into the store. Locks are never held across the
//! API calls; every merge re-checks that the target character still
//! exists, so a call that completes after the character was deleted
//! becomes a no-op instead of resurrecting state.

use charstudio_core::aspect::{AspectRatio, ImageCount};
use charstudio_core::data_url;
use charstudio_core::error::CoreError;
use charstudio_core::model::{GeneratedImage, Image, NewGeneratedImage, QUICK_GENERATIONS_ID};
use charstudio_core::types::{CharacterId, ImageId};
use charstudio_genai::{GenAiError, GeneratedPayload, PromptPart};

use crate::engine::batch::join_settled;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Fixed instruction used by the enhance action. Not user-editable.
pub const ENHANCE_INSTRUCTION: &str = "Upscale this image to a higher resolution. \
    Enhance details, sharpness, and clarity without altering the subject or composition. \
    Generate a photorealistic high-quality version.";

/// A batch generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub count: ImageCount,
}

fn require_non_blank(text: &str, what: &str) -> AppResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(AppError::Core(CoreError::Validation(format!(
            "{what} must not be blank"
        ))))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Assemble the multimodal part list: every reference image in order,
/// then the prompt with the aspect-ratio phrasing folded in (the
/// multimodal path has no ratio parameter).
fn build_parts(
    references: &[Image],
    prompt: &str,
    aspect_ratio: AspectRatio,
) -> AppResult<Vec<PromptPart>> {
    let mut parts = Vec::with_capacity(references.len() + 1);
    for reference in references {
        parts.push(PromptPart::from_image(reference).map_err(AppError::Core)?);
    }
    parts.push(PromptPart::Text(format!(
        "{prompt}{}",
        aspect_ratio.prompt_suffix()
    )));
    Ok(parts)
}

/// A batch where every call failed. A key that was never configured is a
/// configuration problem, not an upstream one; surface it as itself so
/// the client sees 503 rather than a generation failure.
fn batch_failure(failures: Vec<GenAiError>) -> AppError {
    if failures
        .iter()
        .all(|f| matches!(f, GenAiError::MissingApiKey))
    {
        return AppError::Generation(GenAiError::MissingApiKey);
    }
    AppError::AllGenerationsFailed(failures)
}

/// Merge batch successes into the store, tolerating a character deleted
/// mid-flight (the merge is then dropped). Returns the created rows,
/// most recent first.
async fn merge_batch(
    state: &AppState,
    character_id: CharacterId,
    prompt: &str,
    aspect_ratio: AspectRatio,
    successes: Vec<GeneratedPayload>,
) -> Vec<GeneratedImage> {
    let mut store = state.store.write().await;
    let mut ids: Vec<ImageId> = Vec::with_capacity(successes.len());
    for payload in successes {
        let added = store.add_generated_image(
            character_id,
            NewGeneratedImage {
                prompt: prompt.to_string(),
                data_url: payload.data_url,
                parent_id: None,
                aspect_ratio: Some(aspect_ratio),
                usage_metadata: payload.usage_metadata,
            },
        );
        match added {
            Some(id) => ids.push(id),
            None => return Vec::new(),
        }
    }

    let Some(character) = store.character(character_id) else {
        return Vec::new();
    };
    ids.iter()
        .rev()
        .filter_map(|id| character.generated_image(*id).cloned())
        .collect()
}

/// Generate `count` images of a character concurrently.
///
/// At least one success makes the batch a success: each successful call
/// becomes a new generated image and failed calls are only logged. When
/// every call fails, one aggregate error carrying all causes is returned.
pub async fn generate_for_character(
    state: &AppState,
    character_id: CharacterId,
    request: GenerationRequest,
) -> AppResult<Vec<GeneratedImage>> {
    let prompt = require_non_blank(&request.prompt, "Prompt")?;

    let parts = {
        let store = state.store.read().await;
        store.ensure_ready_for_generation(character_id)?;
        let character = store
            .character(character_id)
            .ok_or(CoreError::NotFound { entity: "Character", id: character_id })?;
        build_parts(&character.reference_images, &prompt, request.aspect_ratio)?
    };

    let calls = (0..request.count.as_usize()).map(|_| state.generator.generate_multimodal(&parts));
    let outcome = join_settled(calls).await;

    if outcome.all_failed() {
        return Err(batch_failure(outcome.failures));
    }
    for failure in &outcome.failures {
        tracing::warn!(%character_id, error = %failure, "Generation call failed within batch");
    }

    Ok(merge_batch(
        state,
        character_id,
        &prompt,
        request.aspect_ratio,
        outcome.successes,
    )
    .await)
}

/// Standalone generation: same knobs, text-only model path, results
/// attributed to the quick-generations bucket.
pub async fn quick_generate(
    state: &AppState,
    request: GenerationRequest,
) -> AppResult<Vec<GeneratedImage>> {
    let prompt = require_non_blank(&request.prompt, "Prompt")?;

    let calls = (0..request.count.as_usize())
        .map(|_| state.generator.generate_from_text(&prompt, request.aspect_ratio));
    let outcome = join_settled(calls).await;

    if outcome.all_failed() {
        return Err(batch_failure(outcome.failures));
    }
    for failure in &outcome.failures {
        tracing::warn!(error = %failure, "Quick generation call failed within batch");
    }

    Ok(merge_batch(
        state,
        QUICK_GENERATIONS_ID,
        &prompt,
        request.aspect_ratio,
        outcome.successes,
    )
    .await)
}

/// Apply a free-text edit to one generated image. The result becomes a
/// child of the source; a failure surfaces the underlying cause verbatim.
pub async fn edit_image(
    state: &AppState,
    character_id: CharacterId,
    image_id: ImageId,
    instruction: &str,
) -> AppResult<GeneratedImage> {
    let instruction = require_non_blank(instruction, "Edit instruction")?;

    let (source_prompt, source_data_url) = {
        let store = state.store.read().await;
        let source = find_generated(&store, character_id, image_id)?;
        (source.prompt.clone(), source.data_url.clone())
    };

    let parts = vec![
        PromptPart::from_data_url(&source_data_url).map_err(AppError::Core)?,
        PromptPart::Text(instruction.clone()),
    ];
    let payload = state.generator.generate_multimodal(&parts).await?;

    let prompt = format!("Edit: {instruction} (from original: {source_prompt})");
    merge_derived(state, character_id, Some(image_id), prompt, None, payload).await
}

/// Enhance is edit with a fixed, quality-tuned instruction.
pub async fn enhance_image(
    state: &AppState,
    character_id: CharacterId,
    image_id: ImageId,
) -> AppResult<GeneratedImage> {
    edit_image(state, character_id, image_id, ENHANCE_INSTRUCTION).await
}

/// Re-issue the generation that produced `image_id`, yielding a sibling:
/// the new image shares the source's parent rather than being its child,
/// keeping regenerations grouped at the same lineage level.
///
/// Uses the source's stored prompt, the character's *current* reference
/// images, and the source's aspect ratio -- stored when the source was a
/// direct generation, otherwise recovered from its pixel dimensions
/// (square when recovery fails).
pub async fn regenerate_image(
    state: &AppState,
    character_id: CharacterId,
    image_id: ImageId,
) -> AppResult<GeneratedImage> {
    let (prompt, parent_id, aspect_ratio, parts) = {
        let store = state.store.read().await;
        let source = find_generated(&store, character_id, image_id)?;
        let aspect_ratio = source.aspect_ratio.unwrap_or_else(|| {
            data_url::probe_dimensions(&source.data_url)
                .map(|(w, h)| AspectRatio::from_dimensions(w, h))
                .unwrap_or_default()
        });

        let parts = if character_id == QUICK_GENERATIONS_ID {
            None
        } else {
            store.ensure_ready_for_generation(character_id)?;
            let character = store
                .character(character_id)
                .ok_or(CoreError::NotFound { entity: "Character", id: character_id })?;
            Some(build_parts(
                &character.reference_images,
                &source.prompt,
                aspect_ratio,
            )?)
        };
        (source.prompt.clone(), source.parent_id, aspect_ratio, parts)
    };

    let payload = match &parts {
        Some(parts) => state.generator.generate_multimodal(parts).await?,
        // Quick-bucket images have no references; re-issue on the text path.
        None => state.generator.generate_from_text(&prompt, aspect_ratio).await?,
    };

    merge_derived(
        state,
        character_id,
        parent_id,
        prompt,
        Some(aspect_ratio),
        payload,
    )
    .await
}

/// Look up a generated image, mapping both misses to `NotFound`.
fn find_generated<'a>(
    store: &'a charstudio_core::store::CharacterStore,
    character_id: CharacterId,
    image_id: ImageId,
) -> AppResult<&'a GeneratedImage> {
    let character = store
        .character(character_id)
        .ok_or(CoreError::NotFound { entity: "Character", id: character_id })?;
    Ok(character
        .generated_image(image_id)
        .ok_or(CoreError::NotFound { entity: "GeneratedImage", id: image_id })?)
}

/// Merge a single derived result, failing with `NotFound` if the
/// character was deleted while the call was in flight.
async fn merge_derived(
    state: &AppState,
    character_id: CharacterId,
    parent_id: Option<ImageId>,
    prompt: String,
    aspect_ratio: Option<AspectRatio>,
    payload: GeneratedPayload,
) -> AppResult<GeneratedImage> {
    let mut store = state.store.write().await;
    let id = store
        .add_generated_image(
            character_id,
            NewGeneratedImage {
                prompt,
                data_url: payload.data_url,
                parent_id,
                aspect_ratio,
                usage_metadata: payload.usage_metadata,
            },
        )
        .ok_or(CoreError::NotFound { entity: "Character", id: character_id })?;

    let image = store
        .character(character_id)
        .and_then(|c| c.generated_image(id))
        .cloned()
        .ok_or_else(|| AppError::InternalError("Generated image vanished after insert".into()))?;
    Ok(image)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
