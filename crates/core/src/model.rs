//! The character/image data model.
//!
//! Characters own two independent image lists: the reference images the
//! user uploaded to establish the character's visual identity, and the
//! images produced by generation calls. Generated images carry the prompt
//! that produced them plus an optional parent link forming an edit-lineage
//! forest within the owning character.

use serde::{Deserialize, Serialize};

use crate::aspect::AspectRatio;
use crate::types::{CharacterId, ImageId, Timestamp};

/// Character id reserved for the "Quick Generations" bucket.
///
/// Created once at store initialization and never deletable; standalone
/// (character-free) generations are attributed to it.
pub const QUICK_GENERATIONS_ID: CharacterId = uuid::Uuid::nil();

/// Display name of the quick-generations bucket.
pub const QUICK_GENERATIONS_NAME: &str = "Quick Generations";

/// Minimum number of reference images a character needs before
/// generation is permitted.
pub const MIN_REFERENCE_IMAGES: usize = 3;

/// Maximum number of reference images per character. Enforced at the
/// upload boundary, not by the store.
pub const MAX_REFERENCE_IMAGES: usize = 10;

/// A user-supplied reference image. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    /// Self-contained `data:<mime>;base64,<payload>` string.
    pub data_url: String,
}

/// Token-count accounting returned by the generation API for one image.
///
/// A closed record with named numeric fields; paths that do not report
/// usage simply leave the whole struct absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

/// An image produced by a generation, edit, enhance, or regenerate call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: ImageId,
    /// Owning character (may be [`QUICK_GENERATIONS_ID`]).
    pub character_id: CharacterId,
    /// The prompt text that produced this image.
    pub prompt: String,
    pub data_url: String,
    /// The image this one was derived from via edit/enhance. A dangling
    /// value (parent since deleted) is treated as "no parent" by lineage
    /// queries, never as an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ImageId>,
    /// Aspect ratio as originally requested. Absent for edit/enhance
    /// outputs, which inherit whatever the model returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    pub created_at: Timestamp,
}

/// Inputs for creating a [`GeneratedImage`]; the store assigns the id
/// and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewGeneratedImage {
    pub prompt: String,
    pub data_url: String,
    pub parent_id: Option<ImageId>,
    pub aspect_ratio: Option<AspectRatio>,
    pub usage_metadata: Option<UsageMetadata>,
}

/// A named character with its reference and generated image lists.
///
/// `generated_images` is kept most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub reference_images: Vec<Image>,
    pub generated_images: Vec<GeneratedImage>,
}

impl Character {
    /// Whether this is the protected quick-generations bucket.
    pub fn is_quick_bucket(&self) -> bool {
        self.id == QUICK_GENERATIONS_ID
    }

    /// Whether enough reference images are present for generation.
    pub fn is_ready_for_generation(&self) -> bool {
        self.reference_images.len() >= MIN_REFERENCE_IMAGES
    }

    /// Look up a generated image by id.
    pub fn generated_image(&self, id: ImageId) -> Option<&GeneratedImage> {
        self.generated_images.iter().find(|img| img.id == id)
    }
}
