//! In-memory character store.
//!
//! Single source of truth for the session's character collection.
//! Operations are synchronous state transitions; the store assumes a
//! single logical writer (the API layer serialises access behind a lock).
//! Asynchronous flows (uploads, generation calls) must re-check that
//! their target character still exists when they merge a late result,
//! which every `add_*` method does internally by turning a missing
//! character into a no-op.

use crate::error::CoreError;
use crate::model::{
    Character, GeneratedImage, Image, NewGeneratedImage, MIN_REFERENCE_IMAGES,
    QUICK_GENERATIONS_ID, QUICK_GENERATIONS_NAME,
};
use crate::types::{CharacterId, ImageId};

/// The session's character collection plus the current selection.
#[derive(Debug, Clone)]
pub struct CharacterStore {
    characters: Vec<Character>,
    selected_id: Option<CharacterId>,
}

impl Default for CharacterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterStore {
    /// Create a store holding only the quick-generations bucket, selected.
    pub fn new() -> Self {
        let quick = Character {
            id: QUICK_GENERATIONS_ID,
            name: QUICK_GENERATIONS_NAME.to_string(),
            reference_images: Vec::new(),
            generated_images: Vec::new(),
        };
        Self {
            characters: vec![quick],
            selected_id: Some(QUICK_GENERATIONS_ID),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn selected_character_id(&self) -> Option<CharacterId> {
        self.selected_id
    }

    /// The currently selected character, or `None` if the selection does
    /// not resolve.
    pub fn selected_character(&self) -> Option<&Character> {
        self.selected_id.and_then(|id| self.character(id))
    }

    /// Fail with [`CoreError::Validation`] if the character does not have
    /// enough reference images for generation.
    pub fn ensure_ready_for_generation(&self, id: CharacterId) -> Result<(), CoreError> {
        let character = self
            .character(id)
            .ok_or(CoreError::NotFound { entity: "Character", id })?;
        if character.is_ready_for_generation() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Character '{}' has {} reference images; at least {MIN_REFERENCE_IMAGES} are required before generating",
                character.name,
                character.reference_images.len(),
            )))
        }
    }

    // -----------------------------------------------------------------------
    // Character mutations
    // -----------------------------------------------------------------------

    /// Create a character and select it. A blank or whitespace-only name
    /// is a silent no-op returning `None`.
    pub fn add_character(&mut self, name: &str) -> Option<CharacterId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = uuid::Uuid::new_v4();
        self.characters.push(Character {
            id,
            name: name.to_string(),
            reference_images: Vec::new(),
            generated_images: Vec::new(),
        });
        self.selected_id = Some(id);
        Some(id)
    }

    /// Delete a character. The quick-generations bucket and unknown ids
    /// are silent no-ops. If the deleted character was selected, the
    /// selection moves to the first remaining non-sentinel character,
    /// falling back to the sentinel.
    pub fn delete_character(&mut self, id: CharacterId) {
        if id == QUICK_GENERATIONS_ID {
            return;
        }
        let before = self.characters.len();
        self.characters.retain(|c| c.id != id);
        if self.characters.len() == before {
            return;
        }
        if self.selected_id == Some(id) {
            self.selected_id = self
                .characters
                .iter()
                .find(|c| !c.is_quick_bucket())
                .map(|c| c.id)
                .or(Some(QUICK_GENERATIONS_ID));
        }
    }

    /// Select a character. Returns `false` (selection unchanged) if the
    /// id does not resolve.
    pub fn select_character(&mut self, id: CharacterId) -> bool {
        if self.character(id).is_some() {
            self.selected_id = Some(id);
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Reference images
    // -----------------------------------------------------------------------

    /// Append decoded reference images in the order provided. Returns
    /// `false` (nothing applied) if the character no longer exists --
    /// the decode happens asynchronously and the character may have been
    /// deleted in the interim.
    pub fn add_reference_images(
        &mut self,
        character_id: CharacterId,
        images: Vec<Image>,
    ) -> bool {
        match self.character_mut(character_id) {
            Some(character) => {
                character.reference_images.extend(images);
                true
            }
            None => {
                tracing::debug!(%character_id, "Dropping reference images for deleted character");
                false
            }
        }
    }

    /// Remove a reference image. No-op if the character or image is missing.
    pub fn delete_reference_image(&mut self, character_id: CharacterId, image_id: ImageId) {
        if let Some(character) = self.character_mut(character_id) {
            character.reference_images.retain(|img| img.id != image_id);
        }
    }

    // -----------------------------------------------------------------------
    // Generated images
    // -----------------------------------------------------------------------

    /// Create a generated image and prepend it (most-recent-first order).
    /// Returns `None` (no-op) if the character no longer exists, which
    /// covers generation calls that complete after a delete.
    pub fn add_generated_image(
        &mut self,
        character_id: CharacterId,
        new: NewGeneratedImage,
    ) -> Option<ImageId> {
        match self.character_mut(character_id) {
            Some(character) => {
                let id = uuid::Uuid::new_v4();
                character.generated_images.insert(
                    0,
                    GeneratedImage {
                        id,
                        character_id,
                        prompt: new.prompt,
                        data_url: new.data_url,
                        parent_id: new.parent_id,
                        aspect_ratio: new.aspect_ratio,
                        usage_metadata: new.usage_metadata,
                        created_at: chrono::Utc::now(),
                    },
                );
                Some(id)
            }
            None => {
                tracing::debug!(%character_id, "Dropping generated image for deleted character");
                None
            }
        }
    }

    /// Remove a generated image. No-op on a missing character or image.
    /// Children referencing the removed image keep their `parent_id`;
    /// lineage queries treat the dangling link as "no parent".
    pub fn delete_generated_image(&mut self, character_id: CharacterId, image_id: ImageId) {
        if let Some(character) = self.character_mut(character_id) {
            character.generated_images.retain(|img| img.id != image_id);
        }
    }

    /// All generated images across every character, for usage aggregation.
    pub fn all_generated_images(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.characters.iter().flat_map(|c| c.generated_images.iter())
    }

    fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::AspectRatio;

    fn new_image(new: &str) -> Image {
        Image {
            id: uuid::Uuid::new_v4(),
            data_url: format!("data:image/png;base64,{new}"),
        }
    }

    fn new_generated(prompt: &str) -> NewGeneratedImage {
        NewGeneratedImage {
            prompt: prompt.to_string(),
            data_url: "data:image/png;base64,AAAA".to_string(),
            parent_id: None,
            aspect_ratio: Some(AspectRatio::Square),
            usage_metadata: None,
        }
    }

    // -- initialization --

    #[test]
    fn new_store_holds_only_the_quick_bucket() {
        let store = CharacterStore::new();
        assert_eq!(store.characters().len(), 1);
        let quick = store.character(QUICK_GENERATIONS_ID).unwrap();
        assert_eq!(quick.name, QUICK_GENERATIONS_NAME);
        assert!(quick.reference_images.is_empty());
        assert!(quick.generated_images.is_empty());
        assert_eq!(store.selected_character_id(), Some(QUICK_GENERATIONS_ID));
    }

    // -- add_character --

    #[test]
    fn add_character_creates_empty_selected_character() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        assert_eq!(store.characters().len(), 2);
        let character = store.character(id).unwrap();
        assert_eq!(character.name, "Nova");
        assert!(character.reference_images.is_empty());
        assert!(character.generated_images.is_empty());
        assert_eq!(store.selected_character_id(), Some(id));
    }

    #[test]
    fn add_character_trims_the_name() {
        let mut store = CharacterStore::new();
        let id = store.add_character("  Nova  ").unwrap();
        assert_eq!(store.character(id).unwrap().name, "Nova");
    }

    #[test]
    fn blank_names_are_a_no_op() {
        let mut store = CharacterStore::new();
        assert!(store.add_character("").is_none());
        assert!(store.add_character("   ").is_none());
        assert_eq!(store.characters().len(), 1);
        assert_eq!(store.selected_character_id(), Some(QUICK_GENERATIONS_ID));
    }

    // -- delete_character --

    #[test]
    fn delete_character_removes_it() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        store.delete_character(id);
        assert!(store.character(id).is_none());
        assert_eq!(store.characters().len(), 1);
    }

    #[test]
    fn quick_bucket_cannot_be_deleted() {
        let mut store = CharacterStore::new();
        store.delete_character(QUICK_GENERATIONS_ID);
        assert_eq!(store.characters().len(), 1);
        assert!(store.character(QUICK_GENERATIONS_ID).is_some());
    }

    #[test]
    fn deleting_selected_reselects_first_non_sentinel() {
        let mut store = CharacterStore::new();
        let first = store.add_character("First").unwrap();
        let second = store.add_character("Second").unwrap();
        store.delete_character(second);
        assert_eq!(store.selected_character_id(), Some(first));
    }

    #[test]
    fn deleting_last_character_falls_back_to_sentinel() {
        let mut store = CharacterStore::new();
        let only = store.add_character("Only").unwrap();
        store.delete_character(only);
        assert_eq!(store.selected_character_id(), Some(QUICK_GENERATIONS_ID));
    }

    #[test]
    fn deleting_unselected_keeps_selection() {
        let mut store = CharacterStore::new();
        let first = store.add_character("First").unwrap();
        let second = store.add_character("Second").unwrap();
        store.select_character(second);
        store.delete_character(first);
        assert_eq!(store.selected_character_id(), Some(second));
    }

    #[test]
    fn delete_unknown_character_is_a_no_op() {
        let mut store = CharacterStore::new();
        store.add_character("Nova");
        let len = store.characters().len();
        store.delete_character(uuid::Uuid::new_v4());
        assert_eq!(store.characters().len(), len);
    }

    // -- selection --

    #[test]
    fn select_unknown_character_is_rejected() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        assert!(!store.select_character(uuid::Uuid::new_v4()));
        assert_eq!(store.selected_character_id(), Some(id));
    }

    #[test]
    fn selected_character_resolves() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        assert_eq!(store.selected_character().unwrap().id, id);
    }

    // -- reference images --

    #[test]
    fn reference_images_append_in_order() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        let a = new_image("aa");
        let b = new_image("bb");
        assert!(store.add_reference_images(id, vec![a.clone(), b.clone()]));
        let refs = &store.character(id).unwrap().reference_images;
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id, a.id);
        assert_eq!(refs[1].id, b.id);
    }

    #[test]
    fn reference_images_for_deleted_character_are_dropped() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        store.delete_character(id);
        assert!(!store.add_reference_images(id, vec![new_image("aa")]));
    }

    #[test]
    fn delete_reference_image_removes_only_the_target() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        let a = new_image("aa");
        let b = new_image("bb");
        store.add_reference_images(id, vec![a.clone(), b.clone()]);
        store.delete_reference_image(id, a.id);
        let refs = &store.character(id).unwrap().reference_images;
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, b.id);
    }

    #[test]
    fn delete_missing_reference_image_is_a_no_op() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        store.add_reference_images(id, vec![new_image("aa")]);
        store.delete_reference_image(id, uuid::Uuid::new_v4());
        assert_eq!(store.character(id).unwrap().reference_images.len(), 1);
    }

    // -- generation readiness --

    #[test]
    fn generation_requires_minimum_references() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        store.add_reference_images(id, vec![new_image("aa"), new_image("bb")]);
        assert!(store.ensure_ready_for_generation(id).is_err());

        store.add_reference_images(id, vec![new_image("cc")]);
        assert!(store.ensure_ready_for_generation(id).is_ok());
    }

    #[test]
    fn generation_readiness_for_unknown_character_is_not_found() {
        let store = CharacterStore::new();
        let err = store
            .ensure_ready_for_generation(uuid::Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    // -- generated images --

    #[test]
    fn generated_images_prepend_most_recent_first() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        let first = store.add_generated_image(id, new_generated("first")).unwrap();
        let second = store
            .add_generated_image(id, new_generated("second"))
            .unwrap();
        let images = &store.character(id).unwrap().generated_images;
        assert_eq!(images[0].id, second);
        assert_eq!(images[1].id, first);
    }

    #[test]
    fn generated_image_for_deleted_character_is_dropped() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        store.delete_character(id);
        assert!(store.add_generated_image(id, new_generated("late")).is_none());
    }

    #[test]
    fn delete_generated_image_does_not_cascade_to_children() {
        let mut store = CharacterStore::new();
        let id = store.add_character("Nova").unwrap();
        let parent = store.add_generated_image(id, new_generated("root")).unwrap();
        let mut child = new_generated("child");
        child.parent_id = Some(parent);
        let child_a = store.add_generated_image(id, child.clone()).unwrap();
        let child_b = store.add_generated_image(id, child).unwrap();

        store.delete_generated_image(id, parent);

        let images = &store.character(id).unwrap().generated_images;
        assert_eq!(images.len(), 2);
        for child_id in [child_a, child_b] {
            let child = images.iter().find(|img| img.id == child_id).unwrap();
            assert_eq!(child.parent_id, Some(parent));
        }
    }

    #[test]
    fn all_generated_images_spans_characters() {
        let mut store = CharacterStore::new();
        let a = store.add_character("A").unwrap();
        let b = store.add_character("B").unwrap();
        store.add_generated_image(a, new_generated("one"));
        store.add_generated_image(b, new_generated("two"));
        store.add_generated_image(QUICK_GENERATIONS_ID, new_generated("quick"));
        assert_eq!(store.all_generated_images().count(), 3);
    }
}
