//! Read-side lineage queries over a character's generated images.
//!
//! Edit, enhance, and regenerate calls link new images to the image they
//! were derived from, forming a forest. No index is persisted; queries
//! recompute from the flat list on demand. [`ChildIndex`] exists for
//! callers that need every image's children in one pass.

use std::collections::HashMap;

use crate::model::GeneratedImage;
use crate::types::ImageId;

/// Parent and direct children of a focal generated image.
///
/// A `parent_id` that no longer resolves (the parent was deleted) yields
/// `parent: None`; the focal image is then a lineage root.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineage<'a> {
    pub parent: Option<&'a GeneratedImage>,
    pub children: Vec<&'a GeneratedImage>,
}

/// Resolve the lineage of `focal_id` within one character's image list.
pub fn lineage_of(images: &[GeneratedImage], focal_id: ImageId) -> Lineage<'_> {
    let parent = images
        .iter()
        .find(|img| img.id == focal_id)
        .and_then(|focal| focal.parent_id)
        .and_then(|parent_id| images.iter().find(|img| img.id == parent_id));

    let children = images
        .iter()
        .filter(|img| img.parent_id == Some(focal_id))
        .collect();

    Lineage { parent, children }
}

/// `parent_id -> children` index built in a single pass, for callers
/// walking many lineages over a large history.
#[derive(Debug, Default)]
pub struct ChildIndex<'a> {
    children: HashMap<ImageId, Vec<&'a GeneratedImage>>,
}

impl<'a> ChildIndex<'a> {
    pub fn build(images: &'a [GeneratedImage]) -> Self {
        let mut children: HashMap<ImageId, Vec<&'a GeneratedImage>> = HashMap::new();
        for img in images {
            if let Some(parent_id) = img.parent_id {
                children.entry(parent_id).or_default().push(img);
            }
        }
        Self { children }
    }

    pub fn children_of(&self, id: ImageId) -> &[&'a GeneratedImage] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
