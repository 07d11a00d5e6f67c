//! Aspect-ratio and batch-size policy for generation requests.
//!
//! Both knobs are closed enums: the generation API accepts a fixed set of
//! ratio strings on the text path, and the multimodal path has no ratio
//! parameter at all, so the ratio is folded into the prompt text instead.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Aspect ratio
// ---------------------------------------------------------------------------

/// Supported output aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// All supported ratios, in display order.
    pub const ALL: [AspectRatio; 3] = [Self::Square, Self::Landscape, Self::Portrait];

    /// The wire string the text-generation API expects (`"1:1"`, ...).
    pub fn api_value(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Width/height as a ratio.
    fn numeric(self) -> f64 {
        match self {
            Self::Square => 1.0,
            Self::Landscape => 16.0 / 9.0,
            Self::Portrait => 9.0 / 16.0,
        }
    }

    /// Phrasing appended to multimodal prompts, which have no independent
    /// aspect-ratio parameter.
    pub fn prompt_suffix(self) -> &'static str {
        match self {
            Self::Square => " The image must have a square 1:1 aspect ratio.",
            Self::Landscape => " The image must have a wide landscape 16:9 aspect ratio.",
            Self::Portrait => " The image must have a tall portrait 9:16 aspect ratio.",
        }
    }

    /// Snap pixel dimensions to the nearest supported ratio.
    ///
    /// Used to recover the ratio of images that never had a requested one
    /// (edit/enhance outputs). Distance is measured in log space so that
    /// 16:9 and 9:16 are equally far from 1:1. Degenerate or perfectly
    /// ambiguous dimensions fall back to square.
    pub fn from_dimensions(width: u32, height: u32) -> AspectRatio {
        if width == 0 || height == 0 {
            return Self::Square;
        }
        let ratio = (width as f64 / height as f64).ln();
        let mut best = Self::Square;
        let mut best_dist = (ratio - Self::Square.numeric().ln()).abs();
        for candidate in [Self::Landscape, Self::Portrait] {
            let dist = (ratio - candidate.numeric().ln()).abs();
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Batch size
// ---------------------------------------------------------------------------

/// Number of images requested in a single generation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(into = "u32", try_from = "u32")]
pub enum ImageCount {
    #[default]
    One,
    Two,
    Four,
}

impl ImageCount {
    pub fn as_usize(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

impl From<ImageCount> for u32 {
    fn from(count: ImageCount) -> u32 {
        count.as_usize() as u32
    }
}

impl TryFrom<u32> for ImageCount {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, CoreError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(CoreError::Validation(format!(
                "Unsupported image count {other}. Must be 1, 2, or 4"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
