//! Token-usage aggregation and cost estimation.
//!
//! A derived, recomputed-on-read aggregate over the full generated-image
//! set. Images lacking usage metadata contribute zero tokens but still
//! count toward the image total. Rates are fixed display-side estimates,
//! never transmitted anywhere.

use serde::Serialize;

use crate::model::GeneratedImage;

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Estimated cost per one million prompt tokens, in USD.
pub const INPUT_COST_PER_MILLION_USD: f64 = 0.35;
/// Estimated cost per one million output tokens, in USD.
pub const OUTPUT_COST_PER_MILLION_USD: f64 = 0.70;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Aggregated usage across a set of generated images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    /// Total number of generated images seen.
    pub image_count: u64,
    /// How many of them carried usage metadata.
    pub images_with_usage: u64,
    pub prompt_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl UsageTotals {
    /// Sum usage across `images`.
    pub fn aggregate<'a>(images: impl IntoIterator<Item = &'a GeneratedImage>) -> Self {
        let mut totals = Self::default();
        for image in images {
            totals.image_count += 1;
            if let Some(usage) = &image.usage_metadata {
                totals.images_with_usage += 1;
                totals.prompt_tokens += usage.prompt_token_count;
                totals.output_tokens += usage.candidates_token_count;
                totals.total_tokens += usage.total_token_count;
            }
        }
        totals
    }

    /// Estimated spend in USD at the fixed per-million-token rates.
    pub fn estimated_cost_usd(&self) -> f64 {
        self.prompt_tokens as f64 / TOKENS_PER_MILLION * INPUT_COST_PER_MILLION_USD
            + self.output_tokens as f64 / TOKENS_PER_MILLION * OUTPUT_COST_PER_MILLION_USD
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UsageMetadata;

    fn image(usage: Option<UsageMetadata>) -> GeneratedImage {
        GeneratedImage {
            id: uuid::Uuid::new_v4(),
            character_id: uuid::Uuid::nil(),
            prompt: "p".to_string(),
            data_url: "data:image/png;base64,AAAA".to_string(),
            parent_id: None,
            aspect_ratio: None,
            usage_metadata: usage,
            created_at: chrono::Utc::now(),
        }
    }

    fn usage(prompt: u64, candidates: u64) -> UsageMetadata {
        UsageMetadata {
            prompt_token_count: prompt,
            candidates_token_count: candidates,
            total_token_count: prompt + candidates,
        }
    }

    #[test]
    fn empty_set_aggregates_to_zero() {
        let totals = UsageTotals::aggregate([]);
        assert_eq!(totals, UsageTotals::default());
        assert_eq!(totals.estimated_cost_usd(), 0.0);
    }

    #[test]
    fn images_without_metadata_count_but_contribute_no_tokens() {
        let images = vec![
            image(Some(usage(60, 40))),
            image(None),
            image(Some(usage(30, 20))),
        ];
        let totals = UsageTotals::aggregate(&images);

        assert_eq!(totals.image_count, 3);
        assert_eq!(totals.images_with_usage, 2);
        assert_eq!(totals.prompt_tokens, 90);
        assert_eq!(totals.output_tokens, 60);
        assert_eq!(totals.total_tokens, 150);
    }

    #[test]
    fn cost_uses_both_rates() {
        let images = vec![image(Some(usage(1_000_000, 2_000_000)))];
        let totals = UsageTotals::aggregate(&images);
        let expected = INPUT_COST_PER_MILLION_USD + 2.0 * OUTPUT_COST_PER_MILLION_USD;
        assert!((totals.estimated_cost_usd() - expected).abs() < 1e-9);
    }

    #[test]
    fn aggregation_is_a_pure_recomputation() {
        let images = vec![image(Some(usage(10, 5))), image(None)];
        assert_eq!(
            UsageTotals::aggregate(&images),
            UsageTotals::aggregate(&images)
        );
    }
}
