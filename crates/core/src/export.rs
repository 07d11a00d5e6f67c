//! Filename derivation for single and bulk image downloads.

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Prompt text is truncated to this many characters before slugging.
pub const MAX_SLUG_SOURCE_CHARS: usize = 40;

/// Zero-pad width for archive entry positions.
const ARCHIVE_INDEX_WIDTH: usize = 3;

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Reduce a prompt to a filesystem-safe slug: the first
/// [`MAX_SLUG_SOURCE_CHARS`] characters, lowercased, with every
/// non-alphanumeric character replaced by `_`. Falls back to `"image"`
/// when nothing survives.
pub fn prompt_slug(prompt: &str) -> String {
    let slug: String = prompt
        .chars()
        .take(MAX_SLUG_SOURCE_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.to_string()
    }
}

/// Slug for a character name: whitespace becomes `_` and anything that
/// could break a `Content-Disposition` filename (quotes, backslashes,
/// control characters) is dropped; the rest passes through with case
/// kept. Falls back to `"character"`.
pub fn character_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_control() || matches!(c, '"' | '\\' | '/') {
                None
            } else {
                Some(c)
            }
        })
        .collect();
    if slug.is_empty() {
        "character".to_string()
    } else {
        slug
    }
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Filename for a single-image download.
pub fn download_filename(character_name: &str, prompt: &str) -> String {
    format!("{}_{}.png", character_slug(character_name), prompt_slug(prompt))
}

/// Entry name inside a bulk-download archive. `position` is the
/// zero-based index of the image in display order.
pub fn archive_entry_name(position: usize, prompt: &str) -> String {
    format!(
        "{:0width$}_{}.png",
        position + 1,
        prompt_slug(prompt),
        width = ARCHIVE_INDEX_WIDTH
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
