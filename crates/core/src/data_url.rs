//! Codec for `data:<mime>;base64,<payload>` strings.
//!
//! All images move through the system as self-contained data URLs: uploads
//! are encoded on the way in, the generation API's base64 payloads are
//! wrapped on the way out, and downloads decode back to raw bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::GenericImageView;

use crate::error::CoreError;

/// Encode raw image bytes as a data URL.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Wrap an already-base64-encoded payload as a data URL.
pub fn from_base64(mime_type: &str, payload: &str) -> String {
    format!("data:{mime_type};base64,{payload}")
}

/// Split a data URL into its MIME type and base64 payload without decoding.
///
/// Useful when the payload is forwarded to the generation API, which takes
/// base64 directly.
pub fn split(data_url: &str) -> Result<(&str, &str), CoreError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| CoreError::Validation("Not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::Validation("Data URL has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| CoreError::Validation("Data URL is not base64-encoded".to_string()))?;
    Ok((mime_type, payload))
}

/// Decode a data URL into its MIME type and raw bytes.
pub fn decode(data_url: &str) -> Result<(String, Vec<u8>), CoreError> {
    let (mime_type, payload) = split(data_url)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))?;
    Ok((mime_type.to_string(), bytes))
}

/// Decode a data URL and read the pixel dimensions of the image it carries.
pub fn probe_dimensions(data_url: &str) -> Result<(u32, u32), CoreError> {
    let (_, bytes) = decode(data_url)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| CoreError::Validation(format!("Undecodable image payload: {e}")))?;
    Ok(img.dimensions())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
