use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde_json::Value as JsonValue;

use crate::image_gen_core::error::ImageGenError;

/// Decode every inline image carried by a `generateContent` response.
///
/// Candidates and their parts are walked in order. Text parts and inline data with a non-image
/// MIME type are skipped.
pub fn extract_images(response: &JsonValue) -> Result<Vec<Vec<u8>>, ImageGenError> {
    let candidates = response
        .get("candidates")
        .and_then(|v| v.as_array())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| api_parse_error("No candidates in API response"))?;

    let mut images = Vec::new();
    for candidate in candidates {
        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array());
        for part in parts.into_iter().flatten() {
            let Some(inline) = part.get("inlineData") else {
                continue;
            };
            let mime_type = inline
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let data = inline
                .get("data")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if !mime_type.starts_with("image/") || data.is_empty() {
                continue;
            }
            let bytes = B64.decode(data.as_bytes()).map_err(api_parse_error)?;
            images.push(bytes);
        }
    }

    if images.is_empty() {
        return Err(api_parse_error("No images found in API response"));
    }
    Ok(images)
}

pub(crate) fn api_parse_error(detail: impl std::fmt::Display) -> ImageGenError {
    ImageGenError::decode(format!("Failed to parse API response: {detail}"))
}
