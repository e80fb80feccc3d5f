use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::image_gen_types::image::{GenerationRequest, ReferenceImage};

/// Build the `generateContent` body for one generation call.
///
/// Reference images become `inlineData` parts in input order and the prompt is always the
/// final part.
pub fn build_generation_body(request: &GenerationRequest) -> JsonValue {
    let mut parts: Vec<JsonValue> = request
        .reference_images
        .iter()
        .map(inline_data_part)
        .collect();
    parts.push(json!({ "text": request.prompt }));

    let mut image_config = JsonMap::new();
    image_config.insert("aspectRatio".into(), json!(request.aspect_ratio.as_str()));
    image_config.insert("imageSize".into(), json!(request.size.as_str()));

    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
            "imageConfig": JsonValue::Object(image_config),
        }
    })
}

fn inline_data_part(image: &ReferenceImage) -> JsonValue {
    json!({
        "inlineData": {
            "mimeType": image.media_type,
            "data": B64.encode(&image.bytes),
        }
    })
}
