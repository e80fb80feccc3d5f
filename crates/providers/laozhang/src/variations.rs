use serde_json::{json, Value as JsonValue};

use crate::image_gen_core::error::ImageGenError;
use crate::image_gen_types::image::PromptVariationRequest;

pub(crate) fn validate(request: &PromptVariationRequest) -> Result<(), ImageGenError> {
    if request.count == 0 {
        return Err(ImageGenError::invalid_argument(
            "count must be at least 1",
        ));
    }
    if !(0.0..=1.0).contains(&request.diversity) {
        return Err(ImageGenError::invalid_argument(format!(
            "diversity must be between 0.0 and 1.0, got {}",
            request.diversity
        )));
    }
    Ok(())
}

pub(crate) fn system_instruction(count: usize, diversity: f32) -> String {
    format!(
        "You generate variations of image prompts. Diversity level: {diversity:.1}\n\n\
         - 0.0-0.3 (low): Subtle changes - lighting, time of day, minor details\n\
         - 0.4-0.6 (medium): Change style, mood, setting, or composition\n\
         - 0.7-1.0 (high): Creative reinterpretation, keep core subject\n\n\
         Generate exactly {count} variations. Return JSON only:\n\
         {{\"variations\": [\"prompt1\", \"prompt2\", ...]}}"
    )
}

pub(crate) fn temperature(diversity: f32) -> f64 {
    0.7 + f64::from(diversity) * 0.3
}

pub(crate) fn build_variation_body(model_id: &str, request: &PromptVariationRequest) -> JsonValue {
    json!({
        "model": model_id,
        "messages": [
            {
                "role": "system",
                "content": system_instruction(request.count, request.diversity),
            },
            { "role": "user", "content": request.base_prompt },
        ],
        "response_format": { "type": "json_object" },
        "temperature": temperature(request.diversity),
    })
}

pub(crate) fn parse_variations(
    response: &JsonValue,
    expected: usize,
) -> Result<Vec<String>, ImageGenError> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| llm_parse_error("missing choices[0].message.content"))?;

    let parsed: JsonValue =
        serde_json::from_str(strip_code_fence(content)).map_err(llm_parse_error)?;

    let variations = match parsed.get("variations") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| llm_parse_error("variation is not a string"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(llm_parse_error("variations is not an array")),
    };

    if variations.len() != expected {
        return Err(ImageGenError::VariationCountMismatch {
            expected,
            actual: variations.len(),
        });
    }
    Ok(variations)
}

fn llm_parse_error(detail: impl std::fmt::Display) -> ImageGenError {
    ImageGenError::decode(format!("Failed to parse LLM response: {detail}"))
}

// Some chat models wrap JSON mode output in a markdown fence anyway.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
