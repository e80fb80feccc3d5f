use serde::Deserialize;

use crate::image_gen_core::error::{ImageGenError, TransportError};
use crate::provider_laozhang::response::api_parse_error;

#[derive(Debug, Clone, Deserialize)]
pub struct LaozhangErrorInner {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaozhangErrorData {
    pub error: LaozhangErrorInner,
}

/// Map a transport failure into the domain taxonomy.
///
/// `timeout_message` is what the caller sees on timeout; it differs between generation and chat.
pub fn map_transport_error(te: TransportError, timeout_message: &str) -> ImageGenError {
    match te {
        TransportError::Timeout(_) => ImageGenError::Timeout {
            message: timeout_message.to_string(),
        },
        TransportError::Network(message) | TransportError::Other(message) => {
            ImageGenError::Network { message }
        }
        TransportError::HttpStatus { status: 401, .. } => ImageGenError::Unauthorized,
        TransportError::HttpStatus {
            status: 429,
            retry_after_ms,
            ..
        } => ImageGenError::RateLimited { retry_after_ms },
        TransportError::HttpStatus { status, body, .. } => ImageGenError::Upstream {
            status,
            message: upstream_message(status, &body),
        },
        TransportError::BodyRead(detail) => api_parse_error(detail),
    }
}

/// `error.message` from a JSON error body, else the raw body text.
fn upstream_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<LaozhangErrorData>(body) {
        return parsed.error.message;
    }
    if body.trim().is_empty() {
        format!("http status {}", status)
    } else {
        body.to_string()
    }
}
