use std::time::Duration;
use thiserror::Error;

/// Domain error surfaced to the calling agent. Every variant renders a message that can be shown
/// verbatim.
#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("{message}")]
    Timeout { message: String },
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Invalid API key")]
    Unauthorized,
    #[error("Rate limit exceeded. Please wait before trying again.")]
    RateLimited {
        /// Milliseconds suggested by Retry-After if present
        retry_after_ms: Option<u64>,
    },
    #[error("API error: {message}")]
    Upstream { status: u16, message: String },
    #[error("{message}")]
    Decode { message: String },
    #[error("Expected {expected} variations, got {actual}")]
    VariationCountMismatch { expected: usize, actual: usize },
    #[error("{message}")]
    InvalidArgument { message: String },
}

impl ImageGenError {
    pub fn decode(message: impl Into<String>) -> Self {
        ImageGenError::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ImageGenError::InvalidArgument {
            message: message.into(),
        }
    }

    /// HTTP status associated with the failure, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ImageGenError::Unauthorized => Some(401),
            ImageGenError::RateLimited { .. } => Some(429),
            ImageGenError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure reported by an `HttpTransport` before any provider-specific interpretation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http status {status}: {sanitized}")]
    HttpStatus {
        status: u16,
        /// upstream body (should be treated as sensitive; only log sanitized)
        body: String,
        /// Retry-After header (ms) if available
        retry_after_ms: Option<u64>,
        sanitized: String,
    },
    #[error("{0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("body read error: {0}")]
    BodyRead(String),
    #[error("other: {0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub fn build_http_status_transport_error(
    status: u16,
    body: String,
    retry_after_ms: Option<u64>,
) -> TransportError {
    let sanitized = display_body_for_error(&body);
    TransportError::HttpStatus {
        status,
        body,
        retry_after_ms,
        sanitized,
    }
}

/// Short form of an upstream body that is safe to put in logs.
pub fn display_body_for_error(body: &str) -> String {
    let trimmed = body.trim();
    let looks_like_json = trimmed.starts_with('{') || trimmed.starts_with('[');
    if looks_like_json {
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(v) => v.to_string(),
            Err(_) => format!("{} bytes", body.len()),
        }
    } else {
        format!("{} bytes", body.len())
    }
}
