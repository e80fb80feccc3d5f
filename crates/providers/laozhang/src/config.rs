use std::time::Duration;

use crate::image_gen_core::transport::{HttpTransport, TransportConfig};
use crate::image_gen_provider::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://api.laozhang.ai";
pub const DEFAULT_IMAGE_MODEL_ID: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_CHAT_MODEL_ID: &str = "gpt-4o-mini";

pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct LaozhangConfig<T: HttpTransport> {
    pub base_url: String,
    pub chat_model_id: String,
    pub credentials: Credentials,
    pub http: T,
    /// Used for `generateContent` calls.
    pub generation_transport_cfg: TransportConfig,
    /// Used for chat completion calls.
    pub chat_transport_cfg: TransportConfig,
}

impl<T: HttpTransport> LaozhangConfig<T> {
    pub fn new(credentials: Credentials, http: T) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model_id: DEFAULT_CHAT_MODEL_ID.to_string(),
            credentials,
            http,
            generation_transport_cfg: TransportConfig::default()
                .with_request_timeout(GENERATION_TIMEOUT),
            chat_transport_cfg: TransportConfig::default().with_request_timeout(CHAT_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_chat_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.chat_model_id = model_id.into();
        self
    }

    pub fn generation_url(&self, model_id: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model_id
        )
    }

    pub fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
