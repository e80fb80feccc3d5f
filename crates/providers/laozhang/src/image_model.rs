
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::image_gen_core::error::ImageGenError;
use crate::image_gen_core::image::{generate_images, ImageModel, ImageResponse, ImageResponseMeta};
use crate::image_gen_core::transport::{HttpTransport, TransportConfig};
use crate::image_gen_types::image::{GenerationRequest, PromptVariationRequest};

use crate::provider_laozhang::config::{LaozhangConfig, DEFAULT_IMAGE_MODEL_ID};
use crate::provider_laozhang::error::map_transport_error;
use crate::provider_laozhang::request::build_generation_body;
use crate::provider_laozhang::response::extract_images;
use crate::provider_laozhang::variations;

const GENERATION_TIMEOUT_MESSAGE: &str =
    "Request timed out. Try a smaller image size or simpler prompt.";
const CHAT_TIMEOUT_MESSAGE: &str = "Prompt variation request timed out.";

pub struct LaozhangImageModel<T: HttpTransport = crate::reqwest_transport::ReqwestTransport> {
    model_id: String,
    cfg: LaozhangConfig<T>,
}

impl<T: HttpTransport> LaozhangImageModel<T> {
    pub fn new(model_id: impl Into<String>, cfg: LaozhangConfig<T>) -> Self {
        Self {
            model_id: model_id.into(),
            cfg,
        }
    }

    pub fn with_default_model(cfg: LaozhangConfig<T>) -> Self {
        Self::new(DEFAULT_IMAGE_MODEL_ID, cfg)
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(auth) = self.cfg.credentials.as_bearer() {
            headers.push(("Authorization".to_string(), auth));
        }
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        headers
    }

    async fn post(
        &self,
        url: &str,
        body: &JsonValue,
        transport_cfg: &TransportConfig,
        timeout_message: &str,
    ) -> Result<JsonValue, ImageGenError> {
        self.cfg
            .http
            .post_json(url, &self.headers(), body, transport_cfg)
            .await
            .map_err(|te| {
                let err = map_transport_error(te, timeout_message);
                debug!(target: "image_gen::laozhang", %url, error = %err, "request failed");
                err
            })
    }

    /// POST a `generateContent` body and return the parsed response.
    pub async fn post_generation(&self, body: &JsonValue) -> Result<JsonValue, ImageGenError> {
        let url = self.cfg.generation_url(&self.model_id);
        self.post(
            &url,
            body,
            &self.cfg.generation_transport_cfg,
            GENERATION_TIMEOUT_MESSAGE,
        )
        .await
    }

    /// POST a chat completion body and return the parsed response.
    pub async fn post_chat(&self, body: &JsonValue) -> Result<JsonValue, ImageGenError> {
        let url = self.cfg.chat_url();
        self.post(&url, body, &self.cfg.chat_transport_cfg, CHAT_TIMEOUT_MESSAGE)
            .await
    }

    /// Generate `num_images` images, one backend call each.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        num_images: usize,
    ) -> Result<Vec<Vec<u8>>, ImageGenError> {
        generate_images(self, request, num_images).await
    }

    /// Ask the chat model for `count` rewrites of a prompt.
    pub async fn generate_prompt_variations(
        &self,
        request: &PromptVariationRequest,
    ) -> Result<Vec<String>, ImageGenError> {
        variations::validate(request)?;
        let body = variations::build_variation_body(&self.cfg.chat_model_id, request);
        let response = self.post_chat(&body).await?;
        let prompts = variations::parse_variations(&response, request.count)?;
        debug!(
            target: "image_gen::laozhang",
            count = prompts.len(),
            diversity = request.diversity,
            "prompt variations generated"
        );
        Ok(prompts)
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport> ImageModel for LaozhangImageModel<T> {
    fn provider_name(&self) -> &'static str {
        "laozhang"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ImageResponse, ImageGenError> {
        let body = build_generation_body(request);
        debug!(
            target: "image_gen::laozhang",
            model = %self.model_id,
            aspect_ratio = request.aspect_ratio.as_str(),
            size = request.size.as_str(),
            reference_images = request.reference_images.len(),
            "posting generateContent"
        );
        let response = self.post_generation(&body).await?;
        let images = extract_images(&response)?;
        Ok(ImageResponse {
            images,
            response: ImageResponseMeta {
                model_id: self.model_id.clone(),
            },
        })
    }

    async fn close(&self) {
        self.cfg.http.close().await;
    }
}
