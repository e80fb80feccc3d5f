use crate::image_gen_core::error::ImageGenError;
use crate::image_gen_types::image::GenerationRequest;

#[derive(Debug, Clone)]
pub struct ImageResponseMeta {
    /// Model that served the call, as reported by the provider.
    pub model_id: String,
}

/// Decoded result of a single backend call.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    /// Raw image bytes in encounter order. Never empty.
    pub images: Vec<Vec<u8>>,
    pub response: ImageResponseMeta,
}

#[async_trait::async_trait]
pub trait ImageModel: Send + Sync {
    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
    /// Provider-specific model identifier.
    fn model_id(&self) -> &str;
    /// Issue exactly one backend generation call.
    async fn do_generate(&self, request: &GenerationRequest)
        -> Result<ImageResponse, ImageGenError>;

    /// Release any held network resources. Idempotent.
    async fn close(&self) {}
}

/// Generate `num_images` images with one backend call per image.
///
/// Calls are issued one after another. The first failure aborts the whole operation and images
/// produced by earlier calls are dropped. Only the first image of each response is kept.
pub async fn generate_images(
    model: &dyn ImageModel,
    request: &GenerationRequest,
    num_images: usize,
) -> Result<Vec<Vec<u8>>, ImageGenError> {
    if num_images == 0 {
        return Err(ImageGenError::invalid_argument(
            "num_images must be at least 1",
        ));
    }

    let mut images = Vec::with_capacity(num_images);
    for index in 0..num_images {
        tracing::debug!(
            target: "image_gen::core::image",
            provider = model.provider_name(),
            model = model.model_id(),
            call = index + 1,
            total = num_images,
            "issuing generation call"
        );
        let response = model.do_generate(request).await?;
        tracing::debug!(
            target: "image_gen::core::image",
            served_by = %response.response.model_id,
            images = response.images.len(),
            call = index + 1,
            "generation call completed"
        );
        let first = response
            .images
            .into_iter()
            .next()
            .ok_or_else(|| {
                ImageGenError::decode("Failed to parse API response: No images found in API response")
            })?;
        images.push(first);
    }
    Ok(images)
}
