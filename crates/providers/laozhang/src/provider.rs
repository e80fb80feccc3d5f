use crate::image_gen_core::transport::TransportConfig;
use crate::image_gen_core::ImageGenError;
use crate::image_gen_provider::Settings;
use crate::provider_laozhang::config::{LaozhangConfig, DEFAULT_IMAGE_MODEL_ID};
use crate::provider_laozhang::image_model::LaozhangImageModel;
use crate::reqwest_transport::ReqwestTransport;

/// Build the production image model from settings.
pub fn build_laozhang_image_model(
    settings: &Settings,
) -> Result<LaozhangImageModel<ReqwestTransport>, ImageGenError> {
    if settings.credentials.as_bearer().is_none() {
        return Err(ImageGenError::invalid_argument("API key is required"));
    }
    let http = ReqwestTransport::new(&TransportConfig::default());
    let cfg = LaozhangConfig::new(settings.credentials.clone(), http);
    Ok(LaozhangImageModel::new(DEFAULT_IMAGE_MODEL_ID, cfg))
}
