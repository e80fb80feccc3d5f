use crate::image_gen_core::error::ImageGenError;
use crate::image_gen_core::image::{generate_images, ImageModel, ImageResponse, ImageResponseMeta};
use crate::image_gen_types::image::GenerationRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

struct ScriptedModel {
    script: Mutex<VecDeque<Result<Vec<Vec<u8>>, ImageGenError>>>,
    calls: Mutex<usize>,
}

impl ScriptedModel {
    fn new(script: Vec<Result<Vec<Vec<u8>>, ImageGenError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ImageModel for ScriptedModel {
    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-image"
    }

    async fn do_generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<ImageResponse, ImageGenError> {
        *self.calls.lock().unwrap() += 1;
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected extra generation call");
        next.map(|images| ImageResponse {
            images,
            response: ImageResponseMeta {
                model_id: "scripted-image".into(),
            },
        })
    }
}

#[tokio::test]
async fn collects_one_image_per_call_in_order() {
    let model = ScriptedModel::new(vec![
        Ok(vec![b"one".to_vec()]),
        Ok(vec![b"two".to_vec()]),
        Ok(vec![b"three".to_vec()]),
    ]);
    let images = generate_images(&model, &GenerationRequest::new("owl"), 3)
        .await
        .unwrap();
    assert_eq!(
        images,
        vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
    );
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn failure_on_second_call_discards_earlier_images() {
    let model = ScriptedModel::new(vec![
        Ok(vec![b"one".to_vec()]),
        Err(ImageGenError::RateLimited {
            retry_after_ms: None,
        }),
        Ok(vec![b"three".to_vec()]),
    ]);
    let result = generate_images(&model, &GenerationRequest::new("owl"), 3).await;
    match result {
        Err(ImageGenError::RateLimited { .. }) => {}
        other => panic!("expected rate limited error, got {other:?}"),
    }
    // the third call is never issued
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn only_first_image_of_a_response_is_kept() {
    let model = ScriptedModel::new(vec![Ok(vec![b"first".to_vec(), b"second".to_vec()])]);
    let images = generate_images(&model, &GenerationRequest::new("owl"), 1)
        .await
        .unwrap();
    assert_eq!(images, vec![b"first".to_vec()]);
}

#[tokio::test]
async fn zero_images_is_rejected_before_any_call() {
    let model = ScriptedModel::new(vec![]);
    let err = generate_images(&model, &GenerationRequest::new("owl"), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::InvalidArgument { .. }));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn empty_response_is_a_decode_failure() {
    let model = ScriptedModel::new(vec![Ok(vec![])]);
    let err = generate_images(&model, &GenerationRequest::new("owl"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::Decode { .. }));
    assert_eq!(
        err.to_string(),
        "Failed to parse API response: No images found in API response"
    );
}
