use crate::image_gen_core::error::ImageGenError;
use crate::image_gen_core::image::{ImageModel, ImageResponse, ImageResponseMeta};
use crate::image_gen_storage::ImageStore;
use crate::image_gen_types::image::GenerationRequest;
use crate::tools::{
    GenerateImageParams, GenerateMultipleParams, GenerateVariationsParams, ImageTools,
    ListImagesParams, ToolCallError,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeModel {
    script: Mutex<VecDeque<Result<Vec<u8>, ImageGenError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeModel {
    fn with(script: Vec<Result<Vec<u8>, ImageGenError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageModel for FakeModel {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_id(&self) -> &str {
        "fake-image"
    }

    async fn do_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ImageResponse, ImageGenError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ImageGenError::decode("script exhausted")));
        next.map(|bytes| ImageResponse {
            images: vec![bytes],
            response: ImageResponseMeta {
                model_id: "fake-image".into(),
            },
        })
    }
}

fn tools(model: Arc<FakeModel>, dir: &std::path::Path) -> ImageTools {
    ImageTools::new(model, ImageStore::new(dir))
}

fn single(prompt: &str) -> GenerateImageParams {
    serde_json::from_value(json!({ "prompt": prompt })).expect("params")
}

#[tokio::test]
async fn generate_image_saves_and_reports() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let model = FakeModel::with(vec![Ok(vec![1u8; 1536])]);
    let out = tools(model.clone(), tmp.path())
        .generate_image(single("A cute robot waving"))
        .await;

    assert!(!out.is_error, "{}", out.text);
    assert!(out.text.starts_with("Image generated successfully!\n\n**File:** "));
    assert!(out.text.contains("_cute_robot_waving.jpg\n**Path:** "));
    assert!(out.text.contains("**Size:** 1.5 KB\n\n"));
    assert!(out
        .text
        .ends_with("The image has been saved to your Obsidian vault's AI graphics folder."));

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].aspect_ratio.as_str(), "1:1");
    assert_eq!(requests[0].size.as_str(), "2K");
    assert_eq!(std::fs::read_dir(tmp.path()).expect("dir").count(), 1);
}

#[tokio::test]
async fn invalid_ratio_and_size_are_rejected_before_generation() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let model = FakeModel::with(vec![]);
    let tools = tools(model.clone(), tmp.path());

    let out = tools
        .generate_image(GenerateImageParams {
            aspect_ratio: "7:3".into(),
            ..single("fox")
        })
        .await;
    assert!(out.is_error);
    assert_eq!(
        out.text,
        "Error: Invalid aspect ratio '7:3'. Valid options: 1:1, 16:9, 9:16, 4:3, 3:4, 3:2, 2:3, 21:9, 9:21, 5:4"
    );

    let out = tools
        .generate_image(GenerateImageParams {
            size: "8K".into(),
            ..single("fox")
        })
        .await;
    assert_eq!(out.text, "Error: Invalid size '8K'. Valid options: 1K, 2K, 4K");
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn generation_errors_are_rendered() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let model = FakeModel::with(vec![Err(ImageGenError::Unauthorized)]);
    let out = tools(model, tmp.path()).generate_image(single("fox")).await;
    assert!(out.is_error);
    assert_eq!(out.text, "Error generating image: Invalid API key");
}

#[tokio::test]
async fn generate_multiple_clamps_count_and_names_versions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let model = FakeModel::with(vec![Ok(vec![1; 100]), Ok(vec![2; 100]), Ok(vec![3; 100])]);
    let params: GenerateMultipleParams =
        serde_json::from_value(json!({ "prompt": "mountain lake", "count": 1 })).expect("params");
    let out = tools(model.clone(), tmp.path())
        .generate_multiple(params)
        .await;

    assert!(!out.is_error, "{}", out.text);
    assert_eq!(model.requests().len(), 2);
    let lines: Vec<&str> = out.text.lines().collect();
    assert_eq!(lines[0], "Generated 2 variations!");
    assert_eq!(lines[1], "");
    assert!(lines[2].starts_with("- **") && lines[2].ends_with("_mountain_lake_v1.jpg** (100.0 B)"));
    assert!(lines[3].ends_with("_mountain_lake_v2.jpg** (100.0 B)"));
    assert_eq!(lines[5], "**Total size:** 200.0 B");
    assert_eq!(lines[6], format!("**Location:** {}", tmp.path().display()));
}

#[tokio::test]
async fn generate_multiple_caps_at_four_and_fails_whole_batch() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let model = FakeModel::with(vec![
        Ok(vec![1]),
        Err(ImageGenError::RateLimited {
            retry_after_ms: None,
        }),
    ]);
    let params: GenerateMultipleParams =
        serde_json::from_value(json!({ "prompt": "fox", "count": 9 })).expect("params");
    let out = tools(model.clone(), tmp.path())
        .generate_multiple(params)
        .await;
    assert_eq!(
        out.text,
        "Error generating images: Rate limit exceeded. Please wait before trying again."
    );
    assert_eq!(model.requests().len(), 2);
    assert_eq!(std::fs::read_dir(tmp.path()).expect("dir").count(), 0);
}

#[tokio::test]
async fn generate_variations_validates_paths() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let model = FakeModel::with(vec![]);
    let tools = tools(model.clone(), tmp.path());

    let none: GenerateVariationsParams =
        serde_json::from_value(json!({ "image_paths": [], "prompt": "x" })).expect("params");
    assert_eq!(
        tools.generate_variations(none).await.text,
        "Error: At least one image path is required"
    );

    let too_many: GenerateVariationsParams = serde_json::from_value(json!({
        "image_paths": vec!["a.png"; 15],
        "prompt": "x"
    }))
    .expect("params");
    assert_eq!(
        tools.generate_variations(too_many).await.text,
        "Error: Maximum 14 reference images supported"
    );

    let missing = tmp.path().join("missing.png").display().to_string();
    let params: GenerateVariationsParams =
        serde_json::from_value(json!({ "image_paths": [missing.clone()], "prompt": "x" }))
            .expect("params");
    assert_eq!(
        tools.generate_variations(params).await.text,
        format!("Error: Image not found: {missing}")
    );

    let dir = tmp.path().display().to_string();
    let params: GenerateVariationsParams =
        serde_json::from_value(json!({ "image_paths": [dir.clone()], "prompt": "x" }))
            .expect("params");
    assert_eq!(
        tools.generate_variations(params).await.text,
        format!("Error: Not a file: {dir}")
    );
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn generate_variations_sends_references_in_order() {
    let refs = tempfile::tempdir().expect("tempdir");
    let out_dir = tempfile::tempdir().expect("tempdir");
    let png = refs.path().join("a.png");
    let jpg = refs.path().join("b.jpg");
    std::fs::write(&png, [0x89, 0x50, 0x4E, 0x47, 0x0D]).expect("write png");
    std::fs::write(&jpg, [0xFF, 0xD8, 0xFF, 0xE0]).expect("write jpg");

    let model = FakeModel::with(vec![Ok(vec![9; 10])]);
    let params: GenerateVariationsParams = serde_json::from_value(json!({
        "image_paths": [png.display().to_string(), jpg.display().to_string()],
        "prompt": "watercolor harbor",
        "count": 0,
        "aspect_ratio": "16:9",
        "size": "1K"
    }))
    .expect("params");
    let out = tools(model.clone(), out_dir.path())
        .generate_variations(params)
        .await;

    assert!(!out.is_error, "{}", out.text);
    assert!(out
        .text
        .starts_with("Generated 1 variations from 2 reference image(s)!\n"));
    assert!(out.text.contains("_watercolor_harbor.jpg** (10.0 B)"));

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    let refs = &requests[0].reference_images;
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].media_type, "image/png");
    assert_eq!(refs[1].media_type, "image/jpeg");
    assert_eq!(requests[0].aspect_ratio.as_str(), "16:9");
    assert_eq!(requests[0].size.as_str(), "1K");
}

#[tokio::test]
async fn several_variations_use_var_suffix() {
    let refs = tempfile::tempdir().expect("tempdir");
    let out_dir = tempfile::tempdir().expect("tempdir");
    let png = refs.path().join("a.png");
    std::fs::write(&png, [0x89, 0x50, 0x4E, 0x47]).expect("write png");

    let model = FakeModel::with(vec![Ok(vec![1]), Ok(vec![2]), Ok(vec![3])]);
    let params: GenerateVariationsParams = serde_json::from_value(json!({
        "image_paths": [png.display().to_string()],
        "prompt": "harbor",
        "count": 3
    }))
    .expect("params");
    let out = tools(model, out_dir.path()).generate_variations(params).await;
    for i in 1..=3 {
        assert!(out.text.contains(&format!("_harbor_var{i}.jpg**")), "{}", out.text);
    }
}

#[tokio::test]
async fn listing_reports_empty_and_populated_folder() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tools = tools(FakeModel::with(vec![]), tmp.path());

    let out = tools.list_generated_images(ListImagesParams::default());
    assert_eq!(out.text, format!("No images found in {}", tmp.path().display()));

    std::fs::write(tmp.path().join("one.png"), [0u8; 2048]).expect("write");
    let out = tools.list_generated_images(ListImagesParams { limit: 5 });
    let lines: Vec<&str> = out.text.lines().collect();
    assert_eq!(lines[0], "**Recent images in AI graphics folder** (showing 1):");
    assert!(lines[2].starts_with("- **one.png** | "));
    assert!(lines[2].ends_with(" | 2.0 KB"));
    assert_eq!(lines[4], format!("**Folder:** {}", tmp.path().display()));
}

#[tokio::test]
async fn call_dispatches_by_name_and_rejects_bad_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tools = tools(FakeModel::with(vec![]), tmp.path());

    let out = tools
        .call("list_generated_images", serde_json::Value::Null)
        .await
        .expect("dispatch");
    assert!(out.text.starts_with("No images found in "));

    let err = tools.call("draw", json!({})).await.unwrap_err();
    assert!(matches!(err, ToolCallError::UnknownTool(ref name) if name == "draw"));

    let err = tools
        .call("generate_image", json!({ "size": "2K" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolCallError::InvalidArguments { .. }));
}

#[test]
fn descriptors_cover_every_tool() {
    let names: Vec<&str> = ImageTools::descriptors().iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        vec![
            "generate_image",
            "generate_multiple",
            "generate_variations",
            "list_generated_images"
        ]
    );
    let variations = &ImageTools::descriptors()[2];
    assert_eq!(
        variations.input_schema["required"],
        json!(["image_paths", "prompt"])
    );
    assert_eq!(
        variations.input_schema["properties"]["aspect_ratio"]["enum"][0],
        "1:1"
    );
}
