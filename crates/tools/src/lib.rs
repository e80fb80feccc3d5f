//! Agent-facing image tools.
//!
//! Every tool returns display text. Failures are rendered into that text rather than surfaced as
//! protocol errors, so the agent always sees a readable explanation.

mod params;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use thiserror::Error;
use tracing::{info, warn};

use crate::image_gen_core::image::{generate_images, ImageModel};
use crate::image_gen_provider::expand_home;
use crate::image_gen_storage::{filename_from_prompt, format_file_size, ImageStore};
use crate::image_gen_types::image::{
    AspectRatio, GeneratedImage, GenerationRequest, ImageSize, ReferenceImage,
};

pub use params::{
    GenerateImageParams, GenerateMultipleParams, GenerateVariationsParams, ListImagesParams,
};

pub const MAX_REFERENCE_IMAGES: usize = 14;

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Name, description and JSON input schema of a tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: JsonValue,
}

#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

pub struct ImageTools {
    model: Arc<dyn ImageModel>,
    store: ImageStore,
}

impl ImageTools {
    pub fn new(model: Arc<dyn ImageModel>, store: ImageStore) -> Self {
        Self { model, store }
    }

    pub fn model(&self) -> &Arc<dyn ImageModel> {
        &self.model
    }

    pub fn descriptors() -> Vec<ToolDescriptor> {
        let ratio_schema = json!({
            "type": "string",
            "enum": AspectRatio::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            "default": "1:1",
            "description": "Image aspect ratio"
        });
        let size_schema = json!({
            "type": "string",
            "enum": ImageSize::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            "default": "2K",
            "description": "Image resolution: 1K (fast), 2K (default), 4K (highest quality)"
        });
        vec![
            ToolDescriptor {
                name: "generate_image",
                description: "Generate a single image from a text prompt.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "Text description of the desired image" },
                        "aspect_ratio": ratio_schema.clone(),
                        "size": size_schema.clone(),
                    },
                    "required": ["prompt"]
                }),
            },
            ToolDescriptor {
                name: "generate_multiple",
                description: "Generate multiple images from the same prompt to explore different interpretations.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "Text description of the desired image" },
                        "count": { "type": "integer", "default": 4, "minimum": 2, "maximum": 4, "description": "Number of images to generate (2-4)" },
                        "aspect_ratio": ratio_schema.clone(),
                        "size": size_schema.clone(),
                    },
                    "required": ["prompt"]
                }),
            },
            ToolDescriptor {
                name: "generate_variations",
                description: "Generate variations based on one or more reference images, guided by a prompt.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "image_paths": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 1,
                            "maxItems": MAX_REFERENCE_IMAGES,
                            "description": "Paths to reference images (1-14)"
                        },
                        "prompt": { "type": "string", "description": "How the reference images should be interpreted or modified" },
                        "count": { "type": "integer", "default": 4, "minimum": 1, "maximum": 4, "description": "Number of variations to generate (1-4)" },
                        "aspect_ratio": ratio_schema.clone(),
                        "size": size_schema.clone(),
                    },
                    "required": ["image_paths", "prompt"]
                }),
            },
            ToolDescriptor {
                name: "list_generated_images",
                description: "List recently generated images in the AI graphics folder.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "limit": { "type": "integer", "default": 20, "minimum": 0, "description": "Maximum number of images to list" }
                    }
                }),
            },
        ]
    }

    /// Dispatch a tool call by name with raw JSON arguments.
    pub async fn call(
        &self,
        name: &str,
        arguments: JsonValue,
    ) -> Result<ToolOutput, ToolCallError> {
        // Clients may send `null` or omit arguments for parameterless calls.
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };
        match name {
            "generate_image" => Ok(self.generate_image(parse_args(name, arguments)?).await),
            "generate_multiple" => Ok(self.generate_multiple(parse_args(name, arguments)?).await),
            "generate_variations" => {
                Ok(self.generate_variations(parse_args(name, arguments)?).await)
            }
            "list_generated_images" => Ok(self.list_generated_images(parse_args(name, arguments)?)),
            other => Err(ToolCallError::UnknownTool(other.to_string())),
        }
    }

    pub async fn generate_image(&self, params: GenerateImageParams) -> ToolOutput {
        let (aspect_ratio, size) = match parse_shape(&params.aspect_ratio, &params.size) {
            Ok(shape) => shape,
            Err(out) => return out,
        };
        let request = GenerationRequest::new(&params.prompt)
            .with_aspect_ratio(aspect_ratio)
            .with_size(size);

        let images = match generate_images(self.model.as_ref(), &request, 1).await {
            Ok(images) => images,
            Err(e) => {
                warn!(target: "image_gen::tools", tool = "generate_image", error = %e, "generation failed");
                return ToolOutput::error(format!("Error generating image: {e}"));
            }
        };
        let Some(first) = images.first() else {
            return ToolOutput::error("Error: No image was generated");
        };

        let filename = filename_from_prompt(&params.prompt, "");
        let saved = match self.store.save_image(first, &filename) {
            Ok(saved) => saved,
            Err(e) => return ToolOutput::error(format!("Unexpected error: {e}")),
        };
        info!(target: "image_gen::tools", tool = "generate_image", file = %saved.filename, "image saved");

        ToolOutput::ok(format!(
            "Image generated successfully!\n\n\
             **File:** {}\n\
             **Path:** {}\n\
             **Size:** {}\n\n\
             The image has been saved to your Obsidian vault's AI graphics folder.",
            saved.filename, saved.path, saved.size_human
        ))
    }

    pub async fn generate_multiple(&self, params: GenerateMultipleParams) -> ToolOutput {
        let count = params.count.clamp(2, 4) as usize;
        let (aspect_ratio, size) = match parse_shape(&params.aspect_ratio, &params.size) {
            Ok(shape) => shape,
            Err(out) => return out,
        };
        let request = GenerationRequest::new(&params.prompt)
            .with_aspect_ratio(aspect_ratio)
            .with_size(size);

        let images = match generate_images(self.model.as_ref(), &request, count).await {
            Ok(images) => images,
            Err(e) => {
                warn!(target: "image_gen::tools", tool = "generate_multiple", error = %e, "generation failed");
                return ToolOutput::error(format!("Error generating images: {e}"));
            }
        };

        let stem = file_stem_for(&params.prompt);
        let names = (1..=images.len()).map(|i| format!("{stem}_v{i}.jpg"));
        let saved = match self.save_all(&images, names) {
            Ok(saved) => saved,
            Err(out) => return out,
        };
        info!(target: "image_gen::tools", tool = "generate_multiple", count = saved.len(), "images saved");

        ToolOutput::ok(self.summary(
            format!("Generated {} variations!\n", saved.len()),
            &saved,
        ))
    }

    pub async fn generate_variations(&self, params: GenerateVariationsParams) -> ToolOutput {
        let count = params.count.clamp(1, 4) as usize;
        if params.image_paths.is_empty() {
            return ToolOutput::error("Error: At least one image path is required");
        }
        if params.image_paths.len() > MAX_REFERENCE_IMAGES {
            return ToolOutput::error("Error: Maximum 14 reference images supported");
        }
        let (aspect_ratio, size) = match parse_shape(&params.aspect_ratio, &params.size) {
            Ok(shape) => shape,
            Err(out) => return out,
        };

        let mut references = Vec::with_capacity(params.image_paths.len());
        for raw in &params.image_paths {
            match load_reference(raw).await {
                Ok(image) => references.push(image),
                Err(out) => return out,
            }
        }
        let reference_count = references.len();
        let request = GenerationRequest::new(&params.prompt)
            .with_aspect_ratio(aspect_ratio)
            .with_size(size)
            .with_reference_images(references);

        let images = match generate_images(self.model.as_ref(), &request, count).await {
            Ok(images) => images,
            Err(e) => {
                warn!(target: "image_gen::tools", tool = "generate_variations", error = %e, "generation failed");
                return ToolOutput::error(format!("Error generating variations: {e}"));
            }
        };

        let stem = file_stem_for(&params.prompt);
        let single = images.len() == 1;
        let names = (1..=images.len()).map(|i| {
            if single {
                format!("{stem}.jpg")
            } else {
                format!("{stem}_var{i}.jpg")
            }
        });
        let saved = match self.save_all(&images, names) {
            Ok(saved) => saved,
            Err(out) => return out,
        };
        info!(
            target: "image_gen::tools",
            tool = "generate_variations",
            count = saved.len(),
            references = reference_count,
            "images saved"
        );

        ToolOutput::ok(self.summary(
            format!(
                "Generated {} variations from {} reference image(s)!\n",
                saved.len(),
                reference_count
            ),
            &saved,
        ))
    }

    pub fn list_generated_images(&self, params: ListImagesParams) -> ToolOutput {
        let dir = self.store.output_dir().display().to_string();
        let items = match self.store.list_images(params.limit) {
            Ok(items) => items,
            Err(e) => return ToolOutput::error(format!("Error listing images: {e}")),
        };
        if items.is_empty() {
            return ToolOutput::ok(format!("No images found in {dir}"));
        }

        let mut lines = vec![format!(
            "**Recent images in AI graphics folder** (showing {}):\n",
            items.len()
        )];
        lines.extend(
            items
                .iter()
                .map(|i| format!("- **{}** | {} | {}", i.filename, i.created, i.size_human)),
        );
        lines.push(format!("\n**Folder:** {dir}"));
        ToolOutput::ok(lines.join("\n"))
    }

    fn save_all(
        &self,
        images: &[Vec<u8>],
        names: impl Iterator<Item = String>,
    ) -> Result<Vec<GeneratedImage>, ToolOutput> {
        images
            .iter()
            .zip(names)
            .map(|(bytes, name)| {
                self.store
                    .save_image(bytes, &name)
                    .map_err(|e| ToolOutput::error(format!("Unexpected error: {e}")))
            })
            .collect()
    }

    fn summary(&self, heading: String, saved: &[GeneratedImage]) -> String {
        let total: u64 = saved.iter().map(|s| s.size_bytes).sum();
        let mut lines = vec![heading];
        lines.extend(
            saved
                .iter()
                .map(|s| format!("- **{}** ({})", s.filename, s.size_human)),
        );
        lines.push(format!("\n**Total size:** {}", format_file_size(total)));
        lines.push(format!("**Location:** {}", self.store.output_dir().display()));
        lines.join("\n")
    }
}

fn parse_args<P: serde::de::DeserializeOwned>(
    tool: &str,
    arguments: JsonValue,
) -> Result<P, ToolCallError> {
    serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn parse_shape(aspect_ratio: &str, size: &str) -> Result<(AspectRatio, ImageSize), ToolOutput> {
    let aspect_ratio = aspect_ratio
        .parse::<AspectRatio>()
        .map_err(|e| ToolOutput::error(format!("Error: {e}")))?;
    let size = size
        .parse::<ImageSize>()
        .map_err(|e| ToolOutput::error(format!("Error: {e}")))?;
    Ok((aspect_ratio, size))
}

fn file_stem_for(prompt: &str) -> String {
    let filename = filename_from_prompt(prompt, "");
    filename
        .strip_suffix(".jpg")
        .unwrap_or(&filename)
        .to_string()
}

async fn load_reference(raw: &str) -> Result<ReferenceImage, ToolOutput> {
    let path = expand_home(raw).unwrap_or_else(|_| PathBuf::from(raw));
    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta,
        Err(_) => return Err(ToolOutput::error(format!("Error: Image not found: {raw}"))),
    };
    if !meta.is_file() {
        return Err(ToolOutput::error(format!("Error: Not a file: {raw}")));
    }
    tokio::fs::read(&path)
        .await
        .map(ReferenceImage::from_bytes)
        .map_err(|e| ToolOutput::error(format!("Error reading {raw}: {e}")))
}

#[cfg(test)]
#[path = "../tests/tools_tests.rs"]
mod tools_tests;
