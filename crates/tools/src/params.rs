use serde::Deserialize;

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_size() -> String {
    "2K".to_string()
}

fn default_count() -> i64 {
    4
}

fn default_limit() -> usize {
    20
}

// Ratio and size stay strings here so invalid values produce the friendly tool message
// instead of a protocol-level argument error.

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateImageParams {
    pub prompt: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_size")]
    pub size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMultipleParams {
    pub prompt: String,
    /// Clamped to 2..=4.
    #[serde(default = "default_count")]
    pub count: i64,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_size")]
    pub size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateVariationsParams {
    pub image_paths: Vec<String>,
    pub prompt: String,
    /// Clamped to 1..=4.
    #[serde(default = "default_count")]
    pub count: i64,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_size")]
    pub size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListImagesParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ListImagesParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}
