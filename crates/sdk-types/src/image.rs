use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string does not name a member of one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{value}'. Valid options: {options}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub options: String,
}

/// Output aspect ratios accepted by the image backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide16x9,
    #[serde(rename = "9:16")]
    Tall9x16,
    #[serde(rename = "4:3")]
    Standard4x3,
    #[serde(rename = "3:4")]
    Tall3x4,
    #[serde(rename = "3:2")]
    Photo3x2,
    #[serde(rename = "2:3")]
    Tall2x3,
    #[serde(rename = "21:9")]
    Ultrawide21x9,
    #[serde(rename = "9:21")]
    Ultratall9x21,
    #[serde(rename = "5:4")]
    Classic5x4,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 10] = [
        AspectRatio::Square,
        AspectRatio::Wide16x9,
        AspectRatio::Tall9x16,
        AspectRatio::Standard4x3,
        AspectRatio::Tall3x4,
        AspectRatio::Photo3x2,
        AspectRatio::Tall2x3,
        AspectRatio::Ultrawide21x9,
        AspectRatio::Ultratall9x21,
        AspectRatio::Classic5x4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide16x9 => "16:9",
            AspectRatio::Tall9x16 => "9:16",
            AspectRatio::Standard4x3 => "4:3",
            AspectRatio::Tall3x4 => "3:4",
            AspectRatio::Photo3x2 => "3:2",
            AspectRatio::Tall2x3 => "2:3",
            AspectRatio::Ultrawide21x9 => "21:9",
            AspectRatio::Ultratall9x21 => "9:21",
            AspectRatio::Classic5x4 => "5:4",
        }
    }

    /// Comma separated list of accepted values, in declaration order.
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "aspect ratio",
                value: s.to_string(),
                options: Self::options(),
            })
    }
}

/// Output resolution tier. The backend only accepts the uppercase forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ImageSize {
    /// Fastest.
    #[serde(rename = "1K")]
    Small,
    #[default]
    #[serde(rename = "2K")]
    Medium,
    /// Highest quality.
    #[serde(rename = "4K")]
    Large,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Small, ImageSize::Medium, ImageSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "1K",
            ImageSize::Medium => "2K",
            ImageSize::Large => "4K",
        }
    }

    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "size",
                value: s.to_string(),
                options: Self::options(),
            })
    }
}

/// An input image used to condition the generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ReferenceImage {
    /// Wrap raw bytes, sniffing the media type from the file signature.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            media_type: sniff_image_media_type(&bytes).to_string(),
            bytes,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }
}

/// Unknown signatures fall back to JPEG, which is what the gateway assumes.
pub fn sniff_image_media_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// Everything needed for one backend generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub size: ImageSize,
    /// Encoded ahead of the prompt text, in this order.
    pub reference_images: Vec<ReferenceImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            size: ImageSize::default(),
            reference_images: Vec::new(),
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_reference_images(mut self, images: Vec<ReferenceImage>) -> Self {
        self.reference_images = images;
        self
    }
}

/// Input for a prompt variation call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptVariationRequest {
    pub base_prompt: String,
    pub count: usize,
    /// 0.0 keeps variations subtle, 1.0 allows creative reinterpretation.
    pub diversity: f32,
}

impl PromptVariationRequest {
    pub fn new(base_prompt: impl Into<String>, count: usize) -> Self {
        Self {
            base_prompt: base_prompt.into(),
            count,
            diversity: 0.5,
        }
    }

    pub fn with_diversity(mut self, diversity: f32) -> Self {
        self.diversity = diversity;
        self
    }
}

/// A generated image after it has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub path: String,
    pub filename: String,
    pub size_bytes: u64,
    pub size_human: String,
}

/// A previously saved image found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageListItem {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub size_human: String,
    /// Local modification time, `%Y-%m-%d %H:%M`.
    pub created: String,
}
