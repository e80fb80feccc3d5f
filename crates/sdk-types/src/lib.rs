//! Shared request/response types for the image generation tools.
//!
//! These types carry no I/O. The closed enumerations (`AspectRatio`, `ImageSize`) are the
//! validation boundary: a value that parses into one of them is safe to put on the wire.

pub mod image;

pub use image::{
    AspectRatio, GeneratedImage, GenerationRequest, ImageListItem, ImageSize, ParseEnumError,
    PromptVariationRequest, ReferenceImage,
};

#[cfg(test)]
#[path = "../tests/image_types_tests.rs"]
mod image_types_tests;
