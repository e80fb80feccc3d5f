pub mod error;
pub mod image;
pub mod transport;

pub use crate::core::error::{ImageGenError, TransportError};
pub use crate::core::image::{generate_images, ImageModel, ImageResponse, ImageResponseMeta};
pub use crate::core::transport::{HttpTransport, TransportConfig};

#[cfg(test)]
#[path = "../tests/generate_images_tests.rs"]
mod generate_images_tests;
