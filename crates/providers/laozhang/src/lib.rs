//! laozhang.ai gateway provider: Gemini `generateContent` image generation plus an
//! OpenAI-compatible chat endpoint used for prompt variations.

pub mod config;
pub mod error;
pub mod image_model;
pub mod provider;
pub mod request;
pub mod response;
mod variations;

pub use config::LaozhangConfig;
pub use image_model::LaozhangImageModel;
pub use provider::build_laozhang_image_model;

#[cfg(test)]
#[path = "../tests/request_tests.rs"]
mod request_tests;
#[cfg(test)]
#[path = "../tests/response_tests.rs"]
mod response_tests;
#[cfg(test)]
#[path = "../tests/image_model_tests.rs"]
mod image_model_tests;
