//! Image generation: text-to-image adapter for generated backgrounds.
//!
//! DESIGN
//! ======
//! `ImageGenerate` is the seam the background provisioner depends on;
//! `ImagenClient` implements it over the Imagen REST API and is configured
//! from environment variables. Tests substitute a mock.

pub mod config;
pub mod imagen;
pub mod types;

pub use imagen::ImagenClient;
pub use types::{GeneratedImage, ImageError, ImageGenerate, ImageRequest};
