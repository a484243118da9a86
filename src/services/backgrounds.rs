//! Background provisioning: turn a text prompt into a selectable
//! [`BackgroundAsset`] via the image generation service.
//!
//! DESIGN
//! ======
//! The prompt is prefixed with a fixed style instruction so every result
//! reads as a certificate backdrop, and requested in the canvas aspect
//! ratio. The first returned image becomes an inline asset; persisting it
//! durably is the template repository's job at save time.
//!
//! ERROR HANDLING
//! ==============
//! Client errors collapse into three outcomes the host can act on:
//! configuration problems, an unreachable service, and a response with no
//! usable image. Each carries a user-facing `guidance()` line.

use std::sync::Arc;

use designer::background::BackgroundAsset;
use tracing::{info, warn};

use crate::data_url::DataUrl;
use crate::error::{ErrorClass, ErrorCode};
use crate::imagegen::{ImageError, ImageGenerate, ImageRequest, ImagenClient};

#[cfg(test)]
#[path = "backgrounds_test.rs"]
mod tests;

/// Prepended to every user prompt.
pub const STYLE_PREFIX: &str = "An elegant, high-resolution certificate background texture with an empty center \
                                for text, soft edges and no lettering. Theme: ";

/// Canvas is 1056x816.
pub const ASPECT_RATIO: &str = "4:3";

/// Characters of the prompt kept in the generated asset's name.
const NAME_EXCERPT_CHARS: usize = 30;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("image generation is not configured: {0}")]
    NotConfigured(String),
    #[error("image service unreachable: {0}")]
    Unreachable(String),
    #[error("no image was generated: {0}")]
    NoImage(String),
}

impl GenerateError {
    /// One line the host can show next to the prompt box.
    #[must_use]
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "Describe the background you want first.",
            Self::NotConfigured(_) => "Image generation is unavailable. Check the API key and model settings.",
            Self::Unreachable(_) => "The image service could not be reached. Try again in a moment.",
            Self::NoImage(_) => "No image came back for that prompt. Try rephrasing it.",
        }
    }
}

impl From<ImageError> for GenerateError {
    fn from(e: ImageError) -> Self {
        match e.class() {
            ErrorClass::Configuration => Self::NotConfigured(e.to_string()),
            ErrorClass::InvalidInput => Self::NoImage(e.to_string()),
            _ => Self::Unreachable(e.to_string()),
        }
    }
}

impl ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::NotConfigured(_) => "E_GENERATOR_NOT_CONFIGURED",
            Self::Unreachable(_) => "E_GENERATOR_UNREACHABLE",
            Self::NoImage(_) => "E_NO_IMAGE",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyPrompt | Self::NoImage(_) => ErrorClass::InvalidInput,
            Self::NotConfigured(_) => ErrorClass::Configuration,
            Self::Unreachable(_) => ErrorClass::Transient,
        }
    }
}

// =============================================================================
// PROVISIONER
// =============================================================================

pub struct BackgroundProvisioner {
    generator: Option<Arc<dyn ImageGenerate>>,
}

impl BackgroundProvisioner {
    #[must_use]
    pub fn new(generator: Arc<dyn ImageGenerate>) -> Self {
        Self { generator: Some(generator) }
    }

    /// A provisioner whose every request reports [`GenerateError::NotConfigured`].
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { generator: None }
    }

    /// Build over [`ImagenClient`] from environment configuration. Missing
    /// configuration is logged and yields an unconfigured provisioner.
    #[must_use]
    pub fn from_env() -> Self {
        match ImagenClient::from_env() {
            Ok(client) => {
                info!(model = client.model(), "backgrounds: image generation configured");
                Self::new(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "backgrounds: image generation disabled");
                Self::unconfigured()
            }
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Generate a background for `prompt`.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::EmptyPrompt`] for a blank prompt; the service is not called.
    /// - [`GenerateError::NotConfigured`] without a usable generator.
    /// - [`GenerateError::Unreachable`] or [`GenerateError::NoImage`] per the
    ///   service's failure.
    pub async fn generate(&self, prompt: &str) -> Result<BackgroundAsset, GenerateError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        let Some(generator) = &self.generator else {
            return Err(GenerateError::NotConfigured("no image generator".into()));
        };

        let request = ImageRequest {
            prompt: format!("{STYLE_PREFIX}{prompt}"),
            aspect_ratio: ASPECT_RATIO.to_owned(),
            sample_count: 1,
        };
        let images = generator.generate(&request).await.map_err(|e| {
            warn!(error = %e, "backgrounds: generation failed");
            GenerateError::from(e)
        })?;
        let Some(image) = images.into_iter().next() else {
            return Err(GenerateError::NoImage("the response contained no image".into()));
        };

        let size = image.bytes.len();
        let image_ref = DataUrl::new(image.mime_type, image.bytes).to_url();
        let asset = BackgroundAsset::generated(format!("AI Generated: {}", excerpt(prompt)), image_ref);
        info!(id = %asset.id, size, "backgrounds: generated");
        Ok(asset)
    }
}

fn excerpt(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(NAME_EXCERPT_CHARS).collect();
    if chars.next().is_some() { format!("{}...", head.trim_end()) } else { head }
}
