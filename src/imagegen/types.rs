//! Image generation types and errors.

use crate::error::{ErrorClass, ErrorCode};

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by image generation client operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the image service failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The image service returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The image service response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for ImageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::MissingApiKey { .. } | Self::HttpClientBuild(_) | Self::ApiResponse { status: 401 | 403 | 404, .. } => {
                ErrorClass::Configuration
            }
            Self::ApiResponse { status: 400, .. } => ErrorClass::InvalidInput,
            Self::ApiRequest(_) | Self::ApiResponse { .. } | Self::ApiParse(_) => ErrorClass::Transient,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    /// Width:height, e.g. `"4:3"`.
    pub aspect_ratio: String,
    pub sample_count: u32,
}

/// One decoded image returned by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// =============================================================================
// IMAGE GENERATE TRAIT
// =============================================================================

/// Provider-neutral async trait for text-to-image. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ImageGenerate: Send + Sync {
    /// Generate images for a prompt. An empty vector means the service
    /// answered but produced nothing usable (for example, every sample was
    /// filtered).
    ///
    /// # Errors
    ///
    /// Returns an [`ImageError`] if the request fails or the response is malformed.
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, ImageError>;
}
