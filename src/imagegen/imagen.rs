//! Imagen `:predict` client.
//!
//! Thin HTTP wrapper for `{base}/models/{model}:predict`. Pure parsing in
//! `parse_response` for testability.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::config::ImageConfig;
use super::types::{GeneratedImage, ImageError, ImageGenerate, ImageRequest};

#[cfg(test)]
#[path = "imagen_test.rs"]
mod tests;

const DEFAULT_MIME_TYPE: &str = "image/png";

// =============================================================================
// CLIENT
// =============================================================================

pub struct ImagenClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ImagenClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ImageError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: config.api_key, model: config.model, base_url: config.base_url })
    }

    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, ImageError> {
        Self::new(ImageConfig::from_env()?)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn predict_url(&self) -> String {
        format!("{}/models/{}:predict", self.base_url, self.model)
    }
}

#[async_trait::async_trait]
impl ImageGenerate for ImagenClient {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, ImageError> {
        let body = build_request(request);

        let response = self
            .http
            .post(self.predict_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ImageError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(ImageError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    instances: [Instance<'a>; 1],
    parameters: Parameters<'a>,
}

#[derive(serde::Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

fn build_request(request: &ImageRequest) -> ApiRequest<'_> {
    ApiRequest {
        instances: [Instance { prompt: &request.prompt }],
        parameters: Parameters { sample_count: request.sample_count, aspect_ratio: &request.aspect_ratio },
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Decode every prediction that carries image bytes. Predictions without
/// bytes (filtered samples) are dropped.
fn parse_response(json: &str) -> Result<Vec<GeneratedImage>, ImageError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| ImageError::ApiParse(e.to_string()))?;

    api.predictions
        .into_iter()
        .filter_map(|p| Some((p.bytes_base64_encoded?, p.mime_type)))
        .map(|(encoded, mime_type)| {
            let bytes = STANDARD.decode(encoded.trim()).map_err(|e| ImageError::ApiParse(e.to_string()))?;
            Ok(GeneratedImage { mime_type: mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_owned()), bytes })
        })
        .filter(|image| image.as_ref().map_or(true, |i| !i.bytes.is_empty()))
        .collect()
}
