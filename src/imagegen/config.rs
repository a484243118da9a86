//! Image generation configuration parsed from environment variables.

use super::types::ImageError;
use crate::config::{env_base_url, env_or, env_parse_u64};

pub const DEFAULT_IMAGE_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_IMAGE_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: ImageTimeouts,
}

impl std::fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl ImageConfig {
    /// Build typed image config from environment variables.
    ///
    /// Optional:
    /// - `IMAGE_API_KEY_ENV`: names the env var containing the key (default `GEMINI_API_KEY`)
    /// - `IMAGE_MODEL`: default `imagen-4.0-generate-001`
    /// - `IMAGE_BASE_URL`: default Generative Language API base URL
    /// - `IMAGE_REQUEST_TIMEOUT_SECS`: default 120
    /// - `IMAGE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::MissingApiKey`] if the named key variable is unset or blank.
    pub fn from_env() -> Result<Self, ImageError> {
        let key_var = env_or("IMAGE_API_KEY_ENV", DEFAULT_IMAGE_API_KEY_ENV);
        let api_key = std::env::var(&key_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ImageError::MissingApiKey { var: key_var.clone() })?;

        Ok(Self {
            api_key,
            model: env_or("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            base_url: env_base_url("IMAGE_BASE_URL", DEFAULT_IMAGE_BASE_URL),
            timeouts: ImageTimeouts {
                request_secs: env_parse_u64("IMAGE_REQUEST_TIMEOUT_SECS", DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse_u64("IMAGE_CONNECT_TIMEOUT_SECS", DEFAULT_IMAGE_CONNECT_TIMEOUT_SECS),
            },
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
