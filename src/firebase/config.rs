//! Firebase configuration parsed from environment variables.

use crate::config::{env_base_url, env_or, env_parse_u64, env_var_any};
use crate::store::StoreError;

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";
pub const DEFAULT_TEMPLATE_COLLECTION: &str = "templates";
pub const DEFAULT_FIREBASE_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FIREBASE_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub firestore_base_url: String,
    pub storage_base_url: String,
    pub collection: String,
    pub timeouts: HttpTimeouts,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("firestore_base_url", &self.firestore_base_url)
            .field("storage_base_url", &self.storage_base_url)
            .field("collection", &self.collection)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl FirebaseConfig {
    /// Build typed Firebase config from environment variables.
    ///
    /// Required (each also read from its `VITE_`-prefixed name):
    /// - `FIREBASE_API_KEY`
    /// - `FIREBASE_PROJECT_ID`
    /// - `FIREBASE_STORAGE_BUCKET`
    ///
    /// Optional:
    /// - `FIREBASE_FIRESTORE_BASE_URL`, `FIREBASE_STORAGE_BASE_URL`: emulator overrides
    /// - `TEMPLATE_COLLECTION`: default `templates`
    /// - `FIREBASE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FIREBASE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotConfigured`] naming the first missing variable.
    pub fn from_env() -> Result<Self, StoreError> {
        let api_key = required("FIREBASE_API_KEY")?;
        let project_id = required("FIREBASE_PROJECT_ID")?;
        let storage_bucket = required("FIREBASE_STORAGE_BUCKET")?;

        Ok(Self {
            api_key,
            project_id,
            storage_bucket,
            firestore_base_url: env_base_url("FIREBASE_FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL),
            storage_base_url: env_base_url("FIREBASE_STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL),
            collection: env_or("TEMPLATE_COLLECTION", DEFAULT_TEMPLATE_COLLECTION),
            timeouts: HttpTimeouts {
                request_secs: env_parse_u64("FIREBASE_REQUEST_TIMEOUT_SECS", DEFAULT_FIREBASE_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse_u64("FIREBASE_CONNECT_TIMEOUT_SECS", DEFAULT_FIREBASE_CONNECT_TIMEOUT_SECS),
            },
        })
    }
}

fn required(key: &str) -> Result<String, StoreError> {
    let vite = format!("VITE_{key}");
    env_var_any(&[key, &vite]).ok_or_else(|| StoreError::NotConfigured(format!("env var {key} not set")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
