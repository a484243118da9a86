//! Firebase REST adapters for the storage ports.
//!
//! DESIGN
//! ======
//! `FirestoreStore` implements `DocumentStore` over the Firestore v1 REST
//! API; `FirebaseBlobStore` implements `BlobStore` over the Firebase Storage
//! v0 REST API. Both authenticate the project with the web API key and
//! forward the requester's ID token so the deployed security rules decide
//! what each user may read, write and delete.
//!
//! ERROR HANDLING
//! ==============
//! Google APIs report failures as `{"error": {"code", "message", "status"}}`
//! (wrapped in an array by `:runQuery`). `parse_google_error` maps those onto
//! `StoreError`; a `FAILED_PRECONDITION` that mentions an index becomes
//! `IndexUnavailable` so the repository can take its fallback path.

pub mod config;
pub mod firestore;
pub mod storage;
pub mod value;

use std::time::Duration;

pub use config::FirebaseConfig;
pub use firestore::FirestoreStore;
pub use storage::FirebaseBlobStore;

use config::HttpTimeouts;
use serde_json::Value;

use crate::model::Requester;
use crate::store::StoreError;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Build both adapters from one config.
///
/// # Errors
///
/// Returns [`StoreError::HttpClientBuild`] if the HTTP client fails to build.
pub fn connect(config: &FirebaseConfig) -> Result<(FirestoreStore, FirebaseBlobStore), StoreError> {
    let http = http_client(config.timeouts)?;
    Ok((FirestoreStore::new(http.clone(), config), FirebaseBlobStore::new(http, config)))
}

fn http_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, StoreError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| StoreError::HttpClientBuild(e.to_string()))
}

/// Attach the requester's ID token, when present.
fn authorize(request: reqwest::RequestBuilder, requester: Option<&Requester>) -> reqwest::RequestBuilder {
    match requester.and_then(|r| r.id_token.as_deref()) {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send a request and read the full body. Transport failures are `Unavailable`.
async fn send(request: reqwest::RequestBuilder) -> Result<(u16, String), StoreError> {
    let response = request.send().await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
    Ok((status, text))
}

// =============================================================================
// ERRORS
// =============================================================================

/// Map a failed Google API response onto a [`StoreError`].
fn parse_google_error(status: u16, body: &str) -> StoreError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| match v {
        Value::Array(items) => items.iter().find_map(|item| item.get("error")),
        other => other.get("error"),
    });
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map_or_else(|| body.trim().to_owned(), str::to_owned);
    let code = error.and_then(|e| e.get("status")).and_then(Value::as_str).unwrap_or_default();

    match (code, status) {
        ("PERMISSION_DENIED" | "UNAUTHENTICATED", _) | (_, 401 | 403) => StoreError::PermissionDenied(message),
        ("NOT_FOUND", _) | (_, 404) => StoreError::NotFound(message),
        ("FAILED_PRECONDITION", _) if message.to_lowercase().contains("index") => {
            StoreError::IndexUnavailable(message)
        }
        _ => StoreError::Backend { status, message },
    }
}
