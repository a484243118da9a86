//! Firebase Storage v0 REST adapter.

use serde::Deserialize;

use super::{FirebaseConfig, authorize, parse_google_error, send};
use crate::model::Requester;
use crate::store::{BlobStore, DownloadedBlob, StoreError, UploadedBlob};

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

/// Assumed when a download carries no content type.
const DEFAULT_CONTENT_TYPE: &str = "image/png";

pub struct FirebaseBlobStore {
    http: reqwest::Client,
    /// `{base}/b/{bucket}/o`
    objects_url: String,
}

impl FirebaseBlobStore {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self { http, objects_url: objects_url(&config.storage_base_url, &config.storage_bucket) }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.objects_url, urlencoding::encode(path))
    }
}

#[async_trait::async_trait]
impl BlobStore for FirebaseBlobStore {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
        requester: &Requester,
    ) -> Result<UploadedBlob, StoreError> {
        let request = self
            .http
            .post(&self.objects_url)
            .query(&[("uploadType", "media"), ("name", path)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let (status, text) = send(authorize(request, Some(requester))).await?;
        if status != 200 {
            return Err(parse_google_error(status, &text));
        }
        let object = parse_upload_response(&text)?;
        let url = download_url(&self.objects_url, &object.name, object.first_token());
        Ok(UploadedBlob { path: object.name, url })
    }

    fn path_of(&self, url: &str) -> Option<String> {
        object_path(&self.objects_url, url)
    }

    async fn download(&self, url: &str, requester: &Requester) -> Result<DownloadedBlob, StoreError> {
        let Some(path) = object_path(&self.objects_url, url) else {
            return Err(StoreError::NotFound(format!("not a blob of this bucket: {url}")));
        };
        let request = self.http.get(download_url(&self.objects_url, &path, None));
        let response = authorize(request, Some(requester))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let status = response.status().as_u16();
        if status != 200 {
            let text = response.text().await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
            return Err(parse_google_error(status, &text));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| DEFAULT_CONTENT_TYPE.to_owned(), str::to_owned);
        let bytes = response.bytes().await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(DownloadedBlob { content_type, bytes: bytes.to_vec() })
    }

    async fn delete(&self, url: &str, requester: &Requester) -> Result<(), StoreError> {
        let Some(path) = object_path(&self.objects_url, url) else {
            return Err(StoreError::NotFound(format!("not a blob of this bucket: {url}")));
        };
        let request = self.http.delete(self.object_url(&path));
        let (status, text) = send(authorize(request, Some(requester))).await?;
        if !(200..300).contains(&status) {
            return Err(parse_google_error(status, &text));
        }
        Ok(())
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl ObjectMetadata {
    fn first_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
    }
}

fn objects_url(base_url: &str, bucket: &str) -> String {
    format!("{base_url}/b/{bucket}/o")
}

fn parse_upload_response(body: &str) -> Result<ObjectMetadata, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))
}

/// Durable download URL for an object, as the Firebase SDKs build it.
fn download_url(objects_url: &str, path: &str, token: Option<&str>) -> String {
    let base = format!("{objects_url}/{}?alt=media", urlencoding::encode(path));
    match token {
        Some(token) => format!("{base}&token={token}"),
        None => base,
    }
}

/// Object path behind a download URL, or `None` when the URL is not in
/// this bucket.
fn object_path(objects_url: &str, url: &str) -> Option<String> {
    let rest = url.strip_prefix(objects_url)?.strip_prefix('/')?;
    let encoded = rest.split(['?', '#']).next().unwrap_or_default();
    if encoded.is_empty() {
        return None;
    }
    urlencoding::decode(encoded).ok().map(std::borrow::Cow::into_owned)
}
