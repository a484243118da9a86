//! Storage ports for templates and their background images.
//!
//! DESIGN
//! ======
//! Two narrow async traits sit between the template repository and the
//! cloud backend. `DocumentStore` speaks plain JSON documents so decoding
//! (and skipping records that fail to decode) stays in the repository.
//! `BlobStore` holds uploaded images and knows which URLs it owns.
//!
//! Adapters: `memory` for tests and offline use, `crate::firebase` for
//! Firestore and Firebase Storage over REST.

pub mod memory;

use serde_json::Value;

use crate::error::{ErrorClass, ErrorCode};
use crate::model::{Requester, normalize_email};


/// Field every sorted query orders by.
pub const ORDER_FIELD: &str = "createdAtEpochMillis";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Required configuration is missing or invalid.
    #[error("store not configured: {0}")]
    NotConfigured(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a failure not covered below.
    #[error("store error: status {status}: {message}")]
    Backend { status: u16, message: String },

    /// Rejected by the store's access rules.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The query needs a composite index the store does not have.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    /// The backend response could not be understood.
    #[error("malformed store response: {0}")]
    Malformed(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "E_STORE_NOT_CONFIGURED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
            Self::Backend { .. } => "E_STORE_BACKEND",
            Self::PermissionDenied(_) => "E_PERMISSION_DENIED",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::IndexUnavailable(_) => "E_INDEX_UNAVAILABLE",
            Self::Malformed(_) => "E_STORE_MALFORMED",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::NotConfigured(_) | Self::HttpClientBuild(_) => ErrorClass::Configuration,
            Self::Unavailable(_) | Self::Backend { .. } | Self::Malformed(_) => ErrorClass::Transient,
            Self::PermissionDenied(_) => ErrorClass::Permission,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::IndexUnavailable(_) => ErrorClass::Degraded,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Backend { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Single-field filter of a template listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateFilter {
    /// `isPublic == true`
    Public,
    /// `ownerId == id`
    OwnedBy(String),
    /// `sharedWith` contains the normalized email.
    SharedWith(String),
}

impl TemplateFilter {
    #[must_use]
    pub fn shared_with(email: &str) -> Self {
        Self::SharedWith(normalize_email(email))
    }

    /// Document field the filter applies to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Public => "isPublic",
            Self::OwnedBy(_) => "ownerId",
            Self::SharedWith(_) => "sharedWith",
        }
    }

    /// Whether a raw document passes the filter, as the store would evaluate it.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        let field = data.get(self.field());
        match self {
            Self::Public => field == Some(&Value::Bool(true)),
            Self::OwnedBy(id) => field.and_then(Value::as_str) == Some(id.as_str()),
            Self::SharedWith(email) => field
                .and_then(Value::as_array)
                .is_some_and(|emails| emails.iter().any(|e| e.as_str() == Some(email.as_str()))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateQuery {
    pub filter: TemplateFilter,
    /// Order by [`ORDER_FIELD`] descending. Needs a composite index.
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl TemplateQuery {
    /// Filtered, newest first, optionally capped.
    #[must_use]
    pub fn sorted(filter: TemplateFilter, limit: Option<usize>) -> Self {
        Self { filter, newest_first: true, limit }
    }

    /// Same filter with no ordering or limit. Never needs a composite index.
    #[must_use]
    pub fn unsorted(filter: TemplateFilter) -> Self {
        Self { filter, newest_first: false, limit: None }
    }

    /// Whether the store needs a composite index to serve this query.
    #[must_use]
    pub fn needs_index(&self) -> bool {
        self.newest_first
    }
}

// =============================================================================
// PORTS
// =============================================================================

/// A document as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// Template document collection.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write is rejected or the store is unreachable.
    async fn insert(&self, data: Value, requester: &Requester) -> Result<String, StoreError>;

    /// Read one document. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read is rejected or the store is unreachable.
    async fn get(&self, id: &str, requester: &Requester) -> Result<Option<StoredDocument>, StoreError>;

    /// Run a filtered query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexUnavailable`] if the query needs an index
    /// the store lacks, or another [`StoreError`] on failure.
    async fn query(&self, query: &TemplateQuery, requester: Option<&Requester>)
    -> Result<Vec<StoredDocument>, StoreError>;

    /// Delete one document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PermissionDenied`] if the requester may not
    /// delete it, or another [`StoreError`] on failure.
    async fn delete(&self, id: &str, requester: &Requester) -> Result<(), StoreError>;
}

/// Where an uploaded blob landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    pub path: String,
    /// Durable URL suitable for a template's `imageRef`.
    pub url: String,
}

/// Contents of a stored blob.
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadedBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DownloadedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadedBlob")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Durable image storage.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the upload fails.
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
        requester: &Requester,
    ) -> Result<UploadedBlob, StoreError>;

    /// Object path behind `url`, or `None` when the URL does not point into
    /// this store. Preset and external URLs never do.
    fn path_of(&self, url: &str) -> Option<String>;

    fn owns(&self, url: &str) -> bool {
        self.path_of(url).is_some()
    }

    /// Read the blob behind an owned URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the URL is not owned or the blob is
    /// gone, or another [`StoreError`] if the read fails.
    async fn download(&self, url: &str, requester: &Requester) -> Result<DownloadedBlob, StoreError>;

    /// Delete the blob behind an owned URL.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the URL is not owned or the delete fails.
    async fn delete(&self, url: &str, requester: &Requester) -> Result<(), StoreError>;
}
