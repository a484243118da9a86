//! Template repository: save, scoped listing and delete.
//!
//! DESIGN
//! ======
//! Templates are immutable documents; saving always creates a new one. A
//! background held inline as a `data:` URL is uploaded to the blob store
//! first and the record references the durable URL instead.
//!
//! Listings run one single-field filter query per scope, newest first.
//! Every result, whichever path produced it, goes through the same
//! client-side finalization: decode, scope check, sort by creation time
//! (ties by id, descending like the store's own ordering), cap. A capped
//! page that loses records to decoding is refilled from the unsorted query.
//!
//! A saved template owns its background. Inline images are uploaded into
//! the owner's folder, and a blob from another user's folder (a loaded
//! public or shared template) is copied there, so no delete can strip an
//! image another user still shows.
//!
//! ERROR HANDLING
//! ==============
//! A store without the composite index for a sorted listing reports
//! `IndexUnavailable`; the repository then re-issues the same filter
//! unsorted and unlimited and finalizes client-side. That error never
//! reaches the caller. Upload failures abort a save before any record is
//! written. After a record is deleted, blob cleanup is best-effort and its
//! failure is reported in the outcome, never as an error.

use std::cmp::Reverse;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::data_url::{DataUrl, DataUrlError, extension_for, is_data_url};
use crate::error::{ErrorClass, ErrorCode};
use crate::model::{NewTemplate, Requester, Template, TemplateRecord};
use crate::store::{BlobStore, DocumentStore, StoreError, StoredDocument, TemplateFilter, TemplateQuery, UploadedBlob};

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;

/// Maximum number of public templates in one listing.
pub const PUBLIC_LIST_CAP: usize = 20;

/// Display name recorded when the requester has none.
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Public templates from everyone.
    Public,
    /// The requester's own templates, any visibility.
    Mine,
    /// Templates shared with the requester's email.
    SharedWithMe,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Public, Scope::Mine, Scope::SharedWithMe];

    /// Result cap for this scope.
    #[must_use]
    pub fn cap(self) -> Option<usize> {
        match self {
            Self::Public => Some(PUBLIC_LIST_CAP),
            Self::Mine | Self::SharedWithMe => None,
        }
    }

    /// Store filter for this scope, or `None` when the requester cannot have
    /// any results (anonymous, or no email for shared listings).
    #[must_use]
    pub fn filter(self, requester: Option<&Requester>) -> Option<TemplateFilter> {
        match self {
            Self::Public => Some(TemplateFilter::Public),
            Self::Mine => requester.map(|r| TemplateFilter::OwnedBy(r.id.clone())),
            Self::SharedWithMe => requester.and_then(Requester::normalized_email).map(TemplateFilter::SharedWith),
        }
    }

    /// Whether a decoded template belongs in this scope's listing.
    #[must_use]
    pub fn admits(self, template: &Template, requester: Option<&Requester>) -> bool {
        match self {
            Self::Public => template.visibility.is_public(),
            Self::Mine => requester.is_some_and(|r| r.id == template.owner_id),
            Self::SharedWithMe => requester
                .and_then(Requester::normalized_email)
                .is_some_and(|email| template.visibility.is_shared_with(&email)),
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "community" => Ok(Self::Public),
            "mine" => Ok(Self::Mine),
            "shared" | "shared-with-me" => Ok(Self::SharedWithMe),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template name must not be empty")]
    EmptyName,
    #[error("invalid background image: {0}")]
    InvalidImage(#[from] DataUrlError),
    #[error("failed to upload custom background image: {0}")]
    Upload(StoreError),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("template store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for TemplateError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PermissionDenied(reason) => Self::PermissionDenied(reason),
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Store(other),
        }
    }
}

impl ErrorCode for TemplateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "E_TEMPLATE_EMPTY_NAME",
            Self::InvalidImage(_) => "E_TEMPLATE_INVALID_IMAGE",
            Self::Upload(_) => "E_TEMPLATE_UPLOAD",
            Self::PermissionDenied(_) => "E_PERMISSION_DENIED",
            Self::NotFound(_) => "E_TEMPLATE_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyName | Self::InvalidImage(_) => ErrorClass::InvalidInput,
            Self::Upload(e) if e.class() == ErrorClass::Permission => ErrorClass::Permission,
            Self::Upload(_) => ErrorClass::Transient,
            Self::PermissionDenied(_) => ErrorClass::Permission,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Store(e) => e.class(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Upload(e) | Self::Store(e) => e.retryable(),
            _ => false,
        }
    }
}

/// What happened to a deleted template's background blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The image does not live in this repository's blob store.
    NotOwned,
    /// Another template of the same owner still uses the image.
    StillReferenced,
    Deleted,
    /// Cleanup failed; the template itself is gone.
    Failed(String),
}

// =============================================================================
// REPOSITORY
// =============================================================================

pub struct TemplateRepository {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    clock: fn() -> i64,
}

/// Current time as milliseconds since Unix epoch.
fn now_epoch_millis() -> i64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(0)
}

impl TemplateRepository {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { documents, blobs, clock: now_epoch_millis }
    }

    /// Replace the creation-time clock.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    // --- Save ---

    /// Persist a new template owned by `requester` and return its id.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::EmptyName`] for a blank name.
    /// - [`TemplateError::InvalidImage`] for a malformed inline background.
    /// - [`TemplateError::Upload`] if the inline background cannot be stored;
    ///   no record is written.
    /// - Other variants if the record write fails.
    pub async fn save(&self, mut template: NewTemplate, requester: &Requester) -> Result<String, TemplateError> {
        let name = template.name.trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyName);
        }
        template.name = name.to_owned();
        let created_at = (self.clock)();

        let staged = self.stage_background(&template.background.image_ref, created_at, requester).await?;
        if let Some(blob) = &staged {
            template.background.image_ref.clone_from(&blob.url);
        }
        let uploaded_url = staged.map(|blob| blob.url);

        let display_name = requester.display_name.clone().unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_owned());
        let record = TemplateRecord::new(template, requester.id.clone(), display_name, created_at);
        let data = serde_json::to_value(&record).map_err(|e| TemplateError::Store(StoreError::Malformed(e.to_string())))?;

        match self.documents.insert(data, requester).await {
            Ok(id) => {
                info!(%id, owner = %requester.id, public = record.is_public, "templates: saved");
                Ok(id)
            }
            Err(e) => {
                if let Some(url) = uploaded_url {
                    self.discard_orphan(&url, requester).await;
                }
                Err(e.into())
            }
        }
    }

    /// Put the background into the requester's own folder when it is not
    /// there yet. `None` when the reference can be kept as is.
    async fn stage_background(
        &self,
        image_ref: &str,
        created_at: i64,
        requester: &Requester,
    ) -> Result<Option<UploadedBlob>, TemplateError> {
        let folder = owner_folder(&requester.id);
        let (mime, bytes) = if is_data_url(image_ref) {
            let image = DataUrl::parse(image_ref)?;
            (image.mime, image.bytes)
        } else {
            match self.blobs.path_of(image_ref) {
                Some(source) if !source.starts_with(&folder) => {
                    let blob = self.blobs.download(image_ref, requester).await.map_err(TemplateError::Upload)?;
                    info!(owner = %requester.id, %source, "templates: copying background from another owner");
                    (blob.content_type, blob.bytes)
                }
                _ => return Ok(None),
            }
        };

        let path = format!("{folder}{created_at}-{}.{}", Uuid::new_v4().simple(), extension_for(&mime));
        let size = bytes.len();
        let blob = self.blobs.upload(&path, &mime, bytes, requester).await.map_err(TemplateError::Upload)?;
        info!(owner = %requester.id, path = %blob.path, size, "templates: uploaded background");
        Ok(Some(blob))
    }

    async fn discard_orphan(&self, url: &str, requester: &Requester) {
        match self.blobs.delete(url, requester).await {
            Ok(()) => info!(%url, "templates: removed orphaned upload"),
            Err(e) => warn!(error = %e, %url, "templates: orphaned upload left behind"),
        }
    }

    // --- List ---

    /// List templates in `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the store fails for a reason other than
    /// a missing index.
    pub async fn list(&self, scope: Scope, requester: Option<&Requester>) -> Result<Vec<Template>, TemplateError> {
        let Some(filter) = scope.filter(requester) else {
            return Ok(Vec::new());
        };
        let sorted = TemplateQuery::sorted(filter.clone(), scope.cap());

        match self.documents.query(&sorted, requester).await {
            Ok(documents) => {
                let fetched = documents.len();
                let templates = finalize(scope, requester, documents);
                match scope.cap() {
                    Some(cap) if fetched >= cap && templates.len() < cap => {
                        warn!(?scope, kept = templates.len(), "templates: capped page lost records; refilling client-side");
                    }
                    _ => return Ok(templates),
                }
            }
            Err(StoreError::IndexUnavailable(reason)) => {
                warn!(?scope, %reason, "templates: sorted listing unavailable; sorting client-side");
            }
            Err(e) => return Err(e.into()),
        }

        let documents = self.documents.query(&TemplateQuery::unsorted(filter), requester).await?;
        Ok(finalize(scope, requester, documents))
    }

    // --- Delete ---

    /// Delete a template owned by `requester`, then clean up its background
    /// blob if nothing else uses it.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::NotFound`] if no template has this id.
    /// - [`TemplateError::PermissionDenied`] if the store refuses; the record
    ///   is untouched.
    pub async fn delete(&self, id: &str, requester: &Requester) -> Result<DeleteOutcome, TemplateError> {
        let Some(document) = self.documents.get(id, requester).await? else {
            return Err(TemplateError::NotFound(id.to_owned()));
        };
        let image_ref = background_ref(&document.data).map(str::to_owned);

        self.documents.delete(id, requester).await?;
        info!(%id, owner = %requester.id, "templates: deleted");

        let outcome = match image_ref {
            Some(url) => self.cleanup_blob(id, &url, requester).await,
            None => DeleteOutcome::NotOwned,
        };
        if let DeleteOutcome::Failed(reason) = &outcome {
            warn!(%id, %reason, "templates: background cleanup failed");
        }
        Ok(outcome)
    }

    async fn cleanup_blob(&self, id: &str, url: &str, requester: &Requester) -> DeleteOutcome {
        if !self.blobs.owns(url) {
            return DeleteOutcome::NotOwned;
        }
        let siblings = TemplateQuery::unsorted(TemplateFilter::OwnedBy(requester.id.clone()));
        match self.documents.query(&siblings, Some(requester)).await {
            Ok(documents) => {
                if documents.iter().any(|d| d.id != id && background_ref(&d.data) == Some(url)) {
                    return DeleteOutcome::StillReferenced;
                }
            }
            Err(e) => return DeleteOutcome::Failed(format!("reference check failed: {e}")),
        }
        match self.blobs.delete(url, requester).await {
            Ok(()) | Err(StoreError::NotFound(_)) => DeleteOutcome::Deleted,
            Err(e) => DeleteOutcome::Failed(e.to_string()),
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Blob folder a user may write to.
fn owner_folder(owner_id: &str) -> String {
    format!("backgrounds/{owner_id}/")
}

/// Background image reference of a raw record, under either field name.
fn background_ref(data: &Value) -> Option<&str> {
    let background = data.get("background")?;
    background
        .get("imageRef")
        .or_else(|| background.get("url"))
        .and_then(Value::as_str)
}

fn finalize(scope: Scope, requester: Option<&Requester>, documents: Vec<StoredDocument>) -> Vec<Template> {
    let mut templates: Vec<Template> = documents
        .into_iter()
        .filter_map(|document| match serde_json::from_value::<TemplateRecord>(document.data) {
            Ok(record) => Some(record.into_template(document.id)),
            Err(e) => {
                warn!(id = %document.id, error = %e, "templates: skipping undecodable record");
                None
            }
        })
        .filter(|template| scope.admits(template, requester))
        .collect();
    templates.sort_by(|a, b| {
        Reverse(a.created_at_epoch_millis)
            .cmp(&Reverse(b.created_at_epoch_millis))
            .then_with(|| b.id.cmp(&a.id))
    });
    if let Some(cap) = scope.cap() {
        templates.truncate(cap);
    }
    templates
}
