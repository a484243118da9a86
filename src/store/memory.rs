//! In-memory store adapters.
//!
//! Both adapters emulate the access rules the cloud backend is deployed
//! with, so repository behavior can be exercised without a network:
//!
//! * a template may be created and deleted only by its owner;
//! * a template is readable when public, owned by the requester, or shared
//!   with the requester's email;
//! * listing queries must be restricted to what the requester may read;
//! * blobs under `backgrounds/{ownerId}/` are writable only by that owner.
//!
//! `MemoryDocumentStore::without_index` reproduces a deployment that lacks
//! the composite index for sorted listings. As in the cloud store, a sorted
//! query skips documents that lack the order field.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use super::{BlobStore, DocumentStore, DownloadedBlob, ORDER_FIELD, StoreError, StoredDocument, TemplateFilter, TemplateQuery, UploadedBlob};
use crate::model::{Requester, normalize_email};

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

pub const MEMORY_BLOB_PREFIX: &str = "memory://blobs/";

// =============================================================================
// DOCUMENTS
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<BTreeMap<String, Value>>,
    next_id: AtomicU64,
    index_missing: AtomicBool,
    queries: Mutex<Vec<TemplateQuery>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose sorted queries fail with [`StoreError::IndexUnavailable`].
    #[must_use]
    pub fn without_index() -> Self {
        let store = Self::default();
        store.index_missing.store(true, Ordering::Relaxed);
        store
    }

    pub fn set_index_available(&self, available: bool) {
        self.index_missing.store(!available, Ordering::Relaxed);
    }

    /// Write a document directly, bypassing access rules.
    pub async fn seed(&self, id: impl Into<String>, data: Value) {
        self.docs.write().await.insert(id.into(), data);
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.docs.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Every query issued so far, in order.
    pub async fn queries(&self) -> Vec<TemplateQuery> {
        self.queries.lock().await.clone()
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("doc-{n:06}")
    }
}

fn owner_of(data: &Value) -> Option<&str> {
    data.get("ownerId").and_then(Value::as_str)
}

fn readable_by(data: &Value, requester: Option<&Requester>) -> bool {
    if TemplateFilter::Public.matches(data) {
        return true;
    }
    let Some(requester) = requester else {
        return false;
    };
    if owner_of(data) == Some(requester.id.as_str()) {
        return true;
    }
    requester
        .normalized_email()
        .is_some_and(|email| TemplateFilter::SharedWith(email).matches(data))
}

/// Rules only admit queries whose filter alone guarantees readability.
fn query_allowed(filter: &TemplateFilter, requester: Option<&Requester>) -> bool {
    match filter {
        TemplateFilter::Public => true,
        TemplateFilter::OwnedBy(id) => requester.is_some_and(|r| &r.id == id),
        TemplateFilter::SharedWith(email) => {
            requester.and_then(Requester::normalized_email).is_some_and(|own| own == normalize_email(email))
        }
    }
}

fn created_at(data: &Value) -> i64 {
    data.get(ORDER_FIELD).and_then(Value::as_i64).unwrap_or(i64::MIN)
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, data: Value, requester: &Requester) -> Result<String, StoreError> {
        if owner_of(&data) != Some(requester.id.as_str()) {
            return Err(StoreError::PermissionDenied("ownerId must match the requester".into()));
        }
        let id = self.allocate_id();
        self.docs.write().await.insert(id.clone(), data);
        Ok(id)
    }

    async fn get(&self, id: &str, requester: &Requester) -> Result<Option<StoredDocument>, StoreError> {
        let docs = self.docs.read().await;
        let Some(data) = docs.get(id) else {
            return Ok(None);
        };
        if !readable_by(data, Some(requester)) {
            return Err(StoreError::PermissionDenied(format!("read of {id}")));
        }
        Ok(Some(StoredDocument { id: id.to_owned(), data: data.clone() }))
    }

    async fn query(
        &self,
        query: &TemplateQuery,
        requester: Option<&Requester>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.queries.lock().await.push(query.clone());

        if !query_allowed(&query.filter, requester) {
            return Err(StoreError::PermissionDenied(format!("query on {}", query.filter.field())));
        }
        if query.needs_index() && self.index_missing.load(Ordering::Relaxed) {
            return Err(StoreError::IndexUnavailable(format!(
                "The query requires an index on {} and {ORDER_FIELD}",
                query.filter.field()
            )));
        }

        let docs = self.docs.read().await;
        let mut hits: Vec<StoredDocument> = docs
            .iter()
            .filter(|(_, data)| query.filter.matches(data))
            // An ordered query never returns documents lacking the order field.
            .filter(|(_, data)| !query.newest_first || data.get(ORDER_FIELD).is_some())
            .map(|(id, data)| StoredDocument { id: id.clone(), data: data.clone() })
            .collect();
        if query.newest_first {
            // Ties fall back to the document name in the same direction.
            hits.sort_by(|a, b| created_at(&b.data).cmp(&created_at(&a.data)).then_with(|| b.id.cmp(&a.id)));
        }
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    async fn delete(&self, id: &str, requester: &Requester) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let Some(data) = docs.get(id) else {
            return Ok(());
        };
        if owner_of(data) != Some(requester.id.as_str()) {
            return Err(StoreError::PermissionDenied(format!("delete of {id}")));
        }
        docs.remove(id);
        Ok(())
    }
}

// =============================================================================
// BLOBS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<BTreeMap<String, MemoryBlob>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    pub async fn get(&self, path: &str) -> Option<MemoryBlob> {
        self.blobs.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }
}

fn path_of(url: &str) -> Option<&str> {
    url.strip_prefix(MEMORY_BLOB_PREFIX)
}

/// Storage rules: `backgrounds/{uid}/...` belongs to `uid`.
fn blob_writable_by(path: &str, requester: &Requester) -> bool {
    let mut parts = path.split('/');
    parts.next() == Some("backgrounds") && parts.next() == Some(requester.id.as_str())
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
        requester: &Requester,
    ) -> Result<UploadedBlob, StoreError> {
        if self.fail_uploads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("simulated upload failure".into()));
        }
        if !blob_writable_by(path, requester) {
            return Err(StoreError::PermissionDenied(format!("write to {path}")));
        }
        let blob = MemoryBlob { content_type: content_type.to_owned(), bytes };
        self.blobs.write().await.insert(path.to_owned(), blob);
        Ok(UploadedBlob { path: path.to_owned(), url: format!("{MEMORY_BLOB_PREFIX}{path}") })
    }

    fn path_of(&self, url: &str) -> Option<String> {
        path_of(url).map(str::to_owned)
    }

    /// Reads are open to every signed-in user, as with token download URLs.
    async fn download(&self, url: &str, _requester: &Requester) -> Result<DownloadedBlob, StoreError> {
        let Some(path) = path_of(url) else {
            return Err(StoreError::NotFound(url.to_owned()));
        };
        match self.blobs.read().await.get(path) {
            Some(blob) => Ok(DownloadedBlob { content_type: blob.content_type.clone(), bytes: blob.bytes.clone() }),
            None => Err(StoreError::NotFound(path.to_owned())),
        }
    }

    async fn delete(&self, url: &str, requester: &Requester) -> Result<(), StoreError> {
        let Some(path) = path_of(url) else {
            return Err(StoreError::NotFound(url.to_owned()));
        };
        if self.fail_deletes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("simulated delete failure".into()));
        }
        if !blob_writable_by(path, requester) {
            return Err(StoreError::PermissionDenied(format!("delete of {path}")));
        }
        match self.blobs.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(path.to_owned())),
        }
    }
}
