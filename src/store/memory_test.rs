use super::*;
use serde_json::json;

fn owner() -> Requester {
    Requester::new("u1").with_email("ann@example.com")
}

fn stranger() -> Requester {
    Requester::new("u2").with_email("bo@example.com")
}

fn doc(owner: &str, created: i64, public: bool, shared: &[&str]) -> Value {
    json!({ "ownerId": owner, ORDER_FIELD: created, "isPublic": public, "sharedWith": shared })
}

// =============================================================
// Documents
// =============================================================

#[tokio::test]
async fn insert_requires_matching_owner() {
    let store = MemoryDocumentStore::new();
    let err = store.insert(doc("u1", 1, true, &[]), &stranger()).await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    assert!(store.is_empty().await);

    let id = store.insert(doc("u1", 1, true, &[]), &owner()).await.unwrap();
    assert!(store.contains(&id).await);
}

#[tokio::test]
async fn ids_are_unique() {
    let store = MemoryDocumentStore::new();
    let a = store.insert(doc("u1", 1, false, &[]), &owner()).await.unwrap();
    let b = store.insert(doc("u1", 1, false, &[]), &owner()).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn private_document_is_unreadable_by_others() {
    let store = MemoryDocumentStore::new();
    store.seed("t1", doc("u1", 1, false, &[])).await;
    assert!(store.get("t1", &owner()).await.unwrap().is_some());
    assert!(matches!(store.get("t1", &stranger()).await, Err(StoreError::PermissionDenied(_))));
    assert_eq!(store.get("missing", &owner()).await.unwrap(), None);
}

#[tokio::test]
async fn shared_document_is_readable_by_recipient() {
    let store = MemoryDocumentStore::new();
    store.seed("t1", doc("u1", 1, false, &["bo@example.com"])).await;
    assert!(store.get("t1", &stranger()).await.unwrap().is_some());
}

#[tokio::test]
async fn sorted_query_orders_newest_first_and_caps() {
    let store = MemoryDocumentStore::new();
    store.seed("a", doc("u1", 10, true, &[])).await;
    store.seed("b", doc("u1", 30, true, &[])).await;
    store.seed("c", doc("u1", 20, true, &[])).await;
    store.seed("d", doc("u1", 40, false, &[])).await;

    let hits = store.query(&TemplateQuery::sorted(TemplateFilter::Public, Some(2)), None).await.unwrap();
    let ids: Vec<_> = hits.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["b", "c"]);
}

#[tokio::test]
async fn sorted_query_skips_documents_without_order_field() {
    let store = MemoryDocumentStore::new();
    store.seed("new", doc("u1", 10, true, &[])).await;
    store.seed("old", json!({ "createdBy": "u1", "createdAt": 5, "isPublic": true })).await;

    let sorted = store.query(&TemplateQuery::sorted(TemplateFilter::Public, None), None).await.unwrap();
    assert_eq!(sorted.len(), 1);
    let unsorted = store.query(&TemplateQuery::unsorted(TemplateFilter::Public), None).await.unwrap();
    assert_eq!(unsorted.len(), 2);
}

#[tokio::test]
async fn sorted_query_breaks_ties_by_descending_id() {
    let store = MemoryDocumentStore::new();
    for id in ["a", "c", "b"] {
        store.seed(id, doc("u1", 10, true, &[])).await;
    }
    let hits = store.query(&TemplateQuery::sorted(TemplateFilter::Public, Some(2)), None).await.unwrap();
    let ids: Vec<_> = hits.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["c", "b"]);
}

#[tokio::test]
async fn missing_index_fails_only_sorted_queries() {
    let store = MemoryDocumentStore::without_index();
    store.seed("a", doc("u1", 10, true, &[])).await;

    let sorted = store.query(&TemplateQuery::sorted(TemplateFilter::Public, Some(20)), None).await;
    assert!(matches!(sorted, Err(StoreError::IndexUnavailable(_))));

    let unsorted = store.query(&TemplateQuery::unsorted(TemplateFilter::Public), None).await.unwrap();
    assert_eq!(unsorted.len(), 1);
    assert_eq!(store.queries().await.len(), 2);

    store.set_index_available(true);
    assert!(store.query(&TemplateQuery::sorted(TemplateFilter::Public, None), None).await.is_ok());
}

#[tokio::test]
async fn owner_query_by_someone_else_is_denied() {
    let store = MemoryDocumentStore::new();
    let query = TemplateQuery::unsorted(TemplateFilter::OwnedBy("u1".into()));
    assert!(matches!(store.query(&query, Some(&stranger())).await, Err(StoreError::PermissionDenied(_))));
    assert!(matches!(store.query(&query, None).await, Err(StoreError::PermissionDenied(_))));
    assert!(store.query(&query, Some(&owner())).await.is_ok());
}

#[tokio::test]
async fn delete_requires_owner_and_ignores_missing() {
    let store = MemoryDocumentStore::new();
    store.seed("t1", doc("u1", 1, true, &[])).await;

    assert!(matches!(store.delete("t1", &stranger()).await, Err(StoreError::PermissionDenied(_))));
    assert!(store.contains("t1").await);

    store.delete("t1", &owner()).await.unwrap();
    assert!(!store.contains("t1").await);
    store.delete("t1", &owner()).await.unwrap();
}

// =============================================================
// Blobs
// =============================================================

#[tokio::test]
async fn upload_returns_owned_url() {
    let blobs = MemoryBlobStore::new();
    let uploaded = blobs.upload("backgrounds/u1/1-a.png", "image/png", vec![1, 2], &owner()).await.unwrap();
    assert_eq!(uploaded.url, "memory://blobs/backgrounds/u1/1-a.png");
    assert!(blobs.owns(&uploaded.url));
    assert!(!blobs.owns("/backgrounds/eucalyptus.jpg"));
    assert_eq!(blobs.get("backgrounds/u1/1-a.png").await.unwrap().content_type, "image/png");
}

#[tokio::test]
async fn upload_outside_own_folder_is_denied() {
    let blobs = MemoryBlobStore::new();
    let err = blobs.upload("backgrounds/u1/x.png", "image/png", vec![1], &stranger()).await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    assert!(blobs.paths().await.is_empty());
}

#[tokio::test]
async fn simulated_failures() {
    let blobs = MemoryBlobStore::new();
    blobs.set_fail_uploads(true);
    assert!(matches!(
        blobs.upload("backgrounds/u1/x.png", "image/png", vec![1], &owner()).await,
        Err(StoreError::Unavailable(_))
    ));

    blobs.set_fail_uploads(false);
    let uploaded = blobs.upload("backgrounds/u1/x.png", "image/png", vec![1], &owner()).await.unwrap();
    blobs.set_fail_deletes(true);
    assert!(blobs.delete(&uploaded.url, &owner()).await.is_err());
    assert_eq!(blobs.paths().await.len(), 1);
}

#[tokio::test]
async fn download_reads_any_owned_blob() {
    let blobs = MemoryBlobStore::new();
    let uploaded = blobs.upload("backgrounds/u1/1-a.jpg", "image/jpeg", vec![7, 8], &owner()).await.unwrap();

    let blob = blobs.download(&uploaded.url, &stranger()).await.unwrap();
    assert_eq!(blob.content_type, "image/jpeg");
    assert_eq!(blob.bytes, [7, 8]);
    assert_eq!(blobs.path_of(&uploaded.url).as_deref(), Some("backgrounds/u1/1-a.jpg"));

    blobs.delete(&uploaded.url, &owner()).await.unwrap();
    assert!(matches!(blobs.download(&uploaded.url, &owner()).await, Err(StoreError::NotFound(_))));
    assert!(matches!(blobs.download("/backgrounds/eucalyptus.jpg", &owner()).await, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn delete_unowned_url_is_not_found() {
    let blobs = MemoryBlobStore::new();
    let err = blobs.delete("https://cdn.example.com/a.png", &owner()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
