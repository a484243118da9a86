use super::*;
use crate::model::Visibility;
use crate::store::memory::{MemoryBlobStore, MemoryDocumentStore};
use designer::background::{BackgroundAsset, presets};
use designer::content::CertificateContent;
use designer::layout::Layout;

const NOW: i64 = 1_700_000_000_000;
const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

fn fixed_clock() -> i64 {
    NOW
}

fn ann() -> Requester {
    Requester::new("u1").with_email("ann@example.com").with_display_name("Ann")
}

fn bo() -> Requester {
    Requester::new("u2").with_email("Bo@Example.com")
}

struct Fixture {
    documents: Arc<MemoryDocumentStore>,
    blobs: Arc<MemoryBlobStore>,
    repo: TemplateRepository,
}

fn fixture_with(documents: MemoryDocumentStore) -> Fixture {
    let documents = Arc::new(documents);
    let blobs = Arc::new(MemoryBlobStore::new());
    let repo = TemplateRepository::new(documents.clone(), blobs.clone()).with_clock(fixed_clock);
    Fixture { documents, blobs, repo }
}

fn fixture() -> Fixture {
    fixture_with(MemoryDocumentStore::new())
}

fn new_template(name: &str, visibility: Visibility) -> NewTemplate {
    let mut content = CertificateContent::default();
    content.bride_name = "Ada".into();
    NewTemplate { name: name.into(), content, layout: Layout::default(), background: presets()[2].clone(), visibility }
}

fn inline_template(name: &str) -> NewTemplate {
    let mut template = new_template(name, Visibility::Private);
    template.background = BackgroundAsset::generated("AI Generated: roses", PNG_DATA_URL);
    template
}

async fn seed(documents: &MemoryDocumentStore, id: &str, owner: &str, created: i64, visibility: Visibility) {
    let record = TemplateRecord::new(new_template(id, visibility), owner, "Seeder", created);
    documents.seed(id, serde_json::to_value(&record).unwrap()).await;
}

fn ids(templates: &[Template]) -> Vec<&str> {
    templates.iter().map(|t| t.id.as_str()).collect()
}

// =============================================================
// Save
// =============================================================

#[tokio::test]
async fn save_rejects_blank_name() {
    let f = fixture();
    let err = f.repo.save(new_template("   ", Visibility::Public), &ann()).await.unwrap_err();
    assert!(matches!(err, TemplateError::EmptyName));
    assert_eq!(err.class(), ErrorClass::InvalidInput);
    assert!(f.documents.is_empty().await);
}

#[tokio::test]
async fn save_then_list_round_trips() {
    let f = fixture();
    let original = new_template("  Spring Wedding ", Visibility::shared_with(["bo@example.com"]));
    let id = f.repo.save(original.clone(), &ann()).await.unwrap();

    let mine = f.repo.list(Scope::Mine, Some(&ann())).await.unwrap();
    assert_eq!(mine.len(), 1);
    let saved = &mine[0];
    assert_eq!(saved.id, id);
    assert_eq!(saved.name, "Spring Wedding");
    assert_eq!(saved.content, original.content);
    assert_eq!(saved.layout, original.layout);
    assert_eq!(saved.background, original.background);
    assert_eq!(saved.visibility, original.visibility);
    assert_eq!(saved.owner_id, "u1");
    assert_eq!(saved.owner_display_name, "Ann");
    assert_eq!(saved.created_at_epoch_millis, NOW);
    assert!(f.blobs.paths().await.is_empty());
}

#[tokio::test]
async fn save_without_display_name_records_anonymous() {
    let f = fixture();
    f.repo.save(new_template("Plain", Visibility::Public), &Requester::new("u9")).await.unwrap();
    let listed = f.repo.list(Scope::Public, None).await.unwrap();
    assert_eq!(listed[0].owner_display_name, ANONYMOUS_DISPLAY_NAME);
}

#[tokio::test]
async fn save_uploads_inline_background_first() {
    let f = fixture();
    let original = inline_template("Roses");
    f.repo.save(original.clone(), &ann()).await.unwrap();

    let paths = f.blobs.paths().await;
    assert_eq!(paths.len(), 1);
    assert!(paths[0].starts_with(&format!("backgrounds/u1/{NOW}-")));
    assert!(paths[0].ends_with(".png"));
    let blob = f.blobs.get(&paths[0]).await.unwrap();
    assert_eq!(blob.content_type, "image/png");
    assert_eq!(blob.bytes.len(), 8);

    let saved = f.repo.list(Scope::Mine, Some(&ann())).await.unwrap().remove(0);
    assert_eq!(saved.background.image_ref, format!("memory://blobs/{}", paths[0]));
    assert_eq!(saved.background.id, original.background.id);
    assert_eq!(saved.background.theme, original.background.theme);
}

#[tokio::test]
async fn save_upload_failure_writes_nothing() {
    let f = fixture();
    f.blobs.set_fail_uploads(true);
    let err = f.repo.save(inline_template("Roses"), &ann()).await.unwrap_err();
    assert!(matches!(err, TemplateError::Upload(_)));
    assert!(err.to_string().contains("failed to upload custom background image"));
    assert!(f.documents.is_empty().await);
}

#[tokio::test]
async fn save_malformed_inline_image_is_invalid() {
    let f = fixture();
    let mut template = inline_template("Broken");
    template.background.image_ref = "data:image/png;base64,@@@".into();
    let err = f.repo.save(template, &ann()).await.unwrap_err();
    assert!(matches!(err, TemplateError::InvalidImage(DataUrlError::Decode(_))));
    assert!(f.blobs.paths().await.is_empty());
    assert!(f.documents.is_empty().await);
}

struct RejectingDocuments;

#[async_trait::async_trait]
impl DocumentStore for RejectingDocuments {
    async fn insert(&self, _data: Value, _requester: &Requester) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("connection reset".into()))
    }

    async fn get(&self, _id: &str, _requester: &Requester) -> Result<Option<StoredDocument>, StoreError> {
        Ok(None)
    }

    async fn query(
        &self,
        _query: &TemplateQuery,
        _requester: Option<&Requester>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Err(StoreError::Backend { status: 500, message: "boom".into() })
    }

    async fn delete(&self, _id: &str, _requester: &Requester) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn failed_insert_discards_uploaded_blob() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let repo = TemplateRepository::new(Arc::new(RejectingDocuments), blobs.clone());

    let err = repo.save(inline_template("Roses"), &ann()).await.unwrap_err();
    assert!(matches!(err, TemplateError::Store(StoreError::Unavailable(_))));
    assert!(err.retryable());
    assert!(blobs.paths().await.is_empty());
}

#[tokio::test]
async fn store_failures_other_than_missing_index_surface() {
    let repo = TemplateRepository::new(Arc::new(RejectingDocuments), Arc::new(MemoryBlobStore::new()));
    let err = repo.list(Scope::Public, None).await.unwrap_err();
    assert!(matches!(err, TemplateError::Store(StoreError::Backend { status: 500, .. })));
}

// =============================================================
// List
// =============================================================

#[tokio::test]
async fn public_listing_is_capped_and_public_only() {
    let f = fixture();
    for i in 0..25 {
        seed(&f.documents, &format!("pub-{i:02}"), "u1", NOW + i, Visibility::Public).await;
    }
    seed(&f.documents, "private", "u1", NOW + 100, Visibility::Private).await;
    seed(&f.documents, "shared", "u2", NOW + 101, Visibility::shared_with(["ann@example.com"])).await;

    let listed = f.repo.list(Scope::Public, None).await.unwrap();
    assert_eq!(listed.len(), PUBLIC_LIST_CAP);
    assert!(listed.iter().all(|t| t.visibility.is_public()));
    assert_eq!(listed[0].id, "pub-24");
    assert_eq!(listed[19].id, "pub-05");
}

#[tokio::test]
async fn mine_lists_every_visibility_of_owner_only() {
    let f = fixture();
    seed(&f.documents, "a", "u1", NOW, Visibility::Public).await;
    seed(&f.documents, "b", "u1", NOW + 1, Visibility::Private).await;
    seed(&f.documents, "c", "u1", NOW + 2, Visibility::shared_with(["x@y.z"])).await;
    seed(&f.documents, "d", "u2", NOW + 3, Visibility::Public).await;

    let mine = f.repo.list(Scope::Mine, Some(&ann())).await.unwrap();
    assert_eq!(ids(&mine), ["c", "b", "a"]);
}

#[tokio::test]
async fn shared_lists_only_items_shared_with_requester() {
    let f = fixture();
    seed(&f.documents, "to-bo", "u1", NOW, Visibility::shared_with(["bo@example.com"])).await;
    seed(&f.documents, "to-cy", "u1", NOW + 1, Visibility::shared_with(["cy@example.com"])).await;
    seed(&f.documents, "public", "u1", NOW + 2, Visibility::Public).await;

    let shared = f.repo.list(Scope::SharedWithMe, Some(&bo())).await.unwrap();
    assert_eq!(ids(&shared), ["to-bo"]);
}

#[tokio::test]
async fn public_record_with_share_list_is_only_public() {
    let f = fixture();
    let mut record = TemplateRecord::new(new_template("both", Visibility::shared_with(["bo@example.com"])), "u1", "A", NOW);
    record.is_public = true;
    f.documents.seed("both", serde_json::to_value(&record).unwrap()).await;

    assert!(f.repo.list(Scope::SharedWithMe, Some(&bo())).await.unwrap().is_empty());
    assert_eq!(ids(&f.repo.list(Scope::Public, None).await.unwrap()), ["both"]);
}

#[tokio::test]
async fn anonymous_requester_gets_empty_private_scopes() {
    let f = fixture();
    seed(&f.documents, "a", "u1", NOW, Visibility::Public).await;

    assert!(f.repo.list(Scope::Mine, None).await.unwrap().is_empty());
    assert!(f.repo.list(Scope::SharedWithMe, None).await.unwrap().is_empty());
    assert!(f.repo.list(Scope::SharedWithMe, Some(&Requester::new("u3"))).await.unwrap().is_empty());
    assert_eq!(f.repo.list(Scope::Public, None).await.unwrap().len(), 1);
    // Nothing reached the store for the empty scopes.
    assert_eq!(f.documents.queries().await.len(), 1);
}

#[tokio::test]
async fn equal_timestamps_order_by_descending_id() {
    let f = fixture();
    seed(&f.documents, "b", "u1", NOW, Visibility::Public).await;
    seed(&f.documents, "c", "u1", NOW, Visibility::Public).await;
    seed(&f.documents, "a", "u1", NOW, Visibility::Public).await;

    assert_eq!(ids(&f.repo.list(Scope::Public, None).await.unwrap()), ["c", "b", "a"]);
}

#[tokio::test]
async fn cap_boundary_on_shared_timestamp_matches_fallback() {
    let indexed = fixture();
    let degraded = fixture_with(MemoryDocumentStore::without_index());
    for f in [&indexed, &degraded] {
        for i in 0..25 {
            seed(&f.documents, &format!("t-{i:02}"), "u1", NOW, Visibility::Public).await;
        }
    }

    let expected = indexed.repo.list(Scope::Public, None).await.unwrap();
    let fallback = degraded.repo.list(Scope::Public, None).await.unwrap();
    assert_eq!(expected.len(), PUBLIC_LIST_CAP);
    assert_eq!(ids(&fallback), ids(&expected));
    assert_eq!(expected[0].id, "t-24");
}

#[tokio::test]
async fn capped_page_with_undecodable_record_is_refilled() {
    let f = fixture();
    for i in 0..25 {
        seed(&f.documents, &format!("t-{i:02}"), "u1", NOW + i, Visibility::Public).await;
    }
    f.documents
        .seed("broken", serde_json::json!({ "isPublic": true, "createdAtEpochMillis": NOW + 100 }))
        .await;

    let listed = f.repo.list(Scope::Public, None).await.unwrap();
    assert_eq!(listed.len(), PUBLIC_LIST_CAP);
    assert_eq!(listed[0].id, "t-24");
    assert_eq!(listed[19].id, "t-05");

    let queries = f.documents.queries().await;
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1], TemplateQuery::unsorted(TemplateFilter::Public));
}

#[tokio::test]
async fn missing_index_falls_back_to_client_side_sort() {
    let indexed = fixture();
    let degraded = fixture_with(MemoryDocumentStore::without_index());
    for f in [&indexed, &degraded] {
        for i in 0..23 {
            let visibility = if i % 4 == 0 { Visibility::Private } else { Visibility::Public };
            seed(&f.documents, &format!("t-{i:02}"), "u1", NOW + (i * 7) % 11, visibility).await;
        }
    }

    for scope in [Scope::Public, Scope::Mine] {
        let expected = indexed.repo.list(scope, Some(&ann())).await.unwrap();
        let fallback = degraded.repo.list(scope, Some(&ann())).await.unwrap();
        assert_eq!(ids(&fallback), ids(&expected), "{scope:?}");
    }

    let queries = degraded.documents.queries().await;
    assert_eq!(queries.len(), 4);
    assert!(queries[0].needs_index());
    assert_eq!(queries[1], TemplateQuery::unsorted(TemplateFilter::Public));
}

#[tokio::test]
async fn legacy_record_lists_through_unsorted_path() {
    let f = fixture_with(MemoryDocumentStore::without_index());
    seed(&f.documents, "new", "u1", NOW, Visibility::Public).await;
    let legacy = serde_json::json!({
        "name": "Old",
        "layout": {
            "sloganSize": 40,
            "signatureWidth": 200,
            "brideSigPos": { "x": 1.0, "y": 2.0 },
            "groomSigPos": { "x": 3.0, "y": 4.0 },
            "counselorSigPos": { "x": 5.0, "y": 6.0 }
        },
        "background": {
            "id": "custom",
            "name": "Custom",
            "url": "https://example.com/old.jpg",
            "textColor": "text-white",
            "borderColor": "border-white",
            "accentColor": "bg-white"
        },
        "createdBy": "u7",
        "createdAt": NOW + 1,
        "isPublic": true
    });
    f.documents.seed("legacy", legacy).await;

    let listed = f.repo.list(Scope::Public, None).await.unwrap();
    assert_eq!(ids(&listed), ["legacy", "new"]);
    assert_eq!(listed[0].owner_id, "u7");
    assert_eq!(listed[0].background.theme, designer::background::Theme::Ivory);
    assert_eq!(listed[0].layout.slogan_text_size, 40);
}

#[tokio::test]
async fn undecodable_records_are_skipped() {
    let f = fixture();
    seed(&f.documents, "good", "u1", NOW, Visibility::Public).await;
    f.documents
        .seed("bad", serde_json::json!({ "isPublic": true, "createdAtEpochMillis": NOW + 1, "name": 5 }))
        .await;

    assert_eq!(ids(&f.repo.list(Scope::Public, None).await.unwrap()), ["good"]);
}

// =============================================================
// Delete
// =============================================================

#[tokio::test]
async fn delete_by_non_owner_is_permission_error() {
    let f = fixture();
    seed(&f.documents, "t1", "u1", NOW, Visibility::Public).await;

    let err = f.repo.delete("t1", &bo()).await.unwrap_err();
    assert!(matches!(err, TemplateError::PermissionDenied(_)));
    assert_eq!(err.class(), ErrorClass::Permission);
    assert!(f.documents.get("t1", &ann()).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let f = fixture();
    let err = f.repo.delete("nope", &ann()).await.unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(ref id) if id == "nope"));
}

#[tokio::test]
async fn delete_preset_background_leaves_blobs_alone() {
    let f = fixture();
    let id = f.repo.save(new_template("Preset", Visibility::Public), &ann()).await.unwrap();
    assert_eq!(f.repo.delete(&id, &ann()).await.unwrap(), DeleteOutcome::NotOwned);
    assert!(!f.documents.contains(&id).await);
}

#[tokio::test]
async fn delete_removes_uploaded_blob() {
    let f = fixture();
    let id = f.repo.save(inline_template("Roses"), &ann()).await.unwrap();
    assert_eq!(f.blobs.paths().await.len(), 1);

    assert_eq!(f.repo.delete(&id, &ann()).await.unwrap(), DeleteOutcome::Deleted);
    assert!(f.blobs.paths().await.is_empty());
}

#[tokio::test]
async fn delete_keeps_blob_still_referenced() {
    let f = fixture();
    let first = f.repo.save(inline_template("Roses"), &ann()).await.unwrap();
    let saved = f.repo.list(Scope::Mine, Some(&ann())).await.unwrap().remove(0);

    // Re-saving the loaded design reuses the durable URL.
    let resave = NewTemplate::from_snapshot("Roses again", saved.snapshot(), Visibility::Public);
    f.repo.save(resave, &ann()).await.unwrap();

    assert_eq!(f.repo.delete(&first, &ann()).await.unwrap(), DeleteOutcome::StillReferenced);
    assert_eq!(f.blobs.paths().await.len(), 1);
}

#[tokio::test]
async fn resaving_another_users_template_copies_its_background() {
    let f = fixture();
    let mut original = inline_template("Roses");
    original.visibility = Visibility::Public;
    let ann_id = f.repo.save(original, &ann()).await.unwrap();

    let listed = f.repo.list(Scope::Public, None).await.unwrap().remove(0);
    let resave = NewTemplate::from_snapshot("Bo's roses", listed.snapshot(), Visibility::Private);
    f.repo.save(resave, &bo()).await.unwrap();

    let bo_template = f.repo.list(Scope::Mine, Some(&bo())).await.unwrap().remove(0);
    let bo_path = bo_template.background.image_ref.strip_prefix("memory://blobs/").unwrap().to_owned();
    assert!(bo_path.starts_with(&format!("backgrounds/u2/{NOW}-")));
    assert_ne!(bo_template.background.image_ref, listed.background.image_ref);

    assert_eq!(f.repo.delete(&ann_id, &ann()).await.unwrap(), DeleteOutcome::Deleted);
    let remaining = f.blobs.paths().await;
    assert_eq!(remaining, [bo_path.clone()]);
    assert_eq!(f.blobs.get(&bo_path).await.unwrap().bytes.len(), 8);
}

#[tokio::test]
async fn copy_of_vanished_background_aborts_save() {
    let f = fixture();
    let mut template = new_template("Ghost", Visibility::Public);
    template.background.image_ref = "memory://blobs/backgrounds/u1/gone.png".into();

    let err = f.repo.save(template, &bo()).await.unwrap_err();
    assert!(matches!(err, TemplateError::Upload(StoreError::NotFound(_))));
    assert!(f.documents.is_empty().await);
}

#[tokio::test]
async fn blob_cleanup_failure_does_not_fail_delete() {
    let f = fixture();
    let id = f.repo.save(inline_template("Roses"), &ann()).await.unwrap();
    f.blobs.set_fail_deletes(true);

    let outcome = f.repo.delete(&id, &ann()).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Failed(_)));
    assert!(!f.documents.contains(&id).await);
}

// =============================================================
// Scope
// =============================================================

#[test]
fn scope_parses_cli_names() {
    assert_eq!("public".parse::<Scope>().unwrap(), Scope::Public);
    assert_eq!("Mine".parse::<Scope>().unwrap(), Scope::Mine);
    assert_eq!("shared".parse::<Scope>().unwrap(), Scope::SharedWithMe);
    assert!("everyone".parse::<Scope>().is_err());
}
