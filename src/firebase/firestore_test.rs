use super::*;

fn test_config() -> FirebaseConfig {
    FirebaseConfig {
        api_key: "web-key".into(),
        project_id: "demo".into(),
        storage_bucket: "demo.appspot.com".into(),
        firestore_base_url: "http://localhost:8080/v1".into(),
        storage_base_url: "http://localhost:9199/v0".into(),
        collection: "templates".into(),
        timeouts: crate::firebase::config::HttpTimeouts { request_secs: 5, connect_secs: 1 },
    }
}

// =============================================================
// URLs
// =============================================================

#[test]
fn urls_follow_resource_layout() {
    let store = FirestoreStore::new(reqwest::Client::new(), &test_config());
    assert_eq!(store.collection_url(), "http://localhost:8080/v1/projects/demo/databases/(default)/documents/templates");
    assert_eq!(
        store.document_url("abc 1"),
        "http://localhost:8080/v1/projects/demo/databases/(default)/documents/templates/abc%201"
    );
}

// =============================================================
// Structured queries
// =============================================================

#[test]
fn sorted_public_query() {
    let query = build_structured_query("templates", &TemplateQuery::sorted(TemplateFilter::Public, Some(20)));
    assert_eq!(
        query,
        json!({
            "from": [{ "collectionId": "templates" }],
            "where": { "fieldFilter": {
                "field": { "fieldPath": "isPublic" },
                "op": "EQUAL",
                "value": { "booleanValue": true }
            } },
            "orderBy": [{ "field": { "fieldPath": "createdAtEpochMillis" }, "direction": "DESCENDING" }],
            "limit": 20
        })
    );
}

#[test]
fn unsorted_shared_query_has_no_order_or_limit() {
    let query = build_structured_query("templates", &TemplateQuery::unsorted(TemplateFilter::shared_with("A@x.io")));
    assert_eq!(query["where"]["fieldFilter"]["op"], "ARRAY_CONTAINS");
    assert_eq!(query["where"]["fieldFilter"]["value"]["stringValue"], "a@x.io");
    assert!(query.get("orderBy").is_none());
    assert!(query.get("limit").is_none());
}

#[test]
fn owner_query_filters_owner_id() {
    let query = build_structured_query("t", &TemplateQuery::sorted(TemplateFilter::OwnedBy("u1".into()), None));
    assert_eq!(query["where"]["fieldFilter"]["field"]["fieldPath"], "ownerId");
    assert_eq!(query["where"]["fieldFilter"]["value"]["stringValue"], "u1");
    assert!(query.get("limit").is_none());
}

// =============================================================
// Responses
// =============================================================

#[test]
fn document_body_encodes_fields() {
    let body = document_body(&json!({ "name": "Spring", "isPublic": true })).unwrap();
    assert_eq!(body["fields"]["name"], json!({ "stringValue": "Spring" }));
    assert_eq!(body["fields"]["isPublic"], json!({ "booleanValue": true }));
    assert!(document_body(&json!([1, 2])).is_err());
}

#[test]
fn parse_run_query_skips_read_time_entries() {
    let body = json!([
        { "readTime": "2024-01-01T00:00:00Z" },
        { "document": {
            "name": "projects/demo/databases/(default)/documents/templates/abc",
            "fields": { "name": { "stringValue": "Spring" }, "createdAtEpochMillis": { "integerValue": "5" } }
        } },
        { "document": {
            "name": "projects/demo/databases/(default)/documents/templates/bad",
            "fields": { "name": { "mysteryValue": 1 } }
        } }
    ])
    .to_string();

    let docs = parse_run_query(&body).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "abc");
    assert_eq!(docs[0].data, json!({ "name": "Spring", "createdAtEpochMillis": 5 }));
}

#[test]
fn parse_run_query_empty_result() {
    assert!(parse_run_query(r#"[{"readTime":"2024-01-01T00:00:00Z"}]"#).unwrap().is_empty());
    assert!(matches!(parse_run_query("not json"), Err(StoreError::Malformed(_))));
}

#[test]
fn parse_document_requires_name() {
    assert!(parse_document(&json!({ "fields": {} })).is_err());
    let doc = parse_document(&json!({ "name": "a/b/c/xyz" })).unwrap();
    assert_eq!(doc.id, "xyz");
    assert_eq!(doc.data, json!({}));
}
