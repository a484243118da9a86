//! Firestore v1 REST adapter.
//!
//! Thin HTTP wrapper; request bodies and response parsing are pure functions
//! so they can be tested without a network.

use serde_json::{Value, json};
use tracing::warn;

use super::value::{decode_fields, encode_fields};
use super::{FirebaseConfig, authorize, parse_google_error, send};
use crate::model::Requester;
use crate::store::{DocumentStore, ORDER_FIELD, StoreError, StoredDocument, TemplateFilter, TemplateQuery};

#[cfg(test)]
#[path = "firestore_test.rs"]
mod tests;

// =============================================================================
// CLIENT
// =============================================================================

pub struct FirestoreStore {
    http: reqwest::Client,
    api_key: String,
    documents_url: String,
    collection: String,
}

impl FirestoreStore {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                config.firestore_base_url, config.project_id
            ),
            collection: config.collection.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, self.collection, urlencoding::encode(id))
    }

    fn key(&self) -> [(&'static str, &str); 1] {
        [("key", self.api_key.as_str())]
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreStore {
    async fn insert(&self, data: Value, requester: &Requester) -> Result<String, StoreError> {
        let body = document_body(&data)?;
        let request = self.http.post(self.collection_url()).query(&self.key()).json(&body);
        let (status, text) = send(authorize(request, Some(requester))).await?;
        if status != 200 {
            return Err(parse_google_error(status, &text));
        }
        let document: Value = serde_json::from_str(&text).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(parse_document(&document)?.id)
    }

    async fn get(&self, id: &str, requester: &Requester) -> Result<Option<StoredDocument>, StoreError> {
        let request = self.http.get(self.document_url(id)).query(&self.key());
        let (status, text) = send(authorize(request, Some(requester))).await?;
        match status {
            200 => {
                let document: Value =
                    serde_json::from_str(&text).map_err(|e| StoreError::Malformed(e.to_string()))?;
                parse_document(&document).map(Some)
            }
            404 => Ok(None),
            _ => Err(parse_google_error(status, &text)),
        }
    }

    async fn query(
        &self,
        query: &TemplateQuery,
        requester: Option<&Requester>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let body = json!({ "structuredQuery": build_structured_query(&self.collection, query) });
        let url = format!("{}:runQuery", self.documents_url);
        let request = self.http.post(url).query(&self.key()).json(&body);
        let (status, text) = send(authorize(request, requester)).await?;
        if status != 200 {
            return Err(parse_google_error(status, &text));
        }
        parse_run_query(&text)
    }

    async fn delete(&self, id: &str, requester: &Requester) -> Result<(), StoreError> {
        let request = self.http.delete(self.document_url(id)).query(&self.key());
        let (status, text) = send(authorize(request, Some(requester))).await?;
        if status != 200 {
            return Err(parse_google_error(status, &text));
        }
        Ok(())
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

fn document_body(data: &Value) -> Result<Value, StoreError> {
    let Some(map) = data.as_object() else {
        return Err(StoreError::Malformed("document data must be a JSON object".into()));
    };
    Ok(json!({ "fields": encode_fields(map) }))
}

fn field_filter(filter: &TemplateFilter) -> Value {
    let (op, value) = match filter {
        TemplateFilter::Public => ("EQUAL", json!({ "booleanValue": true })),
        TemplateFilter::OwnedBy(id) => ("EQUAL", json!({ "stringValue": id })),
        TemplateFilter::SharedWith(email) => ("ARRAY_CONTAINS", json!({ "stringValue": email })),
    };
    json!({ "fieldFilter": { "field": { "fieldPath": filter.field() }, "op": op, "value": value } })
}

fn build_structured_query(collection: &str, query: &TemplateQuery) -> Value {
    let mut structured = json!({
        "from": [{ "collectionId": collection }],
        "where": field_filter(&query.filter),
    });
    if query.newest_first {
        structured["orderBy"] = json!([{ "field": { "fieldPath": ORDER_FIELD }, "direction": "DESCENDING" }]);
    }
    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }
    structured
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn parse_document(document: &Value) -> Result<StoredDocument, StoreError> {
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Malformed("document without a name".into()))?;
    let data = decode_fields(document.get("fields").unwrap_or(&Value::Null))?;
    Ok(StoredDocument { id: document_id(name).to_owned(), data })
}

/// Parse a `:runQuery` response stream. Entries without a document (read
/// time markers) are skipped, as are documents whose values fail to decode.
fn parse_run_query(body: &str) -> Result<Vec<StoredDocument>, StoreError> {
    let entries: Vec<Value> = serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))?;
    let mut documents = Vec::with_capacity(entries.len());
    for entry in &entries {
        let Some(document) = entry.get("document") else {
            continue;
        };
        match parse_document(document) {
            Ok(parsed) => documents.push(parsed),
            Err(e) => warn!(error = %e, "firestore: skipping undecodable document"),
        }
    }
    Ok(documents)
}
