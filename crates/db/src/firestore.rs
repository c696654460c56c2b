//! Document store backed by the Cloud Firestore REST API.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/v1/projects/{project}/databases/{database}/documents/{collection}` | list, paged by `nextPageToken` |
//! | POST   | `/v1/projects/{project}/databases/{database}/documents:commit` | append with a `REQUEST_TIME` transform |
//!
//! Firestore wraps every value in a typed envelope (`stringValue`, `integerValue`, ...).
//! Documents are unwrapped into plain JSON on read and wrapped again on write.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use storefront_core::store::{DocumentStore, NewDocument, StoreError, StoredDocument};

const PAGE_SIZE: u32 = 300;

#[derive(Clone, Debug)]
pub struct FirestoreSettings {
    pub base_url: Url,
    pub project_id: String,
    pub database: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http { endpoint: String, source: reqwest::Error },
    #[error("{endpoint} returned {status}: {body}")]
    Api { endpoint: String, status: u16, body: String },
    #[error("could not deserialize response from {endpoint}: {source}")]
    Deserialization { endpoint: String, source: reqwest::Error },
    #[error("could not decode Firestore value: {0}")]
    Decode(String),
    #[error("invalid Firestore URL: {0}")]
    InvalidUrl(String),
    #[error("could not build HTTP client: {0}")]
    Client(reqwest::Error),
}

impl From<FirestoreError> for StoreError {
    fn from(error: FirestoreError) -> Self {
        match error {
            FirestoreError::Api { status, .. } if (400..500).contains(&status) => {
                StoreError::Rejected(error.to_string())
            }
            FirestoreError::Deserialization { .. } | FirestoreError::Decode(_) => {
                StoreError::Decode(error.to_string())
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Clone, Debug)]
pub struct FirestoreDocumentStore {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    database: String,
    api_key: Option<SecretString>,
}

impl FirestoreDocumentStore {
    pub fn new(settings: FirestoreSettings) -> Result<Self, FirestoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(FirestoreError::Client)?;
        Ok(Self {
            http,
            base_url: settings.base_url,
            project_id: settings.project_id,
            database: settings.database,
            api_key: settings.api_key,
        })
    }

    /// `projects/{project}/databases/{database}/documents`
    fn documents_root(&self) -> String {
        format!("projects/{}/databases/{}/documents", self.project_id, self.database)
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url, FirestoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FirestoreError::InvalidUrl(format!("`{}` cannot be a base URL", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["v1", "projects", self.project_id.as_str()])
                .extend(["databases", self.database.as_str()])
                .extend(tail);
        }
        if let Some(api_key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", api_key.expose_secret());
        }
        Ok(url)
    }

    pub async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, FirestoreError> {
        let endpoint = format!("GET /documents/{collection}");
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["documents", collection])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &PAGE_SIZE.to_string());
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|source| FirestoreError::Http { endpoint: endpoint.clone(), source })?;
            let page: ListDocumentsResponse = read_json(response, &endpoint).await?;

            for document in page.documents {
                documents.push(decode_document(document)?);
            }
            debug!(
                event_name = "storefront.firestore.page_loaded",
                collection,
                total = documents.len(),
                "firestore page loaded"
            );

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    pub async fn append(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, FirestoreError> {
        let endpoint = "POST /documents:commit".to_string();
        let id = Uuid::new_v4().to_string();
        let name = format!("{}/{collection}/{id}", self.documents_root());

        let mut write = json!({
            "update": { "name": name, "fields": encode_fields(&document.fields) },
            "currentDocument": { "exists": false },
        });
        if let Some(field) = &document.server_timestamp_field {
            write["updateTransforms"] =
                json!([{ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }]);
        }

        let url = self.endpoint(&["documents:commit"])?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "writes": [write] }))
            .send()
            .await
            .map_err(|source| FirestoreError::Http { endpoint: endpoint.clone(), source })?;
        let _: Value = read_json(response, &endpoint).await?;

        Ok(id)
    }
}

async fn read_json<T>(response: reqwest::Response, endpoint: &str) -> Result<T, FirestoreError>
where
    T: serde::de::DeserializeOwned,
{
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(FirestoreError::Api { endpoint: endpoint.to_string(), status, body });
    }

    response
        .json()
        .await
        .map_err(|source| FirestoreError::Deserialization { endpoint: endpoint.to_string(), source })
}

fn decode_document(document: FirestoreDocument) -> Result<StoredDocument, FirestoreError> {
    let id = document
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FirestoreError::Decode(format!("document name `{}` has no id", document.name)))?
        .to_string();
    Ok(StoredDocument::new(id, decode_fields(&document.fields)?))
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, FirestoreError> {
    fields.iter().map(|(key, value)| Ok((key.clone(), decode_value(value)?))).collect()
}

/// Unwraps one typed Firestore value into plain JSON.
pub fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|object| object.iter().next()) else {
        return Err(FirestoreError::Decode(format!("expected a typed value, found {value}")));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| FirestoreError::Decode(format!("invalid booleanValue {inner}"))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(text) => text.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed
                .map(|number| Value::Number(number.into()))
                .ok_or_else(|| FirestoreError::Decode(format!("invalid integerValue {inner}")))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::String(text) => text.parse::<f64>().ok(),
                other => other.as_f64(),
            };
            parsed
                .map(|number| Number::from_f64(number).map_or(Value::Null, Value::Number))
                .ok_or_else(|| FirestoreError::Decode(format!("invalid doubleValue {inner}")))
        }
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => inner
            .as_str()
            .map(|text| Value::String(text.to_string()))
            .ok_or_else(|| FirestoreError::Decode(format!("invalid {kind} {inner}"))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array).map(Vec::as_slice);
            values
                .unwrap_or_default()
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
            Some(other) => Err(FirestoreError::Decode(format!("invalid mapValue fields {other}"))),
        },
        other => Err(FirestoreError::Decode(format!("unsupported value type `{other}`"))),
    }
}

fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields.iter().map(|(key, value)| (key.clone(), encode_value(value))).collect()
}

/// Wraps plain JSON into a typed Firestore value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64().unwrap_or_default() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self.list(collection).await?)
    }

    async fn append_document(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, StoreError> {
        Ok(self.append(collection, document).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{decode_value, encode_value, FirestoreError};

    #[test]
    fn typed_scalars_decode_to_plain_json() {
        assert_eq!(decode_value(&json!({"stringValue": "Ring"})).expect("string"), json!("Ring"));
        assert_eq!(decode_value(&json!({"integerValue": "120"})).expect("int"), json!(120));
        assert_eq!(decode_value(&json!({"doubleValue": 19.9})).expect("double"), json!(19.9));
        assert_eq!(decode_value(&json!({"booleanValue": false})).expect("bool"), json!(false));
        assert_eq!(decode_value(&json!({"nullValue": null})).expect("null"), json!(null));
        assert_eq!(
            decode_value(&json!({"timestampValue": "2026-03-01T10:00:00Z"})).expect("timestamp"),
            json!("2026-03-01T10:00:00Z")
        );
    }

    #[test]
    fn nested_arrays_and_maps_decode_recursively() {
        let value = json!({"mapValue": {"fields": {
            "images": {"arrayValue": {"values": [{"stringValue": "a.jpg"}, {"stringValue": "b.jpg"}]}},
            "empty": {"arrayValue": {}}
        }}});

        assert_eq!(
            decode_value(&value).expect("map"),
            json!({"images": ["a.jpg", "b.jpg"], "empty": []})
        );
    }

    #[test]
    fn unknown_value_type_is_a_decode_error() {
        let error = decode_value(&json!({"vectorValue": [1, 2]})).expect_err("unsupported");
        assert!(matches!(error, FirestoreError::Decode(_)));
    }

    #[test]
    fn plain_json_encodes_to_typed_values() {
        let encoded = encode_value(&json!({
            "productName": "Ring",
            "productPrice": "19.9",
            "quantity": 2,
            "customerDetails": {"city": "Tetouan"}
        }));

        assert_eq!(
            encoded,
            json!({"mapValue": {"fields": {
                "productName": {"stringValue": "Ring"},
                "productPrice": {"stringValue": "19.9"},
                "quantity": {"integerValue": "2"},
                "customerDetails": {"mapValue": {"fields": {"city": {"stringValue": "Tetouan"}}}}
            }}})
        );
    }
}
