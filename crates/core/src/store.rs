//! Ports to the remote document store and the local preference store.
//!
//! The storefront consumes exactly two document operations: list every document of a
//! collection and append one document. Adapters live in `storefront-db`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::preference::ThemePreference;

pub const PRODUCTS_COLLECTION: &str = "products";
pub const ORDERS_COLLECTION: &str = "orders";

#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self { id: id.into(), fields }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDocument {
    pub fields: Map<String, Value>,
    /// Field the store sets to its own current time on write.
    pub server_timestamp_field: Option<String>,
}

impl NewDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields, server_timestamp_field: None }
    }

    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamp_field = Some(field.into());
        self
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("document decode failed: {0}")]
    Decode(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Appends a document and returns the identifier the store assigned to it.
    async fn append_document(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, StoreError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load_theme(&self) -> Result<Option<ThemePreference>, StoreError>;
    async fn save_theme(&self, theme: ThemePreference) -> Result<(), StoreError>;
}
