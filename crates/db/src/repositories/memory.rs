use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use storefront_core::domain::preference::ThemePreference;
use storefront_core::store::{
    DocumentStore, NewDocument, PreferenceStore, StoreError, StoredDocument,
};

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn with_collection(collection: &str, documents: Vec<StoredDocument>) -> Self {
        Self { collections: RwLock::new(HashMap::from([(collection.to_string(), documents)])) }
    }

    pub async fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        let collections = self.collections.read().await;
        collections.get(collection).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self.documents(collection).await)
    }

    async fn append_document(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut fields = document.fields;
        if let Some(field) = document.server_timestamp_field {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            fields.insert(field, Value::String(now));
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument::new(id.clone(), fields));
        Ok(id)
    }
}

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    theme: RwLock<Option<ThemePreference>>,
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load_theme(&self) -> Result<Option<ThemePreference>, StoreError> {
        Ok(*self.theme.read().await)
    }

    async fn save_theme(&self, theme: ThemePreference) -> Result<(), StoreError> {
        *self.theme.write().await = Some(theme);
        Ok(())
    }
}
