use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use url::Url;

use storefront_core::config::{AppConfig, StoreBackend};
use storefront_core::store::{
    DocumentStore, NewDocument, PreferenceStore, StoreError, StoredDocument, PRODUCTS_COLLECTION,
};

use crate::firestore::{FirestoreDocumentStore, FirestoreError, FirestoreSettings};
use crate::fixtures::DemoCatalog;
use crate::repositories::{
    InMemoryDocumentStore, InMemoryPreferenceStore, RepositoryError, SqlDocumentStore,
    SqlPreferenceRepository,
};
use crate::{connect_with_settings, migrations, DbPool};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not open the local database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("could not apply migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("could not configure Firestore: {0}")]
    Firestore(#[from] FirestoreError),
    #[error("could not load the demo catalog: {0}")]
    Seed(#[from] RepositoryError),
}

/// Document store selected by `store.backend`.
pub enum ConfiguredStore {
    Sqlite(SqlDocumentStore),
    Firestore(FirestoreDocumentStore),
    Memory(InMemoryDocumentStore),
}

impl ConfiguredStore {
    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Sqlite(_) => StoreBackend::Sqlite,
            Self::Firestore(_) => StoreBackend::Firestore,
            Self::Memory(_) => StoreBackend::Memory,
        }
    }
}

#[async_trait]
impl DocumentStore for ConfiguredStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        match self {
            Self::Sqlite(store) => store.list_documents(collection).await,
            Self::Firestore(store) => store.list_documents(collection).await,
            Self::Memory(store) => store.list_documents(collection).await,
        }
    }

    async fn append_document(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, StoreError> {
        match self {
            Self::Sqlite(store) => store.append_document(collection, document).await,
            Self::Firestore(store) => store.append_document(collection, document).await,
            Self::Memory(store) => store.append_document(collection, document).await,
        }
    }
}

pub struct StoreHandles {
    pub documents: Arc<ConfiguredStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    /// Local pool, when the backend keeps one.
    pub pool: Option<DbPool>,
}

/// Opens the document and preference stores named by the configuration.
///
/// Preferences stay local for every backend: SQLite at `store.database_url`, or process
/// memory for the `memory` backend, which also starts with the demo catalog loaded.
pub async fn open(config: &AppConfig) -> Result<StoreHandles, BackendError> {
    let handles = match config.store.backend {
        StoreBackend::Memory => {
            let documents = InMemoryDocumentStore::with_collection(
                PRODUCTS_COLLECTION,
                DemoCatalog::documents()?,
            );
            StoreHandles {
                documents: Arc::new(ConfiguredStore::Memory(documents)),
                preferences: Arc::new(InMemoryPreferenceStore::default()),
                pool: None,
            }
        }
        StoreBackend::Sqlite => {
            let pool = open_local(config).await?;
            StoreHandles {
                documents: Arc::new(ConfiguredStore::Sqlite(SqlDocumentStore::new(pool.clone()))),
                preferences: Arc::new(SqlPreferenceRepository::new(pool.clone())),
                pool: Some(pool),
            }
        }
        StoreBackend::Firestore => {
            let documents = FirestoreDocumentStore::new(firestore_settings(config)?)?;
            let pool = open_local(config).await?;
            StoreHandles {
                documents: Arc::new(ConfiguredStore::Firestore(documents)),
                preferences: Arc::new(SqlPreferenceRepository::new(pool.clone())),
                pool: Some(pool),
            }
        }
    };

    info!(
        event_name = "storefront.store.opened",
        backend = config.store.backend.as_str(),
        "document store opened"
    );
    Ok(handles)
}

async fn open_local(config: &AppConfig) -> Result<DbPool, BackendError> {
    let pool = connect_with_settings(
        &config.store.database_url,
        config.store.max_connections,
        config.store.timeout_secs,
    )
    .await?;
    migrations::run_pending(&pool).await?;
    Ok(pool)
}

pub fn firestore_settings(config: &AppConfig) -> Result<FirestoreSettings, FirestoreError> {
    let base_url = Url::parse(&config.firestore.base_url)
        .map_err(|error| FirestoreError::InvalidUrl(format!("{}: {error}", config.firestore.base_url)))?;
    Ok(FirestoreSettings {
        base_url,
        project_id: config.firestore.project_id.clone(),
        database: config.firestore.database.clone(),
        api_key: config.firestore.api_key.clone(),
        timeout_secs: config.store.timeout_secs,
    })
}
