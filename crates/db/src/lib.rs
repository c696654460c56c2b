pub mod backend;
pub mod connection;
pub mod firestore;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use backend::{open, BackendError, ConfiguredStore, StoreHandles};
pub use connection::{connect_with_settings, DbPool};
pub use firestore::{FirestoreDocumentStore, FirestoreError, FirestoreSettings};
pub use fixtures::{DemoCatalog, SeedResult, VerificationResult};
pub use repositories::{
    InMemoryDocumentStore, InMemoryPreferenceStore, RepositoryError, SqlDocumentStore,
    SqlPreferenceRepository,
};
