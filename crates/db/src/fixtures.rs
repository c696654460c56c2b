use serde::Deserialize;
use serde_json::{Map, Value};

use storefront_core::store::{StoredDocument, PRODUCTS_COLLECTION};

use crate::repositories::document::upsert_document;
use crate::repositories::{decode_error, RepositoryError, SqlDocumentStore};

/// Demo `products` collection used for local development and the `memory` backend.
///
/// Several entries are deliberately untidy (text prices, missing descriptions,
/// non-array lists) so the catalog normalization path is exercised end to end.
pub struct DemoCatalog;

#[derive(Debug, Deserialize)]
struct SeedDocument {
    id: String,
    fields: Map<String, Value>,
}

impl DemoCatalog {
    pub const JSON: &str = include_str!("../../../config/fixtures/demo_catalog.json");

    pub fn documents() -> Result<Vec<StoredDocument>, RepositoryError> {
        let seeds: Vec<SeedDocument> = serde_json::from_str(Self::JSON).map_err(decode_error)?;
        Ok(seeds.into_iter().map(|seed| StoredDocument::new(seed.id, seed.fields)).collect())
    }

    /// Writes every demo product, replacing earlier copies with the same id.
    pub async fn load(store: &SqlDocumentStore) -> Result<SeedResult, RepositoryError> {
        let documents = Self::documents()?;
        let mut tx = store.pool().begin().await?;
        for document in &documents {
            upsert_document(&mut *tx, PRODUCTS_COLLECTION, &document.id, &document.fields).await?;
        }
        tx.commit().await?;

        Ok(SeedResult {
            products_seeded: documents.into_iter().map(|document| document.id).collect(),
        })
    }

    /// Checks that every demo product is present with its seeded name.
    pub async fn verify(store: &SqlDocumentStore) -> Result<VerificationResult, RepositoryError> {
        let expected = Self::documents()?;
        let stored = store.fetch_all(PRODUCTS_COLLECTION).await?;

        let checks = expected
            .iter()
            .map(|seed| {
                let present = stored.iter().any(|document| {
                    document.id == seed.id && document.fields.get("name") == seed.fields.get("name")
                });
                (seed.id.clone(), present)
            })
            .collect::<Vec<_>>();

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: Vec<String>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}
