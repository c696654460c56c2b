use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::Row;
use uuid::Uuid;

use storefront_core::store::{DocumentStore, NewDocument, StoreError, StoredDocument};

use super::{decode_error, RepositoryError};
use crate::DbPool;

/// Document store over the local `documents` table.
///
/// A document's server timestamp is the row's `created_at`, assigned by SQLite on insert
/// and merged back into the fields under the requested name when listed.
#[derive(Clone)]
pub struct SqlDocumentStore {
    pool: DbPool,
}

impl SqlDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Inserts or replaces a document under a caller-chosen identifier.
    pub async fn put_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        upsert_document(&self.pool, collection, id, fields).await
    }

    pub async fn count(&self, collection: &str) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(1) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn fetch_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, body, server_timestamp_field, created_at
             FROM documents WHERE collection = ? ORDER BY seq",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_document).collect()
    }

    pub async fn insert(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(&document.fields).map_err(decode_error)?;
        sqlx::query(
            "INSERT INTO documents (collection, id, body, server_timestamp_field)
             VALUES (?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&id)
        .bind(body)
        .bind(document.server_timestamp_field)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }
}

/// Upsert on `(collection, id)`, usable inside a transaction.
pub(crate) async fn upsert_document<'e, E>(
    executor: E,
    collection: &str,
    id: &str,
    fields: &Map<String, Value>,
) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let body = serde_json::to_string(fields).map_err(decode_error)?;
    sqlx::query(
        "INSERT INTO documents (collection, id, body)
         VALUES (?, ?, ?)
         ON CONFLICT(collection, id) DO UPDATE SET body = excluded.body",
    )
    .bind(collection.to_owned())
    .bind(id.to_owned())
    .bind(body)
    .execute(executor)
    .await?;
    Ok(())
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<StoredDocument, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let body: String = row.try_get("body").map_err(decode_error)?;
    let timestamp_field: Option<String> =
        row.try_get("server_timestamp_field").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;

    let mut fields = match serde_json::from_str::<Value>(&body).map_err(decode_error)? {
        Value::Object(fields) => fields,
        other => {
            return Err(RepositoryError::Decode(format!(
                "document `{id}` body is not an object: {other}"
            )))
        }
    };
    if let Some(field) = timestamp_field {
        fields.insert(field, Value::String(created_at));
    }

    Ok(StoredDocument::new(id, fields))
}

#[async_trait]
impl DocumentStore for SqlDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self.fetch_all(collection).await?)
    }

    async fn append_document(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> Result<String, StoreError> {
        Ok(self.insert(collection, document).await?)
    }
}
