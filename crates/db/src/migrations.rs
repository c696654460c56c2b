use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{run_pending, MIGRATOR};
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] =
        &["documents", "preferences", "idx_documents_collection_seq"];

    async fn schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String)> {
        let mut signature: Vec<(String, String)> = sqlx::query(
            "SELECT type, name FROM sqlite_master WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .map(|row| (row.get::<String, _>("type"), row.get::<String, _>("name")))
        .filter(|(_, name)| MANAGED_SCHEMA_OBJECTS.contains(&name.as_str()))
        .collect();
        signature.sort();
        signature
    }

    #[tokio::test]
    async fn migrations_create_document_and_preference_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let signature = schema_signature(&pool).await;

        assert_eq!(signature.len(), MANAGED_SCHEMA_OBJECTS.len());
        assert!(signature.contains(&("table".to_string(), "documents".to_string())));
        assert!(signature.contains(&("table".to_string(), "preferences".to_string())));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        assert_eq!(schema_signature(&pool).await.len(), MANAGED_SCHEMA_OBJECTS.len());
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        let initial = schema_signature(&pool).await;

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert!(schema_signature(&pool).await.is_empty());

        run_pending(&pool).await.expect("re-run migrations");
        assert_eq!(schema_signature(&pool).await, initial);
    }
}
