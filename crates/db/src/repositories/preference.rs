use async_trait::async_trait;
use serde_json::Value;

use storefront_core::domain::preference::ThemePreference;
use storefront_core::store::{PreferenceStore, StoreError};

use super::{decode_error, RepositoryError};
use crate::DbPool;

pub const DARK_MODE_KEY: &str = "darkMode";

pub struct SqlPreferenceRepository {
    pool: DbPool,
}

impl SqlPreferenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        raw.map(|raw| serde_json::from_str(&raw).map_err(decode_error)).transpose()
    }

    pub async fn set(&self, key: &str, value: &Value) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(value.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for SqlPreferenceRepository {
    async fn load_theme(&self) -> Result<Option<ThemePreference>, StoreError> {
        match self.get(DARK_MODE_KEY).await? {
            None => Ok(None),
            Some(Value::Bool(dark_mode)) => Ok(Some(ThemePreference::from_dark_mode(dark_mode))),
            Some(other) => Err(StoreError::Decode(format!(
                "preference `{DARK_MODE_KEY}` must be a boolean, found {other}"
            ))),
        }
    }

    async fn save_theme(&self, theme: ThemePreference) -> Result<(), StoreError> {
        Ok(self.set(DARK_MODE_KEY, &Value::Bool(theme.is_dark())).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use storefront_core::domain::preference::ThemePreference;
    use storefront_core::store::{PreferenceStore, StoreError};

    use super::{SqlPreferenceRepository, DARK_MODE_KEY};
    use crate::{connect_with_settings, migrations};

    async fn repository() -> SqlPreferenceRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlPreferenceRepository::new(pool)
    }

    #[tokio::test]
    async fn theme_is_absent_until_saved() {
        let repository = repository().await;
        assert_eq!(repository.load_theme().await.expect("load"), None);
    }

    #[tokio::test]
    async fn theme_round_trips_as_dark_mode_flag() {
        let repository = repository().await;

        repository.save_theme(ThemePreference::Dark).await.expect("save dark");
        assert_eq!(repository.get(DARK_MODE_KEY).await.expect("raw"), Some(json!(true)));
        assert_eq!(repository.load_theme().await.expect("load"), Some(ThemePreference::Dark));

        repository.save_theme(ThemePreference::Light).await.expect("save light");
        assert_eq!(repository.load_theme().await.expect("load"), Some(ThemePreference::Light));
    }

    #[tokio::test]
    async fn non_boolean_flag_is_a_decode_error() {
        let repository = repository().await;
        repository.set(DARK_MODE_KEY, &json!("yes")).await.expect("set");

        let error = repository.load_theme().await.expect_err("bad flag");
        assert!(matches!(error, StoreError::Decode(_)));
    }
}
