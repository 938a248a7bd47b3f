// SQLite Config Store

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use contest_core::error::Result;
use contest_core::port::ConfigStore;
use sqlx::SqlitePool;

/// Reads the admin-managed `config` table
#[derive(Clone)]
pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a value
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO config (name, value) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT value FROM config WHERE name = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use contest_core::port::ACCESS_TOKEN_KEY;

    #[tokio::test]
    async fn test_get_missing_key() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteConfigStore::new(pool);

        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteConfigStore::new(pool);

        tokio_test::assert_ok!(store.set(ACCESS_TOKEN_KEY, "first").await);
        tokio_test::assert_ok!(store.set(ACCESS_TOKEN_KEY, "second").await);

        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).await.unwrap(),
            Some("second".to_string())
        );
    }
}
