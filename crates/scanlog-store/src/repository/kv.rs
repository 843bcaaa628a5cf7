//! # Key/Value Repository
//!
//! String key → string value with upsert semantics. Multi-key writes run
//! in one transaction so a crash never persists half of a batch close.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// A pending write: `Some(value)` upserts, `None` deletes.
pub type KvWrite<'a> = (&'a str, Option<String>);

/// Repository over the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads a value. Missing keys are `None`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Inserts or replaces a value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "kv set");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a key. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        debug!(key = %key, "kv remove");

        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// Applies several writes atomically.
    ///
    /// ## Example
    /// ```rust,ignore
    /// kv.write_many(&[("entries", Some("[]".into())), ("header_discount", None)]).await?;
    /// ```
    pub async fn write_many(&self, writes: &[KvWrite<'_>]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        for (key, value) in writes {
            match value {
                Some(value) => {
                    sqlx::query(
                        r#"
                        INSERT INTO kv_store (key, value, updated_at)
                        VALUES (?1, ?2, ?3)
                        ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            updated_at = excluded.updated_at
                        "#,
                    )
                    .bind(*key)
                    .bind(value.as_str())
                    .bind(&now)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                        .bind(*key)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = writes.len(), "kv batch committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let db = setup().await;
        assert_eq!(db.kv().get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = setup().await;
        let kv = db.kv();

        kv.set("scanMode", "1d").await.unwrap();
        kv.set("scanMode", "2d").await.unwrap();

        assert_eq!(kv.get("scanMode").await.unwrap().as_deref(), Some("2d"));
        assert_eq!(kv.keys().await.unwrap(), vec!["scanMode".to_string()]);
    }

    #[tokio::test]
    async fn test_remove() {
        let db = setup().await;
        let kv = db.kv();

        kv.set("a", "1").await.unwrap();
        assert!(kv.remove("a").await.unwrap());
        assert!(!kv.remove("a").await.unwrap());
        assert_eq!(kv.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_many_mixes_upserts_and_deletes() {
        let db = setup().await;
        let kv = db.kv();
        kv.set("gone", "x").await.unwrap();

        kv.write_many(&[
            ("entries", Some("[]".to_string())),
            ("batches", Some("[]".to_string())),
            ("gone", None),
        ])
        .await
        .unwrap();

        assert_eq!(
            kv.keys().await.unwrap(),
            vec!["batches".to_string(), "entries".to_string()]
        );
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.kv().set("header_storeName", "Acme").await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            db.kv().get("header_storeName").await.unwrap().as_deref(),
            Some("Acme")
        );
    }
}
