//! Record Store: generic synchronous-style load/save of named collections
//!
//! Each collection (leads, touches, users) is stored whole as one JSON
//! string under its key. Reads that find missing or malformed data fall
//! back to the caller-supplied seed and persist it — corruption recovery
//! discards broken storage, never valid records.

use leaddesk_common::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Collection key for leads
pub const LEADS_KEY: &str = "leads";
/// Collection key for touches
pub const TOUCHES_KEY: &str = "touches";
/// Collection key for users
pub const USERS_KEY: &str = "users";
/// Scalar key for the current-user pointer
pub const CURRENT_USER_KEY: &str = "current_user_id";

/// Key→JSON record store over the `records` table
#[derive(Debug, Clone)]
pub struct RecordStore {
    db: SqlitePool,
}

impl RecordStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Load a named collection, seeding (and persisting the seed) when the
    /// key is absent or its stored value fails to parse
    pub async fn load_collection<T, F>(&self, key: &str, seed: F) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        match self.read_raw(key).await? {
            Some(text) => match serde_json::from_str::<Vec<T>>(&text) {
                Ok(items) => Ok(items),
                Err(err) => {
                    warn!(key, %err, "Stored collection is malformed, resetting to seed data");
                    let items = seed();
                    self.save_collection(key, &items).await?;
                    Ok(items)
                }
            },
            None => {
                let items = seed();
                info!(key, count = items.len(), "Seeding collection on first access");
                self.save_collection(key, &items).await?;
                Ok(items)
            }
        }
    }

    /// Persist a collection as a full overwrite
    pub async fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let text = serde_json::to_string(items)?;
        self.write_raw(key, &text).await
    }

    /// Read a scalar value; a malformed stored value reads as absent
    pub async fn get_scalar<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.read_raw(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, %err, "Stored scalar is malformed, treating as unset");
                Ok(None)
            }
        }
    }

    /// Write a scalar value
    pub async fn set_scalar<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.write_raw(key, &text).await
    }

    /// Delete a key; next access reseeds
    pub async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM records WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO records (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_records_table;

    async fn test_store() -> RecordStore {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_records_table(&pool).await.unwrap();
        RecordStore::new(pool)
    }

    #[tokio::test]
    async fn first_read_seeds_and_persists() {
        let store = test_store().await;
        let loaded = store
            .load_collection("numbers", || vec![1i64, 2, 3])
            .await
            .unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);

        // Second read must come from storage, not the seed closure
        let reloaded = store
            .load_collection::<i64, _>("numbers", || vec![9])
            .await
            .unwrap();
        assert_eq!(reloaded, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn malformed_value_resets_to_seed() {
        let store = test_store().await;
        store.write_raw("numbers", "{not json").await.unwrap();

        let loaded = store
            .load_collection("numbers", || vec![7i64])
            .await
            .unwrap();
        assert_eq!(loaded, vec![7]);

        // The reset seed was persisted
        let raw = store.read_raw("numbers").await.unwrap().unwrap();
        assert_eq!(raw, "[7]");
    }

    #[tokio::test]
    async fn save_is_a_full_overwrite() {
        let store = test_store().await;
        store.save_collection("numbers", &[1i64, 2]).await.unwrap();
        store.save_collection("numbers", &[3i64]).await.unwrap();
        let loaded = store
            .load_collection::<i64, _>("numbers", Vec::new)
            .await
            .unwrap();
        assert_eq!(loaded, vec![3]);
    }

    #[tokio::test]
    async fn scalar_round_trip_and_malformed_reads_as_unset() {
        let store = test_store().await;
        assert_eq!(store.get_scalar::<String>("who").await.unwrap(), None);

        store.set_scalar("who", &"alice".to_string()).await.unwrap();
        assert_eq!(
            store.get_scalar::<String>("who").await.unwrap(),
            Some("alice".to_string())
        );

        store.write_raw("who", "###").await.unwrap();
        assert_eq!(store.get_scalar::<String>("who").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_clears_the_key() {
        let store = test_store().await;
        store.save_collection("numbers", &[1i64]).await.unwrap();
        store.delete("numbers").await.unwrap();
        assert_eq!(store.read_raw("numbers").await.unwrap(), None);
    }
}
