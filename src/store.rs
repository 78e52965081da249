use crate::error::Result;
use crate::models::{ServerRecord, UserRecord};
use log::info;
use serenity::async_trait;
use serenity::model::id::{GuildId, UserId};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const UPSERT_USER: &str = "INSERT INTO user_records (user_id, data) VALUES (?, ?)
     ON CONFLICT(user_id) DO UPDATE SET data = excluded.data";

/// Whole-document access to user and server records.
///
/// `get_*` never fails for an unknown id: a fresh default record is handed
/// back and only persisted once it is `put_*`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<UserRecord>;
    async fn put_user(&self, record: &UserRecord) -> Result<()>;
    /// Writes all `records` or none of them.
    async fn put_users(&self, records: &[&UserRecord]) -> Result<()>;
    async fn get_server(&self, id: GuildId) -> Result<ServerRecord>;
    async fn put_server(&self, record: &ServerRecord) -> Result<()>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` is its own database
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        info!("Record store ready at {}", url);

        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_user(&self, id: UserId) -> Result<UserRecord> {
        let row = sqlx::query("SELECT data FROM user_records WHERE user_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: &str = row.try_get("data")?;
                Ok(serde_json::from_str(data)?)
            }
            None => Ok(UserRecord::new(id)),
        }
    }

    async fn put_user(&self, record: &UserRecord) -> Result<()> {
        sqlx::query(UPSERT_USER)
            .bind(record.id.to_string())
            .bind(serde_json::to_string(record)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn put_users(&self, records: &[&UserRecord]) -> Result<()> {
        let documents = records
            .iter()
            .map(|record| -> Result<(String, String)> {
                Ok((record.id.to_string(), serde_json::to_string(record)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tx = self.pool.begin().await?;
        for (user_id, data) in documents {
            sqlx::query(UPSERT_USER)
                .bind(user_id)
                .bind(data)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_server(&self, id: GuildId) -> Result<ServerRecord> {
        let row = sqlx::query("SELECT data FROM server_records WHERE guild_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: &str = row.try_get("data")?;
                Ok(serde_json::from_str(data)?)
            }
            None => Ok(ServerRecord::new(id)),
        }
    }

    async fn put_server(&self, record: &ServerRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO server_records (guild_id, data) VALUES (?, ?)
             ON CONFLICT(guild_id) DO UPDATE SET data = excluded.data",
        )
        .bind(record.id.to_string())
        .bind(serde_json::to_string(record)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> SqliteStore {
    SqliteStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open")
}
