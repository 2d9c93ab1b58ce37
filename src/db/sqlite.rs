use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{
    MIGRATIONS_TABLE, MigrationRecord, MigrationStore, Registration, StoreError, StoreErrorKind,
};

/// SQLite-backed store. Bookkeeping statements run against the pool in
/// autocommit mode; script bodies run inside a held transaction so every
/// failed apply can be rolled back before the error is surfaced.
pub struct SqliteStore {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // One connection: each pooled `sqlite::memory:` connection would
        // otherwise be a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(SqliteStore::from_pool(pool))
    }

    /// Wrap an already-open connection pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        SqliteStore { pool, tx: None }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn transaction(&mut self) -> Result<&mut Transaction<'static, Sqlite>, StoreError> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }

        self.tx.as_mut().ok_or_else(|| StoreError {
            kind: StoreErrorKind::TransactionNotStarted,
        })
    }
}

#[async_trait]
impl MigrationStore for SqliteStore {
    async fn table_exists(&mut self) -> Result<bool, StoreError> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(MIGRATIONS_TABLE)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    async fn run_script(&mut self, sql: &str) -> Result<(), StoreError> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;

        Ok(())
    }

    async fn exists(&mut self, name: &str) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn register(&mut self, name: &str) -> Result<Registration, StoreError> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO schema_migrations (name, applied)
            VALUES (?, FALSE)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match id {
            Some(id) => Registration::Inserted(id),
            None => Registration::AlreadyRegistered,
        })
    }

    async fn get(&mut self, name: &str) -> Result<Option<MigrationRecord>, StoreError> {
        let record = sqlx::query_as::<_, MigrationRecord>(
            "SELECT id, name, applied, created_at FROM schema_migrations WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list(&mut self) -> Result<Vec<MigrationRecord>, StoreError> {
        let records = sqlx::query_as::<_, MigrationRecord>(
            "SELECT id, name, applied, created_at FROM schema_migrations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn mark_applied(&mut self, name: &str) -> Result<(), StoreError> {
        // The `applied = FALSE` guard makes the loser of a racing apply
        // observe a zero-row update instead of silently re-flipping.
        let result =
            sqlx::query("UPDATE schema_migrations SET applied = TRUE WHERE name = ? AND applied = FALSE")
                .bind(name)
                .execute(&self.pool)
                .await?;

        let rows = result.rows_affected();

        if rows != 1 {
            return Err(StoreError {
                kind: StoreErrorKind::Consistency { name: name.to_string(), rows },
            });
        }

        Ok(())
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        self.transaction().await?;

        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        let tx = self.transaction().await?;

        sqlx::raw_sql(sql).execute(&mut **tx).await?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }

        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }

        Ok(())
    }
}
