mod error;
mod sqlite;

pub use error::{StoreError, StoreErrorKind};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Name of the bookkeeping table. Created by the designated first
/// migration script, never by the store itself.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

/// One bookkeeping row per discovered migration.
#[derive(Debug, Clone, FromRow)]
pub struct MigrationRecord {
    pub id: i64,
    pub name: String,
    pub applied: bool,
    pub created_at: NaiveDateTime,
}

/// Outcome of registering a migration name. A duplicate insert is benign,
/// not an error.
#[derive(Debug, PartialEq, Eq)]
pub enum Registration {
    Inserted(i64),
    AlreadyRegistered,
}

/// Narrow capability interface between the runner and the target database.
///
/// Bookkeeping operations (`exists`, `register`, `get`, `list`,
/// `mark_applied`) run in autocommit mode and round-trip to storage on
/// every call. Script execution goes through the transaction methods:
/// `begin`, `execute`, then `commit` or `rollback`.
#[async_trait]
pub trait MigrationStore {
    /// Whether the bookkeeping table exists in the target database.
    async fn table_exists(&mut self) -> Result<bool, StoreError>;

    /// Execute a script directly, outside any transaction. Bootstrap path
    /// only: the table the script creates does not yet exist to record it.
    async fn run_script(&mut self, sql: &str) -> Result<(), StoreError>;

    /// True iff a record with that name is present, regardless of applied
    /// state.
    async fn exists(&mut self, name: &str) -> Result<bool, StoreError>;

    /// Insert a new record with `applied = false`. The unique constraint on
    /// `name` turns a duplicate into `Registration::AlreadyRegistered`.
    async fn register(&mut self, name: &str) -> Result<Registration, StoreError>;

    /// Point lookup used to compute the pending set.
    async fn get(&mut self, name: &str) -> Result<Option<MigrationRecord>, StoreError>;

    /// All records, ordered by id.
    async fn list(&mut self) -> Result<Vec<MigrationRecord>, StoreError>;

    /// Flip `applied` to true for exactly one unapplied row with that name.
    /// Any other affected-row count is a `Consistency` error.
    async fn mark_applied(&mut self, name: &str) -> Result<(), StoreError>;

    async fn begin(&mut self) -> Result<(), StoreError>;

    /// Execute a script body inside the open transaction.
    async fn execute(&mut self, sql: &str) -> Result<(), StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn rollback(&mut self) -> Result<(), StoreError>;
}
