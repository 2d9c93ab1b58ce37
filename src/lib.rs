pub mod cli;
pub mod db;
pub mod migrate;

pub use db::{MigrationRecord, MigrationStore, Registration, SqliteStore, StoreError, StoreErrorKind};
pub use migrate::{MigrateError, MigrateErrorKind, MigrationRunner, MigrationStatus, RunReport};
