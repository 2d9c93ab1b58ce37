use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::{MigrationStore, Registration};
use crate::migrate::directory::{self, DiscoveredFiles};
use crate::migrate::error::{MigrateError, MigrateErrorKind};
use crate::migrate::MigrationFile;

/// Counts for one `execute` invocation. A second run over an unchanged
/// directory reports zero registered and zero applied.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub discovered: usize,
    pub registered: usize,
    pub applied: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    Applied,
    Pending,
    Unregistered,
}

/// Per-migration answer to the status query.
#[derive(Debug, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub sequence: i64,
    pub state: MigrationState,
    pub registered_at: Option<NaiveDateTime>,
    pub has_down: bool,
}

/// Execution context for migrations: a directory of scripts and a handle to
/// the target store. Applies pending migrations one at a time, in sequence
/// order, halting at the first failure so a later migration never applies
/// while an earlier one is still pending.
pub struct MigrationRunner<S> {
    directory: PathBuf,
    store: S,
}

impl<S: MigrationStore> MigrationRunner<S> {
    pub fn new(directory: impl Into<PathBuf>, store: S) -> Self {
        MigrationRunner { directory: directory.into(), store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Run the full migration process: bootstrap, registration pass, apply
    /// pass. Returns at the first error, with the migration name and phase
    /// attached.
    pub async fn execute(&mut self) -> Result<RunReport, MigrateError> {
        let files = directory::scan(&self.directory)?;
        let mut report = RunReport { discovered: files.up.len(), ..RunReport::default() };

        if files.up.is_empty() {
            tracing::warn!("No migration scripts found in '{}'", self.directory.display());
            return Ok(report);
        }

        self.bootstrap(&files.up[0], &mut report).await?;
        self.register_all(&files, &mut report).await?;
        self.apply_pending(&files, &mut report).await?;

        tracing::info!(
            discovered = report.discovered,
            registered = report.registered,
            applied = report.applied,
            "Migration run complete"
        );

        Ok(report)
    }

    /// Per-migration status for every discovered up-script. With no
    /// bookkeeping table every migration reports as unregistered.
    pub async fn status(&mut self) -> Result<Vec<MigrationStatus>, MigrateError> {
        let files = directory::scan(&self.directory)?;

        let table_exists = self
            .store
            .table_exists()
            .await
            .map_err(|source| MigrateError { kind: MigrateErrorKind::Status { source } })?;

        let mut statuses = Vec::with_capacity(files.up.len());

        for file in &files.up {
            let record = if table_exists {
                self.store
                    .get(&file.name)
                    .await
                    .map_err(|source| MigrateError { kind: MigrateErrorKind::Status { source } })?
            } else {
                None
            };

            let state = match &record {
                Some(r) if r.applied => MigrationState::Applied,
                Some(_) => MigrationState::Pending,
                None => MigrationState::Unregistered,
            };

            statuses.push(MigrationStatus {
                name: file.name.clone(),
                sequence: file.sequence,
                state,
                registered_at: record.map(|r| r.created_at),
                has_down: files.down_for(file.stem()).is_some(),
            });
        }

        Ok(statuses)
    }

    /// Create the bookkeeping table by executing the designated first
    /// script directly. The table it creates does not yet exist to record
    /// the apply, so the script runs outside the transactional path and is
    /// marked applied immediately afterwards.
    async fn bootstrap(
        &mut self,
        first: &MigrationFile,
        report: &mut RunReport,
    ) -> Result<(), MigrateError> {
        let exists = self
            .store
            .table_exists()
            .await
            .map_err(|source| MigrateError {
                kind: MigrateErrorKind::Bootstrap { name: first.name.clone(), source },
            })?;

        if exists {
            tracing::debug!("Bookkeeping table present, skipping bootstrap");
            return Ok(());
        }

        tracing::info!("Bootstrapping bookkeeping table via '{}'", first.name);

        let sql = read_script(first)?;

        self.store.run_script(&sql).await.map_err(|source| MigrateError {
            kind: MigrateErrorKind::Bootstrap { name: first.name.clone(), source },
        })?;

        self.store.register(&first.name).await.map_err(|source| MigrateError {
            kind: MigrateErrorKind::Register { name: first.name.clone(), source },
        })?;

        self.store.mark_applied(&first.name).await.map_err(|source| MigrateError {
            kind: MigrateErrorKind::MarkApplied { name: first.name.clone(), source },
        })?;

        report.registered += 1;
        report.applied += 1;

        Ok(())
    }

    /// Discovered -> Registered for every up-script not yet recorded.
    async fn register_all(
        &mut self,
        files: &DiscoveredFiles,
        report: &mut RunReport,
    ) -> Result<(), MigrateError> {
        for file in &files.up {
            let known = self.store.exists(&file.name).await.map_err(|source| MigrateError {
                kind: MigrateErrorKind::Register { name: file.name.clone(), source },
            })?;

            if known {
                continue;
            }

            let registration =
                self.store.register(&file.name).await.map_err(|source| MigrateError {
                    kind: MigrateErrorKind::Register { name: file.name.clone(), source },
                })?;

            match registration {
                Registration::Inserted(id) => {
                    tracing::debug!("Registered migration '{}' as record {}", file.name, id);
                    report.registered += 1;
                }
                // A writer got there between the existence check and the
                // insert; the unique constraint already kept us safe.
                Registration::AlreadyRegistered => {
                    tracing::debug!("Migration '{}' already registered", file.name);
                }
            }
        }

        Ok(())
    }

    /// Pending -> Applying -> Applied, in ascending sequence order. The
    /// first failure halts the run.
    async fn apply_pending(
        &mut self,
        files: &DiscoveredFiles,
        report: &mut RunReport,
    ) -> Result<(), MigrateError> {
        for file in &files.up {
            let record = self
                .store
                .get(&file.name)
                .await
                .map_err(|source| MigrateError { kind: MigrateErrorKind::Status { source } })?
                .ok_or_else(|| MigrateError {
                    kind: MigrateErrorKind::MissingRecord { name: file.name.clone() },
                })?;

            if record.applied {
                tracing::debug!("Migration '{}' already applied, skipping", file.name);
                continue;
            }

            self.apply(file).await?;
            report.applied += 1;
        }

        Ok(())
    }

    async fn apply(&mut self, file: &MigrationFile) -> Result<(), MigrateError> {
        tracing::info!("Applying migration '{}'", file.name);

        let sql = read_script(file)?;

        let script_err = |source| MigrateError {
            kind: MigrateErrorKind::Script { name: file.name.clone(), source },
        };

        self.store.begin().await.map_err(script_err)?;

        if let Err(source) = self.store.execute(&sql).await {
            if let Err(e) = self.store.rollback().await {
                tracing::error!("Rollback after failed migration '{}' also failed: {e}", file.name);
            }
            return Err(script_err(source));
        }

        self.store.commit().await.map_err(script_err)?;

        self.store.mark_applied(&file.name).await.map_err(|source| MigrateError {
            kind: MigrateErrorKind::MarkApplied { name: file.name.clone(), source },
        })?;

        Ok(())
    }
}

fn read_script(file: &MigrationFile) -> Result<String, MigrateError> {
    fs::read_to_string(&file.path).map_err(|source| MigrateError {
        kind: MigrateErrorKind::ReadScript { source, path: file.path.clone() },
    })
}
