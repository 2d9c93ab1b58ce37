use crate::db::StoreError;

use std::error::Error;
use std::fmt;
use std::path::PathBuf;


#[derive(Debug)]
pub struct DiscoveryError {
    pub kind: DiscoveryErrorKind,
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiscoveryError: {}", self.kind)
    }
}

impl Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum DiscoveryErrorKind {
    Io { source: std::io::Error, path: PathBuf },
    NotADirectory(PathBuf),
    /// A file matched `up.sql`/`down.sql` but its sequence prefix does not
    /// parse as a number.
    InvalidName(String),
    DuplicateSequence { sequence: i64, first: String, second: String },
}

impl fmt::Display for DiscoveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "Failed to read migration directory '{}'", path.display()),
            Self::NotADirectory(path) => {
                write!(f, "Target '{}' does not exist or is not a directory", path.display())
            }
            Self::InvalidName(name) => {
                write!(f, "Migration '{name}' has no numeric sequence prefix")
            }
            Self::DuplicateSequence { sequence, first, second } => {
                write!(f, "Duplicate sequence {sequence} in migrations '{first}' and '{second}'")
            }
        }
    }
}

impl Error for DiscoveryErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}


/// Runner-level error: every variant carries the migration name and phase
/// the run stopped at.
#[derive(Debug)]
pub struct MigrateError {
    pub kind: MigrateErrorKind,
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MigrateError: {}", self.kind)
    }
}

impl Error for MigrateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum MigrateErrorKind {
    Discovery(DiscoveryError),
    Bootstrap { name: String, source: StoreError },
    Register { name: String, source: StoreError },
    /// A registered migration vanished between the registration and apply
    /// passes.
    MissingRecord { name: String },
    ReadScript { source: std::io::Error, path: PathBuf },
    /// The script failed inside its transaction; the transaction was rolled
    /// back and the record left unapplied.
    Script { name: String, source: StoreError },
    MarkApplied { name: String, source: StoreError },
    Status { source: StoreError },
}

impl fmt::Display for MigrateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "{e}"),
            Self::Bootstrap { name, source } => {
                write!(f, "Bootstrap script '{name}' failed: {source}")
            }
            Self::Register { name, source } => {
                write!(f, "Failed to register migration '{name}': {source}")
            }
            Self::MissingRecord { name } => {
                write!(f, "Migration '{name}' has no bookkeeping record after registration")
            }
            Self::ReadScript { path, .. } => {
                write!(f, "Failed to read migration script '{}'", path.display())
            }
            Self::Script { name, source } => {
                write!(f, "Migration '{name}' failed and was rolled back: {source}")
            }
            Self::MarkApplied { name, source } => {
                write!(f, "Failed to mark migration '{name}' as applied: {source}")
            }
            Self::Status { source } => write!(f, "Failed to query migration status: {source}"),
        }
    }
}

impl Error for MigrateErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Discovery(source) => Some(source),
            Self::Bootstrap { source, .. } => Some(source),
            Self::Register { source, .. } => Some(source),
            Self::ReadScript { source, .. } => Some(source),
            Self::Script { source, .. } => Some(source),
            Self::MarkApplied { source, .. } => Some(source),
            Self::Status { source } => Some(source),
            Self::MissingRecord { .. } => None,
        }
    }
}

impl From<DiscoveryError> for MigrateError {
    fn from(error: DiscoveryError) -> Self {
        MigrateError { kind: MigrateErrorKind::Discovery(error) }
    }
}
