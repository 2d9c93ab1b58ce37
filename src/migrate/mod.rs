pub mod directory;
pub mod error;
pub mod runner;

pub use directory::DiscoveredFiles;
pub use error::{DiscoveryError, DiscoveryErrorKind, MigrateError, MigrateErrorKind};
pub use runner::{MigrationRunner, MigrationState, MigrationStatus, RunReport};

use std::path::{Path, PathBuf};

use crate::migrate::error::DiscoveryErrorKind as Kind;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationKind {
    Up,
    Down,
}

impl MigrationKind {
    // Returns ".up.sql" or ".down.sql"
    pub fn suffix(&self) -> &'static str {
        match self {
            MigrationKind::Up => ".up.sql",
            MigrationKind::Down => ".down.sql",
        }
    }
}

/// A change-script on disk, rebuilt by discovery on every invocation.
///
/// `name` is the full filename (the bookkeeping identity for up-scripts),
/// `sequence` the numeric ordering token parsed from its prefix.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    pub name: String,
    pub kind: MigrationKind,
    pub path: PathBuf,
    pub sequence: i64,
}

impl MigrationFile {
    /// Parse a directory entry into a migration identity. Files matching
    /// neither suffix are not migrations and yield `None`; a matching file
    /// without a numeric sequence prefix is an error.
    pub fn parse(path: &Path) -> Result<Option<MigrationFile>, DiscoveryError> {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => return Ok(None),
        };

        let kind = if name.ends_with(MigrationKind::Up.suffix()) {
            MigrationKind::Up
        } else if name.ends_with(MigrationKind::Down.suffix()) {
            MigrationKind::Down
        } else {
            return Ok(None);
        };

        let sequence = parse_sequence(&name)
            .ok_or_else(|| DiscoveryError { kind: Kind::InvalidName(name.clone()) })?;

        Ok(Some(MigrationFile {
            name,
            kind,
            path: path.to_path_buf(),
            sequence,
        }))
    }

    /// Filename with the kind suffix stripped, used to pair up- and
    /// down-scripts: "0001_create_apps.up.sql" -> "0001_create_apps".
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(self.kind.suffix()).unwrap_or(&self.name)
    }
}

/// Extract the sequence key from a filename: "0001_create_apps.up.sql" -> 1
fn parse_sequence(name: &str) -> Option<i64> {
    name.split('_').next()?.parse::<i64>().ok()
}
