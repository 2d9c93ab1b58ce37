use std::fs;
use std::path::Path;

use crate::migrate::error::{DiscoveryError, DiscoveryErrorKind};
use crate::migrate::{MigrationFile, MigrationKind};

/// Ordered discovery result: up- and down-scripts sorted ascending by
/// (sequence, name).
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    pub up: Vec<MigrationFile>,
    pub down: Vec<MigrationFile>,
}

impl DiscoveredFiles {
    /// Paired rollback script for an up-script, matched by stem.
    pub fn down_for(&self, stem: &str) -> Option<&MigrationFile> {
        self.down.iter().find(|f| f.stem() == stem)
    }
}

/// Scan a directory for migration scripts.
///
/// Files matching neither suffix are skipped; subdirectories are skipped.
/// No side effects beyond filesystem reads.
pub fn scan(directory: &Path) -> Result<DiscoveredFiles, DiscoveryError> {
    if !directory.is_dir() {
        return Err(DiscoveryError {
            kind: DiscoveryErrorKind::NotADirectory(directory.to_path_buf()),
        });
    }

    let entries = fs::read_dir(directory).map_err(|source| DiscoveryError {
        kind: DiscoveryErrorKind::Io { source, path: directory.to_path_buf() },
    })?;

    let mut files = DiscoveredFiles::default();

    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError {
            kind: DiscoveryErrorKind::Io { source, path: directory.to_path_buf() },
        })?;

        let path = entry.path();
        if !path.is_file() {
            tracing::debug!("Skipping non-file entry: {:?}", path);
            continue;
        }

        match MigrationFile::parse(&path)? {
            Some(file) => match file.kind {
                MigrationKind::Up => files.up.push(file),
                MigrationKind::Down => files.down.push(file),
            },
            None => tracing::debug!("Skipping non-migration file: {:?}", path),
        }
    }

    files.up.sort_by(|a, b| (a.sequence, &a.name).cmp(&(b.sequence, &b.name)));
    files.down.sort_by(|a, b| (a.sequence, &a.name).cmp(&(b.sequence, &b.name)));

    // Two up-scripts with one sequence key would make the apply order
    // ambiguous.
    for pair in files.up.windows(2) {
        if pair[0].sequence == pair[1].sequence {
            return Err(DiscoveryError {
                kind: DiscoveryErrorKind::DuplicateSequence {
                    sequence: pair[0].sequence,
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                },
            });
        }
    }

    Ok(files)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_scripts(dir: &TempDir, names: &[&str]) {
        for name in names {
            fs::write(dir.path().join(name), "SELECT 1;").unwrap();
        }
    }

    #[test]
    fn scan_sorts_by_sequence() {
        let dir = TempDir::new().unwrap();
        write_scripts(
            &dir,
            &["0010_later.up.sql", "0000_init.up.sql", "0002_apps.up.sql"],
        );

        let files = scan(dir.path()).unwrap();

        let names: Vec<&str> = files.up.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["0000_init.up.sql", "0002_apps.up.sql", "0010_later.up.sql"]);
        assert!(files.down.is_empty());
    }

    #[test]
    fn scan_splits_and_pairs_up_and_down() {
        let dir = TempDir::new().unwrap();
        write_scripts(
            &dir,
            &[
                "0000_init.up.sql",
                "0001_apps.up.sql",
                "0001_apps.down.sql",
            ],
        );

        let files = scan(dir.path()).unwrap();

        assert_eq!(files.up.len(), 2);
        assert_eq!(files.down.len(), 1);
        assert!(files.down_for("0001_apps").is_some());
        assert!(files.down_for("0000_init").is_none());
    }

    #[test]
    fn scan_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        write_scripts(&dir, &["0000_init.up.sql", "notes.txt", "0001_data.sql"]);

        let files = scan(dir.path()).unwrap();

        assert_eq!(files.up.len(), 1);
        assert!(files.down.is_empty());
    }

    #[test]
    fn scan_rejects_duplicate_sequences() {
        let dir = TempDir::new().unwrap();
        write_scripts(&dir, &["0001_a.up.sql", "0001_b.up.sql"]);

        let err = scan(dir.path()).unwrap_err();

        assert!(matches!(err.kind, DiscoveryErrorKind::DuplicateSequence { sequence: 1, .. }));
    }

    #[test]
    fn scan_missing_directory_is_an_error() {
        let err = scan(Path::new("/definitely/not/here")).unwrap_err();

        assert!(matches!(err.kind, DiscoveryErrorKind::NotADirectory(_)));
    }
}
