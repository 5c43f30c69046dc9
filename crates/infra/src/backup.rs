//! Timestamped copies of the database file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::store::StoreResult;

/// Where backups go and how many to keep.
pub struct BackupPlan {
    source: PathBuf,
    backup_dir: PathBuf,
    keep: usize,
}

impl BackupPlan {
    pub fn new(source: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            source: source.into(),
            backup_dir: backup_dir.into(),
            keep: keep.max(1),
        }
    }

    /// Copy the database to `<stem>-YYYYMMDD-HHMMSS.db`, then prune old
    /// copies down to the retention count. Returns the new backup's path.
    pub fn snapshot(&self, now: DateTime<Utc>) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)?;

        let stem = self
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("pressbill");
        let target = self
            .backup_dir
            .join(format!("{stem}-{}.db", now.format("%Y%m%d-%H%M%S")));
        fs::copy(&self.source, &target)?;
        info!(backup = %target.display(), "database backup written");

        self.prune(stem)?;
        Ok(target)
    }

    fn prune(&self, stem: &str) -> StoreResult<()> {
        let mut backups: Vec<PathBuf> = fs::read_dir(&self.backup_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_backup_of(p, stem))
            .collect();
        // Timestamped names sort chronologically.
        backups.sort();

        while backups.len() > self.keep {
            let oldest = backups.remove(0);
            fs::remove_file(&oldest)?;
            info!(backup = %oldest.display(), "pruned old backup");
        }
        Ok(())
    }
}

fn is_backup_of(path: &Path, stem: &str) -> bool {
    path.extension().is_some_and(|e| e == "db")
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&format!("{stem}-")))
}
