//! Timestamped backups of the output files, taken before each run.
//!
//! Backups are append-only: originals are copied, never moved, and nothing
//! is ever pruned.

use crate::store::OUTPUT_FILES;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

/// Format a run-start time as a backup prefix (`YYYYMMDD_HHMMSS`).
pub fn run_stamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Copies existing output files into the backup directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    data_dir: PathBuf,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(data_dir: &Path, backup_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            backup_dir: backup_dir.to_path_buf(),
        }
    }

    /// Copy every output file that currently exists to `<stamp>_<name>`.
    ///
    /// Returns the paths of the copies made. Missing outputs are skipped.
    pub fn snapshot(&self, stamp: &str) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.backup_dir).with_context(|| {
            format!(
                "failed to create backup directory {}",
                self.backup_dir.display()
            )
        })?;

        let mut copies = Vec::new();
        for name in OUTPUT_FILES {
            let source = self.data_dir.join(name);
            if !source.exists() {
                continue;
            }
            let target = self.backup_dir.join(format!("{stamp}_{name}"));
            std::fs::copy(&source, &target).with_context(|| {
                format!("failed to back up {} to {}", source.display(), target.display())
            })?;
            info!(file = name, backup = %target.display(), "backed up");
            copies.push(target);
        }

        Ok(copies)
    }
}
