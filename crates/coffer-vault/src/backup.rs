// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamped copies of the vault file taken before each save.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use coffer_core::{CofferError, Result};
use tracing::{debug, warn};

use crate::persist;

const BACKUP_PREFIX: &str = "vault-";
const BACKUP_SUFFIX: &str = ".enc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPolicy {
    pub dir: PathBuf,
    /// Number of backups kept; older ones are deleted.
    pub max_backups: usize,
}

/// Copy `source` into the backup directory and prune old copies.
///
/// Returns `None` when there is nothing to back up yet.
pub fn backup_file(source: &Path, policy: &BackupPolicy) -> Result<Option<PathBuf>> {
    let bytes = match fs::read(source) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CofferError::io("failed to read vault for backup", e)),
    };

    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
    let target = policy.dir.join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"));
    persist::atomic_write(&target, &bytes)?;
    debug!(backup = %target.display(), "vault backed up");

    prune(policy)?;
    Ok(Some(target))
}

/// Existing backups, oldest first.
pub fn list_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CofferError::io("failed to list backups", e)),
    };

    let mut backups: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(BACKUP_SUFFIX))
        })
        .collect();
    // Timestamps are fixed-width, so name order is age order.
    backups.sort();
    Ok(backups)
}

fn prune(policy: &BackupPolicy) -> Result<()> {
    let backups = list_backups(&policy.dir)?;
    let excess = backups.len().saturating_sub(policy.max_backups);
    for old in &backups[..excess] {
        if let Err(e) = fs::remove_file(old) {
            warn!(backup = %old.display(), error = %e, "failed to prune old backup");
        }
    }
    Ok(())
}
