// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe file replacement.
//!
//! New contents are written to a sibling temporary file, flushed to stable
//! storage, then renamed over the target. A reader sees either the complete
//! old file or the complete new one. If anything fails before the rename the
//! temporary file is removed and the target is left untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use coffer_core::{CofferError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, error};

/// A fully written, synced temporary file waiting to replace its target.
///
/// Dropping it without calling [`StagedWrite::commit`] deletes the temporary
/// file.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

/// Replace `path` with `contents` atomically.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    stage(path, contents)?.commit()
}

/// Write `contents` next to `path` without touching `path` itself.
pub fn stage(path: &Path, contents: &[u8]) -> Result<StagedWrite> {
    let dir = parent_dir(path);
    ensure_private_dir(dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vault".to_string());

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CofferError::io("failed to create temporary file", e))?;

    restrict_to_owner(temp.as_file())?;

    temp.write_all(contents)
        .map_err(|e| CofferError::io("failed to write temporary file", e))?;
    temp.flush()
        .map_err(|e| CofferError::io("failed to flush temporary file", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CofferError::io("failed to sync temporary file", e))?;

    debug!(temp = %temp.path().display(), bytes = contents.len(), "staged vault write");

    Ok(StagedWrite {
        temp,
        target: path.to_path_buf(),
    })
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the temporary file over the target and sync the directory.
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        if let Err(e) = self.temp.persist(&target) {
            error!(path = %target.display(), error = %e.error, "failed to rename temporary file");
            // Dropping the returned handle removes the temporary file.
            drop(e.file);
            return Err(CofferError::io("failed to rename temporary file", e.error));
        }
        sync_dir(parent_dir(&target));
        debug!(path = %target.display(), "vault written atomically");
        Ok(())
    }

    /// Leave the temporary file on disk without renaming, as if the process
    /// died between the write and the rename.
    #[cfg(test)]
    pub(crate) fn abandon(self) -> PathBuf {
        match self.temp.keep() {
            Ok((_, path)) => path,
            Err(e) => panic!("failed to keep temp file: {e}"),
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Create `dir` (and missing ancestors) readable only by the owner.
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|e| CofferError::io(format!("failed to create directory {}", dir.display()), e))
}

#[cfg(unix)]
fn restrict_to_owner(file: &File) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .map_err(|e| CofferError::io("failed to set file permissions", e))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &File) -> Result<()> {
    Ok(())
}

/// Best effort: make the rename itself durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        if let Err(e) = handle.sync_all() {
            debug!(dir = %dir.display(), error = %e, "directory sync failed");
        }
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn stray_temp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }

    #[test]
    fn writes_new_file_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("vault.enc");

        atomic_write(&path, b"first").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"first");
        assert!(stray_temp_files(path.parent().unwrap()).is_empty());
    }

    #[test]
    fn replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.enc");

        atomic_write(&path, b"old contents").unwrap();
        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn staged_write_leaves_target_alone_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.enc");
        atomic_write(&path, b"old").unwrap();

        let staged = stage(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"old");
        assert_eq!(fs::read(staged.temp_path()).unwrap(), b"new");
        assert_eq!(staged.temp_path().parent(), path.parent());

        staged.commit().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn dropped_stage_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.enc");
        atomic_write(&path, b"old").unwrap();

        let staged = stage(&path, b"new").unwrap();
        let temp = staged.temp_path().to_path_buf();
        drop(staged);

        assert!(!temp.exists());
        assert_eq!(fs::read(&path).unwrap(), b"old");
    }

    #[test]
    fn crash_before_rename_keeps_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.enc");
        atomic_write(&path, b"old").unwrap();

        let leftover = stage(&path, b"half-finished").unwrap().abandon();

        assert_eq!(fs::read(&path).unwrap(), b"old");
        assert!(leftover.exists());
    }

    #[test]
    fn failed_rename_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory sitting at the target path cannot be replaced
        // by a file rename.
        let path = dir.path().join("vault.enc");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let err = atomic_write(&path, b"data").unwrap_err();

        assert!(matches!(err, CofferError::Io { .. }));
        assert!(stray_temp_files(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn file_and_new_dirs_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("coffer");
        let path = parent.join("vault.enc");
        atomic_write(&path, b"secret").unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(&parent).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode & 0o077, 0);
    }
}
