//! Filesystem helpers for the pipeline.
//!
//! All directory operations here are idempotent so that re-running the
//! pipeline over an existing work tree never fails on leftovers.

use super::error::{Error, ErrorExt, Result};
use std::io;
use std::path::Path;
use tokio::fs;

/// Creates `path` and its parents if absent.
///
/// Returns `true` when the directory was created by this call and `false`
/// when it already existed. Existing contents are left untouched.
pub async fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)?;
    Ok(true)
}

/// Removes `path` recursively if it exists, then recreates it empty.
pub async fn reset_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::Fs {
            operation: "removing directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        }),
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)?;
    Ok(())
}

/// Copies a regular file, creating parent directories of the destination.
///
/// Fails with [`Error::MissingResource`] when the source does not exist and
/// with a generic error when it is not a regular file.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if !from.exists() {
        return Err(Error::MissingResource {
            path: from.to_path_buf(),
        });
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "{} is not a regular file",
            from.display()
        )));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating destination directory", parent)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)
}

/// Marks a staged file as executable (no-op outside Unix).
pub async fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting executable permissions", path)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_dir_reports_creation_once() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("work");

        assert!(ensure_dir(&target).await.unwrap());
        std::fs::write(target.join("keep.txt"), "x").unwrap();

        // Second call leaves the directory and its contents alone.
        assert!(!ensure_dir(&target).await.unwrap());
        assert!(target.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn reset_dir_clears_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("stage");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("old.txt"), "x").unwrap();

        reset_dir(&target).await.unwrap();
        assert!(target.exists());
        assert!(!target.join("old.txt").exists());
    }

    #[tokio::test]
    async fn copy_file_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_file(&tmp.path().join("absent.txt"), &tmp.path().join("out.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingResource { .. }));
    }
}
