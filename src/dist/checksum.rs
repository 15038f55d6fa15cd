//! SHA-256 checksums for bundle artifacts.
//!
//! Archive artifacts are single files; directory-mode bundles are hashed as
//! a tree so the recorded checksum covers layout and contents together.

use super::error::{ErrorExt, Result};
use crate::bail;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

const READ_CHUNK: usize = 8192;

/// Hex-encoded SHA-256 of a file or directory artifact.
pub async fn checksum_path(path: &std::path::Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;

    if metadata.is_file() {
        checksum_file(path).await
    } else if metadata.is_dir() {
        checksum_tree(path).await
    } else {
        bail!("artifact is neither file nor directory: {}", path.display())
    }
}

/// Hashes one file in fixed-size chunks.
async fn checksum_file(path: &std::path::Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening artifact", path)?;
    let mut hasher = Sha256::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = file
            .read(&mut chunk)
            .await
            .fs_context("reading artifact", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hashes a directory tree deterministically.
///
/// Files are visited in lexicographic path order and each contributes its
/// bundle-relative path followed by its contents, so renames and moves change
/// the checksum even when contents are identical.
async fn checksum_tree(root: &std::path::Path) -> Result<String> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut hasher = Sha256::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    for path in files {
        if let Ok(relative) = path.strip_prefix(root) {
            hasher.update(relative.to_string_lossy().as_bytes());
        }

        let mut file = tokio::fs::File::open(&path)
            .await
            .fs_context("opening file for hashing", &path)?;
        loop {
            let n = file
                .read(&mut chunk)
                .await
                .fs_context("reading file for hashing", &path)?;
            if n == 0 {
                break;
            }
            hasher.update(&chunk[..n]);
        }
    }

    Ok(hex::encode(hasher.finalize()))
}
