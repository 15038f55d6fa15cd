//! Stage step: assemble the bundle contents.
//!
//! Every declared input is validated before the stage directory is touched,
//! so a half-staged bundle never survives a failed run.

use super::error::{Context, Error, Result};
use super::fs;
use super::settings::Settings;
use crate::bail;
use std::path::{Path, PathBuf};

pub async fn run(settings: &Settings) -> Result<PathBuf> {
    // 1. Validate every input up front
    let binary_source = settings.binary_source();
    if !binary_source.is_file() {
        bail!(
            "built binary not found: {} (did the build step run?)",
            binary_source.display()
        );
    }

    let resources = settings.resources();
    for (source, _) in &resources {
        if !source.is_file() {
            return Err(Error::MissingResource {
                path: source.clone(),
            });
        }
    }

    let sideload = settings.sideload();
    for path in &sideload {
        if !path.is_file() {
            return Err(Error::MissingResource { path: path.clone() });
        }
    }

    // 2. Fresh stage directory
    let stage_dir = settings.stage_dir();
    fs::reset_dir(&stage_dir).await?;

    // 3. Main binary
    let staged_binary = stage_dir.join(settings.binary_name());
    fs::copy_file(&binary_source, &staged_binary).await?;
    fs::make_executable(&staged_binary).await?;

    // 4. Data files, in declaration order
    for (source, dest) in &resources {
        let file_name = source
            .file_name()
            .context("resource source has no file name")?;
        let target = dest_dir(&stage_dir, dest).join(file_name);
        fs::copy_file(source, &target).await?;
        log::debug!("Staged {} -> {}", source.display(), target.display());
    }

    // 5. Sideloaded binaries go next to the main one
    for source in &sideload {
        let file_name = source
            .file_name()
            .context("sideload entry has no file name")?;
        let target = stage_dir.join(file_name);
        fs::copy_file(source, &target).await?;
        fs::make_executable(&target).await?;
        log::debug!("Sideloaded {}", target.display());
    }

    log::info!(
        "✓ Staged {} file(s) into {}",
        1 + resources.len() + sideload.len(),
        stage_dir.display()
    );

    Ok(stage_dir)
}

fn dest_dir(stage_dir: &Path, dest: &Path) -> PathBuf {
    if dest == Path::new(".") || dest.as_os_str().is_empty() {
        stage_dir.to_path_buf()
    } else {
        stage_dir.join(dest)
    }
}
