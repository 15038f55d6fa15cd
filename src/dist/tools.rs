//! Build tool discovery.
//!
//! The bootstrap step refuses to continue when the configured build program
//! is not installed, so later steps never fail halfway through with a
//! confusing "command not found".

use super::error::{Error, Result};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Version banner of the `cargo` on PATH, probed once per process.
pub static CARGO_VERSION: LazyLock<Option<String>> = LazyLock::new(|| {
    let path = match which::which("cargo") {
        Ok(path) => path,
        Err(e) => {
            log::debug!("cargo not found in PATH: {}", e);
            return None;
        }
    };

    match std::process::Command::new(&path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let banner = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::debug!("Found cargo at {}: {}", path.display(), banner);
            Some(banner)
        }
        Ok(output) => {
            log::warn!(
                "cargo found at {} but --version check failed (exit code: {:?})",
                path.display(),
                output.status.code()
            );
            None
        }
        Err(e) => {
            log::warn!("cargo found at {} but failed to execute: {}", path.display(), e);
            None
        }
    }
});

/// Resolves a program name against PATH.
pub fn require_program(name: &str) -> Result<PathBuf> {
    // Explicit paths (e.g. ./scripts/build.sh) bypass PATH lookup.
    let candidate = std::path::Path::new(name);
    if candidate.components().count() > 1 {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(Error::ToolNotFound {
            tool: name.to_string(),
        });
    }

    which::which(name).map_err(|e| {
        log::debug!("{} not found in PATH: {}", name, e);
        Error::ToolNotFound {
            tool: name.to_string(),
        }
    })
}
