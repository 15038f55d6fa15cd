//! Environment bootstrap step.
//!
//! Prepares everything the build needs: the scratch work directory, the
//! build tool, and resolved dependencies. Creating the work directory is
//! idempotent; a second run must find the first run's directory intact.

use super::error::{Context, Error, Result};
use super::settings::Settings;
use super::{fs, tools};

pub async fn run(settings: &Settings) -> Result<()> {
    // 1. Work directory, created only when absent
    let work_dir = settings.work_dir();
    if fs::ensure_dir(&work_dir).await? {
        log::info!("✓ Created work directory: {}", work_dir.display());
    } else {
        log::info!("Work directory already present: {}", work_dir.display());
    }

    // 2. Build tool availability
    let build_command = settings.build_command();
    let program = build_command
        .first()
        .context("build command is empty")?
        .clone();
    let program_path = tools::require_program(&program)?;

    if program == "cargo" {
        match tools::CARGO_VERSION.as_ref() {
            Some(banner) => log::info!("✓ {}", banner),
            None => log::warn!("cargo located but its version probe failed"),
        }
    } else {
        log::info!("✓ Build tool available: {}", program_path.display());
    }

    // 3. Dependency resolution
    match settings.fetch_command() {
        Some(fetch) => {
            let (fetch_program, fetch_args) = fetch
                .split_first()
                .context("dependency resolution command is empty")?;
            log::info!("Resolving dependencies: {}", fetch.join(" "));

            let status = tokio::process::Command::new(fetch_program)
                .args(fetch_args)
                .current_dir(settings.project_dir())
                .status()
                .await
                .map_err(|e| {
                    Error::GenericError(format!("failed to execute {}: {}", fetch_program, e))
                })?;

            if !status.success() {
                return Err(Error::CommandFailed {
                    command: fetch.join(" "),
                    status: render_status(&status),
                });
            }
            log::info!("✓ Dependencies resolved");
        }
        None => log::debug!("no dependency resolution command configured"),
    }

    Ok(())
}

/// Renders an exit status for error messages.
pub(super) fn render_status(status: &std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}
