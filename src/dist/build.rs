//! Build step: run the configured build command.

use super::bootstrap::render_status;
use super::error::{Context, Error, Result};
use super::settings::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let command = settings.build_command();
    let (program, args) = command.split_first().context("build command is empty")?;

    log::info!("Building {}: {}", settings.binary_name(), command.join(" "));

    // Inherited stdio keeps compiler output visible in the terminal.
    let status = tokio::process::Command::new(program)
        .args(args)
        .current_dir(settings.project_dir())
        .status()
        .await
        .map_err(|e| Error::GenericError(format!("failed to execute {}: {}", program, e)))?;

    if !status.success() {
        return Err(Error::CommandFailed {
            command: command.join(" "),
            status: render_status(&status),
        });
    }

    log::info!("✓ Build finished");
    Ok(())
}
