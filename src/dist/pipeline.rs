//! End-to-end dist pipeline.
//!
//! Steps run strictly in order: bootstrap, build, stage, package. The first
//! failure aborts the run and the returned error names the step that failed,
//! so a broken dependency fetch can never be followed by a build, and a
//! broken build can never produce an artifact.

use super::checksum::checksum_path;
use super::error::{Error, Result};
use super::settings::{PackageMode, Settings};
use super::{archive, bootstrap, build, stage};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Switches for skipping pipeline steps on repeated runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Skip environment preparation entirely.
    pub skip_bootstrap: bool,
    /// Stage a previously built binary instead of rebuilding.
    pub skip_build: bool,
}

/// What a completed pipeline run produced.
#[derive(Debug, Clone)]
pub struct DistArtifact {
    /// `directory` or `archive`.
    pub kind: String,
    /// Absolute path of the produced bundle.
    pub path: PathBuf,
    /// Size in bytes; for directory bundles, the sum over all files.
    pub size: u64,
    /// Hex-encoded SHA-256 of the artifact contents.
    pub checksum: String,
}

pub struct Pipeline {
    settings: Settings,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(settings: Settings, options: PipelineOptions) -> Self {
        Self { settings, options }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the full pipeline and returns the produced artifact.
    pub async fn run(&self) -> Result<DistArtifact> {
        let settings = &self.settings;
        log::info!(
            "Bundling {} v{} ({} mode)",
            settings.product_name(),
            settings.version(),
            settings.mode()
        );

        // 1. Prepare the environment (idempotent).
        if self.options.skip_bootstrap {
            log::info!("Skipping the bootstrap step");
        } else {
            bootstrap::run(settings)
                .await
                .map_err(step_error("bootstrap"))?;
        }

        // 2. Compile the binary.
        if self.options.skip_build {
            log::info!("Skipping the build step");
        } else {
            build::run(settings).await.map_err(step_error("build"))?;
        }

        // 3. Stage the binary with its declared resources.
        let stage_dir = stage::run(settings).await.map_err(step_error("stage"))?;

        // 4. Package according to the configured mode.
        let artifact_path = match settings.mode() {
            PackageMode::Directory => stage_dir.clone(),
            PackageMode::Archive => archive::run(settings, &stage_dir)
                .await
                .map_err(step_error("archive"))?,
        };

        // 5. Describe the artifact and record the run beside it.
        let artifact = self
            .describe(artifact_path)
            .await
            .map_err(step_error("manifest"))?;
        self.write_run_manifest(&artifact)
            .await
            .map_err(step_error("manifest"))?;

        log::info!(
            "✓ Bundle complete: {} ({} bytes)",
            artifact.path.display(),
            artifact.size
        );
        Ok(artifact)
    }

    async fn describe(&self, path: PathBuf) -> Result<DistArtifact> {
        let checksum = checksum_path(&path).await?;
        let size = artifact_size(&path).await?;
        Ok(DistArtifact {
            kind: self.settings.mode().to_string(),
            path,
            size,
            checksum,
        })
    }

    /// Writes `dist-manifest.json` into the output directory.
    async fn write_run_manifest(&self, artifact: &DistArtifact) -> Result<()> {
        let out_dir = self.settings.out_dir();
        let relative = artifact
            .path
            .strip_prefix(&out_dir)
            .unwrap_or(&artifact.path);

        let doc = RunManifest {
            product: self.settings.product_name(),
            version: self.settings.version().to_string(),
            description: self.settings.description(),
            console: self.settings.console(),
            created: chrono::Utc::now().to_rfc3339(),
            authors: self.settings.authors(),
            homepage: self.settings.homepage(),
            artifact: RunArtifact {
                kind: &artifact.kind,
                path: relative.to_string_lossy().into_owned(),
                size: artifact.size,
                sha256: &artifact.checksum,
            },
        };

        let manifest_path = out_dir.join("dist-manifest.json");
        let body = serde_json::to_string_pretty(&doc)?;
        tokio::fs::write(&manifest_path, body).await?;
        log::debug!("Recorded run manifest at {}", manifest_path.display());
        Ok(())
    }
}

fn step_error(step: &'static str) -> impl FnOnce(Error) -> Error {
    move |source| Error::StepFailed {
        step,
        source: Box::new(source),
    }
}

async fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }
    let total = walkdir::WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum();
    Ok(total)
}

#[derive(Serialize)]
struct RunManifest<'a> {
    product: &'a str,
    version: String,
    description: &'a str,
    console: bool,
    created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<&'a str>,
    artifact: RunArtifact<'a>,
}

#[derive(Serialize)]
struct RunArtifact<'a> {
    kind: &'a str,
    path: String,
    size: u64,
    sha256: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn artifact_size_sums_a_directory_tree() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("a.bin"), vec![0u8; 10]).unwrap();
        std::fs::write(tmp.path().join("sub/b.bin"), vec![0u8; 5]).unwrap();

        let size = artifact_size(tmp.path()).await.unwrap();
        assert_eq!(size, 15);
    }

    #[test]
    fn step_errors_name_the_failing_step() {
        let err = step_error("build")(Error::GenericError("boom".into()));
        assert_eq!(err.to_string(), "build step failed: boom");
    }
}
