//! Core Settings struct and implementations.

use super::{DistSettings, PackageMode, PackageSettings, ResourceFile};
use std::path::{Path, PathBuf};

/// Default build command when the manifest declares none.
const DEFAULT_BUILD_COMMAND: &[&str] = &["cargo", "build", "--release"];

/// Resolved configuration for one pipeline run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). All path
/// getters return absolize-against-project paths so the steps never depend on
/// the process working directory.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Package metadata.
    package: PackageSettings,

    /// Declarative bundle configuration.
    dist: DistSettings,

    /// Directory containing the manifest; all relative paths resolve here.
    project_dir: PathBuf,

    /// Name of the binary to stage.
    binary_name: String,
}

impl Settings {
    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    /// Returns the parsed package version.
    pub fn version(&self) -> &semver::Version {
        &self.package.version
    }

    /// Returns the package description.
    pub fn description(&self) -> &str {
        &self.package.description
    }

    /// Returns the package authors, if declared.
    pub fn authors(&self) -> Option<&[String]> {
        self.package.authors.as_deref()
    }

    /// Returns the package homepage, if declared.
    pub fn homepage(&self) -> Option<&str> {
        self.package.homepage.as_deref()
    }

    /// Returns the name of the binary to stage.
    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// Returns the project root directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Returns the bootstrap work directory.
    pub fn work_dir(&self) -> PathBuf {
        match &self.dist.work_dir {
            Some(dir) => self.resolve(dir),
            None => self.project_dir.join("target").join("dist-work"),
        }
    }

    /// Returns the directory receiving bundle artifacts.
    pub fn out_dir(&self) -> PathBuf {
        match &self.dist.out_dir {
            Some(dir) => self.resolve(dir),
            None => self.project_dir.join("target").join("dist"),
        }
    }

    /// Returns the stage directory for the bundle contents.
    pub fn stage_dir(&self) -> PathBuf {
        self.out_dir().join(self.product_name())
    }

    /// Returns the file name of the archive artifact.
    pub fn archive_name(&self) -> String {
        format!("{}-{}.zip", self.product_name(), self.version())
    }

    /// Returns the dependency resolution command for the bootstrap step.
    ///
    /// None means the step has nothing to resolve.
    pub fn fetch_command(&self) -> Option<Vec<String>> {
        if let Some(command) = &self.dist.fetch_command {
            return Some(command.clone());
        }
        let build = self.build_command();
        if build.first().map(String::as_str) == Some("cargo") {
            return Some(vec!["cargo".to_string(), "fetch".to_string()]);
        }
        None
    }

    /// Returns the build command.
    pub fn build_command(&self) -> Vec<String> {
        match &self.dist.build_command {
            Some(command) => command.clone(),
            None => DEFAULT_BUILD_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns where the build command leaves the binary.
    pub fn binary_source(&self) -> PathBuf {
        match &self.dist.binary_path {
            Some(path) => self.resolve(path),
            None => self
                .project_dir
                .join("target")
                .join("release")
                .join(&self.binary_name),
        }
    }

    /// Returns the declared data files with sources resolved, in declaration
    /// order.
    pub fn resources(&self) -> Vec<(PathBuf, PathBuf)> {
        self.dist
            .resources
            .iter()
            .map(|ResourceFile { source, dest }| (self.resolve(source), dest.clone()))
            .collect()
    }

    /// Returns the sideload entries with paths resolved.
    pub fn sideload(&self) -> Vec<PathBuf> {
        self.dist.sideload.iter().map(|p| self.resolve(p)).collect()
    }

    /// Returns whether the product is a console application.
    pub fn console(&self) -> bool {
        self.dist.console
    }

    /// Returns whether archive entries are compressed.
    pub fn compress(&self) -> bool {
        self.dist.compress
    }

    /// Returns the delivery mode.
    pub fn mode(&self) -> PackageMode {
        self.dist.mode
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        package: PackageSettings,
        dist: DistSettings,
        project_dir: PathBuf,
        binary_name: String,
    ) -> Self {
        Self {
            package,
            dist,
            project_dir,
            binary_name,
        }
    }
}
