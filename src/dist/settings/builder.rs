//! Builder for constructing Settings.

use super::{DistSettings, PackageSettings, Settings};
use std::path::{Path, PathBuf};

/// Builder for [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use bomcheck::dist::{SettingsBuilder, PackageSettings};
///
/// # fn example() -> bomcheck::dist::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_dir("/path/to/project")
///     .package_settings(PackageSettings {
///         product_name: "myapp".into(),
///         version: semver::Version::new(1, 0, 0),
///         description: "My application".into(),
///         authors: None,
///         homepage: None,
///     })
///     .binary_name("myapp".into())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    package_settings: Option<PackageSettings>,
    dist_settings: DistSettings,
    project_dir: Option<PathBuf>,
    binary_name: Option<String>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets package metadata.
    ///
    /// # Required
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets the declarative bundle configuration.
    ///
    /// Default: [`DistSettings::default`]
    pub fn dist_settings(mut self, settings: DistSettings) -> Self {
        self.dist_settings = settings;
        self
    }

    /// Sets the project root directory.
    ///
    /// # Required
    pub fn project_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the binary name to stage.
    ///
    /// # Required
    pub fn binary_name(mut self, name: String) -> Self {
        self.binary_name = Some(name);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error when a required field is missing or when a declared
    /// command is empty.
    pub fn build(self) -> crate::dist::Result<Settings> {
        use crate::dist::error::Context;

        if matches!(&self.dist_settings.build_command, Some(c) if c.is_empty()) {
            return Err(crate::dist::Error::GenericError(
                "build_command must not be empty".to_string(),
            ));
        }
        if matches!(&self.dist_settings.fetch_command, Some(c) if c.is_empty()) {
            return Err(crate::dist::Error::GenericError(
                "fetch_command must not be empty".to_string(),
            ));
        }

        Ok(Settings::new(
            self.package_settings
                .context("package_settings is required")?,
            self.dist_settings,
            self.project_dir.context("project_dir is required")?,
            self.binary_name.context("binary_name is required")?,
        ))
    }
}
