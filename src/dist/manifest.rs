//! Bundle settings discovery from a single Cargo.toml.

use super::error::{Context, Error, Result};
use super::settings::{DistSettings, PackageSettings, Settings, SettingsBuilder};
use std::path::Path;

/// Loads pipeline settings from a Cargo.toml (single read + parse).
///
/// Reads and parses the manifest exactly once, then extracts the package
/// metadata, the binary name, and the `[package.metadata.dist]` table from
/// the parsed value.
pub fn load_settings(cargo_toml_path: &Path) -> Result<Settings> {
    // 1. Read file once
    let raw = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        Error::GenericError(format!(
            "failed to read {}: {}",
            cargo_toml_path.display(),
            e
        ))
    })?;

    // 2. Parse TOML once
    let toml_value: toml::Value = toml::from_str(&raw)
        .map_err(|e| Error::GenericError(format!("failed to parse Cargo.toml: {}", e)))?;

    let package = toml_value
        .get("package")
        .context("no [package] section in Cargo.toml")?;

    // 3. Extract dist settings from [package.metadata.dist]
    let dist_settings = parse_dist_settings(package)?;

    // 4. Extract package metadata from the parsed value (no additional I/O)
    let name = package
        .get("name")
        .and_then(|v| v.as_str())
        .context("missing 'name' in [package]")?
        .to_string();

    let version_text = package
        .get("version")
        .and_then(|v| v.as_str())
        .context("missing 'version' in [package]")?;
    let version = semver::Version::parse(version_text).map_err(|e| {
        Error::GenericError(format!("invalid package version '{}': {}", version_text, e))
    })?;

    let metadata = PackageSettings {
        product_name: dist_settings.product_name.clone().unwrap_or_else(|| name.clone()),
        version,
        description: package
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("Rust application")
            .to_string(),
        authors: package.get("authors").and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        }),
        homepage: package
            .get("homepage")
            .and_then(|v| v.as_str())
            .map(String::from),
    };

    // 5. Discover the binary name: explicit override, then [[bin]], then the
    //    package name
    let binary_name = dist_settings
        .binary
        .clone()
        .or_else(|| {
            toml_value
                .get("bin")
                .and_then(|v| v.as_array())
                .and_then(|arr| arr.first())
                .and_then(|first| first.get("name"))
                .and_then(|v| v.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| name.clone());

    // 6. Resolve the project root from the manifest location
    let project_dir = cargo_toml_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    SettingsBuilder::new()
        .package_settings(metadata)
        .dist_settings(dist_settings)
        .project_dir(project_dir)
        .binary_name(binary_name)
        .build()
}

/// Parses `[package.metadata.dist]`; an absent table yields the defaults.
fn parse_dist_settings(package: &toml::Value) -> Result<DistSettings> {
    let Some(table) = package.get("metadata").and_then(|m| m.get("dist")) else {
        return Ok(DistSettings::default());
    };

    table
        .clone()
        .try_into()
        .map_err(|e| Error::GenericError(format!("invalid [package.metadata.dist]: {}", e)))
}
