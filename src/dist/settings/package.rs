//! Package metadata carried into the bundle.

/// Package metadata for the bundled product.
///
/// Maps from the `Cargo.toml` `[package]` section, with the product name
/// optionally overridden by `[package.metadata.dist]`.
#[derive(Debug, Clone)]
pub struct PackageSettings {
    /// Product name used for the stage directory and archive file name.
    pub product_name: String,

    /// Package version. Parsed so malformed versions fail at manifest load
    /// rather than surfacing in artifact names.
    pub version: semver::Version,

    /// Brief description, recorded in the bundle manifest.
    pub description: String,

    /// Package authors.
    ///
    /// Default: None
    pub authors: Option<Vec<String>>,

    /// Homepage URL.
    ///
    /// Default: None
    pub homepage: Option<String>,
}
