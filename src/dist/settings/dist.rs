//! Declarative bundle configuration from `[package.metadata.dist]`.

use std::path::PathBuf;

/// One data file carried into the bundle.
///
/// ```toml
/// [[package.metadata.dist.resources]]
/// source = "data/config.json"
/// dest = "."
/// ```
///
/// `source` is resolved against the project root; `dest` is a directory
/// relative to the stage root. Declaration order is preserved when staging.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ResourceFile {
    /// File to copy into the bundle.
    pub source: PathBuf,

    /// Directory inside the bundle to place it in.
    ///
    /// Default: the stage root (`.`)
    #[serde(default = "default_dest")]
    pub dest: PathBuf,
}

fn default_dest() -> PathBuf {
    PathBuf::from(".")
}

/// How the finished bundle is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageMode {
    /// Leave the staged directory in place as the artifact.
    #[default]
    Directory,

    /// Pack the staged directory into a single zip artifact.
    Archive,
}

impl std::fmt::Display for PackageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageMode::Directory => write!(f, "directory"),
            PackageMode::Archive => write!(f, "archive"),
        }
    }
}

/// Bundle configuration for the distribution pipeline.
///
/// # Configuration
///
/// Add to `Cargo.toml`:
///
/// ```toml
/// [package.metadata.dist]
/// product_name = "myapp"
/// binary = "myapp"
/// console = true
/// compress = true
/// mode = "directory"
/// ```
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DistSettings {
    /// Product name override.
    ///
    /// Default: the package name
    #[serde(default)]
    pub product_name: Option<String>,

    /// Binary to bundle.
    ///
    /// Default: the first `[[bin]]` name, falling back to the package name
    #[serde(default)]
    pub binary: Option<String>,

    /// Scratch directory the bootstrap step prepares.
    ///
    /// Created only when absent; existing contents survive re-runs.
    ///
    /// Default: `target/dist-work`
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Directory receiving the finished bundle and its manifest.
    ///
    /// Default: `target/dist`
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    /// Command that resolves dependencies during bootstrap.
    ///
    /// Default: `cargo fetch` when the build command is cargo, otherwise none
    #[serde(default)]
    pub fetch_command: Option<Vec<String>>,

    /// Command that produces the binary.
    ///
    /// Default: `cargo build --release`
    #[serde(default)]
    pub build_command: Option<Vec<String>>,

    /// Where the build command leaves the binary.
    ///
    /// Default: `target/release/<binary>`
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Data files copied into the bundle, in declaration order.
    #[serde(default)]
    pub resources: Vec<ResourceFile>,

    /// Extra binaries the bundle must carry even though nothing in the build
    /// graph references them. Each entry must exist at stage time.
    #[serde(default)]
    pub sideload: Vec<PathBuf>,

    /// Whether the bundled program is a console application.
    ///
    /// Recorded in the bundle manifest for launcher tooling.
    ///
    /// Default: true
    #[serde(default = "default_flag")]
    pub console: bool,

    /// Whether archive mode compresses entries (`false` stores them).
    ///
    /// Default: true
    #[serde(default = "default_flag")]
    pub compress: bool,

    /// Delivery mode.
    ///
    /// Default: [`PackageMode::Directory`]
    #[serde(default)]
    pub mode: PackageMode,
}

impl Default for DistSettings {
    fn default() -> Self {
        Self {
            product_name: None,
            binary: None,
            work_dir: None,
            out_dir: None,
            fetch_command: None,
            build_command: None,
            binary_path: None,
            resources: Vec::new(),
            sideload: Vec::new(),
            console: true,
            compress: true,
            mode: PackageMode::Directory,
        }
    }
}

fn default_flag() -> bool {
    true
}
