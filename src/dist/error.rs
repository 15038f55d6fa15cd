//! Error types for the distribution pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a distribution.
#[derive(Error, Debug)]
pub enum Error {
    /// Catch-all for one-off failures constructed via [`crate::bail!`]
    #[error("{0}")]
    GenericError(String),

    /// IO errors without path context
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Filesystem errors carrying the operation and the path it touched
    #[error("{operation} failed for {}: {source}", path.display())]
    Fs {
        /// What the pipeline was doing
        operation: String,
        /// Path the operation touched
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// A declared resource or sideload entry does not exist on disk
    #[error("declared resource does not exist: {}", path.display())]
    MissingResource {
        /// Path that was declared in the manifest
        path: PathBuf,
    },

    /// A required external tool is not installed
    #[error("required tool not found on PATH: {tool}")]
    ToolNotFound {
        /// Program name that could not be located
        tool: String,
    },

    /// An external command exited with a failure status
    #[error("command `{command}` exited with status {status}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status, or "signal" when terminated
        status: String,
    },

    /// A pipeline step failed; the whole run is aborted
    #[error("{step} step failed: {source}")]
    StepFailed {
        /// Name of the failed step
        step: &'static str,
        /// The step's underlying error
        source: Box<Error>,
    },

    /// Archive read/write errors
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Manifest serialization errors
    #[error("manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Constructs a pipeline `GenericError` from format arguments and returns it
/// from the enclosing function.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::dist::error::Error::GenericError(format!($($arg)*)).into())
    };
}

/// Extension for attaching operation + path context to filesystem results.
pub trait ErrorExt<T> {
    /// Wraps an IO error with the operation name and the path it touched.
    fn fs_context(self, operation: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, operation: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Extension for converting `Option`s and foreign errors into pipeline errors
/// with a short message.
pub trait Context<T> {
    /// Replaces `None` (or wraps an error) with a [`Error::GenericError`].
    fn context(self, message: &str) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, message: &str) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(message.to_string()))
    }
}

impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
    fn context(self, message: &str) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {}", message, e)))
    }
}
