//! Comprehensive error types for bomcheck operations.
//!
//! This module defines all error types with actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bomcheck operations
pub type Result<T> = std::result::Result<T, BomcheckError>;

/// Main error type for all bomcheck operations
#[derive(Error, Debug)]
pub enum BomcheckError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundling pipeline errors
    #[error("Dist error: {0}")]
    Dist(#[from] crate::dist::Error),

    /// Check data errors
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

/// Errors raised while loading or interpreting check data
#[derive(Error, Debug)]
pub enum DataError {
    /// An input file the operation needs does not exist
    #[error("input file not found: {}", path.display())]
    MissingInput {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A table file parsed but held no usable rows
    #[error("no data rows in {}", path.display())]
    EmptyTable {
        /// Table that was read
        path: PathBuf,
    },

    /// A source file has an extension no parser claims
    #[error("unsupported file format: {}", path.display())]
    UnsupportedFormat {
        /// File that was offered
        path: PathBuf,
    },

    /// The invalid-part database file is malformed
    #[error("invalid-part database {}: {reason}", path.display())]
    BadDatabase {
        /// Database path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// The binding library file is malformed
    #[error("binding library {}: {reason}", path.display())]
    BadLibrary {
        /// Library path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Referenced account does not exist
    #[error("account {username} not found")]
    UnknownAccount {
        /// Account name that was looked up
        username: String,
    },

    /// Account name is already taken
    #[error("account {username} already exists")]
    DuplicateAccount {
        /// Conflicting account name
        username: String,
    },
}

impl BomcheckError {
    /// Exit code the process should report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BomcheckError::Cli(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_name_the_offending_path() {
        let err = DataError::MissingInput {
            path: PathBuf::from("bom/missing.csv"),
        };
        assert!(err.to_string().contains("bom/missing.csv"));
    }

    #[test]
    fn cli_errors_exit_with_usage_code() {
        let err = BomcheckError::Cli(CliError::InvalidArguments {
            reason: "bad flag".into(),
        });
        assert_eq!(err.exit_code(), 2);

        let err = BomcheckError::Data(DataError::UnknownAccount {
            username: "ghost".into(),
        });
        assert_eq!(err.exit_code(), 1);
    }
}
