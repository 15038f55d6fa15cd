//! BOM check and distribution toolkit.
//!
//! The library half covers two concerns:
//! - checking BOM tables: invalid-part replacement, binding-project
//!   evaluation, important-material scanning, and the part catalog;
//! - bundling the tool for distribution through a fail-fast pipeline
//!   (bootstrap, build, stage, package).
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod accounts;
pub mod binding;
pub mod catalog;
pub mod check;
pub mod cli;
pub mod config;
pub mod dist;
pub mod error;
pub mod table;
pub mod text;

// Re-export commonly used types
pub use error::{BomcheckError, CliError, DataError, Result};
