//! Configuration structures for the distribution pipeline.
//!
//! [`DistSettings`] is the declarative half read from `[package.metadata.dist]`;
//! [`PackageSettings`] carries the `[package]` metadata; [`Settings`] combines
//! both with the project location and resolves every path the steps need.

mod builder;
mod core;
mod dist;
mod package;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use core::Settings;
pub use dist::{DistSettings, PackageMode, ResourceFile};
pub use package::PackageSettings;
