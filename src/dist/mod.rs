//! Declarative release bundling.
//!
//! The dist workflow turns the `[package.metadata.dist]` table in Cargo.toml
//! into a distributable bundle in two phases: an idempotent environment
//! bootstrap (work directory, tool check, dependency resolution) and the
//! bundling run itself (build, stage, package). See [`Pipeline`].

pub mod archive;
pub mod bootstrap;
pub mod build;
pub mod checksum;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod pipeline;
pub mod settings;
pub mod stage;
pub mod tools;

pub use error::{Context, Error, ErrorExt, Result};
pub use manifest::load_settings;
pub use pipeline::{DistArtifact, Pipeline, PipelineOptions};
pub use settings::{
    DistSettings, PackageMode, PackageSettings, ResourceFile, Settings, SettingsBuilder,
};
