//! Subcommand implementations.

pub mod accounts;
pub mod binding;
pub mod catalog;
pub mod check;
pub mod dist;
