//! bomcheck - BOM check and distribution toolkit.
//!
//! This binary checks BOM tables against the invalid-part database, evaluates
//! binding projects, maintains the part catalog and user accounts, and
//! bundles the tool itself for distribution.

mod accounts;
mod binding;
mod catalog;
mod check;
mod cli;
mod config;
mod dist;
mod error;
mod table;
mod text;

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
