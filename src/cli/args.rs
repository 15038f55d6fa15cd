//! Command line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BOM check and distribution toolkit
#[derive(Parser, Debug)]
#[command(
    name = "bomcheck",
    version,
    about = "BOM check and distribution toolkit",
    long_about = "Checks BOM tables against the invalid-part database, evaluates binding \
projects, maintains the binding library and system part catalog, manages \
user accounts, and bundles the tool itself for distribution.

Usage:
  bomcheck check production-bom.csv
  bomcheck binding export bindings.csv
  bomcheck catalog build raw-export.tsv
  bomcheck dist --skip-build

Exit code 0 = the requested operation completed."
)]
pub struct Args {
    /// Path to the application config file
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        default_value = "config.json",
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a BOM table against the part databases
    Check(CheckCommand),
    /// Inspect and maintain the binding library
    #[command(subcommand)]
    Binding(BindingCommand),
    /// Build and search the system part catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Manage user accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),
    /// Bundle the tool for distribution
    Dist(DistCommand),
}

#[derive(clap::Args, Debug)]
pub struct CheckCommand {
    /// BOM table to check (csv, tsv or txt)
    #[arg(value_name = "BOM")]
    pub bom: PathBuf,

    /// Also write the full report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum BindingCommand {
    /// Print the configured projects
    Show {
        /// Only the project bound to this index part
        #[arg(value_name = "INDEX_PART")]
        index_part: Option<String>,
    },
    /// Append an editable example project to the library
    Template,
    /// Write the library as a ten-column CSV
    Export {
        /// Destination CSV path
        #[arg(value_name = "CSV")]
        target: PathBuf,
    },
    /// Replace the library with projects read from a ten-column CSV
    Import {
        /// Source CSV path
        #[arg(value_name = "CSV")]
        source: PathBuf,
    },
    /// Remove the project bound to an index part
    Remove {
        #[arg(value_name = "INDEX_PART")]
        index_part: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Filter a raw inventory export into the five-column catalog
    Build {
        /// Raw export (tsv/txt) or an existing five-column table
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
    },
    /// Search a catalog written by `catalog build`
    Search {
        /// Catalog table to search
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Keywords, all of which must match
        #[arg(value_name = "KEYWORD")]
        keywords: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountsCommand {
    /// List accounts and their permissions
    List,
    /// Create an account
    Add {
        username: String,
        password: String,

        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },
    /// Delete an account
    Remove { username: String },
    /// Change an account password
    Passwd { username: String, password: String },
    /// Grant a permission to an account
    Grant { username: String, permission: String },
    /// Revoke a permission from an account
    Revoke { username: String, permission: String },
    /// Check a username/password pair
    Verify { username: String, password: String },
}

#[derive(clap::Args, Debug)]
pub struct DistCommand {
    /// Manifest to read bundle settings from
    #[arg(long, value_name = "PATH", default_value = "Cargo.toml")]
    pub manifest: PathBuf,

    /// Skip the environment bootstrap step
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Skip the build step and stage existing binaries
    #[arg(long)]
    pub skip_build: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_flag_is_global() {
        let args =
            Args::try_parse_from(["bomcheck", "check", "bom.csv", "-c", "tool/config.json"])
                .unwrap();
        assert_eq!(args.config, PathBuf::from("tool/config.json"));
        match args.command {
            Command::Check(cmd) => {
                assert_eq!(cmd.bom, PathBuf::from("bom.csv"));
                assert!(!cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dist_flags_default_off() {
        let args = Args::try_parse_from(["bomcheck", "dist"]).unwrap();
        match args.command {
            Command::Dist(cmd) => {
                assert_eq!(cmd.manifest, PathBuf::from("Cargo.toml"));
                assert!(!cmd.no_bootstrap);
                assert!(!cmd.skip_build);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binding_subcommands_parse() {
        let args = Args::try_parse_from(["bomcheck", "binding", "show"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Binding(BindingCommand::Show { index_part: None })
        ));

        let args =
            Args::try_parse_from(["bomcheck", "binding", "export", "out.csv"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Binding(BindingCommand::Export { .. })
        ));
    }
}
