//! Command line interface for the BOM toolkit.

mod args;
pub mod commands;

pub use args::{
    AccountsCommand, Args, BindingCommand, CatalogCommand, CheckCommand, Command, DistCommand,
};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    match args.command {
        Command::Check(cmd) => commands::check::run(&args.config, cmd).await,
        Command::Binding(cmd) => commands::binding::run(&args.config, cmd),
        Command::Catalog(cmd) => commands::catalog::run(&args.config, cmd),
        Command::Accounts(cmd) => commands::accounts::run(&args.config, cmd),
        Command::Dist(cmd) => commands::dist::run(cmd).await,
    }
}
