//! The `accounts` subcommand.

use crate::accounts::{self, AccountStore, PERMISSION_LABELS, UserAccount};
use crate::cli::args::AccountsCommand;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use std::collections::BTreeSet;
use std::path::Path;

pub fn run(config_path: &Path, cmd: AccountsCommand) -> Result<i32> {
    let mut store = AccountStore::load(&AppConfig::accounts_path(config_path))?;

    match cmd {
        AccountsCommand::List => {
            for account in store.list() {
                let role = if account.is_admin { "admin" } else { "user" };
                let labels: Vec<&str> = account
                    .permissions
                    .iter()
                    .filter_map(|key| accounts::permission_label(key))
                    .collect();
                println!("{}  [{}]  {}", account.username, role, labels.join(", "));
            }
        }
        AccountsCommand::Add {
            username,
            password,
            admin,
        } => {
            if username.trim().is_empty() {
                return Err(CliError::InvalidArguments {
                    reason: "username must not be empty".into(),
                }
                .into());
            }
            store.add(UserAccount::create(&username, &password, admin, BTreeSet::new()))?;
            println!("✓ Added account {}", username);
        }
        AccountsCommand::Remove { username } => {
            if store.delete(&username)? {
                println!("✓ Removed account {}", username);
            } else {
                println!("No account named {}", username);
                return Ok(1);
            }
        }
        AccountsCommand::Passwd { username, password } => {
            store.set_password(&username, &password)?;
            println!("✓ Updated password for {}", username);
        }
        AccountsCommand::Grant {
            username,
            permission,
        } => {
            require_known_permission(&permission)?;
            store.grant(&username, &permission)?;
            println!("✓ Granted {} to {}", permission, username);
        }
        AccountsCommand::Revoke {
            username,
            permission,
        } => {
            require_known_permission(&permission)?;
            store.revoke(&username, &permission)?;
            println!("✓ Revoked {} from {}", permission, username);
        }
        AccountsCommand::Verify { username, password } => match store.authenticate(&username, &password) {
            Some(account) => println!("✓ Credentials accepted for {}", account.username),
            None => {
                println!("Invalid credentials");
                return Ok(1);
            }
        },
    }

    Ok(0)
}

fn require_known_permission(permission: &str) -> Result<()> {
    if accounts::is_known_permission(permission) {
        return Ok(());
    }
    let known: Vec<&str> = PERMISSION_LABELS.iter().map(|(key, _)| *key).collect();
    Err(CliError::InvalidArguments {
        reason: format!(
            "unknown permission {}, expected one of: {}",
            permission,
            known.join(", ")
        ),
    }
    .into())
}
