//! User accounts with hashed passwords and named permissions.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Permission keys and their display labels.
pub const PERMISSION_LABELS: [(&str, &str); 5] = [
    ("invalid_part", "编辑失效料号库"),
    ("binding", "编辑绑定料号"),
    ("important", "编辑重要物料"),
    ("blocked", "编辑屏蔽申请人"),
    ("asset", "维护料号资源"),
];

pub fn is_known_permission(key: &str) -> bool {
    PERMISSION_LABELS.iter().any(|(name, _)| *name == key)
}

pub fn permission_label(key: &str) -> Option<&'static str> {
    PERMISSION_LABELS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, label)| *label)
}

fn hash_password(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserAccount {
    /// Creates an account with a freshly hashed password. An administrator
    /// created without explicit permissions gets all of them.
    pub fn create(
        username: &str,
        password: &str,
        is_admin: bool,
        permissions: BTreeSet<String>,
    ) -> Self {
        let permissions = if is_admin && permissions.is_empty() {
            PERMISSION_LABELS
                .iter()
                .map(|(key, _)| key.to_string())
                .collect()
        } else {
            permissions
        };
        Self {
            username: username.to_string(),
            password_hash: hash_password(password),
            permissions,
            is_admin,
        }
    }

    pub fn set_password(&mut self, password: &str) {
        self.password_hash = hash_password(password);
    }

    pub fn verify(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }

    pub fn can(&self, permission: &str) -> bool {
        self.is_admin || self.permissions.contains(permission)
    }
}

/// JSON-backed account collection. An empty store bootstraps a default
/// `admin`/`admin` administrator so the tooling is never locked out.
#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: BTreeMap<String, UserAccount>,
}

impl AccountStore {
    pub fn load(path: &Path) -> Result<Self> {
        let mut store = Self {
            path: path.to_path_buf(),
            accounts: BTreeMap::new(),
        };
        if path.exists() {
            let text = std::fs::read_to_string(path)?;
            match serde_json::from_str::<Vec<UserAccount>>(&text) {
                Ok(list) => {
                    for account in list {
                        if !account.username.is_empty() {
                            store.accounts.insert(account.username.clone(), account);
                        }
                    }
                }
                Err(err) => {
                    log::warn!(
                        "Account store {} is unreadable ({}), starting over",
                        path.display(),
                        err
                    );
                }
            }
        }
        store.ensure_default_admin()?;
        Ok(store)
    }

    fn ensure_default_admin(&mut self) -> Result<()> {
        if self.accounts.is_empty() {
            let admin = UserAccount::create("admin", "admin", true, BTreeSet::new());
            self.accounts.insert(admin.username.clone(), admin);
            self.save()?;
            log::info!("✓ Created default admin account");
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let payload: Vec<&UserAccount> = self.accounts.values().collect();
        let text = serde_json::to_string_pretty(&payload)?;
        std::fs::write(&self.path, text + "\n")?;
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&UserAccount> {
        self.accounts.get(username)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<&UserAccount> {
        self.accounts
            .get(username)
            .filter(|account| account.verify(password))
    }

    /// Adds a new account, refusing to overwrite an existing one.
    pub fn add(&mut self, account: UserAccount) -> Result<()> {
        if self.accounts.contains_key(&account.username) {
            return Err(DataError::DuplicateAccount {
                username: account.username,
            }
            .into());
        }
        self.accounts.insert(account.username.clone(), account);
        self.save()
    }

    /// Removes an account. The default admin reappears on the next load if
    /// the store ends up empty.
    pub fn delete(&mut self, username: &str) -> Result<bool> {
        if self.accounts.remove(username).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn set_password(&mut self, username: &str, password: &str) -> Result<()> {
        let account = self.require_mut(username)?;
        account.set_password(password);
        self.save()
    }

    pub fn grant(&mut self, username: &str, permission: &str) -> Result<()> {
        let account = self.require_mut(username)?;
        account.permissions.insert(permission.to_string());
        self.save()
    }

    pub fn revoke(&mut self, username: &str, permission: &str) -> Result<()> {
        let account = self.require_mut(username)?;
        account.permissions.remove(permission);
        self.save()
    }

    /// All accounts ordered by username.
    pub fn list(&self) -> Vec<&UserAccount> {
        self.accounts.values().collect()
    }

    fn require_mut(&mut self, username: &str) -> Result<&mut UserAccount> {
        match self.accounts.get_mut(username) {
            Some(account) => Ok(account),
            None => Err(DataError::UnknownAccount {
                username: username.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("accounts.json")
    }

    #[test]
    fn empty_store_bootstraps_default_admin() {
        let tmp = tempfile::tempdir().unwrap();
        let path = store_path(&tmp);

        let store = AccountStore::load(&path).unwrap();
        assert!(path.exists());
        let admin = store.authenticate("admin", "admin").unwrap();
        assert!(admin.is_admin);
        for (key, _) in PERMISSION_LABELS {
            assert!(admin.can(key));
        }
    }

    #[test]
    fn unreadable_store_starts_over_with_default_admin() {
        let tmp = tempfile::tempdir().unwrap();
        let path = store_path(&tmp);
        std::fs::write(&path, "{ not json").unwrap();

        let store = AccountStore::load(&path).unwrap();
        assert_eq!(store.list().len(), 1);
        assert!(store.get("admin").is_some());
    }

    #[test]
    fn passwords_are_hashed_and_verified() {
        let account = UserAccount::create("alice", "secret", false, BTreeSet::new());
        assert_eq!(account.password_hash.len(), 64);
        assert_ne!(account.password_hash, "secret");
        assert!(account.verify("secret"));
        assert!(!account.verify("wrong"));
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = AccountStore::load(&store_path(&tmp)).unwrap();

        store
            .add(UserAccount::create("alice", "pw", false, BTreeSet::new()))
            .unwrap();
        let err = store
            .add(UserAccount::create("alice", "pw2", false, BTreeSet::new()))
            .unwrap_err();
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn deleting_every_account_recreates_admin_on_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = store_path(&tmp);
        let mut store = AccountStore::load(&path).unwrap();
        store
            .add(UserAccount::create("alice", "pw", false, BTreeSet::new()))
            .unwrap();

        assert!(store.delete("alice").unwrap());
        assert!(store.delete("admin").unwrap());
        assert!(!store.delete("ghost").unwrap());
        assert_eq!(store.list().len(), 0);

        let reloaded = AccountStore::load(&path).unwrap();
        assert!(reloaded.authenticate("admin", "admin").is_some());
    }

    #[test]
    fn grants_and_revokes_gate_non_admin_accounts() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = AccountStore::load(&store_path(&tmp)).unwrap();
        store
            .add(UserAccount::create("bob", "pw", false, BTreeSet::new()))
            .unwrap();

        assert!(!store.get("bob").unwrap().can("binding"));
        store.grant("bob", "binding").unwrap();
        assert!(store.get("bob").unwrap().can("binding"));
        store.revoke("bob", "binding").unwrap();
        assert!(!store.get("bob").unwrap().can("binding"));

        let err = store.set_password("ghost", "pw").unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
