//! Application configuration.
//!
//! The config file is JSON next to which the data files usually live.
//! Relative entries are resolved against the config directory so the whole
//! folder can be moved or shipped as one unit. Config files written on
//! Windows sometimes arrive with raw `\` path separators, which is not valid
//! JSON; loading repairs that once and rewrites the file.

use crate::error::Result;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INVALID_PART_DB: &str = "失效料号.csv";
pub const DEFAULT_BINDING_LIBRARY: &str = "绑定料号.js";
pub const DEFAULT_IMPORTANT_MATERIALS: &str = "重要物料.txt";
pub const DEFAULT_BLOCKED_REQUESTERS: &str = "屏蔽申请人.txt";

/// On-disk shape of the config file. Paths stay as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConfig {
    #[serde(default = "default_invalid_part_db")]
    invalid_part_db: String,
    #[serde(default = "default_binding_library")]
    binding_library: String,
    #[serde(default = "default_important_materials")]
    important_materials: String,
    #[serde(default = "default_blocked_requesters")]
    blocked_requesters: String,
}

fn default_invalid_part_db() -> String {
    DEFAULT_INVALID_PART_DB.to_string()
}

fn default_binding_library() -> String {
    DEFAULT_BINDING_LIBRARY.to_string()
}

fn default_important_materials() -> String {
    DEFAULT_IMPORTANT_MATERIALS.to_string()
}

fn default_blocked_requesters() -> String {
    DEFAULT_BLOCKED_REQUESTERS.to_string()
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            invalid_part_db: default_invalid_part_db(),
            binding_library: default_binding_library(),
            important_materials: default_important_materials(),
            blocked_requesters: default_blocked_requesters(),
        }
    }
}

/// Resolved application configuration with absolute data file paths.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Invalid-part database table.
    pub invalid_part_db: PathBuf,
    /// Binding library JSON file.
    pub binding_library: PathBuf,
    /// Important-material keyword list, one keyword per line.
    pub important_materials: PathBuf,
    /// Requester names excluded from the part catalog.
    pub blocked_requesters: PathBuf,
}

impl AppConfig {
    /// Loads the config file, creating it with defaults when absent.
    ///
    /// A file that fails to parse is retried once with every backslash
    /// escaped; if that parse succeeds the repaired content is written back.
    /// The original parse error is reported when the repair does not help.
    pub fn load(path: &Path) -> Result<Self> {
        let base_dir = config_base_dir(path);

        if !path.exists() {
            let raw = RawConfig::default();
            write_raw(path, &raw)?;
            log::info!("✓ Created default config at {}", path.display());
            return Ok(Self::from_raw(&raw, &base_dir));
        }

        let text = std::fs::read_to_string(path)?;
        let raw = match serde_json::from_str::<RawConfig>(&text) {
            Ok(raw) => raw,
            Err(original) => {
                let sanitized = text.replace('\\', "\\\\");
                match serde_json::from_str::<RawConfig>(&sanitized) {
                    Ok(raw) => {
                        write_raw(path, &raw)?;
                        log::warn!(
                            "Repaired unescaped backslashes in {}",
                            path.display()
                        );
                        raw
                    }
                    Err(_) => return Err(original.into()),
                }
            }
        };

        Ok(Self::from_raw(&raw, &base_dir))
    }

    /// Writes the config back, relativizing paths under the config directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let base_dir = config_base_dir(path);
        let raw = RawConfig {
            invalid_part_db: to_relative(&self.invalid_part_db, &base_dir),
            binding_library: to_relative(&self.binding_library, &base_dir),
            important_materials: to_relative(&self.important_materials, &base_dir),
            blocked_requesters: to_relative(&self.blocked_requesters, &base_dir),
        };
        write_raw(path, &raw)
    }

    fn from_raw(raw: &RawConfig, base_dir: &Path) -> Self {
        Self {
            invalid_part_db: resolve_path(&raw.invalid_part_db, base_dir),
            binding_library: resolve_path(&raw.binding_library, base_dir),
            important_materials: resolve_path(&raw.important_materials, base_dir),
            blocked_requesters: resolve_path(&raw.blocked_requesters, base_dir),
        }
    }

    /// Sibling of the config file holding the account store.
    pub fn accounts_path(config_path: &Path) -> PathBuf {
        config_base_dir(config_path).join("accounts.json")
    }
}

fn write_raw(path: &Path, raw: &RawConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let body = serde_json::to_string_pretty(raw)?;
    std::fs::write(path, body)?;
    Ok(())
}

fn config_base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve_path(value: &str, base_dir: &Path) -> PathBuf {
    if value.trim().is_empty() {
        return base_dir.to_path_buf();
    }
    let candidate = Path::new(value);
    match candidate.absolutize_from(base_dir) {
        Ok(resolved) => resolved.into_owned(),
        Err(_) => base_dir.join(candidate),
    }
}

fn to_relative(path: &Path, base_dir: &Path) -> String {
    let base = match base_dir.absolutize() {
        Ok(base) => base.into_owned(),
        Err(_) => base_dir.to_path_buf(),
    };
    match path.strip_prefix(&base) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");

        let config = AppConfig::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(
            config.invalid_part_db,
            tmp.path().join(DEFAULT_INVALID_PART_DB)
        );
        assert_eq!(
            config.blocked_requesters,
            tmp.path().join(DEFAULT_BLOCKED_REQUESTERS)
        );

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains(DEFAULT_BINDING_LIBRARY));
    }

    #[test]
    fn windows_backslashes_are_repaired_and_rewritten() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            "{\"invalid_part_db\": \"data\\parts.csv\", \"binding_library\": \"绑定料号.js\"}",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.invalid_part_db, tmp.path().join("data\\parts.csv"));

        // The rewritten file must parse cleanly on the next load.
        let body = std::fs::read_to_string(&path).unwrap();
        serde_json::from_str::<serde_json::Value>(&body).unwrap();
    }

    #[test]
    fn truly_broken_config_reports_the_original_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json at all").unwrap();

        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn saving_relativizes_paths_under_the_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let config = AppConfig::load(&path).unwrap();
        config.save(&path).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(raw["invalid_part_db"], DEFAULT_INVALID_PART_DB);
    }
}
