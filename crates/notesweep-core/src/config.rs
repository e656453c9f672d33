use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Vault root directory
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Options controlling which notes are cleaned and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Folder holding daily notes, relative to the vault root.
    /// Falls back to the vault's daily-notes setting when unset.
    #[serde(default)]
    pub folder: Option<String>,
    /// Minimum note age in days before it is cleaned
    #[serde(default = "default_age_threshold_days")]
    pub age_threshold_days: u32,
    /// Remove ```button blocks
    #[serde(default = "default_true")]
    pub strip_buttons: bool,
    /// Remove ```tasks query blocks
    #[serde(default = "default_true")]
    pub strip_task_queries: bool,
    /// Remove headings with nothing beneath them
    #[serde(default = "default_true")]
    pub prune_empty_sections: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            folder: None,
            age_threshold_days: default_age_threshold_days(),
            strip_buttons: default_true(),
            strip_task_queries: default_true(),
            prune_empty_sections: default_true(),
        }
    }
}

impl CleanupConfig {
    /// Keys accepted by [`CleanupConfig::set`]
    pub const KEYS: [&'static str; 5] = [
        "folder",
        "age_threshold_days",
        "strip_buttons",
        "strip_task_queries",
        "prune_empty_sections",
    ];

    /// Update a single option from its string form.
    /// An empty value for `folder` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        match key {
            "folder" => {
                let value = value.trim();
                self.folder = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "age_threshold_days" => {
                self.age_threshold_days = value.trim().parse().map_err(|_| {
                    crate::Error::Config(format!(
                        "age_threshold_days must be a non-negative integer, got '{}'",
                        value
                    ))
                })?;
            }
            "strip_buttons" => self.strip_buttons = parse_bool(key, value)?,
            "strip_task_queries" => self.strip_task_queries = parse_bool(key, value)?,
            "prune_empty_sections" => self.prune_empty_sections = parse_bool(key, value)?,
            _ => {
                return Err(crate::Error::Config(format!(
                    "unknown option '{}' (expected one of: {})",
                    key,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(crate::Error::Config(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between scheduled cleanups in seconds (0 = disabled)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_vault_dir() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vault")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_age_threshold_days() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    86400 // 24 hours
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, merging it over defaults
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/notesweep/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("notesweep")
            .join("config.toml")
    }

    /// Update a single option and validate it.
    /// `vault_dir`, `log_level` and `cleanup_interval_secs` are accepted
    /// alongside every [`CleanupConfig`] key.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        match key {
            "vault_dir" => self.general.vault_dir = PathBuf::from(value.trim()),
            "log_level" => self.general.log_level = value.trim().to_string(),
            "cleanup_interval_secs" => {
                self.sync.cleanup_interval_secs = value.trim().parse().map_err(|_| {
                    crate::Error::Config(format!(
                        "cleanup_interval_secs must be a non-negative integer, got '{}'",
                        value
                    ))
                })?;
            }
            _ => self.cleanup.set(key, value)?,
        }
        Ok(())
    }

    /// Get the vault directory (with tilde expansion)
    pub fn vault_dir(&self) -> PathBuf {
        expand_tilde(&self.general.vault_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CleanupConfig::default();
        assert_eq!(config.age_threshold_days, 7);
        assert!(config.strip_buttons);
        assert!(config.strip_task_queries);
        assert!(config.prune_empty_sections);
        assert!(config.folder.is_none());
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [cleanup]
            folder = "Journal"
            strip_buttons = false
            "#,
        )
        .unwrap();

        assert_eq!(config.cleanup.folder.as_deref(), Some("Journal"));
        assert!(!config.cleanup.strip_buttons);
        assert!(config.cleanup.strip_task_queries);
        assert_eq!(config.cleanup.age_threshold_days, 7);
        assert_eq!(config.sync.cleanup_interval_secs, 86400);
    }

    #[test]
    fn test_set_options() {
        let mut config = CleanupConfig::default();
        config.set("age_threshold_days", "14").unwrap();
        config.set("prune_empty_sections", "off").unwrap();
        config.set("folder", "Daily").unwrap();
        assert_eq!(config.age_threshold_days, 14);
        assert!(!config.prune_empty_sections);
        assert_eq!(config.folder.as_deref(), Some("Daily"));

        config.set("folder", "").unwrap();
        assert!(config.folder.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = CleanupConfig::default();
        assert!(config.set("age_threshold_days", "-1").is_err());
        assert!(config.set("strip_buttons", "maybe").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, CleanupConfig::default());
    }

    #[test]
    fn test_app_config_set() {
        let mut config = AppConfig::default();
        config.set("vault_dir", "~/Notes").unwrap();
        config.set("cleanup_interval_secs", "3600").unwrap();
        config.set("strip_task_queries", "false").unwrap();
        assert_eq!(config.general.vault_dir, PathBuf::from("~/Notes"));
        assert_eq!(config.sync.cleanup_interval_secs, 3600);
        assert!(!config.cleanup.strip_task_queries);
        assert!(config.set("cleanup_interval_secs", "soon").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.cleanup.age_threshold_days = 3;
        config.cleanup.folder = Some("Daily Notes".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.cleanup, config.cleanup);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.cleanup, CleanupConfig::default());
    }
}
