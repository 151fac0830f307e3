//! Configuration loading and management
//!
//! Handles parsing of `taskdeck.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ids::DEFAULT_ID_PREFIX;
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::storage::CONFIG_FILE;
use crate::task::Priority;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how tasks are stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task creation defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Dashboard views (recent list, due-soon window)
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Name of the slot holding the task collection (file stem)
    #[serde(default = "default_slot_key")]
    pub slot_key: String,

    /// How long to wait for the slot lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_slot_key() -> String {
    "taskdeck_tasks".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            slot_key: default_slot_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Prefix for generated task ids
    #[serde(default = "default_task_id_prefix")]
    pub id_prefix: String,

    /// Priority used by `taskdeck add` when none is given
    #[serde(default)]
    pub default_priority: Priority,
}

fn default_task_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_task_id_prefix(),
            default_priority: Priority::default(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Page size of `taskdeck recent`
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Look-ahead of `taskdeck soon`, in days after today
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,
}

fn default_recent_limit() -> usize {
    5
}

fn default_due_soon_days() -> u32 {
    1
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            due_soon_days: default_due_soon_days(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `taskdeck.toml` from a data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            match Self::load(&config_path) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(
                        path = %config_path.display(),
                        error = %err,
                        "ignoring invalid config, using defaults"
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.tasks.validate()?;
        self.dashboard.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        let key = self.slot_key.trim();
        if key.is_empty() {
            return Err(Error::InvalidConfig(
                "storage.slot_key cannot be empty".to_string(),
            ));
        }
        if !key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(Error::InvalidConfig(format!(
                "storage.slot_key '{key}' may only contain letters, digits, '_' and '-'"
            )));
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<()> {
        let prefix = self.id_prefix.trim();
        if prefix.is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.id_prefix cannot be empty".to_string(),
            ));
        }
        if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(
                "tasks.id_prefix must be alphanumeric".to_string(),
            ));
        }
        Ok(())
    }
}

impl DashboardConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.recent_limit) {
            return Err(Error::InvalidConfig(
                "dashboard.recent_limit must be between 1 and 100".to_string(),
            ));
        }
        if self.due_soon_days > 30 {
            return Err(Error::InvalidConfig(
                "dashboard.due_soon_days must be <= 30".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert!(cfg.storage.data_dir.is_none());
        assert_eq!(cfg.storage.slot_key, "taskdeck_tasks");
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
        assert_eq!(cfg.tasks.id_prefix, "td");
        assert_eq!(cfg.tasks.default_priority, Priority::Medium);
        assert_eq!(cfg.dashboard.recent_limit, 5);
        assert_eq!(cfg.dashboard.due_soon_days, 1);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
data_dir = "/srv/tasks"
slot_key = "fleeped_tasks"
lock_timeout_ms = 250

[tasks]
id_prefix = "home"
default_priority = "high"

[dashboard]
recent_limit = 10
due_soon_days = 3
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.data_dir, Some(PathBuf::from("/srv/tasks")));
        assert_eq!(cfg.storage.slot_key, "fleeped_tasks");
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
        assert_eq!(cfg.tasks.id_prefix, "home");
        assert_eq!(cfg.tasks.default_priority, Priority::High);
        assert_eq!(cfg.dashboard.recent_limit, 10);
        assert_eq!(cfg.dashboard.due_soon_days, 3);
    }

    #[test]
    fn invalid_slot_key_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[storage]\nslot_key = \"../escape\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_dashboard_config_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[dashboard]\nrecent_limit = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn unknown_priority_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[tasks]\ndefault_priority = \"urgent\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn load_from_dir_defaults_when_missing_or_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.dashboard.recent_limit, 5);

        fs::write(dir.path().join(CONFIG_FILE), "[tasks]\nid_prefix = \"\"").expect("write");
        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.tasks.id_prefix, "td");
    }

    #[test]
    fn load_from_dir_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[dashboard]\nrecent_limit = 7",
        )
        .expect("write config");

        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.dashboard.recent_limit, 7);
    }
}
