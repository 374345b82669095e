use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::mailstore::FolderFilter;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Folder markers descended into when no config overrides them.
pub const DEFAULT_FOLDER_FILTERS: &[&str] = &["Inbox", "Deleted"];

/// Deflate level used by `Directory::zip` when unset.
pub const DEFAULT_ZIP_LEVEL: i64 = 6;

fn default_folder_filters() -> Vec<String> {
    DEFAULT_FOLDER_FILTERS.iter().map(|s| s.to_string()).collect()
}

fn default_zip_level() -> i64 {
    DEFAULT_ZIP_LEVEL
}

// ---------------------------------------------------------------------------
// On-disk config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Case-sensitive path markers a child folder must contain to be searched.
    #[serde(default = "default_folder_filters")]
    pub folder_filters: Vec<String>,
    /// Maildir tree searched by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_root: Option<PathBuf>,
    /// Deflate level for archives, 0..=9; 0 stores entries uncompressed.
    #[serde(default = "default_zip_level")]
    pub zip_compression_level: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folder_filters: default_folder_filters(),
            mail_root: None,
            zip_compression_level: DEFAULT_ZIP_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("janky-io")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

impl Config {
    /// Resolve the effective config: file (or defaults), then env overrides.
    pub fn load() -> Result<Self> {
        let base = Self::load_from(&config_path())?.unwrap_or_default();
        Ok(base.with_env())
    }

    /// Read a config file. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0..=9).contains(&self.zip_compression_level) {
            return Err(Error::Config(format!(
                "zip_compression_level must be 0..=9, got {}",
                self.zip_compression_level
            )));
        }
        Ok(())
    }

    /// Overlay `JANKY_IO_MAIL_ROOT` and `JANKY_IO_FOLDER_FILTERS`.
    fn with_env(self) -> Self {
        self.with_overrides(
            std::env::var("JANKY_IO_MAIL_ROOT").ok(),
            std::env::var("JANKY_IO_FOLDER_FILTERS").ok(),
        )
    }

    fn with_overrides(mut self, mail_root: Option<String>, filters: Option<String>) -> Self {
        if let Some(root) = mail_root.filter(|r| !r.trim().is_empty()) {
            log::debug!("mail_root overridden from environment");
            self.mail_root = Some(PathBuf::from(root));
        }
        if let Some(raw) = filters {
            let parsed: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                log::debug!("folder_filters overridden from environment: {:?}", parsed);
                self.folder_filters = parsed;
            }
        }
        self
    }

    pub fn folder_filter(&self) -> FolderFilter {
        FolderFilter::new(self.folder_filters.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_search_inbox_and_deleted() {
        let config = Config::default();
        assert_eq!(config.folder_filters, vec!["Inbox", "Deleted"]);
        assert_eq!(config.zip_compression_level, DEFAULT_ZIP_LEVEL);
        assert!(config.mail_root.is_none());
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            folder_filters: vec!["Archive".into()],
            mail_root: Some(PathBuf::from("/var/mail/me")),
            zip_compression_level: 9,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Some(config));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "mail_root": "/tmp/mail" }"#).unwrap();
        let config = Config::load_from(&path).unwrap().unwrap();
        assert_eq!(config.folder_filters, vec!["Inbox", "Deleted"]);
        assert_eq!(config.mail_root, Some(PathBuf::from("/tmp/mail")));
    }

    #[test]
    fn out_of_range_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "zip_compression_level": 42 }"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn env_filters_are_split_and_trimmed() {
        let config = Config::default().with_overrides(None, Some(" Inbox , Sent,,".into()));
        assert_eq!(config.folder_filters, vec!["Inbox", "Sent"]);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = Config::default().with_overrides(Some("  ".into()), Some(",".into()));
        assert_eq!(config, Config::default());
    }
}
