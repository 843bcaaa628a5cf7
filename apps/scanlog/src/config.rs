//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Configuration Priority (highest wins)                  │
//! │                                                                         │
//! │  1. Environment variables     SCANLOG_DB_PATH, SCANLOG_EXPORT_DIR, ... │
//! │  2. Config file               scanlog.toml (platform config dir        │
//! │                               or --config <path>)                      │
//! │  3. Built-in defaults                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanlog.toml
//! [storage]
//! db_path = "/home/me/.local/share/scanlog/scanlog.db"
//!
//! [export]
//! dir = "/home/me/Downloads"
//! format = "xlsx"              # xlsx | csv
//! auto_export_on_close = true
//!
//! [scan]
//! debounce_ms = 900
//! default_mode = "all"         # 1d | 2d | all
//! default_facing = "back"      # front | back
//!
//! [ledger]
//! price_merge = "keep_unless_non_zero"   # or always_overwrite
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use scanlog_core::{CameraFacing, PriceMergePolicy, ScanMode};

use crate::error::{AppError, AppResult};
use crate::export::ExportFormat;

const CONFIG_FILE: &str = "scanlog.toml";
const DB_FILE: &str = "scanlog.db";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the session.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Where spreadsheets are written.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub format: ExportFormat,

    /// Write the spreadsheet of a batch as soon as it is closed.
    #[serde(default = "default_true")]
    pub auto_export_on_close: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            dir: default_export_dir(),
            format: ExportFormat::default(),
            auto_export_on_close: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Duplicate-suppression window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Mode used when none has been saved yet.
    #[serde(default)]
    pub default_mode: ScanMode,

    #[serde(default)]
    pub default_facing: CameraFacing,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            debounce_ms: default_debounce_ms(),
            default_mode: ScanMode::default(),
            default_facing: CameraFacing::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub price_merge: PriceMergePolicy,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "scanlog", "scanlog")
        .map(|dirs| dirs.data_dir().join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

fn default_export_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("exports"))
}

fn default_debounce_ms() -> u64 {
    900
}

fn default_true() -> bool {
    true
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl AppConfig {
    /// Loads configuration: defaults, then the file (if it exists), then
    /// environment overrides. The result is validated.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.scan.debounce_ms == 0 {
            return Err(AppError::Config(
                "scan.debounce_ms must be greater than zero".into(),
            ));
        }
        if self.export.dir.as_os_str().is_empty() {
            return Err(AppError::Config("export.dir must not be empty".into()));
        }
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("storage.db_path must not be empty".into()));
        }
        Ok(())
    }

    /// Applies `SCANLOG_*` overrides. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SCANLOG_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.db_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("SCANLOG_EXPORT_DIR") {
            debug!(dir = %dir, "Overriding export dir from environment");
            self.export.dir = PathBuf::from(dir);
        }

        if let Some(format) = lookup("SCANLOG_EXPORT_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.export.format = parsed,
                Err(_) => warn!(format = %format, "Unknown export format in environment"),
            }
        }

        if let Some(ms) = lookup("SCANLOG_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.scan.debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Invalid debounce in environment"),
            }
        }

        if let Some(policy) = lookup("SCANLOG_PRICE_MERGE") {
            match policy.parse() {
                Ok(parsed) => self.ledger.price_merge = parsed,
                Err(_) => warn!(policy = %policy, "Unknown price merge policy in environment"),
            }
        }

        if let Some(flag) = lookup("SCANLOG_AUTO_EXPORT") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.export.auto_export_on_close = true,
                "0" | "false" | "no" | "off" => self.export.auto_export_on_close = false,
                _ => warn!(value = %flag, "Invalid auto-export flag in environment"),
            }
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.scan.debounce_ms)
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "scanlog", "scanlog")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scan.debounce_ms, 900);
        assert_eq!(config.scan.default_mode, ScanMode::All);
        assert_eq!(config.scan.default_facing, CameraFacing::Back);
        assert_eq!(config.export.format, ExportFormat::Xlsx);
        assert!(config.export.auto_export_on_close);
        assert_eq!(config.ledger.price_merge, PriceMergePolicy::KeepUnlessNonZero);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [scan]
            default_mode = "1d"

            [export]
            format = "csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.default_mode, ScanMode::OneD);
        assert_eq!(config.scan.debounce_ms, 900);
        assert_eq!(config.export.format, ExportFormat::Csv);
        assert!(config.export.auto_export_on_close);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SCANLOG_DEBOUNCE_MS", "250"),
            ("SCANLOG_PRICE_MERGE", "always_overwrite"),
            ("SCANLOG_AUTO_EXPORT", "off"),
            ("SCANLOG_EXPORT_FORMAT", "bogus"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.ledger.price_merge, PriceMergePolicy::AlwaysOverwrite);
        assert!(!config.export.auto_export_on_close);
        assert_eq!(config.export.format, ExportFormat::Xlsx);
    }

    #[test]
    fn test_validate_rejects_zero_debounce() {
        let mut config = AppConfig::default();
        config.scan.debounce_ms = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.export.dir = dir.path().join("out");
        config.scan.default_facing = CameraFacing::Front;
        config.save(Some(path.clone())).unwrap();

        let loaded: AppConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }
}
