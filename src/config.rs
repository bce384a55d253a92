use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::version::registries::pypi::DEFAULT_PYPI_URL;

// =============================================================================
// Defaults
// =============================================================================

/// Timeout for a single index request in milliseconds (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Number of index requests in flight during a remote sync
pub const DEFAULT_SYNC_CONCURRENCY: usize = 8;

pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

pub const DEFAULT_REPORT_SUBJECT: &str = "Package manager update";

const APP_DIR: &str = "package-monitor";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Database file; defaults to [`db_path`]
    pub database: Option<PathBuf>,
    pub index: IndexConfig,
    pub sync: SyncConfig,
    pub log: LogConfig,
    pub report: ReportConfig,
}

/// Package index configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    /// Base URL of a PyPI-compatible JSON API
    pub url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PYPI_URL.to_string(),
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Manifest read by local reconciliation
    pub requirements_file: PathBuf,
    /// Maximum number of concurrent index requests
    pub concurrency: usize,
    /// Exclude pre-releases and dev releases from latest/next versions
    pub ignore_prerelease: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            requirements_file: PathBuf::from(DEFAULT_REQUIREMENTS_FILE),
            concurrency: DEFAULT_SYNC_CONCURRENCY,
            ignore_prerelease: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Filter directive (e.g. "debug", "package_monitor=trace"); falls back to RUST_LOG
    pub level: Option<String>,
    /// Also write JSON logs to [`log_path`]
    pub file: bool,
}

/// Sync summary configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub subject: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            subject: DEFAULT_REPORT_SUBJECT.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from `path`, or from [`config_path`] when it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configured database path, or the default location
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(db_path)
    }
}

/// Returns the path to the data directory for package-monitor.
/// Uses $XDG_DATA_HOME/package-monitor if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/package-monitor,
/// or ./package-monitor if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("packages.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("package-monitor.log")
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn monitor_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<MonitorConfig>(json!({
            "sync": {
                "concurrency": 2
            }
        }))
        .unwrap();

        assert_eq!(result.sync.concurrency, 2);
        assert_eq!(
            result.sync.requirements_file,
            PathBuf::from("requirements.txt")
        );
        assert_eq!(result.index, IndexConfig::default());
        assert_eq!(result.report.subject, "Package manager update");
    }

    #[test]
    fn monitor_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<MonitorConfig>(json!({
            "database": "/var/lib/monitor/packages.db",
            "index": {
                "url": "https://pypi.example.com",
                "timeoutMs": 5000
            },
            "sync": {
                "requirementsFile": "requirements/production.txt",
                "concurrency": 4,
                "ignorePrerelease": true
            },
            "log": {
                "level": "debug",
                "file": true
            },
            "report": {
                "subject": "Weekly dependency report"
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            MonitorConfig {
                database: Some(PathBuf::from("/var/lib/monitor/packages.db")),
                index: IndexConfig {
                    url: "https://pypi.example.com".to_string(),
                    timeout_ms: 5000,
                },
                sync: SyncConfig {
                    requirements_file: PathBuf::from("requirements/production.txt"),
                    concurrency: 4,
                    ignore_prerelease: true,
                },
                log: LogConfig {
                    level: Some("debug".to_string()),
                    file: true,
                },
                report: ReportConfig {
                    subject: "Weekly dependency report".to_string(),
                },
            }
        );
    }

    #[test]
    fn load_reads_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"index": {"timeoutMs": 1000}}"#).unwrap();

        let config = MonitorConfig::load(Some(&path)).unwrap();

        assert_eq!(config.index.timeout_ms, 1000);
    }

    #[test]
    fn load_reports_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = MonitorConfig::load(Some(&path));

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_reports_missing_explicit_file() {
        let result = MonitorConfig::load(Some(Path::new("/nonexistent/config.json")));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn database_path_prefers_configured_value() {
        let config = MonitorConfig {
            database: Some(PathBuf::from("/tmp/custom.db")),
            ..Default::default()
        };

        assert_eq!(config.database_path(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/package-monitor"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(
            path,
            PathBuf::from("/home/user/.local/share/package-monitor")
        );
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./package-monitor"));
    }
}
