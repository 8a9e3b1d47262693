//! Configuration loading for relay-server.
//!
//! Configuration is loaded from a TOML file (default: `relay.toml`).
//! Every section and field is optional.

use relay_types::CodeRange;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for relay-server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Code generation configuration.
    #[serde(default)]
    pub codes: CodesConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// HTTP endpoints configuration.
    #[serde(default)]
    pub http: HttpConfig,
    /// Cleanup task configuration.
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener (default: 0.0.0.0:8080).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
    /// Maximum pooled SQLite connections (default: 10).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Code generation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CodesConfig {
    /// Lowest code handed out, inclusive (default: 1000).
    #[serde(default = "default_code_min")]
    pub min: i64,
    /// Highest code handed out, inclusive (default: 9999).
    #[serde(default = "default_code_max")]
    pub max: i64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsConfig {
    /// Requests per client IP per minute; 0 disables limiting (default: 0).
    #[serde(default)]
    pub requests_per_minute: u32,
}

/// HTTP endpoints configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Enable metrics endpoint (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

/// Cleanup task configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Enable cleanup task (default: false, tokens are kept forever).
    #[serde(default)]
    pub enabled: bool,
    /// Cleanup interval in seconds (default: 3600 = 1 hour).
    #[serde(default = "default_cleanup_interval")]
    pub interval_secs: u64,
    /// Age in seconds after which a token is deleted (default: 1 day).
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("relay.db")
}

fn default_max_connections() -> u32 {
    10
}

fn default_code_min() -> i64 {
    CodeRange::FOUR_DIGIT.min()
}

fn default_code_max() -> i64 {
    CodeRange::FOUR_DIGIT.max()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

fn default_max_age() -> u64 {
    24 * 60 * 60 // 1 day
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            min: default_code_min(),
            max: default_code_max(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_cleanup_interval(),
            max_age_secs: default_max_age(),
        }
    }
}

impl CodesConfig {
    /// The validated code range.
    pub fn range(&self) -> Result<CodeRange, ConfigError> {
        CodeRange::new(self.min, self.max).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.codes.range()?;

        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid {
                reason: "storage.max_connections must be > 0".to_string(),
            });
        }

        if self.cleanup.enabled && (self.cleanup.interval_secs == 0 || self.cleanup.max_age_secs == 0)
        {
            return Err(ConfigError::Invalid {
                reason: "cleanup.interval_secs and cleanup.max_age_secs must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Configuration values are inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}
