//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Resolved once at startup and handed to constructors; nothing reads the
//! environment after that.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Attendance backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL including any `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Endpoint for attendee registration (`/scan`, or `/attendees` on older backends)
    #[serde(default = "default_registration_path")]
    pub registration_path: String,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_registration_path() -> String {
    "/scan".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            registration_path: default_registration_path(),
        }
    }
}

/// Dashboard behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// How long a banner message stays up
    #[serde(default = "default_message_timeout")]
    pub message_timeout_secs: u64,

    /// How often the terminal dashboard redraws
    #[serde(default = "default_render_interval")]
    pub render_interval_secs: u64,

    /// Public address of the scan page, used when the backend omits a session's scan URL
    #[serde(default = "default_scan_base_url")]
    pub scan_base_url: String,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_message_timeout() -> u64 {
    5
}

fn default_render_interval() -> u64 {
    5
}

fn default_scan_base_url() -> String {
    "http://localhost:5173".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            message_timeout_secs: default_message_timeout(),
            render_interval_secs: default_render_interval(),
            scan_base_url: default_scan_base_url(),
        }
    }
}

impl DashboardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_secs(self.render_interval_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Reads a variable from the process environment
fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides(process_env);
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides(process_env);
        Ok(config)
    }

    /// Load an explicit path when given, otherwise the first default location found,
    /// otherwise defaults with environment overrides. The result is validated.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            None => Self::load_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("fellowship-attendance").join("config.toml")),
            Some(PathBuf::from("./fellowship.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing path that parses; unreadable files are logged
    /// and skipped
    pub fn load_first(config_paths: &[PathBuf]) -> Self {
        for path in config_paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = env("FELLOWSHIP_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(timeout) = env("FELLOWSHIP_REQUEST_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.backend.request_timeout_secs = t;
            }
        }
        if let Some(path) = env("FELLOWSHIP_REGISTRATION_PATH") {
            self.backend.registration_path = path;
        }

        // Dashboard overrides
        if let Some(interval) = env("FELLOWSHIP_POLL_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.dashboard.poll_interval_secs = i;
            }
        }
        if let Some(timeout) = env("FELLOWSHIP_MESSAGE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.dashboard.message_timeout_secs = t;
            }
        }
        if let Some(url) = env("FELLOWSHIP_SCAN_BASE_URL") {
            self.dashboard.scan_base_url = url;
        }

        // Logging overrides
        if let Some(level) = env("FELLOWSHIP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = env("FELLOWSHIP_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "backend.base_url must be an http(s) URL, got {:?}",
                self.backend.base_url
            )));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.request_timeout_secs must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("dashboard.poll_interval_secs", self.dashboard.poll_interval_secs),
            ("dashboard.message_timeout_secs", self.dashboard.message_timeout_secs),
            ("dashboard.render_interval_secs", self.dashboard.render_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Fellowship Attendance Configuration
#
# Environment variables override these settings:
# - FELLOWSHIP_BASE_URL
# - FELLOWSHIP_REQUEST_TIMEOUT
# - FELLOWSHIP_REGISTRATION_PATH
# - FELLOWSHIP_POLL_INTERVAL
# - FELLOWSHIP_MESSAGE_TIMEOUT
# - FELLOWSHIP_SCAN_BASE_URL
# - FELLOWSHIP_LOG_LEVEL
# - FELLOWSHIP_LOG_FORMAT

[backend]
# Attendance backend base URL, including the /api prefix
base_url = "http://localhost:5000/api"

# Request timeout in seconds
request_timeout_secs = 10

# Registration endpoint: "/scan", or "/attendees" for older backends
registration_path = "/scan"

[dashboard]
# How often live attendance is re-fetched (seconds)
poll_interval_secs = 30

# How long status messages stay visible (seconds)
message_timeout_secs = 5

# How often the terminal dashboard redraws (seconds)
render_interval_secs = 5

# Public address of the scan page (used to build session links)
scan_base_url = "http://localhost:5173"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
