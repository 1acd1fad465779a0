// crates/safenet-config/src/config.rs
// ============================================================================
// Module: SafeNet Configuration
// Description: Configuration loading and validation for the SafeNet server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: safenet-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is resolved from, in order: an explicit path, the
//! `SAFENET_CONFIG` environment variable, `./safenet.toml` when present, and
//! finally built-in defaults. The `PORT` environment variable then overrides
//! `server.port`. Explicitly named files must exist; invalid values fail
//! closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use safenet_store_sqlite::SqliteStoreConfig;
use safenet_store_sqlite::SqliteStoreMode;
use safenet_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "safenet.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SAFENET_CONFIG";
/// Environment variable used to override the listening port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind host (all interfaces).
pub(crate) const DEFAULT_BIND_HOST: &str = "0.0.0.0";
/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Maximum allowed request body size in bytes.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
/// Default database file path.
pub(crate) const DEFAULT_DATABASE_PATH: &str = "safenet.db";
/// Default busy timeout for the record store (ms).
pub(crate) const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum busy timeout for the record store (ms).
pub(crate) const MAX_STORE_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Default template directory.
pub(crate) const DEFAULT_TEMPLATES_DIR: &str = "templates";
/// Default static asset directory.
pub(crate) const DEFAULT_STATIC_DIR: &str = "static";
/// Default tracing filter directive.
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// SafeNet server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafenetConfig {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Page template and static asset configuration.
    #[serde(default)]
    pub pages: PagesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from, if any (not deserialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl SafenetConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok();
        let port = env::var(PORT_ENV_VAR).ok();
        Self::load_with(path, env_path.as_deref(), port.as_deref())
    }

    /// Loads configuration with explicit environment values.
    ///
    /// `env_path` stands in for `SAFENET_CONFIG` and `port` for `PORT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with(
        path: Option<&Path>,
        env_path: Option<&str>,
        port: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path, env_path)? {
            Some(resolved) => Self::from_file(&resolved)?,
            None => Self::default(),
        };
        config.apply_port_override(port)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a configuration file.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Applies a `PORT` environment value over `server.port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is not a port number.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = port else {
            return Ok(());
        };
        self.server.port = raw.trim().parse::<u16>().map_err(|_| {
            ConfigError::Invalid(format!("{PORT_ENV_VAR} must be a port number, got '{raw}'"))
        })?;
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.pages.validate()?;
        self.logging.validate()
    }
}

/// Point at which the record store schema is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaInitMode {
    /// Once, before the listener binds.
    #[default]
    Startup,
    /// On every visit to the home or quiz page.
    OnVisit,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// IP address to bind.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Schema initialization trigger.
    #[serde(default)]
    pub schema_init: SchemaInitMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            schema_init: SchemaInitMode::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `bind_host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind_host.trim().parse().map_err(|_| {
            ConfigError::Invalid("server.bind_host must be an IP address".to_string())
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Validates listener configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind_host must be non-empty".to_string()));
        }
        self.socket_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes exceeds limit of {MAX_MAX_BODY_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Builds the record store configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates record store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.path.to_string_lossy())?;
        if self.busy_timeout_ms > MAX_STORE_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms exceeds limit of {MAX_STORE_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Page template and static asset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
    /// Directory holding `<page>.html` templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            static_dir: default_static_dir(),
        }
    }
}

impl PagesConfig {
    /// Validates page asset configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("pages.templates_dir", &self.templates_dir.to_string_lossy())?;
        validate_path_string("pages.static_dir", &self.static_dir.to_string_lossy())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind host.
fn default_bind_host() -> String {
    DEFAULT_BIND_HOST.to_string()
}

/// Returns the default listening port.
const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Returns the default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default database path.
fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

/// Returns the default record store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Returns the default template directory.
fn default_templates_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATES_DIR)
}

/// Returns the default static asset directory.
fn default_static_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATIC_DIR)
}

/// Returns the default log filter.
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config file, or `None` when built-in defaults apply.
fn resolve_path(
    path: Option<&Path>,
    env_path: Option<&str>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = env_path.map(str::trim).filter(|value| !value.is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    if default_path.is_file() {
        return Ok(Some(default_path));
    }
    Ok(None)
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::validate_path_string;

    #[test]
    fn validate_path_string_accepts_valid_path() {
        let result = validate_path_string("test_path", "./data/safenet.db");
        assert!(result.is_ok(), "valid path should pass");
    }

    #[test]
    fn validate_path_string_rejects_empty_string() {
        let result = validate_path_string("test_path", "");
        assert!(result.is_err(), "empty path should fail");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let result = validate_path_string("test_path", "   ");
        assert!(result.is_err(), "whitespace-only path should fail");
    }

    #[test]
    fn validate_path_string_rejects_overlong_component() {
        let value = format!("data/{}", "x".repeat(300));
        let result = validate_path_string("test_path", &value);
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }
}
