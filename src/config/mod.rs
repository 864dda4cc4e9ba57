//! Configuration management
//!
//! This module handles loading and parsing configuration for the Inkpost server.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication and session configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blog listing configuration
    #[serde(default)]
    pub blog: BlogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/inkpost.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How long a login session stays valid, in days
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Interval between expired-session sweeps, in seconds
    #[serde(default = "default_session_cleanup_secs")]
    pub session_cleanup_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
            cookie_name: default_cookie_name(),
            session_cleanup_secs: default_session_cleanup_secs(),
        }
    }
}

impl AuthConfig {
    /// Session lifetime in seconds, used for the cookie Max-Age
    pub fn session_max_age(&self) -> i64 {
        self.session_days.saturating_mul(24 * 60 * 60)
    }
}

/// Longest session lifetime the config accepts (about a century)
pub const MAX_SESSION_DAYS: i64 = 36500;

fn default_session_days() -> i64 {
    7
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_session_cleanup_secs() -> u64 {
    3600
}

/// Blog listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Page size used when the client doesn't send one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound for a requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - INKPOST_SERVER_HOST
    /// - INKPOST_SERVER_PORT
    /// - INKPOST_SERVER_CORS_ORIGIN
    /// - INKPOST_DATABASE_DRIVER
    /// - INKPOST_DATABASE_URL
    /// - INKPOST_AUTH_SESSION_DAYS
    /// - INKPOST_AUTH_COOKIE_NAME
    /// - INKPOST_AUTH_SESSION_CLEANUP_SECS
    /// - INKPOST_BLOG_DEFAULT_PAGE_SIZE
    /// - INKPOST_BLOG_MAX_PAGE_SIZE
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the server misbehave at runtime
    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.session_days <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_days must be positive".to_string(),
            ));
        }
        if self.auth.session_days > MAX_SESSION_DAYS {
            return Err(ConfigError::ValidationError(format!(
                "auth.session_days cannot exceed {}",
                MAX_SESSION_DAYS
            )));
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.cookie_name cannot be empty".to_string(),
            ));
        }
        if self.blog.max_page_size == 0 || self.blog.default_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "blog page sizes must be at least 1".to_string(),
            ));
        }
        if self.blog.default_page_size > self.blog.max_page_size {
            return Err(ConfigError::ValidationError(
                "blog.default_page_size cannot exceed blog.max_page_size".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("INKPOST_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("INKPOST_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("INKPOST_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        // Database configuration
        if let Ok(driver) = std::env::var("INKPOST_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("INKPOST_DATABASE_URL") {
            self.database.url = url;
        }

        // Auth configuration
        if let Ok(days) = std::env::var("INKPOST_AUTH_SESSION_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                self.auth.session_days = days;
            }
        }
        if let Ok(name) = std::env::var("INKPOST_AUTH_COOKIE_NAME") {
            self.auth.cookie_name = name;
        }
        if let Ok(secs) = std::env::var("INKPOST_AUTH_SESSION_CLEANUP_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.auth.session_cleanup_secs = secs;
            }
        }

        // Blog configuration
        if let Ok(size) = std::env::var("INKPOST_BLOG_DEFAULT_PAGE_SIZE") {
            if let Ok(size) = size.parse::<u32>() {
                self.blog.default_page_size = size;
            }
        }
        if let Ok(size) = std::env::var("INKPOST_BLOG_MAX_PAGE_SIZE") {
            if let Ok(size) = size.parse::<u32>() {
                self.blog.max_page_size = size;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: &[&str] = &[
    "INKPOST_SERVER_HOST",
    "INKPOST_SERVER_PORT",
    "INKPOST_SERVER_CORS_ORIGIN",
    "INKPOST_DATABASE_DRIVER",
    "INKPOST_DATABASE_URL",
    "INKPOST_AUTH_SESSION_DAYS",
    "INKPOST_AUTH_COOKIE_NAME",
    "INKPOST_AUTH_SESSION_CLEANUP_SECS",
    "INKPOST_BLOG_DEFAULT_PAGE_SIZE",
    "INKPOST_BLOG_MAX_PAGE_SIZE",
];
