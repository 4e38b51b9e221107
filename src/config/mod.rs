//! Configuration system for the console
//!
//! Loads configuration from TOML files; command-line flags and environment
//! variables are layered on top by the binary.

mod types;

pub use types::*;

use crate::backend::{Credentials, FieldDescriptor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8090";
pub const DEFAULT_ADMIN_IDENTITY: &str = "admin@admin.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "adminadmin";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_COLLECTION_TYPE: &str = "base";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend service connection
    pub backend: BackendConfig,
    /// Web UI configuration
    pub web: WebConfig,
    /// Collections created through the UI
    pub collections: CollectionDefaults,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_raw(raw)
    }

    /// Convert from raw TOML config to validated config
    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            backend: raw.backend.unwrap_or_default().try_into()?,
            web: raw.web.unwrap_or_default().into(),
            collections: raw.collections.unwrap_or_default().into(),
            logging: raw.logging.unwrap_or_default().into(),
        })
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            backend: BackendConfig::default(),
            web: WebConfig::default(),
            collections: CollectionDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("collection-console")
            .join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Backend service connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend service
    pub url: Url,
    /// Administrator credentials used for every collection call
    pub admin: Credentials,
}

impl BackendConfig {
    /// Replace the base URL from an unparsed string
    pub fn set_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.url = parse_url(url)?;
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            admin: Credentials::new(DEFAULT_ADMIN_IDENTITY, DEFAULT_ADMIN_PASSWORD),
        }
    }
}

fn default_backend_url() -> Url {
    Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid")
}

pub(crate) fn parse_url(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::Invalid(format!("Invalid backend URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ConfigError::Invalid(format!(
            "Backend URL scheme '{}' not supported, use http or https",
            scheme
        ))),
    }
}

/// Web UI configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind the web server
    pub bind: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

/// Settings applied to collections created from the web form
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDefaults {
    /// Collection type sent with every create request
    pub collection_type: String,
    /// Schema fields attached to every new collection
    pub fields: Vec<FieldDescriptor>,
}

impl Default for CollectionDefaults {
    fn default() -> Self {
        Self {
            collection_type: DEFAULT_COLLECTION_TYPE.to_string(),
            fields: vec![
                FieldDescriptor::new("title", "text"),
                FieldDescriptor::new("payload", "json"),
            ],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Format: "json" or "pretty"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
}
