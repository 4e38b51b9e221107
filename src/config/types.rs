//! Raw configuration types for TOML parsing

use super::*;
use serde::Deserialize;

/// Raw configuration as parsed from TOML
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub backend: Option<RawBackendConfig>,
    pub web: Option<RawWebConfig>,
    pub collections: Option<RawCollectionDefaults>,
    pub logging: Option<RawLoggingConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawBackendConfig {
    pub url: Option<String>,
    pub admin_identity: Option<String>,
    pub admin_password: Option<String>,
}

impl TryFrom<RawBackendConfig> for BackendConfig {
    type Error = ConfigError;

    fn try_from(raw: RawBackendConfig) -> Result<Self, Self::Error> {
        let url = match raw.url.as_deref() {
            Some(url) => parse_url(url)?,
            None => default_backend_url(),
        };

        let identity = raw
            .admin_identity
            .unwrap_or_else(|| DEFAULT_ADMIN_IDENTITY.to_string());
        if identity.is_empty() {
            return Err(ConfigError::Invalid(
                "backend.admin_identity cannot be empty".to_string(),
            ));
        }

        let password = raw
            .admin_password
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

        Ok(Self {
            url,
            admin: Credentials::new(identity, password),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawWebConfig {
    pub bind: Option<String>,
    pub static_dir: Option<String>,
}

impl From<RawWebConfig> for WebConfig {
    fn from(raw: RawWebConfig) -> Self {
        Self {
            bind: raw.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            static_dir: PathBuf::from(
                raw.static_dir
                    .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawCollectionDefaults {
    #[serde(rename = "type")]
    pub collection_type: Option<String>,
    pub default_fields: Option<Vec<FieldDescriptor>>,
}

impl From<RawCollectionDefaults> for CollectionDefaults {
    fn from(raw: RawCollectionDefaults) -> Self {
        let defaults = CollectionDefaults::default();
        Self {
            collection_type: raw.collection_type.unwrap_or(defaults.collection_type),
            fields: raw.default_fields.unwrap_or(defaults.fields),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl From<RawLoggingConfig> for LoggingConfig {
    fn from(raw: RawLoggingConfig) -> Self {
        Self {
            level: raw.level.unwrap_or_else(|| "info".to_string()),
            format: match raw.format.as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}
