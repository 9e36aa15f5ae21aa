//! Configuration loading and credential resolution
//!
//! Credentials resolve with ENV → TOML priority. Resolution happens once at
//! startup, before any network call is attempted, and fails with a
//! descriptive error when no valid value is found in either source.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the catalog client id
pub const ENV_CLIENT_ID: &str = "TRACKMART_CLIENT_ID";
/// Environment variable holding the catalog client secret
pub const ENV_CLIENT_SECRET: &str = "TRACKMART_CLIENT_SECRET";

/// TOML configuration file schema (`~/.config/trackmart/config.toml`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Catalog API client id
    pub client_id: Option<String>,
    /// Catalog API client secret
    pub client_secret: Option<String>,
    /// Default two-letter market code for extraction runs
    pub market: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter, e.g. "info" or "trackmart_ingest=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Resolved catalog API credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trackmart").join("config.toml"))
}

/// Load the TOML config from `path`.
///
/// A missing file is not an error: extraction can be configured entirely
/// through the environment, so absence degrades to defaults.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve catalog API credentials from ENV → TOML.
///
/// Both halves of the credential pair must resolve; a missing half fails
/// fast so the error surfaces at startup rather than on the first request.
pub fn resolve_credentials(toml_config: &TomlConfig) -> Result<Credentials> {
    let client_id = resolve_value(
        "client id",
        ENV_CLIENT_ID,
        "client_id",
        toml_config.client_id.as_deref(),
    )?;
    let client_secret = resolve_value(
        "client secret",
        ENV_CLIENT_SECRET,
        "client_secret",
        toml_config.client_secret.as_deref(),
    )?;

    Ok(Credentials {
        client_id,
        client_secret,
    })
}

fn resolve_value(
    what: &str,
    env_var: &str,
    toml_key: &str,
    toml_value: Option<&str>,
) -> Result<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "Catalog {} found in both environment and TOML config. Using environment (highest priority).",
            what
        );
    }

    if let Some(value) = env_value {
        info!("Catalog {} loaded from environment variable", what);
        return Ok(value);
    }

    if let Some(value) = toml_value {
        info!("Catalog {} loaded from TOML config", what);
        return Ok(value);
    }

    Err(Error::Config(format!(
        "Catalog {} not configured. Please configure using one of:\n\
         1. Environment: {}=your-value-here\n\
         2. TOML config: ~/.config/trackmart/config.toml ({} = \"your-value\")\n\
         \n\
         Credentials are issued in the catalog provider's developer dashboard.",
        what, env_var, toml_key
    )))
}
