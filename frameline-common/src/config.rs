//! Configuration loading and data folder resolution
//!
//! Data folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! The payment gateway secret is deliberately excluded from the fallback
//! chain's leniency: a missing secret is a fatal configuration error, never
//! a silent skip, so signature checking can never fail open.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the data folder
pub const DATA_DIR_ENV: &str = "FRAMELINE_DATA_DIR";
/// Environment variable holding the gateway key id
pub const GATEWAY_KEY_ID_ENV: &str = "FRAMELINE_GATEWAY_KEY_ID";
/// Environment variable holding the gateway shared secret
pub const GATEWAY_SECRET_ENV: &str = "FRAMELINE_GATEWAY_SECRET";

/// Optional on-disk configuration file (`frameline.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data folder holding the SQLite store
    pub data_dir: Option<PathBuf>,
    /// Payment gateway settings
    #[serde(default)]
    pub gateway: GatewayToml,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayToml {
    pub key_id: Option<String>,
    pub secret: Option<String>,
    /// Base URL of the order-creation endpoint
    pub base_url: Option<String>,
}

/// Fully resolved gateway credentials
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub secret: String,
    pub base_url: String,
}

/// Resolve the data folder following the documented priority order.
pub fn resolve_data_dir(cli_arg: Option<&Path>, toml: Option<&TomlConfig>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(path);
    }
    if let Some(dir) = toml.and_then(|c| c.data_dir.clone()) {
        return dir;
    }
    default_data_dir()
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("frameline"))
        .unwrap_or_else(|| PathBuf::from("./frameline_data"))
}

/// Load `frameline.toml` from the platform config directory, if present.
///
/// A missing or unreadable file is not an error; startup degrades to
/// environment variables and defaults.
pub fn load_toml_config() -> Option<TomlConfig> {
    let path = dirs::config_dir()?.join("frameline").join("frameline.toml");
    let content = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
            None
        }
    }
}

/// Resolve gateway credentials from environment variables, falling back to
/// the TOML config. Missing key id or secret is fatal.
pub fn resolve_gateway_config(toml: Option<&TomlConfig>) -> Result<GatewayConfig> {
    let key_id = std::env::var(GATEWAY_KEY_ID_ENV)
        .ok()
        .or_else(|| toml.and_then(|c| c.gateway.key_id.clone()))
        .ok_or_else(|| Error::Config("payment gateway key id is not configured".to_string()))?;

    let secret = std::env::var(GATEWAY_SECRET_ENV)
        .ok()
        .or_else(|| toml.and_then(|c| c.gateway.secret.clone()))
        .ok_or_else(|| Error::Config("payment gateway secret is not configured".to_string()))?;

    if secret.trim().is_empty() {
        return Err(Error::Config(
            "payment gateway secret is empty".to_string(),
        ));
    }

    let base_url = toml
        .and_then(|c| c.gateway.base_url.clone())
        .unwrap_or_else(|| "https://api.razorpay.com/v1".to_string());

    Ok(GatewayConfig {
        key_id,
        secret,
        base_url,
    })
}

/// Database file path inside the data folder
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("frameline.db")
}
