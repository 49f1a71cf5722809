//! Configuration loading and credential resolution
//!
//! Services resolve settings in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `<config_dir>/snapsort/<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub classifier: ClassifierSection,
    pub retry: RetrySection,
    pub server: ServerSection,
    pub logging: LoggingConfig,
}

/// `[classifier]` table: remote inference service settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[retry]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    /// Total attempts per classification (must be >= 1)
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// `[server]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub max_upload_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when RUST_LOG is not set (e.g. "info", "debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl TomlConfig {
    /// Reject values no service can run with
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_retries == 0 {
            return Err(Error::Config(
                "retry.max_retries must be at least 1".to_string(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config file location for a module
///
/// e.g. `~/.config/snapsort/snapsort-ic.toml` on Linux
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("snapsort").join(format!("{}.toml", module_name)))
}

/// Read and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the inference-service API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(env_var_name: &str, toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(env_var_name)
        .ok()
        .filter(|key| is_valid_key(key));
    let toml_key = toml_config
        .classifier
        .api_key
        .as_ref()
        .filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API key found in both environment ({}) and TOML config. Using environment (highest priority).",
            env_var_name
        );
    }

    if let Some(key) = env_key {
        info!(key_len = key.len(), "API key loaded from environment variable");
        return Ok(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!(key_len = key.len(), "API key loaded from TOML config");
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(format!(
        "Inference service API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: [classifier] api_key = \"your-key\"",
        env_var_name
    )))
}

/// Resolve a string setting: ENV → TOML → compiled default
///
/// Blank values are treated as unset.
pub fn resolve_setting(env_var_name: &str, toml_value: Option<&str>, default: &str) -> String {
    std::env::var(env_var_name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            toml_value
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| default.to_string())
}
