//! Configuration resolution for snapsort-ic
//!
//! Provides multi-tier configuration resolution with ENV → TOML → default
//! priority. Host/port/config-path flags are handled by the binary's CLI.

use snapsort_common::config::{
    resolve_api_key, resolve_setting, TomlConfig, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_TIMEOUT_SECS,
};
use snapsort_common::Result;
use std::time::Duration;

use crate::services::{ClassifierConfig, RetryPolicy};

/// Inference-service credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "SNAPSORT_OPENAI_BASE_URL";
pub const MODEL_ENV: &str = "SNAPSORT_MODEL";

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub classifier: ClassifierConfig,
    pub retry_policy: RetryPolicy,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    /// Resolve from environment and TOML
    ///
    /// Fails when no usable API key is configured.
    pub fn resolve(toml_config: &TomlConfig) -> Result<Self> {
        toml_config.validate()?;

        let section = &toml_config.classifier;
        let api_key = resolve_api_key(API_KEY_ENV, toml_config)?;
        let base_url = resolve_setting(
            BASE_URL_ENV,
            section.base_url.as_deref(),
            DEFAULT_OPENAI_BASE_URL,
        );
        let model = resolve_setting(MODEL_ENV, section.model.as_deref(), DEFAULT_MODEL);
        let timeout = Duration::from_secs(section.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let classifier = ClassifierConfig::new(api_key)
            .with_base_url(base_url)
            .with_model(model)
            .with_timeout(timeout);

        let retry_policy = RetryPolicy::new(
            toml_config.retry.max_retries,
            Duration::from_millis(toml_config.retry.delay_ms),
        );

        Ok(Self {
            classifier,
            retry_policy,
            max_upload_bytes: toml_config.server.max_upload_bytes,
        })
    }
}
