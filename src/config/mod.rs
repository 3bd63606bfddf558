//! # Extension Configuration
//!
//! Settings shared by the HTTP client, the event dispatcher and the order
//! producer. Values are layered by [`ConfigManager`]: built-in defaults, then an
//! optional TOML file, then `MPT_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mpt_extension_sdk::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let products = &manager.config().products_ids;
//! let interval = manager.config().polling_interval();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::defaults;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Accepts either a comma separated string (`PRD-1,PRD-2`) or a list of ids.
fn deserialize_products_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(split_products_ids(&s)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(D::Error::custom(format!(
                    "Product id must be a string, got {other}"
                ))),
            })
            .collect(),
        other => Err(D::Error::custom(format!(
            "products_ids must be a string or a list, got {other}"
        ))),
    }
}

/// Split a comma separated product id list, dropping blank entries
pub fn split_products_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Console output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Root configuration for an extension process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Platform API root, without the `/v1/` suffix
    pub api_base_url: String,
    pub api_token: String,
    /// Token for the operations client
    pub api_token_operations: String,
    #[serde(deserialize_with = "deserialize_products_ids")]
    pub products_ids: Vec<String>,
    pub orders_api_polling_interval_secs: u64,
    pub portal_base_url: String,
    /// Azure Key Vault holding extension secrets
    pub key_vault_name: String,
    pub http_timeout_ms: u64,
    pub http_max_retries: u32,
    pub http_backoff_factor_ms: u64,
    pub dispatcher_max_workers: usize,
    pub dispatcher_tick_ms: u64,
    pub log_format: LogFormat,
    /// Free-form extension settings, usually collected from `EXT_*` variables
    pub extension: HashMap<String, Value>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::API_BASE_URL.to_string(),
            api_token: defaults::API_TOKEN.to_string(),
            api_token_operations: defaults::API_TOKEN.to_string(),
            products_ids: split_products_ids(defaults::PRODUCTS_IDS),
            orders_api_polling_interval_secs: defaults::ORDERS_POLLING_INTERVAL_SECS,
            portal_base_url: defaults::PORTAL_BASE_URL.to_string(),
            key_vault_name: defaults::KEY_VAULT_NAME.to_string(),
            http_timeout_ms: defaults::HTTP_TIMEOUT_MS,
            http_max_retries: defaults::HTTP_MAX_RETRIES,
            http_backoff_factor_ms: defaults::HTTP_BACKOFF_FACTOR_MS,
            dispatcher_max_workers: defaults::DISPATCHER_MAX_WORKERS,
            dispatcher_tick_ms: defaults::DISPATCHER_TICK_MS,
            log_format: LogFormat::default(),
            extension: HashMap::new(),
        }
    }
}

impl ExtensionConfig {
    /// Versioned API root used by the platform clients, always ending in `/v1/`
    pub fn api_v1_url(&self) -> String {
        format!("{}/v1/", self.api_base_url.trim_end_matches('/'))
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.orders_api_polling_interval_secs)
    }

    pub fn dispatcher_tick(&self) -> Duration {
        Duration::from_millis(self.dispatcher_tick_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Look up a per-product entry of an extension setting.
    ///
    /// `EXT_WEBHOOKS_SECRETS={"PRD-1": "..."}` is read with
    /// `for_product("WEBHOOKS_SECRETS", "PRD-1")`.
    pub fn for_product(&self, key: &str, product_id: &str) -> Option<&Value> {
        self.extension.get(key)?.get(product_id)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "api_base_url",
                "extension configuration",
            ));
        }

        if url::Url::parse(&self.api_base_url).is_err() {
            return Err(ConfigurationError::invalid_value(
                "api_base_url",
                &self.api_base_url,
                "must be an absolute URL",
            ));
        }

        if self.api_token.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "api_token",
                "extension configuration",
            ));
        }

        if self.products_ids.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "products_ids",
                "extension configuration",
            ));
        }

        if self.orders_api_polling_interval_secs == 0 {
            return Err(ConfigurationError::invalid_value(
                "orders_api_polling_interval_secs",
                "0",
                "must be greater than 0",
            ));
        }

        if self.dispatcher_max_workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "dispatcher_max_workers",
                "0",
                "must be greater than 0",
            ));
        }

        if self.dispatcher_tick_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "dispatcher_tick_ms",
                "0",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}
