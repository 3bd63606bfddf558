//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and `MPT_*` environment
//! variables into an [`ExtensionConfig`] using the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::ExtensionConfig;
use crate::constants::{defaults, env_vars};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded, validated extension configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: ExtensionConfig,
    environment: String,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `MPT_CONFIG_PATH` (or the default file when present)
    /// and the process environment
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let explicit = env::var(env_vars::CONFIG_PATH).ok().map(PathBuf::from);
        let (path, required) = match explicit {
            Some(path) => (path, true),
            None => (PathBuf::from(defaults::CONFIG_PATH), false),
        };

        Self::load_with_sources(Some(&path), required, None)
    }

    /// Load configuration from a specific TOML file that must exist
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_sources(Some(path.as_ref()), true, None)
    }

    /// Load configuration from explicit sources.
    ///
    /// When `env_source` is given it replaces the process environment, which
    /// keeps tests independent of the variables set on the machine running them.
    pub fn load_with_sources(
        config_file: Option<&Path>,
        required: bool,
        env_source: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();

        let mut builder =
            Config::builder().add_source(Config::try_from(&ExtensionConfig::default())?);

        let mut loaded_file = None;
        if let Some(path) = config_file {
            if required && !path.is_file() {
                return Err(ConfigurationError::config_file_not_found(path));
            }
            if path.is_file() {
                debug!(path = %path.display(), "Loading configuration file");
                loaded_file = Some(path.to_path_buf());
            }
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(env_vars::PREFIX)
                .prefix_separator("_")
                .source(env_source),
        );

        let config: ExtensionConfig = builder.build()?.try_deserialize()?;

        config.validate()?;

        let sanitized = Self::sanitize_config_for_logging(&config);
        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&sanitized)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = %environment,
            api_base_url = %config.api_base_url,
            products = config.products_ids.len(),
            polling_interval_secs = config.orders_api_polling_interval_secs,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_file: loaded_file,
        }))
    }

    /// Wrap an already built configuration after validating it
    pub fn from_config(config: ExtensionConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            config_file: None,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    /// Configuration as JSON with tokens and secrets masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// File the configuration was read from, if any
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Current environment: `MPT_ENV`, then `APP_ENV`, then `development`
    pub fn detect_environment() -> String {
        env::var(env_vars::ENVIRONMENT)
            .or_else(|_| env::var(env_vars::APP_ENVIRONMENT))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn sanitize_config_for_logging(config: &ExtensionConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "key", "token", "credential", "auth"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        *val = Self::mask(val);
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }

    fn mask(value: &serde_json::Value) -> serde_json::Value {
        let masked = match value {
            serde_json::Value::String(s) if s.is_empty() => "[EMPTY]".to_string(),
            serde_json::Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                if chars.len() > 4 {
                    let head: String = chars[..2].iter().collect();
                    let tail: String = chars[chars.len() - 2..].iter().collect();
                    format!("[MASKED: {head}***{tail}]")
                } else {
                    "[MASKED: ***]".to_string()
                }
            }
            _ => "[MASKED]".to_string(),
        };
        serde_json::Value::String(masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_sources() {
        let manager = ConfigManager::load_with_sources(None, false, env(&[])).unwrap();
        assert_eq!(manager.config(), &ExtensionConfig::default());
        assert!(manager.config_file().is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let manager = ConfigManager::load_with_sources(
            None,
            false,
            env(&[
                ("MPT_API_BASE_URL", "https://api.example.com"),
                ("MPT_PRODUCTS_IDS", "PRD-1234-1,PRD-1234-2"),
                ("MPT_ORDERS_API_POLLING_INTERVAL_SECS", "30"),
                ("MPT_DISPATCHER_MAX_WORKERS", "4"),
            ]),
        )
        .unwrap();

        let config = manager.config();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.products_ids, vec!["PRD-1234-1", "PRD-1234-2"]);
        assert_eq!(config.orders_api_polling_interval_secs, 30);
        assert_eq!(config.dispatcher_max_workers, 4);
    }

    #[test]
    fn test_file_then_environment_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extension.toml");
        std::fs::write(
            &path,
            "api_token = \"file-token\"\nproducts_ids = [\"PRD-FILE\"]\nlog_format = \"json\"\n",
        )
        .unwrap();

        let manager = ConfigManager::load_with_sources(
            Some(&path),
            true,
            env(&[("MPT_API_TOKEN", "env-token")]),
        )
        .unwrap();

        assert_eq!(manager.config().api_token, "env-token");
        assert_eq!(manager.config().products_ids, vec!["PRD-FILE"]);
        assert_eq!(manager.config().log_format, super::super::LogFormat::Json);
        assert_eq!(manager.config_file(), Some(path.as_path()));
    }

    #[test]
    fn test_required_file_missing() {
        let result = ConfigManager::load_with_sources(
            Some(Path::new("/nonexistent/extension.toml")),
            true,
            env(&[]),
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = ConfigManager::load_with_sources(
            None,
            false,
            env(&[("MPT_DISPATCHER_TICK_MS", "0")]),
        );
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_debug_config_masks_tokens() {
        let config = ExtensionConfig {
            api_token: "idt:TKN-1234-5678".to_string(),
            ..Default::default()
        };
        let manager = ConfigManager::from_config(config).unwrap();
        let debug = manager.debug_config();

        assert_eq!(debug["api_token"], "[MASKED: id***78]");
        assert_eq!(debug["api_base_url"], "http://localhost:8000");
    }
}
