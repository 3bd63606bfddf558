//! # Azure Key Vault
//!
//! Secret access through the Key Vault REST API at
//! `https://{name}.vault.azure.net/`. Requests carry an Azure AD bearer token
//! issued for the `https://vault.azure.net` resource; obtaining that token is
//! left to the caller.
//!
//! A missing secret on read, or any HTTP failure on write, is logged and
//! reported as `None`. Transport failures are returned as errors.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ExtensionConfig;
use crate::constants::{defaults, USER_AGENT};

/// Key Vault REST API version used for secret operations
pub const API_VERSION: &str = "7.4";

pub type KeyVaultResult<T> = Result<T, KeyVaultError>;

#[derive(Debug, Error)]
pub enum KeyVaultError {
    #[error("Secret '{secret}' not found in Key Vault '{vault}'")]
    SecretNotFound { vault: String, secret: String },

    #[error("Key Vault '{vault}' responded {status}: {content}")]
    Http {
        vault: String,
        status: u16,
        content: String,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid Key Vault URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Deserialize)]
struct SecretBundle {
    value: String,
}

/// Client for one Azure Key Vault
#[derive(Clone)]
pub struct KeyVault {
    name: String,
    vault_url: Url,
    access_token: String,
    http: Client,
}

impl std::fmt::Debug for KeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVault")
            .field("name", &self.name)
            .field("vault_url", &self.vault_url.as_str())
            .field("access_token", &"[MASKED]")
            .finish()
    }
}

impl KeyVault {
    /// Client for the vault called `name` in the public Azure cloud
    pub fn new(name: impl Into<String>, access_token: impl Into<String>) -> KeyVaultResult<Self> {
        let name = name.into();
        let vault_url = format!("https://{name}.vault.azure.net/");
        Self::with_vault_url(name, vault_url, access_token)
    }

    /// Client for the vault named by `key_vault_name` in the extension configuration
    pub fn from_config(
        config: &ExtensionConfig,
        access_token: impl Into<String>,
    ) -> KeyVaultResult<Self> {
        Self::new(config.key_vault_name.clone(), access_token)
    }

    /// Client for a vault served from an explicit URL
    pub fn with_vault_url(
        name: impl Into<String>,
        vault_url: impl AsRef<str>,
        access_token: impl Into<String>,
    ) -> KeyVaultResult<Self> {
        let raw = vault_url.as_ref();
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let vault_url = Url::parse(&normalized).map_err(|e| KeyVaultError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(defaults::HTTP_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            name: name.into(),
            vault_url,
            access_token: access_token.into(),
            http,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vault_url(&self) -> &str {
        self.vault_url.as_str()
    }

    /// Read the current value of `secret_name`
    pub async fn get_secret(&self, secret_name: &str) -> KeyVaultResult<Option<String>> {
        match self.fetch_secret(secret_name).await {
            Ok(value) => Ok(Some(value)),
            Err(e @ KeyVaultError::SecretNotFound { .. }) => {
                error!(
                    secret = secret_name,
                    key_vault = %self.name,
                    error = %e,
                    "Secret not found in Key Vault"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Store `secret_value` under `secret_name` and return the value read back
    pub async fn set_secret(
        &self,
        secret_name: &str,
        secret_value: &str,
    ) -> KeyVaultResult<Option<String>> {
        match self.store_and_read(secret_name, secret_value).await {
            Ok(value) => Ok(Some(value)),
            Err(e @ (KeyVaultError::SecretNotFound { .. } | KeyVaultError::Http { .. })) => {
                error!(
                    secret = secret_name,
                    key_vault = %self.name,
                    error = %e,
                    "Failed to set secret in Key Vault"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn store_and_read(&self, secret_name: &str, secret_value: &str) -> KeyVaultResult<String> {
        let response = self
            .http
            .put(self.secret_url(secret_name)?)
            .bearer_auth(&self.access_token)
            .json(&json!({ "value": secret_value }))
            .send()
            .await?;
        self.check(secret_name, response).await?;
        debug!(secret = secret_name, key_vault = %self.name, "Secret stored");

        self.fetch_secret(secret_name).await
    }

    async fn fetch_secret(&self, secret_name: &str) -> KeyVaultResult<String> {
        let response = self
            .http
            .get(self.secret_url(secret_name)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let bundle: SecretBundle = self.check(secret_name, response).await?.json().await?;
        Ok(bundle.value)
    }

    async fn check(
        &self,
        secret_name: &str,
        response: reqwest::Response,
    ) -> KeyVaultResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(KeyVaultError::SecretNotFound {
                vault: self.name.clone(),
                secret: secret_name.to_string(),
            });
        }

        Err(KeyVaultError::Http {
            vault: self.name.clone(),
            status: status.as_u16(),
            content: response.text().await.unwrap_or_default(),
        })
    }

    fn secret_url(&self, secret_name: &str) -> KeyVaultResult<Url> {
        let mut url = self
            .vault_url
            .join(&format!("secrets/{secret_name}"))
            .map_err(|e| KeyVaultError::InvalidUrl {
                url: format!("{}secrets/{secret_name}", self.vault_url),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_url_from_name() {
        let vault = KeyVault::new("test-key-vault-name", "token").unwrap();
        assert_eq!(vault.name(), "test-key-vault-name");
        assert_eq!(vault.vault_url(), "https://test-key-vault-name.vault.azure.net/");
    }

    #[test]
    fn test_from_config_uses_key_vault_name() {
        let config = ExtensionConfig::default();
        let vault = KeyVault::from_config(&config, "token").unwrap();
        assert_eq!(vault.vault_url(), "https://mpt-key-vault.vault.azure.net/");
    }

    #[test]
    fn test_secret_url_carries_api_version() {
        let vault = KeyVault::with_vault_url("kv", "http://localhost:8200", "token").unwrap();
        assert_eq!(
            vault.secret_url("db-password").unwrap().as_str(),
            "http://localhost:8200/secrets/db-password?api-version=7.4"
        );
    }

    #[test]
    fn test_debug_masks_token() {
        let vault = KeyVault::new("kv", "super-secret-token").unwrap();
        let rendered = format!("{vault:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("[MASKED]"));
    }

    #[test]
    fn test_invalid_vault_url() {
        let error = KeyVault::with_vault_url("kv", "not a url", "token").unwrap_err();
        assert!(matches!(error, KeyVaultError::InvalidUrl { .. }));
    }
}
