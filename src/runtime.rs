//! # Extension Runtime
//!
//! Wires an [`Extension`] to the platform: one API client, one dispatcher and the
//! order producer, running until the process is asked to stop.
//!
//! ```rust,no_run
//! use mpt_extension_sdk::config::ConfigManager;
//! use mpt_extension_sdk::events::EventType;
//! use mpt_extension_sdk::{runtime, Extension};
//!
//! # async fn example() -> mpt_extension_sdk::Result<()> {
//! let manager = ConfigManager::load()?;
//! let extension = Extension::new();
//! extension.listener(EventType::Orders, "process_order", |_client, _event| async {
//!     anyhow::Ok(())
//! });
//! runtime::consume_events(extension, manager.config()).await
//! # }
//! ```

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use crate::config::{ConfigurationError, ExtensionConfig};
use crate::constants::env_vars;
use crate::error::{Result, SdkError};
use crate::events::{Dispatcher, DispatcherConfig, EventProducer, OrderEventProducer};
use crate::extension::Extension;
use crate::logging;
use crate::mpt_http::MptClient;

/// Run the event runtime until Ctrl+C or SIGTERM
pub async fn consume_events(extension: Extension, config: &ExtensionConfig) -> Result<()> {
    logging::init_structured_logging_with(config.log_format);
    consume_events_until(extension, config, shutdown_signal()).await
}

/// Run the event runtime until `shutdown` resolves.
///
/// The producer stops first so nothing new is queued, then the dispatcher.
pub async fn consume_events_until<F>(
    extension: Extension,
    config: &ExtensionConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    config.validate()?;

    if extension.events.registered_types().is_empty() {
        warn!("No event listeners registered - events will be dropped");
    }

    let client = Arc::new(MptClient::from_config(config)?);
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&extension.events),
        Arc::clone(&client),
        DispatcherConfig::from(config),
    ));
    let producer = OrderEventProducer::from_config(config, client, Arc::clone(&dispatcher));

    dispatcher.start()?;
    if let Err(e) = producer.start() {
        dispatcher.stop().await;
        return Err(e);
    }

    info!(
        products = ?config.products_ids,
        api = %config.api_base_url,
        "🚀 Extension runtime started"
    );

    let outcome = shutdown.await;

    info!("🛑 Shutdown requested, stopping event runtime");
    producer.stop().await;
    dispatcher.stop().await;
    info!("👋 Extension runtime stopped");

    outcome
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .map_err(|e| SdkError::runtime(format!("Failed to install Ctrl+C handler: {e}")))
    };

    #[cfg(unix)]
    let terminate = async {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(|e| SdkError::runtime(format!("Failed to install signal handler: {e}")))?;
        terminate.recv().await;
        Ok(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            info!("Received Ctrl+C");
            result
        },
        result = terminate => {
            info!("Received SIGTERM");
            result
        },
    }
}

/// Collect `EXT_*` process variables, keyed without the prefix.
///
/// Variables named in `json_keys` (full names, e.g. `EXT_WEBHOOKS_SECRETS`) are
/// decoded as JSON; the rest are kept as strings.
pub fn extension_variables<S: AsRef<str>>(
    json_keys: &[S],
) -> std::result::Result<HashMap<String, Value>, ConfigurationError> {
    extension_variables_from(std::env::vars(), json_keys)
}

/// [`extension_variables`] over an explicit set of variables
pub fn extension_variables_from<I, K, V, S>(
    vars: I,
    json_keys: &[S],
) -> std::result::Result<HashMap<String, Value>, ConfigurationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
    S: AsRef<str>,
{
    let mut variables = HashMap::new();

    for (name, raw) in vars {
        let name = name.as_ref();
        let Some(key) = name.strip_prefix(env_vars::EXTENSION_PREFIX) else {
            continue;
        };

        let value = if json_keys.iter().any(|json_key| json_key.as_ref() == name) {
            serde_json::from_str(raw.as_ref())
                .map_err(|e| ConfigurationError::invalid_extension_variable(name, e))?
        } else {
            Value::String(raw.as_ref().to_string())
        };

        variables.insert(key.to_string(), value);
    }

    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("EXT_WEBHOOKS_SECRETS", r#"{"PRD-1111-1111": "secret"}"#),
            ("EXT_EMAIL_NOTIFICATION_SENDER", "no-reply@example.com"),
            ("MPT_API_TOKEN", "token"),
        ]
    }

    #[test]
    fn test_collects_prefixed_variables_only() {
        let variables = extension_variables_from(vars(), &["EXT_WEBHOOKS_SECRETS"]).unwrap();

        assert_eq!(variables.len(), 2);
        assert_eq!(
            variables["WEBHOOKS_SECRETS"],
            json!({"PRD-1111-1111": "secret"})
        );
        assert_eq!(
            variables["EMAIL_NOTIFICATION_SENDER"],
            json!("no-reply@example.com")
        );
    }

    #[test]
    fn test_json_keys_are_not_decoded_unless_listed() {
        let variables = extension_variables_from(vars(), &[] as &[&str]).unwrap();
        assert_eq!(
            variables["WEBHOOKS_SECRETS"],
            json!(r#"{"PRD-1111-1111": "secret"}"#)
        );
    }

    #[test]
    fn test_malformed_json_variable() {
        let error = extension_variables_from(
            vec![("EXT_PRODUCT_SEGMENT", "{\"field_1\": ")],
            &env_vars::JSON_EXTENSION_VARIABLES,
        )
        .unwrap_err();

        assert!(error
            .to_string()
            .contains("Variable EXT_PRODUCT_SEGMENT not well formatted"));
    }
}
