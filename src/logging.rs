//! # Structured Logging Module
//!
//! Environment-aware structured logging for the event runtime. Console output is
//! either human readable or JSON lines, selected by [`LogFormat`].

use chrono::Utc;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigManager, LogFormat};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging, reading the format from `MPT_LOG_FORMAT`
pub fn init_structured_logging() {
    let format = match std::env::var("MPT_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    init_structured_logging_with(format);
}

/// Initialize structured logging with an explicit console format.
///
/// Only the first call installs a subscriber; `RUST_LOG` overrides the
/// per-environment level.
pub fn init_structured_logging_with(format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let console = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .boxed(),
        };

        // A host application may already own the global subscriber
        if tracing_subscriber::registry()
            .with(console.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            format = ?format,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

fn get_environment() -> String {
    ConfigManager::detect_environment()
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for event processing
pub fn log_event_operation(
    operation: &str,
    event_type: &str,
    event_id: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        event_type = %event_type,
        event_id = %event_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 EVENT_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
