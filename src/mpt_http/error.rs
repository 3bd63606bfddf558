//! # MPT Error Types
//!
//! Maps failed platform calls into a single error enum. A non-2xx response with a
//! JSON body becomes [`MptError::Api`] carrying the problem-details payload; any
//! other non-2xx response becomes [`MptError::Http`] with the raw body.

use crate::rql::RqlError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for platform calls
pub type MptResult<T> = Result<T, MptError>;

/// Problem-details body returned by the platform on failure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    pub status: Option<Value>,
    pub title: Option<String>,
    pub detail: Option<String>,
    #[serde(rename = "traceId")]
    pub trace_id: Option<String>,
    pub errors: Option<Value>,
    /// Full body as received
    #[serde(skip)]
    pub raw: Value,
}

impl ApiErrorPayload {
    /// Build from a decoded JSON body, keeping the original document
    pub fn from_json(raw: Value) -> Self {
        let mut payload: ApiErrorPayload =
            serde_json::from_value(raw.clone()).unwrap_or_default();
        payload.raw = raw;
        payload
    }
}

fn display_or_none<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "None".to_string(), ToString::to_string)
}

impl fmt::Display for ApiErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &self.status {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "{} {} - {} ({})",
            status,
            display_or_none(self.title.as_ref()),
            display_or_none(self.detail.as_ref()),
            display_or_none(self.trace_id.as_ref()),
        )?;

        match &self.errors {
            Some(errors) if !is_blank(errors) => {
                let pretty = serde_json::to_string_pretty(errors).map_err(|_| fmt::Error)?;
                write!(f, "\n{pretty}")
            }
            _ => Ok(()),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Errors raised by the platform client and helpers
#[derive(Debug, Error)]
pub enum MptError {
    /// Non-2xx response whose body is not JSON
    #[error("{status} - {content}")]
    Http { status: u16, content: String },

    /// Non-2xx response with a JSON problem-details body
    #[error("{payload}")]
    Api { status: u16, payload: ApiErrorPayload },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid RQL filter: {0}")]
    Rql(#[from] RqlError),

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl MptError {
    /// Classify a failed response body
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(json) => Self::Api {
                status,
                payload: ApiErrorPayload::from_json(json),
            },
            Err(_) => Self::Http {
                status,
                content: body.to_string(),
            },
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status of the failed response, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            MptError::Http { status, .. } | MptError::Api { status, .. } => Some(*status),
            MptError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is recoverable (worth retrying)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            MptError::Transport(e) => e.is_timeout() || e.is_connect(),
            MptError::Http { status, .. } | MptError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Order-level validation error reported back to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub id: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub const fn new(id: &'static str, message: &'static str) -> Self {
        Self { id, message }
    }

    /// Render the message, replacing `{name}` placeholders with `args`
    pub fn format(&self, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.message.to_string(), |message, (name, value)| {
            message.replace(&format!("{{{name}}}"), value)
        })
    }

    /// `{"id": ..., "message": ...}` document as sent in status notes
    pub fn to_json(&self, args: &[(&str, &str)]) -> Value {
        serde_json::json!({
            "id": self.id,
            "message": self.format(args),
        })
    }
}

pub const ERR_EXT_UNHANDLED_EXCEPTION: ValidationError = ValidationError::new(
    "EXT001",
    "Order can't be processed. Failure reason: {error}",
);
