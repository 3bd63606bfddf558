//! Error wrapping for Airtable API calls.
//!
//! Failed Airtable responses are classified the same way as platform ones: a
//! JSON body becomes [`AirTableError::Api`] with the message taken from
//! `error.message`, anything else becomes [`AirTableError::Http`] with the raw
//! body.

use reqwest::Response;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

pub type AirTableResult<T> = Result<T, AirTableError>;

#[derive(Debug, Error)]
pub enum AirTableError {
    /// Non-2xx response whose body is not JSON
    #[error("{status} - {content}")]
    Http { status: u16, content: String },

    /// Non-2xx response with a JSON body
    #[error("{code} - {message}")]
    Api {
        code: u16,
        message: String,
        payload: Value,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AirTableError {
    /// Classify a failed response body
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(payload) => Self::Api {
                code: status,
                message: payload
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                payload,
            },
            Err(_) => Self::Http {
                status,
                content: body.to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AirTableError::Http { status, .. } => Some(*status),
            AirTableError::Api { code, .. } => Some(*code),
            AirTableError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Pass a successful response through, turning any other status into an [`AirTableError`]
pub async fn check_response(response: Response) -> AirTableResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(AirTableError::from_response_body(status.as_u16(), &body))
}

/// Await an Airtable request and wrap its HTTP failures.
///
/// ```rust,no_run
/// use mpt_extension_sdk::integrations::airtable::wrap_http_error;
///
/// # async fn example() -> Result<(), mpt_extension_sdk::integrations::airtable::AirTableError> {
/// let http = reqwest::Client::new();
/// let response = wrap_http_error(
///     http.get("https://api.airtable.com/v0/appXXXX/Orders")
///         .bearer_auth("pat-token")
///         .send(),
/// )
/// .await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
pub async fn wrap_http_error<F>(request: F) -> AirTableResult<Response>
where
    F: Future<Output = reqwest::Result<Response>>,
{
    check_response(request.await?).await
}
