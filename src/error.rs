use crate::config::ConfigurationError;
use crate::mpt_http::MptError;
use crate::rql::RqlError;
use thiserror::Error;

/// Errors surfaced by the SDK's own entry points
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("RQL error: {0}")]
    Rql(#[from] RqlError),

    #[error("MPT API error: {0}")]
    Api(#[from] MptError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Event error: {0}")]
    Event(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl SdkError {
    pub fn event(message: impl Into<String>) -> Self {
        Self::Event(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
