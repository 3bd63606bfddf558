#![allow(clippy::doc_markdown)] // Allow technical terms like RQL, MPT in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # MPT Extension SDK
//!
//! Toolkit for building marketplace platform extensions: a typed builder for
//! RQL filter expressions, an authenticated REST client with retries and
//! pagination, and an event runtime that polls processing orders and routes
//! them to registered listeners.
//!
//! ## Module Organization
//!
//! - [`rql`] - RQL expression builder and encoder
//! - [`mpt_http`] - REST client, error mapping, pagination and endpoint helpers
//! - [`events`] - Listener registry, dispatcher and order producer
//! - [`flows`] - Order contexts and step pipelines
//! - [`runtime`] - Runtime entry point and extension variables
//! - [`integrations`] - Azure Key Vault secrets and Airtable error wrapping
//! - [`config`] - Layered configuration management
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mpt_extension_sdk::config::ConfigManager;
//! use mpt_extension_sdk::events::EventType;
//! use mpt_extension_sdk::flows::Context;
//! use mpt_extension_sdk::rql::RqlQuery;
//! use mpt_extension_sdk::{mpt_http::api, runtime, Extension};
//!
//! # async fn example() -> mpt_extension_sdk::Result<()> {
//! let manager = ConfigManager::load()?;
//!
//! let extension = Extension::new();
//! extension.listener(EventType::Orders, "process_order", |client, event| async move {
//!     let context = Context::new(event.data);
//!     let filter = RqlQuery::field("externalIds.vendor").eq("SUB-0001")?;
//!     let subscriptions = api::get_agreements_by_query(&client, &filter.to_string()).await?;
//!     tracing::info!(%context, found = subscriptions.len(), "processed");
//!     anyhow::Ok(())
//! });
//!
//! runtime::consume_events(extension, manager.config()).await
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod extension;
pub mod flows;
pub mod integrations;
pub mod logging;
pub mod mpt_http;
pub mod rql;
pub mod runtime;

pub use config::{ConfigManager, ExtensionConfig};
pub use error::{Result, SdkError};
pub use extension::Extension;
pub use mpt_http::{MptClient, MptError};
pub use rql::{FieldPath, RqlError, RqlQuery, RqlValue, R};
