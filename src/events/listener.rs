//! Listener trait and closure adapter.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::types::Event;
use crate::mpt_http::MptClient;

/// Handles events of the types it is registered for
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Process one event. Errors are logged by the dispatcher and never stop it.
    async fn on_event(&self, client: Arc<MptClient>, event: Event) -> anyhow::Result<()>;

    /// Listener name for identification in logs
    fn listener_name(&self) -> &str {
        "unnamed_listener"
    }
}

/// Listener backed by an async closure
pub struct FnListener<F> {
    name: String,
    func: F,
}

impl<F> std::fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .field("func", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl<F, Fut> EventListener for FnListener<F>
where
    F: Fn(Arc<MptClient>, Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_event(&self, client: Arc<MptClient>, event: Event) -> anyhow::Result<()> {
        (self.func)(client, event).await
    }

    fn listener_name(&self) -> &str {
        &self.name
    }
}

/// Wrap an async closure as an [`EventListener`]
///
/// ```rust
/// use mpt_extension_sdk::events::{listener_fn, EventListener};
///
/// let listener = listener_fn("process_order", |_client, event| async move {
///     println!("processing {}", event.id);
///     anyhow::Ok(())
/// });
/// assert_eq!(listener.listener_name(), "process_order");
/// ```
pub fn listener_fn<F, Fut>(name: impl Into<String>, func: F) -> FnListener<F>
where
    F: Fn(Arc<MptClient>, Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnListener {
        name: name.into(),
        func,
    }
}
