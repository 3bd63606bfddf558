//! The object an extension author builds and hands to the runtime.

use std::future::Future;
use std::sync::Arc;

use crate::events::{listener_fn, Event, EventListener, EventType, EventsRegistry};
use crate::mpt_http::MptClient;

/// Extension definition: the listeners it registers for platform events
///
/// ```rust
/// use mpt_extension_sdk::events::EventType;
/// use mpt_extension_sdk::Extension;
///
/// let extension = Extension::new();
/// extension.listener(EventType::Orders, "process_order", |_client, event| async move {
///     tracing::info!(order_id = %event.id, "processing");
///     anyhow::Ok(())
/// });
/// assert!(extension.events.is_event_supported(EventType::Orders));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extension {
    pub events: Arc<EventsRegistry>,
}

impl Extension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async closure as the listener for `event_type`
    pub fn listener<F, Fut>(&self, event_type: EventType, name: impl Into<String>, func: F)
    where
        F: Fn(Arc<MptClient>, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.events
            .listener(event_type, Arc::new(listener_fn(name, func)));
    }

    /// Register an existing [`EventListener`] implementation
    pub fn register(&self, event_type: EventType, listener: Arc<dyn EventListener>) {
        self.events.listener(event_type, listener);
    }
}
