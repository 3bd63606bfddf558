//! # Events Registry
//!
//! Maps each [`EventType`] to the single listener that handles it. Registering
//! a second listener for the same type replaces the first.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::listener::EventListener;
use super::types::EventType;

#[derive(Default)]
pub struct EventsRegistry {
    listeners: RwLock<HashMap<EventType, Arc<dyn EventListener>>>,
}

impl std::fmt::Debug for EventsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventsRegistry")
            .field("registered_types", &self.registered_types())
            .finish()
    }
}

impl EventsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event_type`; last registration wins
    pub fn listener(&self, event_type: EventType, listener: Arc<dyn EventListener>) {
        let name = listener.listener_name().to_string();
        let replaced = self.listeners.write().insert(event_type, listener);

        if replaced.is_some() {
            warn!(event_type = %event_type, listener = %name, "Replacing registered listener");
        } else {
            debug!(event_type = %event_type, listener = %name, "Registered listener");
        }
    }

    pub fn get_listener(&self, event_type: EventType) -> Option<Arc<dyn EventListener>> {
        self.listeners.read().get(&event_type).cloned()
    }

    /// Registered types in declaration order
    pub fn registered_types(&self) -> Vec<EventType> {
        let listeners = self.listeners.read();
        EventType::ALL
            .into_iter()
            .filter(|event_type| listeners.contains_key(event_type))
            .collect()
    }

    pub fn is_event_supported(&self, event_type: EventType) -> bool {
        self.listeners.read().contains_key(&event_type)
    }
}
