//! # Event Runtime
//!
//! Listener registration, the queueing dispatcher and the polling producers
//! that feed it.
//!
//! ## Flow
//!
//! ```text
//! OrderEventProducer --dispatch_event--> Dispatcher --on_event--> EventListener
//!        |                                   |
//!   polls /commerce/orders          one in-flight event per (type, id)
//! ```

pub mod dispatcher;
pub mod listener;
pub mod producer;
pub mod registry;
pub mod types;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use listener::{listener_fn, EventListener, FnListener};
pub use producer::{EventProducer, OrderEventProducer};
pub use registry::EventsRegistry;
pub use types::{Event, EventKey, EventType};
