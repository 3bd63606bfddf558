//! # Event Dispatcher
//!
//! Queues events produced by the polling producers and hands them to the
//! registered listeners on a bounded worker pool.
//!
//! ## Processing Guarantees
//!
//! - Events are processed in arrival order, oldest first
//! - At most one event per `(type, id)` is in flight; a duplicate waits in the
//!   queue until the running one completes
//! - Listener failures and panics are logged and never stop the loop

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

use super::registry::EventsRegistry;
use super::types::{Event, EventKey};
use crate::config::ExtensionConfig;
use crate::constants::defaults;
use crate::error::{Result, SdkError};
use crate::logging::{log_error, log_event_operation};
use crate::mpt_http::MptClient;

/// Worker pool and loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Listeners running concurrently
    pub max_workers: usize,
    /// Pause between queue drains
    pub tick: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_workers: defaults::DISPATCHER_MAX_WORKERS,
            tick: Duration::from_millis(defaults::DISPATCHER_TICK_MS),
        }
    }
}

impl From<&ExtensionConfig> for DispatcherConfig {
    fn from(config: &ExtensionConfig) -> Self {
        Self {
            max_workers: config.dispatcher_max_workers.max(1),
            tick: config.dispatcher_tick(),
        }
    }
}

struct DispatcherState {
    registry: Arc<EventsRegistry>,
    client: Arc<MptClient>,
    config: DispatcherConfig,
    queue: Mutex<VecDeque<Event>>,
    in_flight: DashMap<EventKey, ()>,
    workers: Arc<Semaphore>,
    running: AtomicBool,
    shutdown_notify: Notify,
}

/// Routes queued events to their listeners
pub struct Dispatcher {
    state: Arc<DispatcherState>,
    processor: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.state.config)
            .field("running", &self.running())
            .field("queue_len", &self.queue_len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        registry: Arc<EventsRegistry>,
        client: Arc<MptClient>,
        config: DispatcherConfig,
    ) -> Self {
        let max_workers = config.max_workers.max(1);
        Self {
            state: Arc::new(DispatcherState {
                registry,
                client,
                config: DispatcherConfig {
                    max_workers,
                    ..config
                },
                queue: Mutex::new(VecDeque::new()),
                in_flight: DashMap::new(),
                workers: Arc::new(Semaphore::new(max_workers)),
                running: AtomicBool::new(false),
                shutdown_notify: Notify::new(),
            }),
            processor: Mutex::new(None),
        }
    }

    /// Spawn the processing loop on the current tokio runtime
    pub fn start(&self) -> Result<()> {
        if self.state.running.swap(true, Ordering::AcqRel) {
            return Err(SdkError::event("Dispatcher is already running"));
        }

        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move { state.process_events().await });
        *self.processor.lock() = Some(handle);

        info!(
            max_workers = self.state.config.max_workers,
            tick_ms = self.state.config.tick.as_millis() as u64,
            "Event dispatcher started"
        );
        Ok(())
    }

    /// Stop the processing loop and wait for it to exit.
    ///
    /// Listeners already running keep running; see [`Dispatcher::wait_idle`].
    pub async fn stop(&self) {
        if !self.state.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.state.shutdown_notify.notify_one();

        let handle = self.processor.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Dispatcher loop terminated abnormally");
            }
        }
        info!(pending = self.queue_len(), "Event dispatcher stopped");
    }

    pub fn running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Queue `event` if a listener handles its type; returns whether it was accepted
    pub fn dispatch_event(&self, event: Event) -> bool {
        if !self.state.registry.is_event_supported(event.event_type) {
            debug!(
                event_type = %event.event_type,
                event_id = %event.id,
                "No listener registered, event dropped"
            );
            return false;
        }

        info!(
            "event of type {} with id {} accepted",
            event.event_type, event.id
        );
        self.state.queue.lock().push_back(event);
        true
    }

    /// Events waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.state.queue.lock().len()
    }

    /// Events currently being handled by a listener
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.len()
    }

    /// Wait until the queue is empty and no listener is running.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.queue_len() > 0 || self.in_flight() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .is_ok()
    }
}

impl DispatcherState {
    async fn process_events(self: Arc<Self>) {
        debug!("Dispatcher loop entered");

        while self.running.load(Ordering::Acquire) {
            self.drain_queue();

            tokio::select! {
                _ = tokio::time::sleep(self.config.tick) => {},
                _ = self.shutdown_notify.notified() => {
                    debug!("Shutdown notification received");
                    break;
                }
            }
        }

        debug!("Dispatcher loop exited");
    }

    // The queue lock is held until every drained event is either in flight or
    // re-queued, so observers never see an event in neither place.
    fn drain_queue(self: &Arc<Self>) {
        let mut queue = self.queue.lock();
        let pending: Vec<Event> = queue.drain(..).collect();
        let mut skipped = Vec::new();

        for event in pending {
            debug!(
                "got event of type {} ({}) from queue...",
                event.event_type, event.id
            );

            let key = event.key();
            if self.in_flight.contains_key(&key) {
                info!(
                    "An event for ({}, {}) is already processing, skip it",
                    event.event_type, event.id
                );
                skipped.push(event);
                continue;
            }

            self.in_flight.insert(key.clone(), ());
            self.spawn_listener(key, event);
        }

        queue.extend(skipped);
    }

    fn spawn_listener(self: &Arc<Self>, key: EventKey, event: Event) {
        let state = Arc::clone(self);

        tokio::spawn(async move {
            let permit = match Arc::clone(&state.workers).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    state.in_flight.remove(&key);
                    return;
                }
            };

            let Some(listener) = state.registry.get_listener(event.event_type) else {
                state.in_flight.remove(&key);
                return;
            };

            let span = info_span!(
                "event_listener",
                name = %format!("Event {} for {}", event.event_type, event.id),
                order.id = %event.id,
            );
            let client = Arc::clone(&state.client);
            let event_type = event.event_type;
            let event_id = event.id.clone();

            // Run the listener in its own task so a panic is reported, not propagated
            let outcome =
                tokio::spawn(async move { listener.on_event(client, event).await }.instrument(span))
                    .await;

            state.in_flight.remove(&key);
            drop(permit);

            match outcome {
                Ok(Ok(())) => {
                    debug!(
                        "Future for ({}, {}) has been completed successfully",
                        event_type, event_id
                    );
                    log_event_operation(
                        "listener",
                        event_type.as_str(),
                        &event_id,
                        "completed",
                        None,
                    );
                }
                Ok(Err(e)) => {
                    error!("Future for ({}, {}) has failed: {:#}", event_type, event_id, e);
                    log_error(
                        "dispatcher",
                        "listener",
                        &format!("{e:#}"),
                        Some(&format!("{event_type}:{event_id}")),
                    );
                }
                Err(join_error) => {
                    error!(
                        "Future for ({}, {}) has failed: {}",
                        event_type, event_id, join_error
                    );
                    log_error(
                        "dispatcher",
                        "listener",
                        &join_error.to_string(),
                        Some(&format!("{event_type}:{event_id}")),
                    );
                }
            }
        });
    }
}
