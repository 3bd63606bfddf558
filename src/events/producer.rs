//! # Event Producers
//!
//! Producers poll the platform for work and feed the [`Dispatcher`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use super::types::{Event, EventType};
use crate::config::ExtensionConfig;
use crate::error::{Result, SdkError};
use crate::mpt_http::{api, MptClient};

/// Lifecycle shared by every producer
#[async_trait]
pub trait EventProducer: Send + Sync {
    /// Spawn the production loop
    fn start(&self) -> Result<()>;

    /// Stop the production loop and wait for it to exit
    async fn stop(&self);

    fn running(&self) -> bool;

    /// One production round; returns the number of events dispatched
    async fn produce_events(&self) -> usize;
}

struct ProducerState {
    client: Arc<MptClient>,
    dispatcher: Arc<Dispatcher>,
    product_ids: Vec<String>,
    polling_interval: Duration,
    running: AtomicBool,
    shutdown_notify: Notify,
}

/// Polls processing orders of the configured products and dispatches one
/// `orders` event per order
pub struct OrderEventProducer {
    state: Arc<ProducerState>,
    producer: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for OrderEventProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEventProducer")
            .field("product_ids", &self.state.product_ids)
            .field("polling_interval", &self.state.polling_interval)
            .field("running", &self.running())
            .finish()
    }
}

impl OrderEventProducer {
    pub fn new(
        client: Arc<MptClient>,
        dispatcher: Arc<Dispatcher>,
        product_ids: Vec<String>,
        polling_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(ProducerState {
                client,
                dispatcher,
                product_ids,
                polling_interval,
                running: AtomicBool::new(false),
                shutdown_notify: Notify::new(),
            }),
            producer: Mutex::new(None),
        }
    }

    /// Producer for the products and polling interval in `config`
    pub fn from_config(
        config: &ExtensionConfig,
        client: Arc<MptClient>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self::new(
            client,
            dispatcher,
            config.products_ids.clone(),
            config.polling_interval(),
        )
    }

    /// Processing orders, or an empty list when the platform cannot be reached
    pub async fn get_processing_orders(&self) -> Vec<Value> {
        self.state.get_processing_orders().await
    }
}

impl ProducerState {
    async fn get_processing_orders(&self) -> Vec<Value> {
        match api::get_processing_orders(&self.client, &self.product_ids).await {
            Ok(orders) => orders,
            Err(e) if e.status().is_some() => {
                warn!(status = ?e.status(), error = %e, "Order API error");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Cannot retrieve orders");
                Vec::new()
            }
        }
    }

    async fn produce_once(&self) -> usize {
        let orders = self.get_processing_orders().await;
        info!("{} orders found for processing...", orders.len());

        let mut dispatched = 0;
        for order in orders {
            let Some(id) = order.get("id").and_then(Value::as_str).map(str::to_string) else {
                warn!("Skipping order without an id");
                continue;
            };
            if self
                .dispatcher
                .dispatch_event(Event::new(id, EventType::Orders, order))
            {
                dispatched += 1;
            }
        }
        dispatched
    }

    async fn produce_events(self: Arc<Self>) {
        debug!("Order producer loop entered");

        while self.running.load(Ordering::Acquire) {
            self.produce_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.polling_interval) => {},
                _ = self.shutdown_notify.notified() => {
                    debug!("Shutdown notification received");
                    break;
                }
            }
        }

        debug!("Order producer loop exited");
    }
}

#[async_trait]
impl EventProducer for OrderEventProducer {
    fn start(&self) -> Result<()> {
        if self.state.running.swap(true, Ordering::AcqRel) {
            return Err(SdkError::event("Order producer is already running"));
        }

        let state = Arc::clone(&self.state);
        *self.producer.lock() = Some(tokio::spawn(state.produce_events()));

        info!(
            products = ?self.state.product_ids,
            polling_interval_secs = self.state.polling_interval.as_secs(),
            "Order event producer started"
        );
        Ok(())
    }

    async fn stop(&self) {
        if !self.state.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.state.shutdown_notify.notify_one();

        let handle = self.producer.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Order producer loop terminated abnormally");
            }
        }
        info!("Order event producer stopped");
    }

    fn running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    async fn produce_events(&self) -> usize {
        self.state.produce_once().await
    }
}
