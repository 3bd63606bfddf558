//! # Step Pipelines
//!
//! A [`Pipeline`] runs its [`Step`]s in order. Each step receives a [`Next`]
//! handle for the remainder of the pipeline: calling [`Next::run`] continues,
//! returning without calling it ends the pipeline early.
//!
//! ```rust
//! use async_trait::async_trait;
//! use mpt_extension_sdk::flows::{Context, Next, Pipeline, Step};
//! use mpt_extension_sdk::mpt_http::{MptClient, MptClientConfig};
//!
//! struct SkipTerminations;
//!
//! #[async_trait]
//! impl Step<Context> for SkipTerminations {
//!     async fn call(
//!         &self,
//!         client: &MptClient,
//!         context: &mut Context,
//!         next: Next<'_, Context>,
//!     ) -> anyhow::Result<()> {
//!         if context.is_termination_order() {
//!             return Ok(());
//!         }
//!         next.run(client, context).await
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let client = MptClient::new(MptClientConfig::new("http://localhost:8000/v1/", "token"))?;
//! let steps: Vec<Box<dyn Step<Context>>> = vec![Box::new(SkipTerminations)];
//! let pipeline = Pipeline::new(steps);
//!
//! let mut context = Context::new(serde_json::json!({"id": "ORD-1", "type": "Termination"}));
//! pipeline.run(&client, &mut context).await?;
//! # anyhow::Ok(())
//! # }).unwrap();
//! ```

use async_trait::async_trait;

use crate::mpt_http::MptClient;

/// One unit of order processing
#[async_trait]
pub trait Step<C: Send>: Send + Sync {
    async fn call(&self, client: &MptClient, context: &mut C, next: Next<'_, C>)
        -> anyhow::Result<()>;

    /// Step name for identification in logs
    fn step_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Remaining steps of a running pipeline
pub struct Next<'a, C> {
    steps: &'a [Box<dyn Step<C>>],
}

impl<'a, C: Send> Next<'a, C> {
    /// Run the remaining steps
    pub async fn run(self, client: &MptClient, context: &mut C) -> anyhow::Result<()> {
        match self.steps.split_first() {
            Some((step, rest)) => {
                tracing::debug!(step = step.step_name(), "Running pipeline step");
                step.call(client, context, Next { steps: rest }).await
            }
            None => Ok(()),
        }
    }

    /// Steps left after the current one
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

type ErrorHandler<C> = Box<dyn Fn(anyhow::Error, &mut C) -> anyhow::Result<()> + Send + Sync>;

/// Ordered chain of steps sharing one mutable context
pub struct Pipeline<C> {
    steps: Vec<Box<dyn Step<C>>>,
    error_handler: Option<ErrorHandler<C>>,
}

impl<C> std::fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.len())
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

impl<C: Send> Pipeline<C> {
    pub fn new(steps: Vec<Box<dyn Step<C>>>) -> Self {
        Self {
            steps,
            error_handler: None,
        }
    }

    /// Route step errors through `handler` instead of returning them
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(anyhow::Error, &mut C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn run(&self, client: &MptClient, context: &mut C) -> anyhow::Result<()> {
        let next = Next { steps: &self.steps };
        tracing::debug!(steps = next.remaining(), "Running pipeline");
        let result = next.run(client, context).await;

        match (result, &self.error_handler) {
            (Err(error), Some(handler)) => handler(error, context),
            (result, _) => result,
        }
    }
}
