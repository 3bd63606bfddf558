use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::constants::order_types;

/// Order being processed by a pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Context {
    pub order: Value,
}

impl Context {
    pub fn new(order: Value) -> Self {
        Self { order }
    }

    /// Copy of another context's order data
    pub fn from_context(context: &Context) -> Self {
        context.clone()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order.get("id").and_then(Value::as_str)
    }

    pub fn order_type(&self) -> Option<&str> {
        self.order.get("type").and_then(Value::as_str)
    }

    pub fn product_id(&self) -> Option<&str> {
        self.order
            .get("product")
            .and_then(|product| product.get("id"))
            .and_then(Value::as_str)
    }

    pub fn is_purchase_order(&self) -> bool {
        self.order_type() == Some(order_types::PURCHASE)
    }

    pub fn is_change_order(&self) -> bool {
        self.order_type() == Some(order_types::CHANGE)
    }

    pub fn is_termination_order(&self) -> bool {
        self.order_type() == Some(order_types::TERMINATION)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context: {} {}",
            self.order_id().unwrap_or("None"),
            self.order_type().unwrap_or("None")
        )
    }
}

/// One context per order, in order
pub fn setup_contexts(orders: impl IntoIterator<Item = Value>) -> Vec<Context> {
    orders.into_iter().map(Context::new).collect()
}
