//! Notification endpoints.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::mpt_http::client::MptClient;
use crate::mpt_http::error::{MptError, MptResult};
use crate::mpt_http::pagination::paginated;

// Webhook definitions are immutable for the life of a process.
static WEBHOOK_CACHE: OnceLock<DashMap<String, Value>> = OnceLock::new();

/// Webhook criteria, cached per API root and webhook id
pub async fn get_webhook(client: &MptClient, webhook_id: &str) -> MptResult<Value> {
    let cache = WEBHOOK_CACHE.get_or_init(DashMap::new);
    let cache_key = format!("{}{}", client.base_url(), webhook_id);

    if let Some(cached) = cache.get(&cache_key) {
        debug!(webhook_id = webhook_id, "Webhook served from cache");
        return Ok(cached.value().clone());
    }

    let webhook: Value = client
        .get_json(&format!(
            "/notifications/webhooks/{webhook_id}?select=criteria"
        ))
        .await?;
    cache.insert(cache_key, webhook.clone());
    Ok(webhook)
}

/// Message sent to every contact of a buyer in a notification category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub category_id: String,
    pub account_id: String,
    pub buyer_id: String,
    pub subject: String,
    pub body: String,
}

/// Send `notification` to all matching contacts, posting one batch per `limit` contacts
pub async fn notify(client: &MptClient, notification: &Notification, limit: u32) -> MptResult<()> {
    if limit == 0 {
        return Err(MptError::config("notification batch limit must be greater than 0"));
    }

    let contacts = paginated(
        client,
        &format!(
            "notifications/accounts/{}/categories/{}/contacts?select=id,-email,-name,-status,-user&filter(group.buyers.id,{})",
            notification.account_id, notification.category_id, notification.buyer_id
        ),
        limit,
    )
    .await?;

    for batch in contacts.chunks(limit as usize) {
        let response = client
            .post(
                "notifications/batches",
                &json!({
                    "category": {"id": notification.category_id},
                    "subject": notification.subject,
                    "body": notification.body,
                    "contacts": batch,
                    "buyer": {"id": notification.buyer_id},
                }),
            )
            .await?;
        MptClient::error_for_status(response).await?;
    }

    info!(
        category_id = %notification.category_id,
        buyer_id = %notification.buyer_id,
        contacts = contacts.len(),
        "Notification batches sent"
    );

    Ok(())
}
