//! # Platform API Helpers
//!
//! Thin async wrappers over the commerce, catalog, accounts and notifications
//! endpoints. Every helper resolves paths through [`MptClient`], maps failures
//! into [`MptError`](super::MptError) and returns the decoded JSON document.
//!
//! Filters are composed with the [`RqlQuery`](crate::rql::RqlQuery) builder.

pub mod accounts;
pub mod agreements;
pub mod catalog;
pub mod notifications;
pub mod orders;

pub use accounts::{get_buyer, get_licensee};
pub use agreements::{
    create_agreement, create_agreement_subscription, get_agreement, get_agreement_subscription,
    get_agreement_subscription_by_external_id, get_agreements_by_external_id_values,
    get_agreements_by_ids, get_agreements_by_query, get_all_agreements, terminate_subscription,
    update_agreement, update_agreement_subscription,
};
pub use catalog::{
    create_listing, get_authorizations_by_currency_and_seller_id, get_listing_by_id,
    get_listings_by_price_list_and_seller_and_authorization, get_price_lists_by_currency,
    get_product_items_by_period, get_product_items_by_skus, get_product_onetime_items_by_ids,
    get_product_template_or_default, get_template_by_name,
};
pub use notifications::{get_webhook, notify, Notification};
pub use orders::{
    complete_order, create_asset, create_subscription, fail_order, get_order,
    get_order_subscription_by_external_id, get_processing_orders, get_rendered_template,
    query_order, set_processing_template, update_asset, update_order, update_subscription,
};

use serde_json::Value;

use super::client::MptClient;
use super::error::{MptError, MptResult};
use super::pagination::Page;

/// Merge `extra` object fields into `body`; non-object `extra` is ignored
pub(crate) fn merge_fields(mut body: Value, extra: &Value) -> Value {
    if let (Value::Object(target), Value::Object(source)) = (&mut body, extra) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    body
}

/// GET a collection page and return the first record
pub(crate) async fn first_of(client: &MptClient, url: &str, resource: &str) -> MptResult<Value> {
    let page: Page = client.get_json(url).await?;
    page.data
        .into_iter()
        .next()
        .ok_or_else(|| MptError::not_found(resource, url))
}

/// GET a collection page and return its `data` array
pub(crate) async fn data_of(client: &MptClient, url: &str) -> MptResult<Vec<Value>> {
    let page: Page = client.get_json(url).await?;
    Ok(page.data)
}
