//! Commerce order endpoints.

use serde_json::{json, Value};
use tracing::debug;

use super::merge_fields;
use crate::constants::{order_statuses, DEFAULT_PAGE_LIMIT};
use crate::mpt_http::client::MptClient;
use crate::mpt_http::error::MptResult;
use crate::mpt_http::pagination::{paginated, Page};
use crate::rql::RqlQuery;

/// Related collections expanded on orders picked up for processing
pub const PROCESSING_ORDER_SELECT: &str =
    "audit,parameters,lines,subscriptions,subscriptions.lines,agreement,buyer,seller";

pub async fn get_order(client: &MptClient, order_id: &str) -> MptResult<Value> {
    client.get_json(&format!("/commerce/orders/{order_id}")).await
}

/// PUT arbitrary order fields
pub async fn update_order(client: &MptClient, order_id: &str, fields: &Value) -> MptResult<Value> {
    client
        .put_json(&format!("/commerce/orders/{order_id}"), fields)
        .await
}

/// Move the order to `Querying`
pub async fn query_order(client: &MptClient, order_id: &str, fields: &Value) -> MptResult<Value> {
    client
        .post_json(&format!("/commerce/orders/{order_id}/query"), fields)
        .await
}

/// Fail the order with `status_notes`; `extra` object fields are merged into the body
pub async fn fail_order(
    client: &MptClient,
    order_id: &str,
    status_notes: &Value,
    extra: &Value,
) -> MptResult<Value> {
    let body = merge_fields(json!({ "statusNotes": status_notes }), extra);
    client
        .post_json(&format!("/commerce/orders/{order_id}/fail"), &body)
        .await
}

/// Complete the order with the given template
pub async fn complete_order(
    client: &MptClient,
    order_id: &str,
    template: &Value,
    extra: &Value,
) -> MptResult<Value> {
    let body = merge_fields(json!({ "template": template }), extra);
    client
        .post_json(&format!("/commerce/orders/{order_id}/complete"), &body)
        .await
}

pub async fn set_processing_template(
    client: &MptClient,
    order_id: &str,
    template: &Value,
) -> MptResult<Value> {
    client
        .put_json(
            &format!("/commerce/orders/{order_id}"),
            &json!({ "template": template }),
        )
        .await
}

pub async fn get_rendered_template(client: &MptClient, order_id: &str) -> MptResult<Value> {
    client
        .get_json(&format!("/commerce/orders/{order_id}/template"))
        .await
}

pub async fn create_asset(client: &MptClient, order_id: &str, asset: &Value) -> MptResult<Value> {
    client
        .post_json(&format!("/commerce/orders/{order_id}/assets"), asset)
        .await
}

pub async fn update_asset(
    client: &MptClient,
    order_id: &str,
    asset_id: &str,
    fields: &Value,
) -> MptResult<Value> {
    client
        .put_json(
            &format!("/commerce/orders/{order_id}/assets/{asset_id}"),
            fields,
        )
        .await
}

pub async fn create_subscription(
    client: &MptClient,
    order_id: &str,
    subscription: &Value,
) -> MptResult<Value> {
    client
        .post_json(
            &format!("/commerce/orders/{order_id}/subscriptions"),
            subscription,
        )
        .await
}

pub async fn update_subscription(
    client: &MptClient,
    order_id: &str,
    subscription_id: &str,
    fields: &Value,
) -> MptResult<Value> {
    client
        .put_json(
            &format!("/commerce/orders/{order_id}/subscriptions/{subscription_id}"),
            fields,
        )
        .await
}

/// Order subscription whose vendor external id matches, if exactly one does
pub async fn get_order_subscription_by_external_id(
    client: &MptClient,
    order_id: &str,
    external_id: &str,
) -> MptResult<Option<Value>> {
    let filter = RqlQuery::n("externalIds").n("vendor").eq(external_id)?;
    let page: Page = client
        .get_json(&format!(
            "/commerce/orders/{order_id}/subscriptions?{filter}&limit=1"
        ))
        .await?;

    if page.meta.pagination.total == 1 {
        Ok(page.data.into_iter().next())
    } else {
        Ok(None)
    }
}

/// Filter selecting orders of `product_ids` waiting in `processing`
pub fn processing_orders_filter(product_ids: &[String]) -> MptResult<RqlQuery> {
    let by_product = RqlQuery::n("agreement")
        .n("product")
        .n("id")
        .in_(product_ids)?;
    let processing = RqlQuery::filter("status", order_statuses::PROCESSING)?;
    Ok(by_product & processing)
}

/// Every processing order of `product_ids`, oldest first
pub async fn get_processing_orders(
    client: &MptClient,
    product_ids: &[String],
) -> MptResult<Vec<Value>> {
    let filter = processing_orders_filter(product_ids)?;
    let url = format!(
        "/commerce/orders?{filter}&select={PROCESSING_ORDER_SELECT}&order=audit.created.at"
    );
    debug!(url = %url, "Fetching processing orders");
    paginated(client, &url, DEFAULT_PAGE_LIMIT).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_orders_filter() {
        let filter =
            processing_orders_filter(&["PRD-1".to_string(), "PRD-2".to_string()]).unwrap();
        assert_eq!(
            filter.to_string(),
            "and(in(agreement.product.id,(PRD-1,PRD-2)),eq(status,'processing'))"
        );
    }
}
