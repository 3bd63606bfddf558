//! Commerce agreement and agreement-subscription endpoints.

use serde_json::{json, Value};

use super::data_of;
use crate::constants::DEFAULT_PAGE_LIMIT;
use crate::mpt_http::client::MptClient;
use crate::mpt_http::error::MptResult;
use crate::mpt_http::pagination::paginated;
use crate::rql::RqlQuery;

const AGREEMENT_SELECT: &str = "lines,parameters,subscriptions,product,listing";

pub async fn get_agreement(client: &MptClient, agreement_id: &str) -> MptResult<Value> {
    client
        .get_json(&format!(
            "/commerce/agreements/{agreement_id}?select=seller,buyer,listing,product,subscriptions"
        ))
        .await
}

pub async fn update_agreement(
    client: &MptClient,
    agreement_id: &str,
    fields: &Value,
) -> MptResult<Value> {
    client
        .put_json(&format!("/commerce/agreements/{agreement_id}"), fields)
        .await
}

pub async fn create_agreement(client: &MptClient, agreement: &Value) -> MptResult<Value> {
    client.post_json("/commerce/agreements", agreement).await
}

/// All agreements matching a raw query string (filter plus any `&select=`)
pub async fn get_agreements_by_query(client: &MptClient, query: &str) -> MptResult<Vec<Value>> {
    paginated(
        client,
        &format!("/commerce/agreements?{query}"),
        DEFAULT_PAGE_LIMIT,
    )
    .await
}

/// Active agreements among `ids`
pub async fn get_agreements_by_ids(client: &MptClient, ids: &[String]) -> MptResult<Vec<Value>> {
    let filter = RqlQuery::n("id").in_(ids)? & RqlQuery::n("status").eq("Active")?;
    get_agreements_by_query(client, &format!("{filter}&select={AGREEMENT_SELECT}")).await
}

/// Active agreements of any of `product_ids`
pub async fn get_all_agreements(
    client: &MptClient,
    product_ids: &[String],
) -> MptResult<Vec<Value>> {
    let filter =
        RqlQuery::n("status").eq("Active")? & RqlQuery::n("product").n("id").in_(product_ids)?;
    get_agreements_by_query(client, &format!("{filter}&select={AGREEMENT_SELECT}")).await
}

/// Agreements whose fulfillment parameter `external_id` has one of `display_values`
pub async fn get_agreements_by_external_id_values(
    client: &MptClient,
    external_id: &str,
    display_values: &[String],
) -> MptResult<Vec<Value>> {
    let parameter_filter = RqlQuery::n("externalId").eq(external_id)?
        & RqlQuery::n("displayValue").in_(display_values)?;
    get_agreements_by_query(
        client,
        &format!("any(parameters.fulfillment,{parameter_filter})&select={AGREEMENT_SELECT}"),
    )
    .await
}

pub async fn get_agreement_subscription(
    client: &MptClient,
    subscription_id: &str,
) -> MptResult<Value> {
    client
        .get_json(&format!("/commerce/subscriptions/{subscription_id}"))
        .await
}

pub async fn update_agreement_subscription(
    client: &MptClient,
    subscription_id: &str,
    fields: &Value,
) -> MptResult<Value> {
    client
        .put_json(&format!("/commerce/subscriptions/{subscription_id}"), fields)
        .await
}

pub async fn create_agreement_subscription(
    client: &MptClient,
    subscription: &Value,
) -> MptResult<Value> {
    client
        .post_json("/commerce/subscriptions", subscription)
        .await
}

/// Active or updating subscription of `agreement_id` with the given vendor id
pub async fn get_agreement_subscription_by_external_id(
    client: &MptClient,
    agreement_id: &str,
    external_id: &str,
) -> MptResult<Option<Value>> {
    let filter = RqlQuery::n("externalIds").n("vendor").eq(external_id)?
        & RqlQuery::n("agreement").n("id").eq(agreement_id)?
        & RqlQuery::n("status").in_(["Active", "Updating"])?;
    let data = data_of(
        client,
        &format!("/commerce/subscriptions?{filter}&select=agreement.id&limit=1"),
    )
    .await?;
    Ok(data.into_iter().next())
}

/// Terminate an agreement subscription, recording `reason` as its description
pub async fn terminate_subscription(
    client: &MptClient,
    subscription_id: &str,
    reason: &str,
) -> MptResult<Value> {
    client
        .post_json(
            &format!("/commerce/subscriptions/{subscription_id}/terminate"),
            &json!({ "description": reason }),
        )
        .await
}
