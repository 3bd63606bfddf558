//! Catalog endpoints: items, templates, listings, price lists and authorizations.

use serde_json::Value;

use super::{data_of, first_of};
use crate::constants::DEFAULT_PAGE_LIMIT;
use crate::mpt_http::client::MptClient;
use crate::mpt_http::error::MptResult;
use crate::mpt_http::pagination::paginated;
use crate::rql::RqlQuery;

async fn items(client: &MptClient, filter: RqlQuery) -> MptResult<Vec<Value>> {
    paginated(
        client,
        &format!("/catalog/items?{filter}"),
        DEFAULT_PAGE_LIMIT,
    )
    .await
}

/// Items of `product_id` whose vendor external id is one of `skus`
pub async fn get_product_items_by_skus(
    client: &MptClient,
    product_id: &str,
    skus: &[String],
) -> MptResult<Vec<Value>> {
    let filter = RqlQuery::n("product").n("id").eq(product_id)?
        & RqlQuery::n("externalIds").n("vendor").in_(skus)?;
    items(client, filter).await
}

/// One-time items of `product_id` among `item_ids`
pub async fn get_product_onetime_items_by_ids(
    client: &MptClient,
    product_id: &str,
    item_ids: &[String],
) -> MptResult<Vec<Value>> {
    let filter = RqlQuery::n("product").n("id").eq(product_id)?
        & RqlQuery::n("id").in_(item_ids)?
        & RqlQuery::n("terms").n("period").eq("one-time")?;
    items(client, filter).await
}

/// Items of `product_id` billed per `period`, optionally restricted to vendor ids
pub async fn get_product_items_by_period(
    client: &MptClient,
    product_id: &str,
    period: &str,
    vendor_external_ids: Option<&[String]>,
) -> MptResult<Vec<Value>> {
    let mut filter = RqlQuery::n("product").n("id").eq(product_id)?
        & RqlQuery::n("terms").n("period").eq(period)?;

    if let Some(vendor_ids) = vendor_external_ids.filter(|ids| !ids.is_empty()) {
        filter = filter & RqlQuery::n("externalIds").n("vendor").in_(vendor_ids)?;
    }

    items(client, filter).await
}

/// Template for order `status` (e.g. `Purchase`), preferring `name` when given,
/// otherwise the product default
pub async fn get_product_template_or_default(
    client: &MptClient,
    product_id: &str,
    status: &str,
    name: Option<&str>,
) -> MptResult<Value> {
    let mut name_or_default = RqlQuery::n("default").eq(true)?;
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        name_or_default = name_or_default | RqlQuery::n("name").eq(name)?;
    }
    let filter = RqlQuery::n("type").eq(format!("Order{status}"))? & name_or_default;

    first_of(
        client,
        &format!("/catalog/products/{product_id}/templates?{filter}&order=default&limit=1"),
        "template",
    )
    .await
}

pub async fn get_template_by_name(
    client: &MptClient,
    product_id: &str,
    template_name: &str,
) -> MptResult<Value> {
    let filter = RqlQuery::n("name").eq(template_name)?;
    first_of(
        client,
        &format!("/catalog/products/{product_id}/templates?{filter}"),
        "template",
    )
    .await
}

pub async fn get_listing_by_id(client: &MptClient, listing_id: &str) -> MptResult<Value> {
    client
        .get_json(&format!("/catalog/listings/{listing_id}"))
        .await
}

pub async fn create_listing(client: &MptClient, listing: &Value) -> MptResult<Value> {
    client.post_json("/catalog/listings", listing).await
}

pub async fn get_authorizations_by_currency_and_seller_id(
    client: &MptClient,
    product_id: &str,
    currency: &str,
    owner_id: &str,
) -> MptResult<Vec<Value>> {
    let filter = RqlQuery::from_filters([
        ("product__id", product_id),
        ("currency", currency),
        ("owner__id", owner_id),
    ])?;
    data_of(client, &format!("/catalog/authorizations?{filter}")).await
}

pub async fn get_price_lists_by_currency(
    client: &MptClient,
    product_id: &str,
    currency: &str,
) -> MptResult<Vec<Value>> {
    let filter = RqlQuery::from_filters([("product__id", product_id), ("currency", currency)])?;
    data_of(client, &format!("/catalog/price-lists?{filter}")).await
}

pub async fn get_listings_by_price_list_and_seller_and_authorization(
    client: &MptClient,
    product_id: &str,
    price_list_id: &str,
    seller_id: &str,
    authorization_id: &str,
) -> MptResult<Vec<Value>> {
    let filter = RqlQuery::from_filters([
        ("product__id", product_id),
        ("priceList__id", price_list_id),
        ("seller__id", seller_id),
        ("authorization__id", authorization_id),
    ])?;
    data_of(client, &format!("/catalog/listings?{filter}")).await
}
