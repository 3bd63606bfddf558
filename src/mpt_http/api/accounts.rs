use serde_json::Value;

use crate::mpt_http::client::MptClient;
use crate::mpt_http::error::MptResult;

pub async fn get_licensee(client: &MptClient, licensee_id: &str) -> MptResult<Value> {
    client
        .get_json(&format!("/accounts/licensees/{licensee_id}"))
        .await
}

pub async fn get_buyer(client: &MptClient, buyer_id: &str) -> MptResult<Value> {
    client
        .get_json(&format!("/accounts/buyers/{buyer_id}"))
        .await
}
