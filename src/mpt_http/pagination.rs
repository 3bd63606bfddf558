//! Offset pagination over platform collection endpoints.
//!
//! Collection responses carry `{"data": [...], "$meta": {"pagination": {...}}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::client::MptClient;
use super::error::{MptError, MptResult};

/// `$meta.pagination` block of a collection response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub pagination: PaginationMeta,
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(rename = "$meta", default)]
    pub meta: PageMeta,
}

impl Page {
    /// Whether records exist past this page
    pub fn has_next_page(&self) -> bool {
        let pagination = self.meta.pagination;
        pagination.total > pagination.limit + pagination.offset
    }
}

/// True before the first page is fetched, then while `total > limit + offset`
pub fn has_more_pages(page: Option<&Page>) -> bool {
    page.map_or(true, Page::has_next_page)
}

/// Represents limit/offset parameters for a collection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    /// First page of `limit` records
    pub fn new(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn limit_offset(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// `limit={limit}&offset={offset}`
    pub fn query_string(&self) -> String {
        format!("limit={}&offset={}", self.limit, self.offset)
    }

    /// Parameters of the following page
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }

    /// Append the parameters to `url`, using `?` when it has no query yet
    pub fn apply(&self, url: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}{}", self.query_string())
    }
}

/// Fetch every page of `url`, accumulating the `data` arrays in order
pub async fn paginated(client: &MptClient, url: &str, limit: u32) -> MptResult<Vec<Value>> {
    if limit == 0 {
        return Err(MptError::config("page limit must be greater than 0"));
    }

    let mut items = Vec::new();
    let mut page: Option<Page> = None;
    let mut pagination = Pagination::new(limit);

    while has_more_pages(page.as_ref()) {
        let current: Page = client.get_json(&pagination.apply(url)).await?;
        debug!(
            url = url,
            offset = pagination.offset,
            received = current.data.len(),
            total = current.meta.pagination.total,
            "Fetched page"
        );

        // An empty page ends the walk even if the reported total disagrees
        if current.data.is_empty() {
            break;
        }

        items.extend(current.data.iter().cloned());
        page = Some(current);
        pagination = pagination.next();
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(total: u64, limit: u64, offset: u64) -> Page {
        serde_json::from_value(json!({
            "data": [],
            "$meta": {"pagination": {"total": total, "limit": limit, "offset": offset}},
        }))
        .unwrap()
    }

    #[test]
    fn test_has_more_pages_without_page() {
        assert!(has_more_pages(None));
    }

    #[test]
    fn test_has_more_pages() {
        assert!(has_more_pages(Some(&page(25, 10, 10))));
        assert!(!has_more_pages(Some(&page(20, 10, 10))));
        assert!(!has_more_pages(Some(&page(0, 10, 0))));
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected_before_any_request() {
        let client =
            MptClient::new(crate::mpt_http::MptClientConfig::new("http://127.0.0.1:9/v1/", "token"))
                .unwrap();

        let error = paginated(&client, "commerce/orders", 0).await.unwrap_err();
        assert!(matches!(error, MptError::Config(_)));
    }

    #[test]
    fn test_pagination_query_string() {
        let pagination = Pagination::new(10);
        assert_eq!(pagination.query_string(), "limit=10&offset=0");
        assert_eq!(pagination.next().query_string(), "limit=10&offset=10");
    }

    #[test]
    fn test_apply_picks_separator() {
        let pagination = Pagination::limit_offset(5, 15);
        assert_eq!(
            pagination.apply("/commerce/orders?select=lines"),
            "/commerce/orders?select=lines&limit=5&offset=15"
        );
        assert_eq!(
            pagination.apply("/commerce/orders"),
            "/commerce/orders?limit=5&offset=15"
        );
    }

    #[test]
    fn test_page_without_meta_has_no_next() {
        let page: Page = serde_json::from_value(json!({"data": [{"id": "ORD-1"}]})).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_next_page());
    }
}
