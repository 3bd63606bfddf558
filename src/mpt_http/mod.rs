//! # MPT HTTP Layer
//!
//! Client, error mapping, pagination and endpoint helpers for the marketplace
//! platform REST API.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mpt_extension_sdk::mpt_http::{api, MptClient, MptClientConfig};
//!
//! # async fn example() -> Result<(), mpt_extension_sdk::mpt_http::MptError> {
//! let client = MptClient::new(MptClientConfig::new(
//!     "https://api.example.com/v1/",
//!     "idt:TKN-0000-0000",
//! ))?;
//!
//! let order = api::get_order(&client, "ORD-1234-5678").await?;
//! println!("{}", order["status"]);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod pagination;

pub use client::{MptClient, MptClientConfig};
pub use error::{
    ApiErrorPayload, MptError, MptResult, ValidationError, ERR_EXT_UNHANDLED_EXCEPTION,
};
pub use pagination::{has_more_pages, paginated, Page, PageMeta, Pagination, PaginationMeta};
