//! # RQL Expression Builder
//!
//! Builds filter strings in the Resource Query Language understood by the
//! marketplace platform's list endpoints.
//!
//! ## Key Components
//!
//! - [`query`] - Expression tree with AND/OR/NOT composition and serialization
//! - [`path`] - Dotted field path builder with terminal comparisons
//! - [`value`] - Encodable values and the per-operator encoder
//! - [`operator`] - Wire operators and the filter-key suffix table
//!
//! ## Wire Format
//!
//! - `eq(field,'value')`, `ne`, `lt`, `le`, `gt`, `ge` - comparison
//! - `like(field,pattern)`, `ilike(field,pattern)` - text search
//! - `in(field,(v1,v2))`, `out(field,(v1,v2))` - membership
//! - `eq(field,null())`, `ne(field,empty())` - presence
//! - `and(e1,e2)`, `or(e1,e2)`, `not(e)` - composition
//!
//! ## Example Usage
//!
//! ```rust
//! use mpt_extension_sdk::rql::{RqlQuery, RqlValue};
//!
//! # fn main() -> Result<(), mpt_extension_sdk::rql::RqlError> {
//! let query = RqlQuery::from_filters([
//!     ("id", RqlValue::from("ORD-0001")),
//!     ("status__in", RqlValue::from(["Processing", "Querying"])),
//! ])?;
//!
//! assert_eq!(
//!     query.to_string(),
//!     "and(eq(id,'ORD-0001'),in(status,(Processing,Querying)))"
//! );
//! assert!((!query).to_string().starts_with("not(and("));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod operator;
pub mod path;
pub mod query;
pub mod value;

pub use error::{RqlError, RqlResult};
pub use operator::{FilterSuffix, Operator, OperatorClass, Presence};
pub use path::FieldPath;
pub use query::{parse_filters, Leaf, NodeKind, RqlQuery, R};
pub use value::{rql_encode, RqlValue};
