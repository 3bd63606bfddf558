//! Fluent dotted-path builder.
//!
//! Terminal methods consume the [`FieldPath`] and return a finalized
//! [`RqlQuery`], so a path cannot be extended after a comparison is applied.

use super::error::RqlResult;
use super::operator::{Operator, Presence};
use super::query::{Leaf, RqlQuery};
use super::value::RqlValue;

/// Field path awaiting a terminal comparison
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a field path builds nothing until a comparison is applied"]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Append a path segment
    pub fn n(mut self, name: impl Into<String>) -> Self {
        self.segments.push(name.into());
        self
    }

    /// Append a path segment; alias of [`FieldPath::n`]
    pub fn field(self, name: impl Into<String>) -> Self {
        self.n(name)
    }

    /// Dot-joined path
    pub fn path(&self) -> String {
        self.segments.join(".")
    }

    fn finalize(self, op: Operator, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        let leaf = Leaf::new(self.path(), op, &value.into())?;
        Ok(RqlQuery::from_leaf(leaf))
    }

    fn presence(self, presence: Presence, present: bool) -> RqlQuery {
        RqlQuery::from_leaf(Leaf::presence(self.path(), presence, present))
    }

    pub fn eq(self, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Eq, value)
    }

    pub fn ne(self, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Ne, value)
    }

    pub fn lt(self, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Lt, value)
    }

    pub fn le(self, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Le, value)
    }

    pub fn gt(self, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Gt, value)
    }

    pub fn ge(self, value: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Ge, value)
    }

    /// Case-sensitive search; `*` is the wildcard by convention
    pub fn like(self, pattern: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Like, pattern)
    }

    /// Case-insensitive search
    pub fn ilike(self, pattern: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Ilike, pattern)
    }

    /// Membership; `values` must be a list of scalars
    pub fn in_(self, values: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::In, values)
    }

    /// Alias of [`FieldPath::in_`]
    pub fn oneof(self, values: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::In, values)
    }

    /// Exclusion; `values` must be a list of scalars
    pub fn out(self, values: impl Into<RqlValue>) -> RqlResult<RqlQuery> {
        self.finalize(Operator::Out, values)
    }

    /// `eq(path,null())` when `value` is true, `ne(path,null())` otherwise
    pub fn null(self, value: bool) -> RqlQuery {
        self.presence(Presence::Null, value)
    }

    pub fn not_null(self) -> RqlQuery {
        self.presence(Presence::Null, false)
    }

    /// `eq(path,empty())` when `value` is true, `ne(path,empty())` otherwise
    pub fn empty(self, value: bool) -> RqlQuery {
        self.presence(Presence::Empty, value)
    }

    pub fn not_empty(self) -> RqlQuery {
        self.presence(Presence::Empty, false)
    }
}
