//! # RQL Query Nodes
//!
//! [`RqlQuery`] is an immutable boolean expression over comparison leaves.
//! Composition with `&`, `|` and `!` always produces a new node; AND/OR operands
//! of the same kind are flattened and structurally equal children are collapsed.

use super::error::{RqlError, RqlResult};
use super::operator::{FilterSuffix, Operator, OperatorClass, Presence};
use super::path::FieldPath;
use super::value::{rql_encode, RqlValue};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Shorthand used by extensions: `R::n("agreement").n("product")...`
pub type R = RqlQuery;

/// Shape of a query node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Expression,
    And,
    Or,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Expression => "expr",
            NodeKind::And => "and",
            NodeKind::Or => "or",
        }
    }
}

/// A finalized `op(field,value)` comparison; `value` is already encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    op: Operator,
    field: String,
    value: String,
}

impl Leaf {
    pub(crate) fn new(field: String, op: Operator, value: &RqlValue) -> RqlResult<Self> {
        let value = rql_encode(op, value)?;
        Ok(Self { op, field, value })
    }

    pub(crate) fn presence(field: String, presence: Presence, present: bool) -> Self {
        Self {
            op: if present { Operator::Eq } else { Operator::Ne },
            field,
            value: presence.marker().to_string(),
        }
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op.class() {
            OperatorClass::List => write!(f, "{}({},({}))", self.op, self.field, self.value),
            _ => write!(f, "{}({},{})", self.op, self.field, self.value),
        }
    }
}

/// RQL expression tree node.
///
/// Equality and hashing are structural: kind, negation, leaf and children
/// (order-sensitive). The default value is the empty node, which serializes to
/// an empty string and is the identity for both `&` and `|`.
///
/// ```rust
/// use mpt_extension_sdk::rql::RqlQuery;
///
/// # fn main() -> Result<(), mpt_extension_sdk::rql::RqlError> {
/// let query = RqlQuery::n("agreement").n("product").n("id").in_(["PRD-1", "PRD-2"])?
///     & RqlQuery::filter("status", "processing")?;
///
/// assert_eq!(
///     query.to_string(),
///     "and(in(agreement.product.id,(PRD-1,PRD-2)),eq(status,'processing'))"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RqlQuery {
    kind: NodeKind,
    expr: Option<Leaf>,
    children: Vec<RqlQuery>,
    negated: bool,
}

impl RqlQuery {
    /// Create the empty node
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a dotted field path bound to `name`
    pub fn field(name: impl Into<String>) -> FieldPath {
        FieldPath::new(name)
    }

    /// Alias of [`RqlQuery::field`]
    pub fn n(name: impl Into<String>) -> FieldPath {
        FieldPath::new(name)
    }

    /// Start a field path from this node.
    ///
    /// Only the empty node can start a path; a node that already holds an
    /// expression fails with [`RqlError::InvalidPathContinuation`].
    pub fn try_n(&self, name: impl Into<String>) -> RqlResult<FieldPath> {
        let name = name.into();
        if self.is_empty() {
            Ok(FieldPath::new(name))
        } else {
            Err(RqlError::invalid_path_continuation(self.to_string(), name))
        }
    }

    /// Build a single leaf from a `field__op` key
    pub fn filter(key: &str, value: impl Into<RqlValue>) -> RqlResult<Self> {
        parse_filter(key, value.into())
    }

    /// Build a node from ordered `field__op` / value pairs.
    ///
    /// One pair yields a leaf, several pairs yield an AND node with the leaves in
    /// the given order, no pairs yield the empty node.
    pub fn from_filters<I, K, V>(filters: I) -> RqlResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RqlValue>,
    {
        let mut leaves = filters
            .into_iter()
            .map(|(key, value)| parse_filter(key.as_ref(), value.into()))
            .collect::<RqlResult<Vec<_>>>()?;

        Ok(match leaves.len() {
            0 => Self::new(),
            1 => leaves.remove(0),
            _ => Self {
                kind: NodeKind::And,
                children: leaves,
                ..Self::default()
            },
        })
    }

    pub(crate) fn from_leaf(leaf: Leaf) -> Self {
        Self {
            expr: Some(leaf),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn expr(&self) -> Option<&Leaf> {
        self.expr.as_ref()
    }

    pub fn children(&self) -> &[RqlQuery] {
        &self.children
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    /// Number of terms: 0 for the empty node, 1 for a leaf, child count otherwise
    pub fn len(&self) -> usize {
        match self.expr {
            Some(_) => 1,
            None => self.children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_none() && self.children.is_empty()
    }

    /// Conjunction; same as `self & other`
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.join(other, NodeKind::And)
    }

    /// Disjunction; same as `self | other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.join(other, NodeKind::Or)
    }

    /// Negation; same as `!self`.
    ///
    /// Negating a negated node wraps it instead of cancelling, so `!!a`
    /// serializes as `not(not(a))`.
    #[must_use]
    pub fn negate(self) -> Self {
        if self.is_empty() {
            return self;
        }
        if !self.negated {
            return Self {
                negated: true,
                ..self
            };
        }
        Self {
            kind: NodeKind::And,
            expr: None,
            children: vec![self],
            negated: true,
        }
    }

    fn join(self, other: Self, kind: NodeKind) -> Self {
        if other.is_empty() || self == other {
            return self;
        }
        if self.is_empty() {
            return other;
        }

        let mut joined = Self {
            kind,
            ..Self::default()
        };
        joined.absorb(self);
        joined.absorb(other);
        joined
    }

    fn absorb(&mut self, other: Self) {
        if other.kind == self.kind && other.expr.is_none() && !other.negated {
            for child in other.children {
                self.push_unique(child);
            }
        } else {
            self.push_unique(other);
        }
    }

    fn push_unique(&mut self, child: Self) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(leaf) = &self.expr {
            return write!(f, "{leaf}");
        }
        if let [only] = self.children.as_slice() {
            return write!(f, "{only}");
        }

        write!(f, "{}(", self.kind.as_str())?;
        for (index, child) in self.children.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for RqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        if self.negated {
            f.write_str("not(")?;
            self.fmt_body(f)?;
            return f.write_str(")");
        }
        self.fmt_body(f)
    }
}

impl fmt::Debug for RqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<R({}) {}>", self.kind.as_str(), self)
    }
}

impl BitAnd for RqlQuery {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitAnd for &RqlQuery {
    type Output = RqlQuery;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.clone().and(rhs.clone())
    }
}

impl BitOr for RqlQuery {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl BitOr for &RqlQuery {
    type Output = RqlQuery;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.clone().or(rhs.clone())
    }
}

impl Not for RqlQuery {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl Not for &RqlQuery {
    type Output = RqlQuery;

    fn not(self) -> Self::Output {
        self.clone().negate()
    }
}

/// Serialize each `field__op` / value pair into its leaf string, in order.
pub fn parse_filters<I, K, V>(filters: I) -> RqlResult<Vec<String>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<RqlValue>,
{
    filters
        .into_iter()
        .map(|(key, value)| parse_filter(key.as_ref(), value.into()).map(|q| q.to_string()))
        .collect()
}

// `a__b__op` -> field `a.b` with `op`; an unknown trailing token stays in the path.
fn parse_filter(key: &str, value: RqlValue) -> RqlResult<RqlQuery> {
    let mut tokens: Vec<&str> = key.split("__").collect();
    let suffix = match tokens.as_slice() {
        [_, .., last] => FilterSuffix::parse(last),
        _ => None,
    };
    if suffix.is_some() {
        tokens.pop();
    }
    let field = tokens.join(".");

    let leaf = match suffix.unwrap_or(FilterSuffix::Compare(Operator::Eq)) {
        FilterSuffix::Compare(op) => Leaf::new(field, op, &value)?,
        FilterSuffix::Presence(presence) => {
            Leaf::presence(field, presence, matches!(value, RqlValue::Bool(true)))
        }
    };
    Ok(RqlQuery::from_leaf(leaf))
}
