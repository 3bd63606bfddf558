use std::fmt;

/// Wire operators emitted for leaf expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    Ilike,
    In,
    Out,
}

/// Encoding family an operator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// `eq ne lt le gt ge`: single quoted scalar
    Comparison,
    /// `like ilike`: raw pattern text
    Search,
    /// `in out`: comma-joined list of scalars
    List,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
            Operator::In => "in",
            Operator::Out => "out",
        }
    }

    pub const fn class(self) -> OperatorClass {
        match self {
            Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Le
            | Operator::Gt
            | Operator::Ge => OperatorClass::Comparison,
            Operator::Like | Operator::Ilike => OperatorClass::Search,
            Operator::In | Operator::Out => OperatorClass::List,
        }
    }

    /// Look up a wire operator by name
    pub fn from_wire(name: &str) -> Option<Self> {
        let op = match name {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "lt" => Operator::Lt,
            "le" => Operator::Le,
            "gt" => Operator::Gt,
            "ge" => Operator::Ge,
            "like" => Operator::Like,
            "ilike" => Operator::Ilike,
            "in" => Operator::In,
            "out" => Operator::Out,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence checks rendered as `eq(field,marker())` / `ne(field,marker())`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Null,
    Empty,
}

impl Presence {
    /// Zero-argument marker call used as the right-hand side
    pub const fn marker(self) -> &'static str {
        match self {
            Presence::Null => "null()",
            Presence::Empty => "empty()",
        }
    }
}

/// Operator suffix accepted in `field__suffix` filter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSuffix {
    Compare(Operator),
    Presence(Presence),
}

impl FilterSuffix {
    /// Alias table for filter key suffixes.
    ///
    /// `oneof` is an alias of `in`. Anything not listed is a path segment, not an error.
    pub fn parse(suffix: &str) -> Option<Self> {
        match suffix {
            "oneof" => Some(Self::Compare(Operator::In)),
            "null" => Some(Self::Presence(Presence::Null)),
            "empty" => Some(Self::Presence(Presence::Empty)),
            other => Operator::from_wire(other).map(Self::Compare),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes() {
        assert_eq!(Operator::Ge.class(), OperatorClass::Comparison);
        assert_eq!(Operator::Ilike.class(), OperatorClass::Search);
        assert_eq!(Operator::Out.class(), OperatorClass::List);
    }

    #[test]
    fn test_suffix_aliases() {
        assert_eq!(
            FilterSuffix::parse("oneof"),
            Some(FilterSuffix::Compare(Operator::In))
        );
        assert_eq!(
            FilterSuffix::parse("out"),
            Some(FilterSuffix::Compare(Operator::Out))
        );
        assert_eq!(
            FilterSuffix::parse("empty"),
            Some(FilterSuffix::Presence(Presence::Empty))
        );
        assert_eq!(FilterSuffix::parse("inn"), None);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for name in ["eq", "ne", "lt", "le", "gt", "ge", "like", "ilike", "in", "out"] {
            assert_eq!(Operator::from_wire(name).map(Operator::as_str), Some(name));
        }
    }
}
