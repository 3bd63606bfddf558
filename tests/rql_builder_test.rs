//! RQL builder behavior through the public API.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use mpt_extension_sdk::rql::{
    parse_filters, rql_encode, NodeKind, Operator, RqlError, RqlQuery, RqlValue, R,
};

fn q(key: &str, value: impl Into<RqlValue>) -> RqlQuery {
    RqlQuery::filter(key, value).unwrap()
}

const PRODUCTS: [&str; 2] = ["PRD-1111-1111", "PRD-2222-2222"];

#[test]
fn test_in_and_namespaces() {
    let chained = R::n("agreement").n("product").n("id").in_(PRODUCTS).unwrap();
    let dotted = R::field("agreement").field("product").field("id").in_(PRODUCTS).unwrap();

    assert_eq!(chained.to_string(), dotted.to_string());
    assert_eq!(
        chained.to_string(),
        "in(agreement.product.id,(PRD-1111-1111,PRD-2222-2222))"
    );
}

#[test]
fn test_querying_orders_url() {
    let query = R::n("agreement").n("product").n("id").in_(PRODUCTS).unwrap()
        & R::filter("status", "Querying").unwrap();

    let url = format!(
        "/commerce/orders?{query}&select=audit,parameters,lines,subscriptions,\
         subscriptions.lines,agreement,buyer&order=audit.created.at"
    );

    assert_eq!(
        query.to_string(),
        "and(in(agreement.product.id,(PRD-1111-1111,PRD-2222-2222)),eq(status,'Querying'))"
    );
    assert!(url.starts_with("/commerce/orders?and(in(agreement.product.id,"));
}

#[test]
fn test_filter_keys() {
    assert_eq!(
        parse_filters([("product__id__inn", "PRD-1111-1111")]).unwrap(),
        vec!["eq(product.id.inn,'PRD-1111-1111')"]
    );
    assert_eq!(
        parse_filters([("product__id__eq", "PRD-1111-1111")]).unwrap(),
        vec!["eq(product.id,'PRD-1111-1111')"]
    );
    assert_eq!(
        parse_filters([("product__id__like", "PRD-1111-1111")]).unwrap(),
        vec!["like(product.id,PRD-1111-1111)"]
    );
    assert_eq!(
        parse_filters([("product__id__null", "PRD-1111-1111")]).unwrap(),
        vec!["ne(product.id,null())"]
    );
    assert_eq!(
        q("product__id__in", PRODUCTS).to_string(),
        "in(product.id,(PRD-1111-1111,PRD-2222-2222))"
    );
}

#[test]
fn test_comparison_encoding() {
    let cases: Vec<(Operator, RqlValue, &str)> = vec![
        (Operator::Eq, "value".into(), "'value'"),
        (Operator::Eq, "null()".into(), "null()"),
        (Operator::Eq, "O'Reilly".into(), "'O\\'Reilly'"),
        (Operator::Ne, true.into(), "'true'"),
        (Operator::Lt, false.into(), "'false'"),
        (Operator::Gt, 10i64.into(), "'10'"),
        (Operator::Ge, 10.5f64.into(), "'10.5'"),
        (
            Operator::Le,
            Decimal::from_str("32983.328238273").unwrap().into(),
            "'32983.328238273'",
        ),
        (
            Operator::Eq,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().into(),
            "'2024-01-02'",
        ),
        (
            Operator::Eq,
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap().into(),
            "'2024-01-02T03:04:05+00:00'",
        ),
    ];

    for (op, value, expected) in cases {
        assert_eq!(rql_encode(op, &value).unwrap(), expected, "{op} {value:?}");
    }
}

#[test]
fn test_search_and_list_encoding() {
    assert_eq!(rql_encode(Operator::Like, &"value*".into()).unwrap(), "value*");
    assert_eq!(rql_encode(Operator::Like, &true.into()).unwrap(), "true");
    assert_eq!(rql_encode(Operator::Ilike, &42i64.into()).unwrap(), "42");
    assert_eq!(rql_encode(Operator::In, &["a", "b"].into()).unwrap(), "a,b");
    assert_eq!(
        rql_encode(Operator::In, &["O'Reilly", "x"].into()).unwrap(),
        "O\\'Reilly,x"
    );
    assert_eq!(rql_encode(Operator::In, &["a,b", "c"].into()).unwrap(), "a\\,b,c");
}

#[test]
fn test_encoding_shape_errors() {
    assert!(matches!(
        rql_encode(Operator::In, &"not-a-sequence".into()),
        Err(RqlError::EncodingType { .. })
    ));
    assert!(matches!(
        rql_encode(Operator::Eq, &vec!["a", "b"].into()),
        Err(RqlError::EncodingType { .. })
    ));
    assert!(R::n("asset").n("id").in_("Test").is_err());
}

#[test]
fn test_len_and_emptiness() {
    assert_eq!(RqlQuery::new().len(), 0);
    assert!(RqlQuery::new().is_empty());
    assert_eq!(q("id", "ID").len(), 1);

    let pair = RqlQuery::from_filters([
        ("id", RqlValue::from("ID")),
        ("status__in", RqlValue::from(["a", "b"])),
    ])
    .unwrap();
    assert_eq!(pair.len(), 2);
    assert!(!pair.is_empty());
}

#[test]
fn test_equality() {
    assert_eq!(RqlQuery::new(), RqlQuery::new());
    assert_eq!(q("id", "ID"), q("id", "ID"));
    assert_eq!(!q("id", "ID"), !q("id", "ID"));
    assert_ne!(RqlQuery::new(), q("id", "ID"));
}

#[test]
fn test_or_composition() {
    let id = q("id", "ID");
    let name = q("name", "name");

    assert_eq!(RqlQuery::new() | RqlQuery::new(), RqlQuery::new());
    assert_eq!(&id | &id, id);
    assert_eq!(&id | &RqlQuery::new(), id);
    assert_eq!(&RqlQuery::new() | &id, id);

    let either = &id | &name;
    assert_eq!(either.kind(), NodeKind::Or);
    assert!(either.children().contains(&id));
    assert!(either.children().contains(&name));
}

#[test]
fn test_merge_flattens_same_kind() {
    let r1 = q("id", "ID");
    let r2 = q("name", "name");
    let r3 = q("field", "value");
    let r4 = q("field__in", ["v1", "v2"]);

    let merged_or = (&r1 | &r2) | (&r3 | &r4);
    assert_eq!(merged_or.kind(), NodeKind::Or);
    assert_eq!(
        merged_or.children(),
        &[r1.clone(), r2.clone(), r3.clone(), r4.clone()][..]
    );

    let merged_and = (&r1 & &r2) & (&r3 & &r4);
    assert_eq!(merged_and.kind(), NodeKind::And);
    assert_eq!(merged_and.children(), &[r1, r2, r3, r4][..]);
}

#[test]
fn test_duplicates_collapse() {
    let id = q("id", "ID");
    let field = q("field", "value");

    let and = &id & &field & field.clone();
    assert_eq!(and.len(), 2);
    assert_eq!(and.children(), &[id.clone(), field.clone()][..]);

    let or = &id | &field | field.clone();
    assert_eq!(or.len(), 2);
    assert_eq!(or.kind(), NodeKind::Or);
}

#[test]
fn test_mixed_and_or() {
    let r1 = q("id", "ID");
    let r2 = q("field", "value");
    let r3 = q("other", "value2");
    let r4 = q("inop__in", ["a", "b"]);

    assert_eq!(
        (&r1 & &r2 & (&r3 | &r4)).to_string(),
        "and(eq(id,'ID'),eq(field,'value'),or(eq(other,'value2'),in(inop,(a,b))))"
    );
    assert_eq!(
        (&r1 & &r2 | r3.clone()).to_string(),
        "or(and(eq(id,'ID'),eq(field,'value')),eq(other,'value2'))"
    );
    assert_eq!(
        (&r1 & &(&r2 | &r3)).to_string(),
        "and(eq(id,'ID'),or(eq(field,'value'),eq(other,'value2')))"
    );
    assert_eq!(
        ((&r1 & &r2) | (&r3 & &r4)).to_string(),
        "or(and(eq(id,'ID'),eq(field,'value')),and(eq(other,'value2'),in(inop,(a,b))))"
    );
    assert_eq!(
        ((&r1 & &r2) | !&r3).to_string(),
        "or(and(eq(id,'ID'),eq(field,'value')),not(eq(other,'value2')))"
    );
}

#[test]
fn test_dotted_path_comparisons() {
    type Terminal = fn(mpt_extension_sdk::FieldPath, RqlValue) -> Result<RqlQuery, RqlError>;
    let terminals: [(&str, Terminal); 6] = [
        ("eq", |p, v| p.eq(v)),
        ("ne", |p, v| p.ne(v)),
        ("gt", |p, v| p.gt(v)),
        ("ge", |p, v| p.ge(v)),
        ("le", |p, v| p.le(v)),
        ("lt", |p, v| p.lt(v)),
    ];

    for (op, terminal) in terminals {
        let path = || R::n("asset").n("id");
        assert_eq!(
            terminal(path(), "value".into()).unwrap().to_string(),
            format!("{op}(asset.id,'value')")
        );
        assert_eq!(
            terminal(path(), true.into()).unwrap().to_string(),
            format!("{op}(asset.id,'true')")
        );
        assert_eq!(
            terminal(path(), 10i64.into()).unwrap().to_string(),
            format!("{op}(asset.id,'10')")
        );
        assert_eq!(
            terminal(path(), 10.678937f64.into()).unwrap().to_string(),
            format!("{op}(asset.id,'10.678937')")
        );
    }
}

#[test]
fn test_dotted_path_search_and_lists() {
    for pattern in ["value", "*value", "value*", "*value*"] {
        assert_eq!(
            R::n("asset").n("id").like(pattern).unwrap().to_string(),
            format!("like(asset.id,{pattern})")
        );
        assert_eq!(
            R::n("asset").n("id").ilike(pattern).unwrap().to_string(),
            format!("ilike(asset.id,{pattern})")
        );
    }

    let values = vec!["first".to_string(), "second".to_string()];
    assert_eq!(
        R::n("asset").n("id").in_(values.clone()).unwrap().to_string(),
        "in(asset.id,(first,second))"
    );
    assert_eq!(
        R::n("asset").n("id").oneof(values.as_slice()).unwrap().to_string(),
        "in(asset.id,(first,second))"
    );
    assert_eq!(
        R::n("asset").n("id").out(values).unwrap().to_string(),
        "out(asset.id,(first,second))"
    );
}

#[test]
fn test_presence_terminals() {
    assert_eq!(R::n("asset").n("id").null(true).to_string(), "eq(asset.id,null())");
    assert_eq!(R::n("asset").n("id").null(false).to_string(), "ne(asset.id,null())");
    assert_eq!(R::n("asset").n("id").not_null().to_string(), "ne(asset.id,null())");
    assert_eq!(R::n("value").empty(true).to_string(), "eq(value,empty())");
    assert_eq!(R::n("value").not_empty().to_string(), "ne(value,empty())");
    assert_eq!(R::n("value").empty(false), R::n("value").not_empty());
}

#[test]
fn test_path_cannot_continue_after_terminal() {
    let finalized = R::n("first").n("second").eq("value").unwrap();
    assert!(matches!(
        finalized.try_n("third"),
        Err(RqlError::InvalidPathContinuation { .. })
    ));
}

#[test]
fn test_negation_strings() {
    assert_eq!(q("id", "ID").to_string(), "eq(id,'ID')");
    assert_eq!((!q("id", "ID")).to_string(), "not(eq(id,'ID'))");

    let pair = RqlQuery::from_filters([("id", "ID"), ("field", "value")]).unwrap();
    assert_eq!((!pair).to_string(), "not(and(eq(id,'ID'),eq(field,'value')))");
    assert_eq!(RqlQuery::new().to_string(), "");
}

fn leaf() -> impl Strategy<Value = RqlQuery> {
    ("[a-z]{1,8}", "[A-Za-z0-9]{1,8}")
        .prop_map(|(field, value)| RqlQuery::filter(&field, value).unwrap())
}

proptest! {
    #[test]
    fn prop_and_is_idempotent(a in leaf()) {
        prop_assert_eq!(&a & &a, a);
    }

    #[test]
    fn prop_empty_is_identity(a in leaf()) {
        prop_assert_eq!(&a & &RqlQuery::new(), a.clone());
        prop_assert_eq!(&RqlQuery::new() | &a, a);
    }

    #[test]
    fn prop_negation_wraps_serialization(a in leaf()) {
        prop_assert_eq!((!&a).to_string(), format!("not({a})"));
    }

    #[test]
    fn prop_and_flattens_distinct_leaves(a in leaf(), b in leaf(), c in leaf()) {
        prop_assume!(a != b && b != c && a != c);
        let joined = (&a & &b) & c.clone();
        prop_assert_eq!(joined.len(), 3);
        prop_assert_eq!(joined.to_string(), format!("and({a},{b},{c})"));
    }
}
