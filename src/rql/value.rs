//! # RQL Values and Encoding
//!
//! Closed set of values an RQL leaf can carry, plus the per-operator-class
//! encoder that turns them into wire text.
//!
//! Variant order fixes the dispatch priority: a `bool` is always `Bool`, never an
//! integer, because the conversion picks the variant at the call site.

use super::error::{RqlError, RqlResult};
use super::operator::{Operator, OperatorClass};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;

/// A value that can be encoded into an RQL expression
#[derive(Debug, Clone, PartialEq)]
pub enum RqlValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Str(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    /// Zero-argument marker call such as `null()`; never quoted
    Marker(String),
    List(Vec<RqlValue>),
}

impl RqlValue {
    /// Build a marker call value, e.g. `RqlValue::marker("null")` is `null()`
    pub fn marker(name: &str) -> Self {
        Self::Marker(format!("{name}()"))
    }

    /// Human-readable variant name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            RqlValue::Bool(_) => "bool",
            RqlValue::Int(_) => "int",
            RqlValue::Float(_) => "float",
            RqlValue::Decimal(_) => "decimal",
            RqlValue::Str(_) => "string",
            RqlValue::Date(_) => "date",
            RqlValue::DateTime(_) => "datetime",
            RqlValue::NaiveDateTime(_) => "naive datetime",
            RqlValue::Marker(_) => "marker",
            RqlValue::List(_) => "list",
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, RqlValue::List(_))
    }

    /// Unquoted text form of a scalar; `None` for lists
    fn raw(&self) -> Option<String> {
        let text = match self {
            RqlValue::Bool(b) => b.to_string(),
            RqlValue::Int(i) => i.to_string(),
            RqlValue::Float(f) => format_float(*f),
            RqlValue::Decimal(d) => d.to_string(),
            RqlValue::Str(s) | RqlValue::Marker(s) => s.clone(),
            RqlValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            RqlValue::DateTime(dt) => format_datetime(dt),
            RqlValue::NaiveDateTime(dt) => format_naive_datetime(dt),
            RqlValue::List(_) => return None,
        };
        Some(text)
    }
}

/// Encode `value` for use as the right-hand side of `op`.
///
/// Fails with [`RqlError::EncodingType`] when the value shape does not match the
/// operator class. List results are not parenthesized; the leaf adds them.
pub fn rql_encode(op: Operator, value: &RqlValue) -> RqlResult<String> {
    match op.class() {
        OperatorClass::Comparison => encode_comparison(op, value),
        OperatorClass::Search => value
            .raw()
            .ok_or_else(|| RqlError::encoding_type(op.as_str(), "a scalar", value.type_name())),
        OperatorClass::List => encode_list(op, value),
    }
}

fn encode_comparison(op: Operator, value: &RqlValue) -> RqlResult<String> {
    match value {
        RqlValue::Marker(marker) => Ok(marker.clone()),
        RqlValue::Str(s) if s.ends_with("()") => Ok(s.clone()),
        other => other
            .raw()
            .map(|text| format!("'{}'", escape_quotes(&text)))
            .ok_or_else(|| RqlError::encoding_type(op.as_str(), "a scalar", other.type_name())),
    }
}

fn encode_list(op: Operator, value: &RqlValue) -> RqlResult<String> {
    let RqlValue::List(items) = value else {
        return Err(RqlError::encoding_type(
            op.as_str(),
            "a list of scalars",
            value.type_name(),
        ));
    };

    let encoded = items
        .iter()
        .map(|item| {
            item.raw()
                .map(|text| escape_quotes(&text.replace(',', "\\,")))
                .ok_or_else(|| {
                    RqlError::encoding_type(op.as_str(), "scalar list items", item.type_name())
                })
        })
        .collect::<RqlResult<Vec<_>>>()?;

    Ok(encoded.join(","))
}

fn escape_quotes(text: &str) -> String {
    text.replace('\'', "\\'")
}

// Python `repr` rendering: shortest round-trip digits, exponent form outside
// [1e-4, 1e16) and integral values keep a trailing `.0`.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude > 0.0 && magnitude < 1e-4) {
        let scientific = format!("{value:e}");
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or_default();
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
    }

    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
    }
}

fn format_naive_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RqlValue {
                fn from(value: $ty) -> Self {
                    RqlValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for RqlValue {
    fn from(value: bool) -> Self {
        RqlValue::Bool(value)
    }
}

impl From<f32> for RqlValue {
    fn from(value: f32) -> Self {
        RqlValue::Float(f64::from(value))
    }
}

impl From<f64> for RqlValue {
    fn from(value: f64) -> Self {
        RqlValue::Float(value)
    }
}

impl From<Decimal> for RqlValue {
    fn from(value: Decimal) -> Self {
        RqlValue::Decimal(value)
    }
}

impl From<&str> for RqlValue {
    fn from(value: &str) -> Self {
        RqlValue::Str(value.to_string())
    }
}

impl From<String> for RqlValue {
    fn from(value: String) -> Self {
        RqlValue::Str(value)
    }
}

impl From<&String> for RqlValue {
    fn from(value: &String) -> Self {
        RqlValue::Str(value.clone())
    }
}

impl From<NaiveDate> for RqlValue {
    fn from(value: NaiveDate) -> Self {
        RqlValue::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for RqlValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RqlValue::DateTime(value)
    }
}

impl From<DateTime<Utc>> for RqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        RqlValue::DateTime(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for RqlValue {
    fn from(value: NaiveDateTime) -> Self {
        RqlValue::NaiveDateTime(value)
    }
}

impl<T: Into<RqlValue>> From<Vec<T>> for RqlValue {
    fn from(values: Vec<T>) -> Self {
        RqlValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RqlValue> + Clone> From<&[T]> for RqlValue {
    fn from(values: &[T]) -> Self {
        RqlValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<RqlValue>, const N: usize> From<[T; N]> for RqlValue {
    fn from(values: [T; N]) -> Self {
        RqlValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn encode(op: Operator, value: impl Into<RqlValue>) -> RqlResult<String> {
        rql_encode(op, &value.into())
    }

    #[test]
    fn test_comparison_quotes_and_escapes() {
        assert_eq!(encode(Operator::Eq, "value").unwrap(), "'value'");
        assert_eq!(encode(Operator::Eq, "O'Reilly").unwrap(), "'O\\'Reilly'");
        assert_eq!(encode(Operator::Eq, "null()").unwrap(), "null()");
    }

    #[test]
    fn test_comparison_scalars() {
        assert_eq!(encode(Operator::Ne, true).unwrap(), "'true'");
        assert_eq!(encode(Operator::Lt, false).unwrap(), "'false'");
        assert_eq!(encode(Operator::Gt, 10i64).unwrap(), "'10'");
        assert_eq!(encode(Operator::Ge, 10.5f64).unwrap(), "'10.5'");
        assert_eq!(encode(Operator::Ge, 10.0f64).unwrap(), "'10.0'");
        assert_eq!(encode(Operator::Eq, 0.0001f64).unwrap(), "'0.0001'");
        assert_eq!(
            encode(Operator::Eq, 9_999_999_999_999_998.0f64).unwrap(),
            "'9999999999999998.0'"
        );
        assert_eq!(encode(Operator::Eq, 1e16f64).unwrap(), "'1e+16'");
        assert_eq!(encode(Operator::Eq, 1e22f64).unwrap(), "'1e+22'");
        assert_eq!(encode(Operator::Eq, -2.5e20f64).unwrap(), "'-2.5e+20'");
        assert_eq!(encode(Operator::Eq, 1e-7f64).unwrap(), "'1e-07'");
        assert_eq!(encode(Operator::Eq, 1.5e-5f64).unwrap(), "'1.5e-05'");
        assert_eq!(encode(Operator::Eq, 1e-123f64).unwrap(), "'1e-123'");
        assert_eq!(encode(Operator::Eq, f64::NAN).unwrap(), "'nan'");
        assert_eq!(encode(Operator::Eq, f64::INFINITY).unwrap(), "'inf'");
        assert_eq!(encode(Operator::Eq, f64::NEG_INFINITY).unwrap(), "'-inf'");
        let decimal = Decimal::from_str("32983.328238273").unwrap();
        assert_eq!(encode(Operator::Le, decimal).unwrap(), "'32983.328238273'");
    }

    #[test]
    fn test_comparison_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(encode(Operator::Eq, date).unwrap(), "'2024-01-02'");

        let datetime = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            encode(Operator::Eq, datetime).unwrap(),
            "'2024-01-02T03:04:05+00:00'"
        );

        let with_micros = datetime + chrono::Duration::microseconds(1500);
        assert_eq!(
            encode(Operator::Eq, with_micros).unwrap(),
            "'2024-01-02T03:04:05.001500+00:00'"
        );
    }

    #[test]
    fn test_search_is_raw() {
        assert_eq!(encode(Operator::Like, "value*").unwrap(), "value*");
        assert_eq!(encode(Operator::Ilike, "Value").unwrap(), "Value");
        assert_eq!(encode(Operator::Like, true).unwrap(), "true");
        assert_eq!(encode(Operator::Ilike, 42i64).unwrap(), "42");
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(encode(Operator::Like, date).unwrap(), "2024-01-02");
    }

    #[test]
    fn test_list_escaping() {
        assert_eq!(encode(Operator::In, ["a", "b"]).unwrap(), "a,b");
        assert_eq!(encode(Operator::Out, vec!["x", "y"]).unwrap(), "x,y");
        assert_eq!(encode(Operator::In, ["O'Reilly", "x"]).unwrap(), "O\\'Reilly,x");
        assert_eq!(encode(Operator::In, ["a,b", "c"]).unwrap(), "a\\,b,c");
    }

    #[test]
    fn test_shape_mismatches() {
        assert!(matches!(
            encode(Operator::Eq, vec!["a"]),
            Err(RqlError::EncodingType { found: "list", .. })
        ));
        assert!(matches!(
            encode(Operator::In, "not-a-sequence"),
            Err(RqlError::EncodingType { found: "string", .. })
        ));
        let nested = RqlValue::List(vec![RqlValue::from("ok"), RqlValue::from(vec!["x"])]);
        assert!(rql_encode(Operator::In, &nested).is_err());
        assert!(encode(Operator::Like, vec!["a"]).is_err());
    }
}
