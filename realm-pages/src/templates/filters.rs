//! Display filters invoked by templates: `number`, `attr-escape` and `local-date`.
//!
//! Each filter takes the piped value plus any extra template arguments and
//! returns a display-ready value. A value outside the filter's domain is a
//! template contract violation and fails the render.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use minijinja::value::{Object, ObjectRepr, Value};
use minijinja::{Error, ErrorKind};
use std::fmt;
use std::sync::Arc;

/// Canonical filter names.
pub const NUMBER: &str = "number";
pub const ATTR_ESCAPE: &str = "attr-escape";
pub const LOCAL_DATE: &str = "local-date";

/// A numeric value as handed to the `number` filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl NumberValue {
    /// Format with grouped thousands and no decimal places (`#,##0`).
    ///
    /// Fractions round half to even, so `2.5` becomes `"2"` and `3.5`
    /// becomes `"4"`.
    #[must_use]
    pub fn format_grouped(&self) -> String {
        match *self {
            NumberValue::Integer(n) => group_digits(&n.to_string()),
            NumberValue::Long(n) => group_digits(&n.to_string()),
            NumberValue::Float(n) => format_fractional(f64::from(n)),
            NumberValue::Double(n) => format_fractional(n),
        }
    }

    /// Classify a template value. `None` for anything that is not a number.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_integer() {
            if let Ok(n) = i64::try_from(value.clone()) {
                return Some(match i32::try_from(n) {
                    Ok(small) => NumberValue::Integer(small),
                    Err(_) => NumberValue::Long(n),
                });
            }
        }
        if value.is_number() {
            return f64::try_from(value.clone()).ok().map(NumberValue::Double);
        }
        None
    }
}

impl From<NumberValue> for Value {
    fn from(n: NumberValue) -> Self {
        match n {
            NumberValue::Integer(n) => Value::from(n),
            NumberValue::Long(n) => Value::from(n),
            NumberValue::Float(n) => Value::from(n),
            NumberValue::Double(n) => Value::from(n),
        }
    }
}

fn format_fractional(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    group_digits(&format!("{:.0}", n.round_ties_even()))
}

/// Insert `,` every three digits from the right, keeping a leading sign.
fn group_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut out = String::with_capacity(sign.len() + digits.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A point in time placed into a render context.
///
/// Stored as an engine object so `local-date` can tell it apart from a
/// string that merely looks like a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// The current time in UTC.
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// The wrapped date-time.
    #[must_use]
    pub fn date_time(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// RFC 3339 with milliseconds, e.g. `2013-05-01T10:20:30.000Z`.
    #[must_use]
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Object for Timestamp {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::from_object(ts)
    }
}

fn is_null(value: &Value) -> bool {
    value.is_none() || value.is_undefined()
}

/// `number`: grouped thousands, no decimals. Null passes through unchanged.
pub fn number(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    if is_null(value) {
        return Ok(value.clone());
    }

    NumberValue::from_value(value)
        .map(|n| Value::from(n.format_grouped()))
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "Expected a number."))
}

/// `attr-escape`: make a value safe inside a quoted HTML attribute.
///
/// `"` becomes `&quot;` and `'` becomes `&squot;`, in that order.
pub fn attr_escape(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    if is_null(value) {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            "attr-escape cannot be applied to a null value.",
        ));
    }

    let escaped = value
        .to_string()
        .replace('"', "&quot;")
        .replace('\'', "&squot;");
    Ok(Value::from_safe_string(escaped))
}

/// `local-date`: emit a script that writes the timestamp in the viewer's locale.
///
/// The viewer's time zone is only known in the browser, so the conversion
/// happens client-side at the point the filter output appears.
pub fn local_date(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    let ts = value
        .downcast_object_ref::<Timestamp>()
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "Expected a DateTime."))?;

    Ok(Value::from_safe_string(format!(
        "<script>(function() {{ var dt = new Date(\"{}\"); document.write(dt.toLocaleString());}})();</script>",
        ts.to_iso_string()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(
        filter: fn(&Value, &[Value]) -> Result<Value, Error>,
        value: Value,
    ) -> Result<Value, Error> {
        filter(&value, &[])
    }

    #[test]
    fn test_number_groups_thousands() {
        assert_eq!(apply(number, Value::from(1234567)).unwrap().to_string(), "1,234,567");
        assert_eq!(apply(number, Value::from(0)).unwrap().to_string(), "0");
        assert_eq!(apply(number, Value::from(999)).unwrap().to_string(), "999");
        assert_eq!(apply(number, Value::from(1000)).unwrap().to_string(), "1,000");
        assert_eq!(apply(number, Value::from(-1234)).unwrap().to_string(), "-1,234");
    }

    #[test]
    fn test_number_long_and_double() {
        assert_eq!(
            apply(number, Value::from(9_876_543_210_i64)).unwrap().to_string(),
            "9,876,543,210"
        );
        assert_eq!(apply(number, Value::from(1234.4_f64)).unwrap().to_string(), "1,234");
        assert_eq!(apply(number, Value::from(1234.6_f64)).unwrap().to_string(), "1,235");
    }

    #[test]
    fn test_number_passes_null_through() {
        let out = apply(number, Value::from(())).unwrap();
        assert!(out.is_none());
        let out = apply(number, Value::UNDEFINED).unwrap();
        assert!(out.is_undefined());
    }

    #[test]
    fn test_number_rejects_non_numeric() {
        let err = apply(number, Value::from("12")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(apply(number, Value::from(true)).is_err());
    }

    #[test]
    fn test_number_value_variants() {
        assert_eq!(NumberValue::Integer(i32::MIN).format_grouped(), "-2,147,483,648");
        assert_eq!(NumberValue::Long(i64::MAX).format_grouped(), "9,223,372,036,854,775,807");
        assert_eq!(NumberValue::Float(1500.0).format_grouped(), "1,500");
        assert_eq!(NumberValue::Double(2.5).format_grouped(), "2");
        assert_eq!(NumberValue::Double(3.5).format_grouped(), "4");
        assert_eq!(NumberValue::Double(1e20).format_grouped(), "100,000,000,000,000,000,000");
        assert_eq!(NumberValue::Double(f64::NAN).format_grouped(), "NaN");
        assert_eq!(NumberValue::Double(f64::NEG_INFINITY).format_grouped(), "-∞");
    }

    #[test]
    fn test_number_value_classification() {
        assert_eq!(
            NumberValue::from_value(&Value::from(42)),
            Some(NumberValue::Integer(42))
        );
        assert_eq!(
            NumberValue::from_value(&Value::from(3_000_000_000_i64)),
            Some(NumberValue::Long(3_000_000_000))
        );
        assert_eq!(
            NumberValue::from_value(&Value::from(0.5_f64)),
            Some(NumberValue::Double(0.5))
        );
        assert_eq!(NumberValue::from_value(&Value::from("x")), None);
    }

    #[test]
    fn test_attr_escape() {
        let out = apply(attr_escape, Value::from("He said \"hi\" it's")).unwrap();
        assert_eq!(out.to_string(), "He said &quot;hi&quot; it&squot;s");
        assert!(out.is_safe());
    }

    #[test]
    fn test_attr_escape_uses_string_form() {
        let out = apply(attr_escape, Value::from(42)).unwrap();
        assert_eq!(out.to_string(), "42");
    }

    #[test]
    fn test_attr_escape_rejects_null() {
        assert!(apply(attr_escape, Value::from(())).is_err());
    }

    #[test]
    fn test_local_date_emits_script() {
        let dt = Utc.with_ymd_and_hms(2013, 5, 1, 10, 20, 30).unwrap();
        let out = apply(local_date, Value::from(Timestamp::from(dt))).unwrap();
        let text = out.to_string();
        assert!(text.starts_with("<script>"));
        assert!(text.ends_with("</script>"));
        assert!(text.contains("new Date(\"2013-05-01T10:20:30.000Z\")"));
        assert!(text.contains("document.write(dt.toLocaleString())"));
        assert!(out.is_safe());
    }

    #[test]
    fn test_local_date_keeps_offset() {
        let offset = FixedOffset::east_opt(10 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2013, 5, 1, 20, 20, 30).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts.to_iso_string(), "2013-05-01T20:20:30.000+10:00");
    }

    #[test]
    fn test_local_date_rejects_non_timestamp() {
        let err = apply(local_date, Value::from("2013-05-01T10:20:30Z")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(apply(local_date, Value::from(())).is_err());
    }
}
