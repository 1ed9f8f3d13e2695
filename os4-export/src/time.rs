//! ISO-8601 to unix time conversion.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Convert an old timestamp into unix seconds.
///
/// `null` and empty strings stay `null`. Values that cannot be parsed are
/// exported as `0`; `context` names the field in the warning.
pub fn to_unix_time(value: Option<&Value>, context: &str) -> Value {
    let raw = match value {
        None | Some(Value::Null) => return Value::Null,
        Some(Value::String(raw)) if raw.is_empty() => return Value::Null,
        Some(Value::String(raw)) => raw,
        Some(other) => {
            warn!(context, value = %other, "Timestamp is not a string, exporting 0");
            return Value::from(0);
        }
    };

    match parse_timestamp(raw) {
        Some(seconds) => Value::from(seconds),
        None => {
            warn!(context, value = %raw, "Unparsable timestamp, exporting 0");
            Value::from(0)
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            to_unix_time(Some(&json!("2020-01-01T00:00:00+00:00")), "t"),
            json!(1577836800)
        );
        assert_eq!(
            to_unix_time(Some(&json!("2020-01-01T01:00:00.123456+01:00")), "t"),
            json!(1577836800)
        );
    }

    #[test]
    fn test_naive_is_utc() {
        assert_eq!(
            to_unix_time(Some(&json!("2020-01-01T00:00:10")), "t"),
            json!(1577836810)
        );
    }

    #[test]
    fn test_absent_values_stay_null() {
        assert_eq!(to_unix_time(None, "t"), Value::Null);
        assert_eq!(to_unix_time(Some(&Value::Null), "t"), Value::Null);
        assert_eq!(to_unix_time(Some(&json!("")), "t"), Value::Null);
    }

    #[test]
    fn test_unparsable_falls_back_to_zero() {
        assert_eq!(to_unix_time(Some(&json!("yesterday")), "t"), json!(0));
        assert_eq!(to_unix_time(Some(&json!(12)), "t"), json!(0));
    }
}
