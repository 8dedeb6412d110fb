//! Date field normalization.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Keys ending with this suffix hold timestamps.
pub const DATE_FIELD_SUFFIX: &str = "At";

/// How deep below the root date fields are still normalized.
pub const MAX_DATE_FIELD_DEPTH: usize = 3;

/// Normalize date fields of an API object.
///
/// String values under keys ending with [`DATE_FIELD_SUFFIX`] that parse as
/// RFC 3339 are rewritten to canonical UTC with millisecond precision, the
/// form the API itself emits. Anything unparsable is left as it was.
pub fn parse_date_fields(value: Value) -> Value {
    normalize(value, 0)
}

fn normalize(value: Value, depth: usize) -> Value {
    if depth > MAX_DATE_FIELD_DEPTH {
        return value;
    }
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize(item, depth + 1))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) if key.ends_with(DATE_FIELD_SUFFIX) => {
                            Value::String(canonical_date(&s).unwrap_or(s))
                        }
                        other => normalize(other, depth + 1),
                    };
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

fn canonical_date(value: &str) -> Option<String> {
    parse_date(value).map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Read a date field of an API object.
pub fn date_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    value.get(key).and_then(Value::as_str).and_then(parse_date)
}
