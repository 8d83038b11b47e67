use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Parse a database-native timestamp value into a UTC instant.
///
/// The hosted document store writes instants either as epoch milliseconds
/// (JSON number, possibly fractional) or as an RFC 3339 string. Anything
/// else is unparsable and yields `None`.
pub fn parse_doc_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

/// Parse a date-bearing document value into a UTC instant at midnight.
///
/// Accepts everything `parse_doc_timestamp` accepts, plus date-only
/// strings like "2024-05-01" (common for project end dates entered by hand).
pub fn parse_doc_date(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(instant) = parse_doc_timestamp(value) {
        return Some(instant);
    }

    let s = value.as_str()?;
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Read a required string field off a raw document.
///
/// Returns `None` for missing, non-string, or empty values.
pub fn doc_str(doc: &Value, field: &str) -> Option<String> {
    doc.get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convert a display name to a URL-safe kebab-case slug.
///
/// Example: "Acme Corp" → "acme-corp"
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
