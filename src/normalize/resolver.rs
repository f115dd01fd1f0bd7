//! Field resolution over raw nested JSON records.
//!
//! Source payloads drift: the same concept shows up under different keys,
//! intermediate objects are sometimes missing, and numbers arrive as strings.
//! Resolution walks an ordered list of candidate paths and returns the first
//! usable value. A missing key, a `null`, or a non-object in the middle of a path
//! all mean "not found" for that candidate.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

/// A dotted path into a JSON record (`organization.asset_amount`).
///
/// Numeric segments index into arrays (`filings_with_data.0.totrevenue`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// A new path with `prefix` in front of this one.
    pub fn under(&self, prefix: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(prefix.to_string());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// Walk the record; `None` on any missing or mistyped level, or a final `null`.
    pub fn lookup<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() { None } else { Some(current) }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Parse a list of dotted paths, preserving order.
pub fn paths(dotted: &[&str]) -> Vec<FieldPath> {
    dotted.iter().map(|p| FieldPath::parse(p)).collect()
}

/// First candidate present and non-null.
pub fn resolve<'a>(record: &'a Value, candidates: &[FieldPath]) -> Option<&'a Value> {
    candidates.iter().find_map(|path| path.lookup(record))
}

/// First candidate whose value converts with `convert`.
///
/// A candidate that is present but of the wrong shape is skipped, so a later
/// candidate can still supply the value.
pub fn resolve_with<'a, T>(
    record: &'a Value,
    candidates: &[FieldPath],
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    candidates
        .iter()
        .filter_map(|path| path.lookup(record))
        .find_map(convert)
}

pub fn resolve_str(record: &Value, candidates: &[FieldPath]) -> Option<String> {
    resolve_with(record, candidates, as_text)
}

pub fn resolve_f64(record: &Value, candidates: &[FieldPath]) -> Option<f64> {
    resolve_with(record, candidates, as_f64)
}

pub fn resolve_date(record: &Value, candidates: &[FieldPath]) -> Option<NaiveDate> {
    resolve_with(record, candidates, as_date)
}

/// Non-blank text. Integers are rendered (EINs and CIKs often arrive as numbers).
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number, from a JSON number or a numeric string.
pub fn as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}

/// Calendar date from `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`, or `YYYY-MM` (first of month).
pub fn as_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_candidate_wins() {
        let record = json!({"a": {"b": 1}, "c": 2});
        let found = resolve(&record, &paths(&["a.b", "c"])).unwrap();
        assert_eq!(found, &json!(1));

        let found = resolve(&record, &paths(&["missing", "c"])).unwrap();
        assert_eq!(found, &json!(2));
    }

    #[test]
    fn missing_nesting_is_not_found() {
        let record = json!({"a": 5, "b": null, "c": {"d": null}});
        assert!(resolve(&record, &paths(&["a.x.y", "b.z", "c.d", "nope.deeper"])).is_none());
        assert!(resolve(&json!(null), &paths(&["a"])).is_none());
        assert!(resolve(&record, &[]).is_none());
    }

    #[test]
    fn array_segments_index() {
        let record = json!({"filings": [{"year": 2023}, {"year": 2022}]});
        assert_eq!(resolve_f64(&record, &paths(&["filings.1.year"])), Some(2022.0));
        assert!(resolve(&record, &paths(&["filings.9.year", "filings.x"])).is_none());
    }

    #[test]
    fn typed_resolution_skips_wrong_shapes() {
        let record = json!({"amount": "n/a", "backup": "1,250,000", "name": "  ", "alt_name": "ACME"});
        assert_eq!(resolve_f64(&record, &paths(&["amount", "backup"])), Some(1_250_000.0));
        assert_eq!(resolve_str(&record, &paths(&["name", "alt_name"])), Some("ACME".to_string()));
    }

    #[test]
    fn dates_accept_common_shapes() {
        assert_eq!(as_date(&json!("2024-02-29")), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(as_date(&json!("1979-11-01T00:00:00")), NaiveDate::from_ymd_opt(1979, 11, 1));
        assert_eq!(as_date(&json!("1979-11")), NaiveDate::from_ymd_opt(1979, 11, 1));
        assert_eq!(as_date(&json!("soon")), None);
    }

    #[test]
    fn numbers_render_as_text() {
        assert_eq!(as_text(&json!(411234567)), Some("411234567".to_string()));
        assert_eq!(as_text(&json!(1.5)), None);
    }

    #[test]
    fn under_prefixes_path() {
        let path = FieldPath::parse("us-gaap.Assets").under("facts");
        assert_eq!(path.to_string(), "facts.us-gaap.Assets");
        assert_eq!(path.lookup(&json!({"facts": {"us-gaap": {"Assets": 7}}})), Some(&json!(7)));
    }
}
