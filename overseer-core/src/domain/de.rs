//! Lenient deserializers for backend encodings

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer};

/// Earliest year treated as a real timestamp. The backend encodes "never" as
/// its zero time (year 1), so anything before the Unix epoch folds into `None`.
const EPOCH_YEAR: i32 = 1970;

/// Deserializes an optional RFC 3339 timestamp.
///
/// `null`, empty strings, unparsable strings and pre-epoch sentinels all
/// become `None`.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|dt| dt.year() >= EPOCH_YEAR)
}

/// Wire shapes accepted for an optional string
#[derive(Deserialize)]
#[serde(untagged)]
enum NullableString {
    Plain(String),
    Sql {
        #[serde(rename = "String", default)]
        string: String,
        #[serde(rename = "Valid", default)]
        valid: bool,
    },
}

/// Deserializes a string that may be plain, `null`, or a
/// `{ "String": ..., "Valid": ... }` record.
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NullableString>::deserialize(deserializer)?;
    Ok(match value {
        Some(NullableString::Plain(s)) if !s.is_empty() => Some(s),
        Some(NullableString::Sql { string, valid: true }) => Some(string),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Fixture {
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "nullable_string")]
        text: Option<String>,
    }

    fn parse(json: &str) -> Fixture {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_timestamp_accepts_rfc3339() {
        let p = parse(r#"{"at": "2025-03-01T12:30:00+02:00"}"#);
        assert_eq!(
            p.at.unwrap().to_rfc3339(),
            "2025-03-01T10:30:00+00:00".to_string()
        );
    }

    #[test]
    fn test_timestamp_folds_sentinels() {
        assert!(parse(r#"{"at": "0001-01-01T00:00:00Z"}"#).at.is_none());
        assert!(parse(r#"{"at": ""}"#).at.is_none());
        assert!(parse(r#"{"at": null}"#).at.is_none());
        assert!(parse(r#"{"at": "yesterday"}"#).at.is_none());
        assert!(parse(r#"{}"#).at.is_none());
    }

    #[test]
    fn test_nullable_string_shapes() {
        assert_eq!(parse(r#"{"text": "hello"}"#).text.as_deref(), Some("hello"));
        assert_eq!(
            parse(r#"{"text": {"String": "boom", "Valid": true}}"#)
                .text
                .as_deref(),
            Some("boom")
        );
        assert!(parse(r#"{"text": {"String": "", "Valid": false}}"#).text.is_none());
        assert!(parse(r#"{"text": null}"#).text.is_none());
        assert!(parse(r#"{"text": ""}"#).text.is_none());
    }
}
