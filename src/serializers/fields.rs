//! Field-level deserialization helpers shared by request payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

pub const DATETIME_FORMAT_MESSAGE: &str = "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

// Timestamps without an offset are taken as UTC
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Use with `#[serde(default)]`: a missing field stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

pub fn datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).ok_or_else(|| D::Error::custom(DATETIME_FORMAT_MESSAGE))
}

pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_datetime(&raw).ok_or_else(|| D::Error::custom(DATETIME_FORMAT_MESSAGE)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Note {
        #[serde(default, deserialize_with = "nullable")]
        text: Option<Option<String>>,
    }

    #[test]
    fn nullable_tells_missing_from_null() {
        let missing: Note = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.text, None);

        let null: Note = serde_json::from_value(json!({"text": null})).unwrap();
        assert_eq!(null.text, Some(None));

        let set: Note = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(set.text, Some(Some("hi".to_string())));
    }

    #[test]
    fn naive_datetime_is_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap();
        assert_eq!(parse_datetime("2022-06-02 14:00:00"), Some(expected));
        assert_eq!(parse_datetime("2022-06-02T14:00:00"), Some(expected));
        assert_eq!(parse_datetime("2022-06-02 14:00"), Some(expected));
    }

    #[test]
    fn offset_datetime_is_converted_to_utc() {
        assert_eq!(
            parse_datetime("2022-06-02T16:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2022-06-02T14:00:00Z"),
            Some(Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_datetime_is_rejected() {
        assert_eq!(parse_datetime("02/06/2022"), None);
        assert_eq!(parse_datetime(""), None);
    }
}
