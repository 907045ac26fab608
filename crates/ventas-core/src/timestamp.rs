//! Canonical timestamp format.
//!
//! Timestamps are written as fixed-width RFC 3339 with millisecond precision
//! and a `Z` suffix (`2024-03-01T12:00:00.000Z`). Fixed width matters: the
//! document store compares `fecha` values as strings, so string order must
//! equal chronological order.
//!
//! Input is more lenient: any RFC 3339 timestamp, or a bare `YYYY-MM-DD`
//! date which is read as midnight UTC.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::ValidationError;

/// Current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Formats a timestamp in the canonical stored form.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp or a bare date.
///
/// ## Example
/// ```rust
/// use ventas_core::timestamp;
///
/// let a = timestamp::parse("fecha", "2024-03-01").unwrap();
/// let b = timestamp::parse("fecha", "2024-03-01T00:00:00Z").unwrap();
/// assert_eq!(a, b);
/// assert!(timestamp::parse("fecha", "yesterday").is_err());
/// ```
pub fn parse(field: &str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ValidationError::invalid_format(field, "expected an RFC 3339 timestamp or YYYY-MM-DD")
        })
}

/// serde adapter: `#[serde(with = "timestamp")]`.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

/// serde adapter: `#[serde(with = "timestamp")]`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse("timestamp", &raw).map_err(serde::de::Error::custom)
}

/// serde adapter for optional timestamps: `#[serde(with = "timestamp::option")]`.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse("timestamp", &raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap();
        assert_eq!(format(&whole), "2024-01-05T08:00:00.000Z");

        let fractional = whole + chrono::Duration::milliseconds(250);
        assert_eq!(format(&fractional), "2024-01-05T08:00:00.250Z");

        // String order follows time order
        assert!(format(&whole) < format(&fractional));
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let parsed = parse("fecha", "2024-01-05T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse("fecha_inicio", "05/01/2024").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "fecha_inicio"));
    }

    #[test]
    fn test_now_survives_storage() {
        let now = now();
        assert_eq!(parse("creado", &format(&now)).unwrap(), now);
    }
}
