//! Parsing and (de)serialization of calendar dates.
//!
//! Dates are exchanged as `YYYY-MM-DD` strings. Clients that send a full
//! RFC 3339 timestamp (e.g. from `Date.toISOString()`) have the date part kept.

use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::Error;

/// Parse a date given as either `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` is in neither format.
pub fn parse_date(raw: &str) -> Result<Date, Error> {
    let raw = raw.trim();

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

/// Parse an optional date parameter, treating blank strings as absent.
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<Date>, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_date(raw).map(Some),
    }
}

/// Serde helpers for `#[serde(with = "iso_date")]` on [Date] fields.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::Date;

    /// Serialize `date` as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }

    /// Deserialize a date from `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;

        super::parse_date(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::{Date, macros::date};

    use crate::Error;

    use super::{iso_date, parse_date, parse_optional_date};

    #[test]
    fn parses_plain_date() {
        assert_eq!(parse_date("2025-01-15"), Ok(date!(2025 - 01 - 15)));
    }

    #[test]
    fn parses_javascript_iso_string() {
        assert_eq!(
            parse_date("2025-01-15T00:00:00.000Z"),
            Ok(date!(2025 - 01 - 15))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_date("next tuesday"),
            Err(Error::InvalidDate("next tuesday".to_owned()))
        );
    }

    #[test]
    fn blank_optional_date_is_none() {
        assert_eq!(parse_optional_date(Some("  ")), Ok(None));
        assert_eq!(parse_optional_date(None), Ok(None));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "iso_date")]
        date: Date,
    }

    #[test]
    fn serializes_as_iso_date_string() {
        let json = serde_json::to_value(Wrapper {
            date: date!(2024 - 02 - 29),
        })
        .unwrap();

        assert_eq!(json["date"], "2024-02-29");

        let wrapper: Wrapper = serde_json::from_value(json).unwrap();
        assert_eq!(wrapper.date, date!(2024 - 02 - 29));
    }
}
