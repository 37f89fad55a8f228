use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time,
};

use crate::errors::ApiError;

/// Parses the ISO-8601 shapes clients send: full RFC 3339, a naive
/// date-time (taken as UTC) or a bare date (midnight UTC).
pub fn parse_iso(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, naive) {
        return Some(dt.assume_utc());
    }
    let naive_frac =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, naive_frac) {
        return Some(dt.assume_utc());
    }
    let day = format_description!("[year]-[month]-[day]");
    Date::parse(raw, day)
        .ok()
        .map(|d| d.with_time(Time::MIDNIGHT).assume_utc())
}

pub fn parse_field(field: &str, raw: &str) -> Result<OffsetDateTime, ApiError> {
    parse_iso(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid {field}: expected ISO-8601 date")))
}

pub fn parse_optional_field(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<OffsetDateTime>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_field(field, s).map(Some),
    }
}
