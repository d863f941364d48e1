//! Datetime handling for export values.
//!
//! Every datetime in an export is UTC, but the suffix varies between format
//! versions: ` GMT`, ` UTC` and `+00` all occur. Values are normalized into
//! ISO-8601 before parsing so one parser covers every shape.

use crate::error::{Error, Result};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const UTC_SUFFIXES: [&str; 3] = [" GMT", " UTC", "+00"];

/// Rewrites an export datetime into ISO-8601 form.
///
/// The date/time separator is replaced before the zone suffix so that the
/// space inside ` GMT`/` UTC` is not mistaken for the separator.
pub fn normalize_timestamp(raw: &str) -> String {
    let normalized = raw.trim().replacen(' ', "T", 1);

    for suffix in UTC_SUFFIXES {
        if let Some(stem) = normalized.strip_suffix(suffix) {
            return format!("{stem}Z");
        }
    }

    normalized
}

/// Parses one export datetime into a UTC instant.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime> {
    let normalized = normalize_timestamp(raw);

    OffsetDateTime::parse(&normalized, &Iso8601::DEFAULT)
        .map(|t| t.to_offset(UtcOffset::UTC))
        .map_err(|_| Error::InvalidTimestamp {
            value: raw.to_string(),
            line: None,
        })
}

pub fn format_instant(instant: OffsetDateTime) -> Result<String> {
    Ok(instant.to_offset(UtcOffset::UTC).format(&Rfc3339)?)
}

pub fn format_date(instant: OffsetDateTime) -> Result<String> {
    Ok(instant
        .to_offset(UtcOffset::UTC)
        .format(format_description!("[year]-[month]-[day]"))?)
}

pub fn format_date_time(instant: OffsetDateTime) -> Result<String> {
    Ok(instant.to_offset(UtcOffset::UTC).format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))?)
}
