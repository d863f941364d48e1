//! Reader for the account activity export.
//!
//! An export is a sequence of sections separated by blank lines. Each section
//! starts with a label line; only the `Location details` section is read:
//!
//! ```text
//! Location details
//! Date(UTC),Location
//! 2024-02-18 10:32:03 UTC,(24.237699 56.989057)|2024-02-18 10:32:03 UTC(56.9355 24.175612)
//! ```

use crate::error::{Error, Result};
use crate::timestamp::parse_timestamp;
use crate::{TrackPoint, Trip};

pub const LOCATION_SECTION_LABEL: &str = "Location details";

/// Label line plus column header line.
const SECTION_HEADER_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<'a> {
    /// 1-based line number within the whole export.
    pub number: usize,
    pub text: &'a str,
}

/// Splits export text into blank-line separated sections.
pub fn split_sections(text: &str) -> Vec<Vec<Line<'_>>> {
    let mut sections = Vec::new();
    let mut current = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        if text.trim().is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            current.push(Line {
                number: idx + 1,
                text,
            });
        }
    }

    if !current.is_empty() {
        sections.push(current);
    }

    sections
}

/// Returns the record lines of the `Location details` section, header excluded.
pub fn find_location_section(text: &str) -> Result<Vec<Line<'_>>> {
    split_sections(text)
        .into_iter()
        .find(|lines| lines[0].text.trim() == LOCATION_SECTION_LABEL)
        .map(|lines| lines.into_iter().skip(SECTION_HEADER_LINES).collect())
        .ok_or(Error::NoLocationSection)
}

/// Parses every trip of one export, in file order.
///
/// An export without location data is not an error and yields no trips.
pub fn parse_export(text: &str) -> Result<Vec<Trip>> {
    let records = match find_location_section(text) {
        Ok(records) => records,
        Err(Error::NoLocationSection) => {
            log::warn!("export has no `{LOCATION_SECTION_LABEL}` section");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let trips = records
        .iter()
        .map(parse_record)
        .collect::<Result<Vec<_>>>()?;

    log::debug!("parsed {} trips", trips.len());
    Ok(trips)
}

pub fn parse_record(line: &Line<'_>) -> Result<Trip> {
    let fields: Vec<&str> = line.text.split(',').collect();
    let [time_field, points_field] = fields.as_slice() else {
        return Err(Error::malformed(
            line.number,
            line.text,
            format!("expected 2 fields, found {}", fields.len()),
        ));
    };

    let start_time =
        parse_timestamp(time_field).map_err(|e| e.in_record(line.number, line.text))?;

    let points = points_field
        .split('|')
        .map(|descriptor| parse_point(descriptor).map_err(|e| e.in_record(line.number, line.text)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Trip { start_time, points })
}

/// Parses a single point descriptor.
///
/// Two shapes exist:
/// - `(24.237699 56.989057)`: bare `(longitude latitude)` without a time
/// - `2024-02-18 10:32:03 UTC(56.9355 24.175612)`: a time followed by the
///   pair. Exports whose times end in `+00` write `(longitude latitude)`,
///   older ones write `(latitude longitude)`.
pub fn parse_point(descriptor: &str) -> Result<TrackPoint> {
    let descriptor = descriptor.trim();

    if descriptor.starts_with('(') {
        let (lon, lat) = parse_pair(descriptor, descriptor)?;
        return Ok(TrackPoint {
            lat,
            lon,
            time: None,
        });
    }

    let Some(paren) = descriptor.find('(') else {
        return Err(Error::malformed(
            0,
            descriptor,
            format!("point {descriptor:?} has no coordinate pair"),
        ));
    };
    let (raw_time, pair) = descriptor.split_at(paren);

    let time = parse_timestamp(raw_time)?;
    let (first, second) = parse_pair(pair, descriptor)?;
    let (lat, lon) = if raw_time.contains("+00") {
        (second, first)
    } else {
        (first, second)
    };

    Ok(TrackPoint {
        lat,
        lon,
        time: Some(time),
    })
}

/// Reads `(A B)` into its two numbers, in written order.
fn parse_pair(pair: &str, descriptor: &str) -> Result<(f64, f64)> {
    let malformed = |reason: &str| Error::malformed(0, descriptor, format!("point {descriptor:?} {reason}"));

    let inner = pair
        .strip_prefix('(')
        .and_then(|p| p.strip_suffix(')'))
        .ok_or_else(|| malformed("is not enclosed in parentheses"))?;

    let values = inner
        .split_whitespace()
        .map(|v| v.parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| malformed("has a non-numeric coordinate"))?;

    match values.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(malformed(&format!("has {} coordinates, expected 2", values.len()))),
    }
}
