use thiserror::Error;
use time::OffsetDateTime;

/// Errors produced while parsing an export or rendering its tracks.
#[derive(Debug, Error)]
pub enum Error {
    /// The export has no `Location details` section.
    #[error("no `Location details` section found")]
    NoLocationSection,

    /// A record line does not have the expected shape.
    #[error("malformed record on line {line} ({reason}): {content:?}")]
    MalformedRecord {
        line: usize,
        content: String,
        reason: String,
    },

    /// A datetime string matches none of the known export shapes.
    #[error("invalid timestamp {value:?}{}", line_suffix(.line))]
    InvalidTimestamp { value: String, line: Option<usize> },

    #[error("time window start {start} is after end {end}")]
    InvalidTimeWindow {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to format time: {0}")]
    Format(#[from] time::error::Format),

    #[error("invalid GPX: {0}")]
    InvalidGpx(String),

    #[error("KML error: {0}")]
    Kml(#[from] kml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }

    /// Places an error raised while reading part of a record at that record.
    pub(crate) fn in_record(self, line_number: usize, record: &str) -> Self {
        match self {
            Error::InvalidTimestamp { value, line: None } => Error::InvalidTimestamp {
                value,
                line: Some(line_number),
            },
            Error::MalformedRecord { reason, .. } => Error::malformed(line_number, record, reason),
            other => other,
        }
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" on line {l}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
