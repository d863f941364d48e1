pub mod error;
pub mod exporters;
pub mod gpxxml;
pub mod parser;
pub mod timestamp;

pub use error::{Error, Result};
pub use exporters::{Rendered, geojson_to_kml, gpx_to_geojson, render_all};
pub use gpxxml::{MergeMode, write_gpx, write_gpx_at};
pub use parser::parse_export;
pub use timestamp::parse_timestamp;

use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub time: Option<OffsetDateTime>,
}

/// One recorded journey: a start time and its points in recorded order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start_time: OffsetDateTime,
    pub points: Vec<TrackPoint>,
}

impl Trip {
    /// Time to report for the point at `index`.
    ///
    /// The first point falls back to the trip start time when it carries no
    /// time of its own; other points without a time have none.
    pub fn effective_time(&self, index: usize) -> Option<OffsetDateTime> {
        let point = self.points.get(index)?;
        match (point.time, index) {
            (Some(time), _) => Some(time),
            (None, 0) => Some(self.start_time),
            (None, _) => None,
        }
    }

    /// Latest point time, or the start time when no point is timed.
    pub fn end_time(&self) -> OffsetDateTime {
        self.points
            .iter()
            .filter_map(|p| p.time)
            .fold(self.start_time, Ord::max)
    }
}

/// Inclusive `[start, end]` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl TimeWindow {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidTimeWindow { start, end });
        }
        Ok(TimeWindow { start, end })
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Selection made by the caller for one rendering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    pub window: TimeWindow,
    pub merge_mode: MergeMode,
}

/// Trips from one or more exports, ordered by start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripCollection {
    trips: Vec<Trip>,
}

impl TripCollection {
    pub fn new(mut trips: Vec<Trip>) -> Self {
        // Stable: equal start times keep their import order.
        trips.sort_by_key(|t| t.start_time);
        TripCollection { trips }
    }

    /// Parses every export and merges their trips. Overlapping exports are
    /// not deduplicated.
    pub fn from_exports<'a, I>(texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut trips = Vec::new();
        for text in texts {
            trips.extend(parse_export(text)?);
        }
        Ok(TripCollection::new(trips))
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn first(&self) -> Option<&Trip> {
        self.trips.first()
    }

    pub fn last(&self) -> Option<&Trip> {
        self.trips.last()
    }

    /// Window from the first to the last trip start, if there are any trips.
    pub fn span(&self) -> Option<TimeWindow> {
        Some(TimeWindow {
            start: self.first()?.start_time,
            end: self.last()?.start_time,
        })
    }

    /// Trips whose start time lies inside `window`, bounds included.
    pub fn filter(&self, window: TimeWindow) -> &[Trip] {
        let lower = self.trips.partition_point(|t| t.start_time < window.start);
        let upper = self.trips.partition_point(|t| t.start_time <= window.end);
        &self.trips[lower..upper.max(lower)]
    }

    /// First trip starting strictly after `instant`.
    pub fn next_after(&self, instant: OffsetDateTime) -> Option<&Trip> {
        let idx = self.trips.partition_point(|t| t.start_time <= instant);
        self.trips.get(idx)
    }

    /// Last trip starting strictly before `instant`.
    pub fn prev_before(&self, instant: OffsetDateTime) -> Option<&Trip> {
        let idx = self.trips.partition_point(|t| t.start_time < instant);
        idx.checked_sub(1).and_then(|i| self.trips.get(i))
    }
}
