use crate::Trip;
use crate::error::Result;
use crate::timestamp::{format_date, format_date_time, format_instant};
use clap::ValueEnum;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use time::OffsetDateTime;

pub const GPX_CREATOR: &str = "waze2gpx - https://github.com/TheStalwart/waze2gpx";

/// Root attributes after `creator`. Downstream tools match this declaration
/// literally, duplicated schema locations included.
const GPX_ROOT_ATTRIBUTES: [(&str, &str); 6] = [
    ("version", "1.1"),
    ("xmlns", "http://www.topografix.com/GPX/1/1"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    (
        "xsi:schemaLocation",
        "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd \
         http://www.garmin.com/xmlschemas/GpxExtensions/v3 http://www.garmin.com/xmlschemas/GpxExtensionsv3.xsd \
         http://www.garmin.com/xmlschemas/TrackPointExtension/v1 http://www.garmin.com/xmlschemas/TrackPointExtensionv1.xsd \
         http://www.garmin.com/xmlschemas/GpxExtensions/v3 http://www.garmin.com/xmlschemas/GpxExtensionsv3.xsd \
         http://www.garmin.com/xmlschemas/TrackPointExtension/v1 http://www.garmin.com/xmlschemas/TrackPointExtensionv1.xsd",
    ),
    (
        "xmlns:gpxtpx",
        "http://www.garmin.com/xmlschemas/TrackPointExtension/v1",
    ),
    ("xmlns:gpxx", "http://www.garmin.com/xmlschemas/GpxExtensions/v3"),
];

/// How trips map onto GPX tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MergeMode {
    /// One `<trk>` per trip
    #[default]
    #[value(alias = "trk")]
    SeparateTracks,
    /// One `<trk>` holding a `<trkseg>` per trip
    #[value(alias = "trkseg")]
    SingleTrackMultiSegment,
}

/// Renders trips as a GPX document stamped with the current time.
///
/// Returns an empty string when there are no trips.
pub fn write_gpx(trips: &[Trip], mode: MergeMode) -> Result<String> {
    write_gpx_at(trips, mode, OffsetDateTime::now_utc())
}

pub fn write_gpx_at(trips: &[Trip], mode: MergeMode, generated_at: OffsetDateTime) -> Result<String> {
    let mut output = Vec::new();
    write_gpx_to_writer(trips, mode, generated_at, &mut output)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

pub fn write_gpx_to_writer<W: Write>(
    trips: &[Trip],
    mode: MergeMode,
    generated_at: OffsetDateTime,
    output: W,
) -> Result<()> {
    if trips.is_empty() {
        return Ok(());
    }

    let mut writer = Writer::new(output);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("gpx")
            .with_attributes([("creator", GPX_CREATOR)])
            .with_attributes(GPX_ROOT_ATTRIBUTES),
    ))?;

    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text_element(&mut writer, "time", &format_instant(generated_at)?)?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    match mode {
        MergeMode::SeparateTracks => {
            for trip in trips {
                let name = format!("Waze Trip {}", format_date_time(trip.start_time)?);
                writer.write_event(Event::Start(BytesStart::new("trk")))?;
                write_text_element(&mut writer, "name", &name)?;
                write_segment(&mut writer, trip)?;
                writer.write_event(Event::End(BytesEnd::new("trk")))?;
            }
        }
        MergeMode::SingleTrackMultiSegment => {
            let starts = trips.iter().map(|t| t.start_time);
            let first = starts.clone().min().unwrap_or(generated_at);
            let last = starts.max().unwrap_or(generated_at);
            let name = format!(
                "Waze History {} - {}",
                format_date(first)?,
                format_date(last)?
            );

            writer.write_event(Event::Start(BytesStart::new("trk")))?;
            write_text_element(&mut writer, "name", &name)?;
            for trip in trips {
                write_segment(&mut writer, trip)?;
            }
            writer.write_event(Event::End(BytesEnd::new("trk")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    log::debug!("wrote {} trips as {:?}", trips.len(), mode);

    Ok(())
}

fn write_segment<W: Write>(writer: &mut Writer<W>, trip: &Trip) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;

    for (idx, point) in trip.points.iter().enumerate() {
        let lat = point.lat.to_string();
        let lon = point.lon.to_string();
        writer.write_event(Event::Start(
            BytesStart::new("trkpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]),
        ))?;
        if let Some(time) = trip.effective_time(idx) {
            write_text_element(writer, "time", &format_instant(time)?)?;
        }
        writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
