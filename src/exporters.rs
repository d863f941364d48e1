//! GeoJSON and KML renditions of the generated GPX.
//!
//! Both formats are derived from the GPX string rather than from the trip
//! model, so all three outputs always describe the same tracks. An empty GPX
//! string (no trips selected) produces empty outputs. Coordinates pass
//! through exactly as written, with no range check.

use crate::error::{Error, Result};
use crate::gpxxml::{MergeMode, write_gpx};
use crate::timestamp::{format_instant, parse_timestamp};
use crate::{TrackPoint, Trip};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, Value};
use kml::types::{Coord, Geometry, LineString, MultiGeometry, Placemark, Point};
use kml::{Kml, KmlDocument, KmlVersion, KmlWriter};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// All three outputs for one selection of trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub gpx: String,
    pub geojson: String,
    pub kml: String,
}

pub fn render_all(trips: &[Trip], mode: MergeMode) -> Result<Rendered> {
    let gpx = write_gpx(trips, mode)?;
    let geojson = render_geojson(&gpx)?;
    let kml = render_kml(&gpx)?;
    Ok(Rendered { gpx, geojson, kml })
}

pub fn render_geojson(xml: &str) -> Result<String> {
    Ok(gpx_to_geojson(xml)?
        .map(|doc| doc.to_string())
        .unwrap_or_default())
}

pub fn render_kml(xml: &str) -> Result<String> {
    match gpx_to_geojson(xml)? {
        Some(doc) => geojson_to_kml(&doc),
        None => Ok(String::new()),
    }
}

/// Converts a GPX document into a FeatureCollection with one feature per
/// track. Returns `None` for empty input.
pub fn gpx_to_geojson(xml: &str) -> Result<Option<GeoJson>> {
    if xml.is_empty() {
        return Ok(None);
    }

    let tracks = read_tracks(xml)?;
    log::debug!("number of tracks in gpx: {}", tracks.len());

    let features = tracks
        .iter()
        .map(track_feature)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })))
}

#[derive(Debug, Default)]
struct GpxTrack {
    name: Option<String>,
    segments: Vec<Vec<TrackPoint>>,
}

/// Collects `<trk>` elements with their names, segments and point times.
fn read_tracks(xml: &str) -> Result<Vec<GpxTrack>> {
    let mut reader = Reader::from_str(xml);
    let mut tracks = Vec::new();
    let mut track: Option<GpxTrack> = None;
    let mut point: Option<TrackPoint> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(ref e) => match e.name().as_ref() {
                b"trk" => track = Some(GpxTrack::default()),
                b"trkseg" => {
                    if let Some(track) = track.as_mut() {
                        track.segments.push(Vec::new());
                    }
                }
                b"trkpt" => point = Some(start_point(e)?),
                b"name" | b"time" => text.clear(),
                _ => {}
            },
            Event::Empty(ref e) if e.name().as_ref() == b"trkpt" => {
                push_point(&mut track, start_point(e)?);
            }
            Event::Text(ref e) => text.push_str(&e.unescape()?),
            Event::End(ref e) => match e.name().as_ref() {
                b"name" if point.is_none() => {
                    if let Some(track) = track.as_mut() {
                        track.name = Some(text.clone());
                    }
                }
                b"time" => {
                    if let Some(point) = point.as_mut() {
                        point.time = Some(parse_timestamp(&text)?);
                    }
                }
                b"trkpt" => {
                    if let Some(point) = point.take() {
                        push_point(&mut track, point);
                    }
                }
                b"trk" => tracks.extend(track.take()),
                _ => {}
            },
            _ => {}
        }
    }

    Ok(tracks)
}

fn push_point(track: &mut Option<GpxTrack>, point: TrackPoint) {
    if let Some(segment) = track.as_mut().and_then(|t| t.segments.last_mut()) {
        segment.push(point);
    }
}

fn start_point(element: &BytesStart) -> Result<TrackPoint> {
    Ok(TrackPoint {
        lat: coordinate(element, "lat")?,
        lon: coordinate(element, "lon")?,
        time: None,
    })
}

fn coordinate(element: &BytesStart, key: &str) -> Result<f64> {
    let attr = element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .ok_or_else(|| Error::InvalidGpx(format!("trkpt without `{key}`")))?;

    std::str::from_utf8(&attr.value)
        .ok()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| {
            Error::InvalidGpx(format!(
                "trkpt `{key}` is not a number: {:?}",
                String::from_utf8_lossy(&attr.value)
            ))
        })
}

fn track_feature(track: &GpxTrack) -> Result<Feature> {
    let mut lines = Vec::with_capacity(track.segments.len());
    let mut times = Vec::with_capacity(track.segments.len());
    let mut first_time = None;

    for segment in &track.segments {
        let mut coords = Vec::with_capacity(segment.len());
        let mut segment_times = Vec::with_capacity(segment.len());

        for point in segment {
            coords.push(vec![point.lon, point.lat]);

            match point.time {
                Some(time) => {
                    let formatted = format_instant(time)?;
                    if first_time.is_none() {
                        first_time = Some(formatted.clone());
                    }
                    segment_times.push(JsonValue::String(formatted));
                }
                None => segment_times.push(JsonValue::Null),
            }
        }

        lines.push(coords);
        times.push(JsonValue::Array(segment_times));
    }

    let (geometry, times) = if lines.len() == 1 {
        (Value::LineString(lines.remove(0)), times.remove(0))
    } else {
        (Value::MultiLineString(lines), JsonValue::Array(times))
    };

    let mut props = JsonObject::new();
    if let Some(name) = &track.name {
        props.insert("name".to_string(), JsonValue::from(name.as_str()));
    }
    props.insert("_gpxType".to_string(), json!("trk"));
    if let Some(time) = first_time {
        props.insert("time".to_string(), JsonValue::String(time));
    }
    props.insert("coordinateProperties".to_string(), json!({ "times": times }));

    Ok(Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geometry)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    })
}

/// Writes every feature of a GeoJSON document as a KML Placemark.
pub fn geojson_to_kml(doc: &GeoJson) -> Result<String> {
    let placemarks: Vec<Kml> = match doc {
        GeoJson::FeatureCollection(collection) => {
            collection.features.iter().map(feature_placemark).collect()
        }
        GeoJson::Feature(feature) => vec![feature_placemark(feature)],
        GeoJson::Geometry(geometry) => vec![Kml::Placemark(Placemark {
            geometry: kml_geometry(&geometry.value),
            ..Default::default()
        })],
    };

    let document = Kml::KmlDocument(KmlDocument {
        version: KmlVersion::V22,
        attrs: HashMap::from([("xmlns".to_string(), KML_NAMESPACE.to_string())]),
        elements: vec![Kml::Document {
            attrs: HashMap::new(),
            elements: placemarks,
        }],
    });

    let mut output = Vec::new();
    KmlWriter::from_writer(&mut output).write(&document)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn feature_placemark(feature: &Feature) -> Kml {
    let name = feature
        .property("name")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    Kml::Placemark(Placemark {
        name,
        geometry: feature
            .geometry
            .as_ref()
            .and_then(|g| kml_geometry(&g.value)),
        ..Default::default()
    })
}

/// Geometries without a KML counterpart here (polygons) are dropped.
fn kml_geometry(value: &Value) -> Option<Geometry> {
    match value {
        Value::Point(position) => {
            let coord = kml_coord(position)?;
            Some(Geometry::Point(Point::new(coord.x, coord.y, coord.z)))
        }
        Value::LineString(positions) => Some(Geometry::LineString(kml_line(positions))),
        Value::MultiLineString(lines) => Some(Geometry::MultiGeometry(MultiGeometry {
            geometries: lines
                .iter()
                .map(|positions| Geometry::LineString(kml_line(positions)))
                .collect(),
            attrs: HashMap::new(),
        })),
        Value::GeometryCollection(geometries) => Some(Geometry::MultiGeometry(MultiGeometry {
            geometries: geometries
                .iter()
                .filter_map(|g| kml_geometry(&g.value))
                .collect(),
            attrs: HashMap::new(),
        })),
        _ => None,
    }
}

fn kml_line(positions: &[Vec<f64>]) -> LineString {
    LineString::from(positions.iter().filter_map(|p| kml_coord(p)).collect::<Vec<_>>())
}

fn kml_coord(position: &[f64]) -> Option<Coord> {
    match position {
        [x, y] => Some(Coord::new(*x, *y, None)),
        [x, y, z, ..] => Some(Coord::new(*x, *y, Some(*z))),
        _ => None,
    }
}
