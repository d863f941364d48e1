use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempdir::TempDir;

const SAMPLE_EXPORT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/account_activity.csv");
const SECOND_EXPORT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/second_export.csv");
const NO_LOCATION_EXPORT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/no_location.csv");
const MALFORMED_EXPORT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/malformed.csv");

fn sample_export() -> &'static str {
    include_str!("../samples/account_activity.csv")
}

fn convert_output(args: &[&str]) -> Vec<u8> {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone()
}

#[test]
fn test_convert_separate_tracks() {
    let output = convert_output(&[SAMPLE_EXPORT]);

    let gpx: gpx::Gpx = gpx::read(output.as_slice()).unwrap();
    assert_eq!(
        gpx.creator.as_deref(),
        Some("waze2gpx - https://github.com/TheStalwart/waze2gpx")
    );
    assert_eq!(gpx.tracks.len(), 4);
    for track in &gpx.tracks {
        assert_eq!(track.segments.len(), 1);
        assert!(track.segments[0].points[0].time.is_some());
    }

    // Sorted by start time, not file order.
    assert_eq!(
        gpx.tracks[0].name.as_deref(),
        Some("Waze Trip 2024-01-05 08:00:00")
    );
    assert_eq!(
        gpx.tracks[3].name.as_deref(),
        Some("Waze Trip 2024-09-20 07:15:30")
    );
}

#[test]
fn test_convert_single_track_multi_segment() {
    let output = convert_output(&[SAMPLE_EXPORT, "--merge-mode", "single-track-multi-segment"]);

    let gpx: gpx::Gpx = gpx::read(output.as_slice()).unwrap();
    assert_eq!(gpx.tracks.len(), 1);
    assert_eq!(gpx.tracks[0].segments.len(), 4);
    assert_eq!(
        gpx.tracks[0].name.as_deref(),
        Some("Waze History 2024-01-05 - 2024-09-20")
    );
}

#[test]
fn test_convert_merge_mode_alias() {
    let output = convert_output(&[SAMPLE_EXPORT, "--merge-mode", "trkseg"]);
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("<trk>").count(), 1);
    assert_eq!(text.matches("<trkseg>").count(), 4);
}

#[test]
fn test_convert_axis_order() {
    let output = convert_output(&[SAMPLE_EXPORT]);
    let text = String::from_utf8(output).unwrap();

    assert!(text.contains(r#"<trkpt lat="56.879377" lon="24.264584"><time>2024-09-18T18:03:04Z</time></trkpt>"#));
    assert!(text.contains(r#"<trkpt lat="56.9355" lon="24.175612"><time>2024-02-18T10:35:00Z</time></trkpt>"#));
    assert!(text.contains(r#"<trkpt lat="56.989057" lon="24.237699"><time>2024-02-18T10:32:03Z</time></trkpt>"#));
}

#[test]
fn test_convert_time_window_is_inclusive() {
    let output = convert_output(&[
        SAMPLE_EXPORT,
        "--start",
        "2024-02-18 10:32:03 UTC",
        "--end",
        "2024-09-18T18:03:04Z",
    ]);

    let gpx: gpx::Gpx = gpx::read(output.as_slice()).unwrap();
    assert_eq!(gpx.tracks.len(), 2);
    assert_eq!(
        gpx.tracks[0].name.as_deref(),
        Some("Waze Trip 2024-02-18 10:32:03")
    );
    assert_eq!(
        gpx.tracks[1].name.as_deref(),
        Some("Waze Trip 2024-09-18 18:03:04")
    );
}

#[test]
fn test_convert_empty_window_writes_nothing() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg(SAMPLE_EXPORT)
        .arg("--start")
        .arg("2023-01-01T00:00:00Z")
        .arg("--end")
        .arg("2023-12-31T00:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_convert_reads_stdin() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .write_stdin(sample_export())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains("<gpx"))
        .stdout(predicate::str::contains("</gpx>"));
}

#[test]
fn test_convert_multiple_files() {
    let output = convert_output(&[SAMPLE_EXPORT, SECOND_EXPORT]);

    let gpx: gpx::Gpx = gpx::read(output.as_slice()).unwrap();
    assert_eq!(gpx.tracks.len(), 5);
    assert_eq!(
        gpx.tracks[2].name.as_deref(),
        Some("Waze Trip 2024-03-10 12:00:00")
    );
}

#[test]
fn test_convert_geojson() {
    let output = convert_output(&[SAMPLE_EXPORT, "--format", "geojson"]);

    let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(doc["type"], "FeatureCollection");
    let features = doc["features"].as_array().unwrap();
    assert_eq!(features.len(), 4);
    assert_eq!(features[0]["geometry"]["type"], "LineString");
    assert_eq!(
        features[0]["properties"]["name"],
        "Waze Trip 2024-01-05 08:00:00"
    );
}

#[test]
fn test_convert_kml() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    let output = cmd
        .arg("convert")
        .arg(SAMPLE_EXPORT)
        .arg("--format")
        .arg("kml")
        .assert()
        .success()
        .stdout(predicate::str::contains("<kml"))
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("<Placemark").count(), 4);
}

#[test]
fn test_convert_to_file() {
    let dir = TempDir::new("waze2gpx").unwrap();
    let path = dir.path().join("out.gpx");

    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg(SAMPLE_EXPORT)
        .arg("--output")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let gpx: gpx::Gpx = gpx::read(fs::read(&path).unwrap().as_slice()).unwrap();
    assert_eq!(gpx.tracks.len(), 4);
}

#[test]
fn test_convert_without_location_section_fails() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg(NO_LOCATION_EXPORT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load any trips!"));
}

#[test]
fn test_convert_malformed_record_fails_with_line() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg(MALFORMED_EXPORT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 4"))
        .stderr(predicate::str::contains("(24.237699)"));
}

#[test]
fn test_convert_invalid_window_fails() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg(SAMPLE_EXPORT)
        .arg("--start")
        .arg("2024-09-18T18:03:04Z")
        .arg("--end")
        .arg("2024-02-18T10:32:03Z")
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end"));

    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg(SAMPLE_EXPORT)
        .arg("--start")
        .arg("last tuesday")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid timestamp"));
}

#[test]
fn test_convert_missing_file_fails() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("convert")
        .arg("does/not/exist.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_export_writes_all_formats() {
    let dir = TempDir::new("waze2gpx").unwrap();

    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("export")
        .arg(SAMPLE_EXPORT)
        .arg("--output-dir")
        .arg(dir.path())
        .arg("--end")
        .arg("2024-09-18 18:03:04+00")
        .assert()
        .success()
        .stdout(predicate::str::contains("waze_history_2024-01-05_2024-09-18.gpx"));

    let gpx_path = dir.path().join("waze_history_2024-01-05_2024-09-18.gpx");
    let geojson_path = dir.path().join("waze_history_2024-01-05_2024-09-18.geojson");
    let kml_path = dir.path().join("waze_history_2024-01-05_2024-09-18.kml");

    let gpx: gpx::Gpx = gpx::read(fs::read(&gpx_path).unwrap().as_slice()).unwrap();
    assert_eq!(gpx.tracks.len(), 3);

    let doc: serde_json::Value = serde_json::from_slice(&fs::read(&geojson_path).unwrap()).unwrap();
    assert_eq!(doc["features"].as_array().map(Vec::len), Some(3));

    let kml = fs::read_to_string(&kml_path).unwrap();
    assert_eq!(kml.matches("<Placemark").count(), 3);
}

#[test]
fn test_export_empty_window_writes_no_files() {
    let dir = TempDir::new("waze2gpx").unwrap();
    let out = dir.path().join("out");

    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("export")
        .arg(SAMPLE_EXPORT)
        .arg("--output-dir")
        .arg(&out)
        .arg("--start")
        .arg("2025-01-01T00:00:00Z")
        .arg("--end")
        .arg("2025-02-01T00:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(!out.exists());
}

#[test]
fn test_list_trips() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("list")
        .arg(SAMPLE_EXPORT)
        .arg("--start")
        .arg("2024-02-01T00:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed trips: 4"))
        .stdout(predicate::str::contains("Selected trips: 3"))
        .stdout(predicate::str::contains(
            "2024-02-18T10:32:03Z\t2024-02-18T10:35:00Z\t3 points",
        ))
        .stdout(predicate::str::contains("2024-01-05T08:00:00Z").not());
}

#[test]
fn test_jump_next_and_prev() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("jump")
        .arg(SAMPLE_EXPORT)
        .arg("--from")
        .arg("2024-02-18T10:32:03Z")
        .arg("--direction")
        .arg("next")
        .assert()
        .success()
        .stdout("2024-09-18T18:03:04Z\n");

    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("jump")
        .arg(SAMPLE_EXPORT)
        .arg("--from")
        .arg("2024-02-18T10:32:03Z")
        .arg("--direction")
        .arg("prev")
        .assert()
        .success()
        .stdout("2024-01-05T08:00:00Z\n");
}

#[test]
fn test_jump_past_last_trip_fails() {
    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("jump")
        .arg(SAMPLE_EXPORT)
        .arg("--from")
        .arg("2024-09-20T07:15:30Z")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no next trip after"));
}

#[test]
fn test_export_keeps_out_of_range_coordinates() {
    let dir = TempDir::new("waze2gpx").unwrap();
    let export = "Location details\nDate(UTC),Location\n\
                  2024-02-18 10:32:03 UTC,(124.1 56.9)|2024-02-18 10:35:00 UTC(120.5 24.1)\n";

    let mut cmd = cargo_bin_cmd!("waze2gpx");
    cmd.arg("export")
        .arg("--output-dir")
        .arg(dir.path())
        .write_stdin(export)
        .assert()
        .success();

    let stem = dir.path().join("waze_history_2024-02-18_2024-02-18");
    let gpx = fs::read_to_string(stem.with_extension("gpx")).unwrap();
    assert!(gpx.contains(r#"lat="120.5" lon="24.1""#));

    let doc: serde_json::Value =
        serde_json::from_slice(&fs::read(stem.with_extension("geojson")).unwrap()).unwrap();
    assert_eq!(doc["features"][0]["geometry"]["coordinates"][1][1], 120.5);

    let kml = fs::read_to_string(stem.with_extension("kml")).unwrap();
    assert!(kml.contains("24.1,120.5"));
}
