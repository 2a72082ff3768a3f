//! Integration tests for the `linemap` binary.
//!
//! Each test runs the real binary with `HOME` pointed at a temporary
//! directory, so configuration and log files never touch the user's
//! `~/.linemap`.
//!
//! Run with: `cargo test -p linemap-cli --test cli_workflow`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const RECORDS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "id": "span-1",
      "geometry": { "type": "Point", "coordinates": [0.5, 0.001] },
      "properties": { "severity": "high", "status": "critical", "name": "Span 1", "span_length": 410.0 } },
    { "type": "Feature", "id": "span-2",
      "geometry": { "type": "Point", "coordinates": [1.5, 0.002] },
      "properties": { "severity": "low", "status": "resolved", "name": "Span 2", "span_length": 180.0 } },
    { "type": "Feature", "id": "far-away",
      "geometry": { "type": "Point", "coordinates": [10.0, 10.0] },
      "properties": { "severity": "medium", "name": "Far" } }
  ]
}"#;

const CORRIDOR: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "id": "line-1",
      "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [2.0, 0.0], [4.0, 1.0]] },
      "properties": {} }
  ]
}"#;

const RAILWAYS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "id": "rail-1",
      "geometry": { "type": "LineString", "coordinates": [[1.0, -1.0], [1.0, 1.0]] },
      "properties": {} }
  ]
}"#;

/// Temporary home directory holding the GeoJSON inputs.
struct Workspace {
    home: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in [
            ("records.geojson", RECORDS),
            ("corridor.geojson", CORRIDOR),
            ("railways.geojson", RAILWAYS),
        ] {
            fs::write(home.path().join(name), content).expect("Failed to write input");
        }
        Self { home }
    }

    fn path(&self, name: &str) -> String {
        self.home.path().join(name).to_string_lossy().into_owned()
    }

    fn run(&self, args: &[&str]) -> Output {
        run_cli(self.home.path(), args)
    }
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_linemap"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded and return its stdout.
fn assert_success(output: &Output, context: &str) -> String {
    assert!(
        output.status.success(),
        "{} failed:\nstdout: {}\nstderr: {}",
        context,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stdout_json(output: &Output, context: &str) -> serde_json::Value {
    let stdout = assert_success(output, context);
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}

// ============================================================================
// distance
// ============================================================================

#[test]
fn test_distance_one_degree_of_longitude_at_equator() {
    let ws = Workspace::new();
    let stdout = assert_success(&ws.run(&["distance", "0,0", "1,0", "--raw"]), "distance");

    let km: f64 = stdout.trim().parse().expect("raw distance is a number");
    assert!((km - 111.195).abs() < 0.01, "got {}", km);
}

#[test]
fn test_distance_accepts_negative_coordinates() {
    let ws = Workspace::new();
    let stdout = assert_success(
        &ws.run(&["distance", "-46.63,-23.55", "-46.63,-23.56"]),
        "distance",
    );
    assert!(stdout.trim().ends_with(" m") || stdout.trim().ends_with(" km"));
}

#[test]
fn test_distance_rejects_out_of_range_latitude() {
    let ws = Workspace::new();
    let output = ws.run(&["distance", "0,95", "1,0"]);
    assert!(!output.status.success());
}

// ============================================================================
// analyze
// ============================================================================

#[test]
fn test_analyze_reports_crossings_and_ranking() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "analyze",
        &ws.path("records.geojson"),
        "--corridor",
        &ws.path("corridor.geojson"),
        "--railways",
        &ws.path("railways.geojson"),
        "--json",
    ]);
    let report = stdout_json(&output, "analyze");

    assert_eq!(report["summary"]["railway"], 1);
    assert_eq!(report["summary"]["highway"], 0);
    assert_eq!(report["crossings"][0]["tag"], "railway");
    assert_eq!(report["ranking"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_analyze_buffer_drops_distant_records() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "analyze",
        &ws.path("records.geojson"),
        "--corridor",
        &ws.path("corridor.geojson"),
        "--buffer",
        "1000",
        "--json",
    ]);
    let report = stdout_json(&output, "analyze --buffer");

    let ids: Vec<&str> = report["ranking"]
        .as_array()
        .expect("ranking array")
        .iter()
        .filter_map(|r| r["record_id"].as_str())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&"far-away"));
}

#[test]
fn test_analyze_missing_corridor_file_fails() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "analyze",
        &ws.path("records.geojson"),
        "--corridor",
        &ws.path("missing.geojson"),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.geojson"));
}

// ============================================================================
// preview
// ============================================================================

#[test]
fn test_preview_json_lists_overlays() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "preview",
        &ws.path("records.geojson"),
        "--corridor",
        &ws.path("corridor.geojson"),
        "--railways",
        &ws.path("railways.geojson"),
        "--severity",
        "high",
        "--measure",
        "0,0",
        "--measure",
        "1,0",
        "--json",
    ]);
    let report = stdout_json(&output, "preview");

    assert_eq!(report["state"], "ready");
    assert_eq!(report["records"], 3);
    assert_eq!(report["filtered"], 1);

    let layers: Vec<&str> = report["layers"]
        .as_array()
        .expect("layers array")
        .iter()
        .filter_map(|l| l["id"].as_str())
        .collect();
    assert!(layers.contains(&"events-heat"));
    assert!(layers.contains(&"events-points"));
    assert!(layers.contains(&"crossings-points"));

    let km = report["measurement_km"].as_f64().expect("measurement");
    assert!((km - 111.195).abs() < 0.01);
}

#[test]
fn test_preview_focus_outside_filter_is_reported() {
    let ws = Workspace::new();
    let stdout = assert_success(
        &ws.run(&[
            "preview",
            &ws.path("records.geojson"),
            "--severity",
            "low",
            "--focus",
            "span-1",
        ]),
        "preview --focus",
    );
    assert!(stdout.contains("Record 'span-1' is not in the filtered set"));
}

#[test]
fn test_preview_rejects_negative_window() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "preview",
        &ws.path("records.geojson"),
        "--within-hours=-5",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--within-hours"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_set_then_get() {
    let ws = Workspace::new();
    let set = assert_success(&ws.run(&["config", "set", "map.zoom", "9.5"]), "config set");
    assert_eq!(set.trim(), "map.zoom = 9.5");

    let get = assert_success(&ws.run(&["config", "get", "map.zoom"]), "config get");
    assert_eq!(get.trim(), "9.5");

    let config = fs::read_to_string(ws.home.path().join(".linemap").join("config.ini"))
        .expect("config file written");
    assert!(config.contains("[map]"));
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "set", "map.center_lat", "-91"]);
    assert!(!output.status.success());

    let get = assert_success(&ws.run(&["config", "get", "map.center_lat"]), "config get");
    assert_ne!(get.trim(), "-91");
}

#[test]
fn test_config_unknown_key_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "get", "map.colour"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("map.colour"));
}
