//! Integration tests for the map view.
//!
//! These tests drive a complete [`MapView`] over the in-memory surface the
//! way a host would: records arrive as GeoJSON, the style load completes
//! asynchronously, the user filters, clicks and switches basemaps.
//!
//! Run with: `cargo test --test map_view_integration`

use chrono::{DateTime, Duration, TimeZone, Utc};

use linemap::config::{ConfigFile, ConfigKey, MapConfig};
use linemap::coord::{haversine_km, Camera, LngLat};
use linemap::feature::{parse_records, FeatureRecord, Severity, Status};
use linemap::filter::RecordFilter;
use linemap::geometry::{collect_intersections, ObstacleKind};
use linemap::measure::{MeasureState, MeasurementTool};
use linemap::surface::{MemorySurface, RenderSurface, SurfaceCall};
use linemap::view::{MapView, ViewOutcome, EVENTS_SOURCE_ID};

// ============================================================================
// Helpers
// ============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn records_json() -> String {
    let started = |hours: i64| (now() - Duration::hours(hours)).to_rfc3339();
    format!(
        r#"{{
        "type": "FeatureCollection",
        "features": [
            {{ "type": "Feature", "id": "ev-1",
               "geometry": {{ "type": "Point", "coordinates": [-46.31, -23.95] }},
               "properties": {{ "severity": "high", "status": "critical", "name": "Tower 14", "start": "{}" }} }},
            {{ "type": "Feature", "id": "ev-2",
               "geometry": {{ "type": "Point", "coordinates": [-46.40, -23.91] }},
               "properties": {{ "severity": "high", "status": "pending", "name": "Tower 22", "start": "{}" }} }},
            {{ "type": "Feature", "id": "ev-3",
               "geometry": {{ "type": "Point", "coordinates": [-46.36, -23.99] }},
               "properties": {{ "severity": "medium", "status": "alert", "name": "<b>Span</b> 7", "start": "{}" }} }}
        ]
    }}"#,
        started(1),
        started(30),
        started(2)
    )
}

fn new_view(config: &MapConfig) -> MapView<MemorySurface> {
    let surface = MemorySurface::new((1280.0, 800.0), Camera::new(LngLat::new(0.0, 0.0), 1.0));
    MapView::new(surface, "map", config)
}

fn load(view: &mut MapView<MemorySurface>) -> ViewOutcome {
    let event = view.surface_mut().complete_style_load();
    view.handle_event(&event)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_time_window() {
    let records = parse_records(&records_json()).unwrap();
    let severities: Vec<Severity> = records.iter().map(|r| r.severity).collect();
    assert_eq!(severities, vec![Severity::High, Severity::High, Severity::Medium]);

    let kept = RecordFilter::new()
        .within(Duration::hours(24))
        .apply_indices(&records, now());
    assert_eq!(kept, vec![0, 2]);
}

#[test]
fn test_scenario_b_single_crossing() {
    let corridor = [
        LngLat::new(0.0, 0.0),
        LngLat::new(2.0, 0.0),
        LngLat::new(4.0, 1.0),
    ];
    let obstacle = vec![vec![LngLat::new(1.0, -1.0), LngLat::new(1.0, 1.0)]];

    let crossings = collect_intersections(&corridor, &obstacle, ObstacleKind::Railway);
    assert_eq!(crossings.len(), 1);
    assert_eq!(crossings[0].coordinate, LngLat::new(1.0, 0.0));
    assert_eq!(crossings[0].tag, ObstacleKind::Railway);
}

#[test]
fn test_scenario_c_fifo_window() {
    let a = LngLat::new(-46.30, -23.95);
    let b = LngLat::new(-46.40, -23.90);
    let c = LngLat::new(-46.35, -24.00);

    let mut tool = MeasurementTool::new();
    tool.toggle_on();
    tool.click(a);
    tool.click(b);
    let distance = tool.click(c).unwrap();

    assert_eq!(tool.points(), vec![b, c]);
    assert_eq!(tool.state(), MeasureState::TwoPoints);
    assert!((distance - haversine_km(b, c)).abs() < 1e-9);
    assert!((distance - haversine_km(a, b)).abs() > 1e-3);
}

// ============================================================================
// Map view sessions
// ============================================================================

#[test]
fn test_session_before_and_after_style_load() {
    let mut view = new_view(&MapConfig::default());
    view.set_records(parse_records(&records_json()).unwrap(), now());
    view.set_filter(RecordFilter::new().within(Duration::hours(24)), now());

    // Nothing reaches the surface before the style is loaded
    assert!(view.surface().source_ids().is_empty());
    assert!(!view.controller().queued_ops().is_empty());

    assert_eq!(load(&mut view), ViewOutcome::Replayed);
    assert!(view.controller().queued_ops().is_empty());
    assert_eq!(view.surface().source(EVENTS_SOURCE_ID).unwrap().data.len(), 2);
    assert_eq!(
        view.controller().layer_order(),
        vec!["events-heat", "events-points"]
    );
}

#[test]
fn test_focus_popup_escapes_fields() {
    let mut view = new_view(&MapConfig::default());
    load(&mut view);
    view.set_records(parse_records(&records_json()).unwrap(), now());

    assert!(view.focus("ev-3"));
    let popup = view.surface().popup().unwrap();
    assert!(popup.html.contains("&lt;b&gt;Span&lt;/b&gt; 7"));
    assert!(!popup.html.contains("<b>Span"));
    assert_eq!(popup.anchor, LngLat::new(-46.36, -23.99));

    let camera = view.surface().camera();
    assert_eq!(camera.center, LngLat::new(-46.36, -23.99));
    assert!(camera.zoom >= 14.0);
}

#[test]
fn test_focus_is_cleared_when_filtered_out() {
    let mut view = new_view(&MapConfig::default());
    load(&mut view);
    view.set_records(parse_records(&records_json()).unwrap(), now());
    assert!(view.focus("ev-2"));

    // ev-2 started 30h ago
    view.set_filter(RecordFilter::new().within(Duration::hours(24)), now());
    assert_eq!(view.focused(), None);
    assert!(view.surface().popup().is_none());

    // And cannot be focused again while filtered out
    assert!(!view.focus("ev-2"));
}

#[test]
fn test_style_swap_keeps_overlays_and_camera() {
    let config = MapConfig::default().with_clustering(Default::default());
    let mut view = new_view(&config);
    load(&mut view);
    view.set_records(parse_records(&records_json()).unwrap(), now());
    view.set_corridor(
        &[LngLat::new(-46.5, -24.0), LngLat::new(-46.2, -23.8)],
        &[vec![LngLat::new(-46.5, -23.8), LngLat::new(-46.2, -24.0)]],
        &[],
    );
    view.set_zoom(11.0);
    let order = view.controller().layer_order();
    let camera = view.surface().camera();

    view.set_basemap("topo");
    // Writes during the swap are queued and land after the reload
    view.set_zoom(8.0);
    assert_eq!(load(&mut view), ViewOutcome::Replayed);

    assert_eq!(view.controller().layer_order(), order);
    assert_eq!(view.surface().camera().center, camera.center);
    assert_eq!(view.surface().source("crossings").unwrap().data.len(), 1);
    assert!(view.surface().layer("events-heat").unwrap().visible);
    assert!(!view.surface().layer("events-points").unwrap().visible);
}

#[test]
fn test_source_data_is_replaced_in_place() {
    let mut view = new_view(&MapConfig::default());
    load(&mut view);
    view.set_records(parse_records(&records_json()).unwrap(), now());
    view.surface_mut().clear_calls();

    let extra = FeatureRecord::point("ev-4", LngLat::new(-46.2, -23.9), Severity::Low, Status::Resolved);
    let mut records = parse_records(&records_json()).unwrap();
    records.push(extra);
    view.set_records(records, now());

    let surface = view.surface();
    assert_eq!(
        surface.count_calls(|c| matches!(c, SurfaceCall::SetSourceData(id) if id == EVENTS_SOURCE_ID)),
        1
    );
    assert_eq!(surface.count_calls(|c| matches!(c, SurfaceCall::RemoveSource(_))), 0);
    assert_eq!(surface.count_calls(|c| matches!(c, SurfaceCall::AddLayer { .. })), 0);
    assert_eq!(surface.source(EVENTS_SOURCE_ID).unwrap().data.len(), 4);
}

#[test]
fn test_view_built_from_config_file() {
    let mut file = ConfigFile::default();
    ConfigKey::MapBasemap.set(&mut file, "streets").unwrap();
    ConfigKey::LayersHeatmapZoomThreshold.set(&mut file, "6").unwrap();
    ConfigKey::MapZoom.set(&mut file, "7").unwrap();

    let mut view = new_view(&MapConfig::from(&file));
    load(&mut view);
    view.set_records(parse_records(&records_json()).unwrap(), now());

    assert_eq!(view.basemap().id, "streets");
    assert_eq!(view.zoom(), 7.0);
    // 7 is above the configured crossover
    assert!(view.surface().layer("events-points").unwrap().visible);
    assert!(!view.surface().layer("events-heat").unwrap().visible);
}

#[test]
fn test_teardown_releases_listeners() {
    let mut view = new_view(&MapConfig::default());
    load(&mut view);
    assert!(view.surface().listener_count() > 0);

    assert!(view.teardown());
    assert_eq!(view.surface().listener_count(), 0);
    assert!(view.surface().is_disposed());

    // Writes after teardown are dropped
    view.set_records(parse_records(&records_json()).unwrap(), now());
    assert!(view.surface().source_ids().is_empty());
}
