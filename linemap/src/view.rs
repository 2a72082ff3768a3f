//! Map view composition.
//!
//! [`MapView`] owns one [`MapSurfaceController`], the [`LayerSyncEngine`]
//! writing to it, and the feature modules drawing through that engine:
//! the event heatmap/points overlay, the corridor crossings, the measurement
//! tool and the event focus. The host feeds it records, filters and corridor
//! geometry, and routes every [`SurfaceEvent`] to [`MapView::handle_event`].
//!
//! Overlays are stacked bottom to top as: event heatmap, event points
//! (clusters above them), crossings, measurement.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::controller::{Dispatch, MapSurfaceController, Notice, SurfaceOp};
use crate::coord::{Camera, LngLat, MAX_ZOOM, MIN_ZOOM};
use crate::feature::FeatureRecord;
use crate::filter::RecordFilter;
use crate::focus::EventFocusController;
use crate::geometry::{collect_intersections, CrossingPoint, CrossingSummary, ObstacleKind};
use crate::layers::{cluster_id, ClusterHeatmapLayer, CrossingLayer, LayerVisibility};
use crate::measure::{MeasurementTool, MEASUREMENT_LINE_LAYER_ID, MEASUREMENT_POINTS_LAYER_ID};
use crate::risk::{RiskAssessment, RiskModel};
use crate::style::{default_basemap, resolve_basemap, Basemap, BASEMAPS};
use crate::surface::{EventKind, RenderSurface, SurfaceEvent};
use crate::sync::LayerSyncEngine;

/// Source id of the event overlay.
pub const EVENTS_SOURCE_ID: &str = "events";

/// What a routed surface event did to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    /// Nothing changed
    Ignored,
    /// The style finished loading and every overlay was replayed
    Replayed,
    /// A style failed to load; see [`MapView::take_notices`]
    StyleFailed,
    /// The click went to the measurement tool
    Measured { distance_km: Option<f64> },
    /// A cluster was clicked and its expansion zoom requested
    ClusterExpanding { cluster_id: u64 },
    /// The camera moved to a cluster's expansion zoom
    ClusterExpanded { zoom: f64 },
    /// A record was focused
    Focused(String),
}

/// One interactive corridor map.
#[derive(Debug)]
pub struct MapView<S: RenderSurface> {
    controller: MapSurfaceController<S>,
    sync: LayerSyncEngine,
    events: ClusterHeatmapLayer,
    crossing_layer: CrossingLayer,
    measurement: MeasurementTool,
    focus: EventFocusController,
    risk: RiskModel,
    records: Vec<FeatureRecord>,
    filter: RecordFilter,
    /// Indices into `records` that pass `filter`
    filtered: Vec<usize>,
    now: DateTime<Utc>,
    crossings: Vec<CrossingPoint>,
    zoom: f64,
    basemap: &'static Basemap,
    mapbox_token: Option<String>,
    terrain: bool,
}

impl<S: RenderSurface> MapView<S> {
    /// Mount a view on `surface` and request the configured basemap.
    ///
    /// The view is usable immediately; writes are queued until the surface
    /// reports its style as loaded.
    pub fn new(surface: S, container: impl Into<String>, config: &MapConfig) -> Self {
        let mapbox_token = config.mapbox_token().map(str::to_string);
        let basemap = resolve_basemap(Some(config.basemap()), mapbox_token.as_deref());
        let camera = config.camera();

        let controller = MapSurfaceController::create(
            surface,
            container,
            camera,
            basemap.style(mapbox_token.as_deref()),
        )
        .with_fallback_style(default_basemap().style(None));

        let mut events =
            ClusterHeatmapLayer::new(EVENTS_SOURCE_ID).with_threshold(config.heatmap_zoom_threshold());
        if let Some(options) = config.clustering() {
            events = events.with_clustering(options);
        }

        let mut view = Self {
            controller,
            sync: LayerSyncEngine::new(),
            events,
            crossing_layer: CrossingLayer,
            measurement: MeasurementTool::new(),
            focus: EventFocusController::new()
                .with_min_zoom(config.focus_min_zoom())
                .with_ease_duration(config.ease_duration_ms()),
            risk: config.risk_model(),
            records: Vec::new(),
            filter: RecordFilter::new(),
            filtered: Vec::new(),
            now: Utc::now(),
            crossings: Vec::new(),
            zoom: camera.zoom,
            basemap,
            mapbox_token,
            terrain: false,
        };
        view.register_listeners();
        view.refresh();

        info!(
            container = view.controller.container(),
            basemap = basemap.id,
            zoom = camera.zoom,
            "Map view created"
        );
        view
    }

    fn register_listeners(&mut self) {
        self.controller.on(EventKind::Click, None);
        let points = self.events.points_layer_id();
        self.controller.on(EventKind::Click, Some(&points));
        self.controller.on(EventKind::MouseEnter, Some(&points));
        self.controller.on(EventKind::MouseLeave, Some(&points));
        if self.events.clustering().is_some() {
            self.controller
                .on(EventKind::Click, Some(&self.events.cluster_layer_id()));
        }
    }

    // ---------------------------------------------------------------------
    // Data
    // ---------------------------------------------------------------------

    /// Replace the record set and re-render with the current filter.
    pub fn set_records(&mut self, records: Vec<FeatureRecord>, now: DateTime<Utc>) {
        debug!(records = records.len(), "Replacing records");
        self.records = records;
        self.now = now;
        self.refresh();
    }

    /// Narrow the records and frame the result.
    ///
    /// Returns the camera the view eases to, or `None` when nothing left
    /// has geometry.
    pub fn set_filter(&mut self, filter: RecordFilter, now: DateTime<Utc>) -> Option<Camera> {
        self.filter = filter;
        self.now = now;
        self.refresh();

        let framed = self.focus.fit_bounds(
            &mut self.controller,
            self.filtered.iter().filter_map(|&i| self.records.get(i)),
        );
        if framed.is_some() {
            self.sync_zoom();
        }
        framed
    }

    /// Recompute the filtered set and push it to the surface.
    ///
    /// A focused record that no longer passes the filter loses its focus.
    pub fn refresh(&mut self) {
        self.filtered = self.filter.apply_indices(&self.records, self.now);
        debug!(
            records = self.records.len(),
            filtered = self.filtered.len(),
            "Refreshing event overlay"
        );

        self.events.sync(
            &mut self.sync,
            &mut self.controller,
            self.filtered.iter().filter_map(|&i| self.records.get(i)),
            self.zoom,
        );
        self.focus.settle(
            &mut self.controller,
            self.filtered.iter().filter_map(|&i| self.records.get(i)),
        );
        self.restack();
    }

    /// Compute the crossings of `corridor` with the given obstacle lines
    /// and render them.
    pub fn set_corridor(
        &mut self,
        corridor: &[LngLat],
        highways: &[Vec<LngLat>],
        railways: &[Vec<LngLat>],
    ) -> CrossingSummary {
        let mut crossings = collect_intersections(corridor, highways, ObstacleKind::Highway);
        crossings.extend(collect_intersections(corridor, railways, ObstacleKind::Railway));
        let summary = CrossingSummary::from_crossings(&crossings);
        info!(
            highway = summary.highway,
            railway = summary.railway,
            "Corridor crossings updated"
        );

        self.crossings = crossings;
        self.crossing_layer
            .sync(&mut self.sync, &mut self.controller, &self.crossings);
        self.restack();
        summary
    }

    /// Risk assessments of the filtered records, highest first.
    pub fn risk_ranking(&self) -> Vec<RiskAssessment> {
        self.risk.rank(self.filtered_records(), &self.crossings)
    }

    // ---------------------------------------------------------------------
    // Map controls
    // ---------------------------------------------------------------------

    /// Switch the base map. Unknown or unavailable ids fall back to the
    /// default imagery.
    pub fn set_basemap(&mut self, id: &str) -> Dispatch {
        let next = resolve_basemap(Some(id), self.mapbox_token.as_deref());
        if next.id == self.basemap.id {
            return Dispatch::Skipped;
        }
        if self.terrain_active() {
            self.controller.reset_terrain();
        }
        info!(from = self.basemap.id, to = next.id, "Switching basemap");
        self.basemap = next;
        self.controller
            .set_style(next.style(self.mapbox_token.as_deref()))
    }

    /// Report a new zoom level, e.g. at the end of a user zoom gesture.
    pub fn set_zoom(&mut self, zoom: f64) -> LayerVisibility {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.events
            .set_zoom(&mut self.sync, &mut self.controller, self.zoom)
    }

    /// Turn terrain on or off. Terrain only shows on basemaps that carry
    /// an elevation source; the request is remembered across switches.
    ///
    /// Returns whether terrain is now shown.
    pub fn set_terrain(&mut self, enabled: bool) -> bool {
        let was_active = self.terrain_active();
        self.terrain = enabled;
        let active = self.terrain_active();
        if enabled && !active {
            warn!(basemap = self.basemap.id, "Basemap has no terrain, keeping it flat");
        }
        match (was_active, active) {
            (false, true) => {
                self.controller.enable_terrain();
            }
            (true, false) => self.controller.reset_terrain(),
            _ => {}
        }
        active
    }

    /// Arm or disarm the measurement tool. Returns the new state.
    pub fn toggle_measurement(&mut self) -> bool {
        let active = self.measurement.toggle();
        self.measurement.render(&mut self.sync, &mut self.controller);
        self.restack();
        active
    }

    /// Focus a record of the filtered set.
    pub fn focus(&mut self, id: &str) -> bool {
        let focused = self.focus.focus(
            &mut self.controller,
            self.filtered.iter().filter_map(|&i| self.records.get(i)),
            id,
        );
        if focused {
            self.sync_zoom();
        }
        focused
    }

    /// Drop the focus and close the popup.
    pub fn clear_focus(&mut self) -> bool {
        self.focus.clear(&mut self.controller)
    }

    /// Ask the surface to re-read its container size.
    pub fn resize(&mut self) -> Dispatch {
        self.controller.resize()
    }

    // ---------------------------------------------------------------------
    // Surface events
    // ---------------------------------------------------------------------

    /// Route a surface callback into the view.
    pub fn handle_event(&mut self, event: &SurfaceEvent) -> ViewOutcome {
        match event {
            SurfaceEvent::StyleLoaded => {
                if !self.controller.on_surface_event(event) {
                    return ViewOutcome::Ignored;
                }
                self.sync.replay(&mut self.controller);
                if self.terrain_active() {
                    self.controller.enable_terrain();
                }
                ViewOutcome::Replayed
            }
            SurfaceEvent::StyleError { .. } => {
                self.controller.on_surface_event(event);
                self.basemap = self.basemap_for_current_style();
                ViewOutcome::StyleFailed
            }
            SurfaceEvent::Click {
                point,
                layer_id,
                properties,
            } => self.on_click(*point, layer_id.as_deref(), properties.as_ref()),
            SurfaceEvent::ClusterExpansion {
                source_id,
                cluster_id,
                center,
                zoom,
            } => {
                if source_id != self.events.source_id() {
                    return ViewOutcome::Ignored;
                }
                debug!(cluster_id, zoom, "Expanding cluster");
                let camera = self.controller.camera().looking_at(*center, *zoom);
                self.controller.dispatch(SurfaceOp::EaseTo {
                    camera,
                    duration_ms: self.focus.ease_duration_ms(),
                });
                self.set_zoom(camera.zoom);
                ViewOutcome::ClusterExpanded { zoom: camera.zoom }
            }
            SurfaceEvent::MouseMove { .. } => ViewOutcome::Ignored,
        }
    }

    fn on_click(
        &mut self,
        point: LngLat,
        layer_id: Option<&str>,
        properties: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> ViewOutcome {
        if self.measurement.is_active() {
            let distance_km = self.measurement.click(point);
            self.measurement.render(&mut self.sync, &mut self.controller);
            return ViewOutcome::Measured { distance_km };
        }

        let (Some(layer_id), Some(properties)) = (layer_id, properties) else {
            return ViewOutcome::Ignored;
        };

        if self.events.is_cluster_layer(layer_id) {
            let Some(id) = cluster_id(properties) else {
                return ViewOutcome::Ignored;
            };
            self.controller.dispatch(SurfaceOp::ExpandCluster {
                source_id: self.events.source_id().to_string(),
                cluster_id: id,
                center: point,
            });
            return ViewOutcome::ClusterExpanding { cluster_id: id };
        }

        if self.events.is_feature_layer(layer_id) {
            let focused = self.focus.focus_clicked(
                &mut self.controller,
                self.filtered.iter().filter_map(|&i| self.records.get(i)),
                properties,
            );
            if focused {
                self.sync_zoom();
                if let Some(id) = self.focus.focused() {
                    return ViewOutcome::Focused(id.to_string());
                }
            }
        }
        ViewOutcome::Ignored
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Bottom-to-top order of every overlay layer.
    fn layer_stack(&self) -> Vec<String> {
        vec![
            self.events.heatmap_layer_id(),
            self.events.points_layer_id(),
            self.events.cluster_layer_id(),
            self.events.cluster_count_layer_id(),
            self.crossing_layer.layer_id().to_string(),
            MEASUREMENT_LINE_LAYER_ID.to_string(),
            MEASUREMENT_POINTS_LAYER_ID.to_string(),
        ]
    }

    fn restack(&mut self) {
        let stack = self.layer_stack();
        self.sync.apply_order(&mut self.controller, stack);
    }

    /// Follow the surface camera after a camera move.
    fn sync_zoom(&mut self) {
        let zoom = self.controller.camera().zoom;
        if zoom != self.zoom {
            self.set_zoom(zoom);
        }
    }

    fn terrain_active(&self) -> bool {
        self.terrain && self.basemap.terrain
    }

    fn basemap_for_current_style(&self) -> &'static Basemap {
        let token = self.mapbox_token.as_deref();
        BASEMAPS
            .iter()
            .find(|b| b.style(token) == *self.controller.style())
            .unwrap_or(self.basemap)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn controller(&self) -> &MapSurfaceController<S> {
        &self.controller
    }

    pub fn surface(&self) -> &S {
        self.controller.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.controller.surface_mut()
    }

    pub fn sync_engine(&self) -> &LayerSyncEngine {
        &self.sync
    }

    pub fn events_layer(&self) -> &ClusterHeatmapLayer {
        &self.events
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Records passing the current filter, in input order.
    pub fn filtered_records(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.filtered.iter().filter_map(|&i| self.records.get(i))
    }

    pub fn crossings(&self) -> &[CrossingPoint] {
        &self.crossings
    }

    pub fn measurement(&self) -> &MeasurementTool {
        &self.measurement
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.focused()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn basemap(&self) -> &'static Basemap {
        self.basemap
    }

    pub fn terrain_enabled(&self) -> bool {
        self.terrain_active()
    }

    /// Drain non-fatal conditions for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.controller.take_notices()
    }

    /// Remove every listener and dispose the surface. Returns `false` if
    /// the view was already torn down.
    pub fn teardown(&mut self) -> bool {
        info!(container = self.controller.container(), "Tearing down map view");
        self.controller.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SurfaceState;
    use crate::feature::{Severity, Status};
    use crate::surface::{ClusterOptions, MemorySurface, SurfaceCall};
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Map};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, lon: f64, lat: f64, severity: Severity) -> FeatureRecord {
        FeatureRecord::point(id, LngLat::new(lon, lat), severity, Status::Pending)
            .with_started_at(now() - Duration::hours(1))
            .with_property("name", format!("Event {}", id))
    }

    fn records() -> Vec<FeatureRecord> {
        vec![
            record("a", -46.30, -23.95, Severity::High),
            record("b", -46.40, -23.90, Severity::Low),
            record("c", -46.35, -23.99, Severity::Medium),
        ]
    }

    fn surface() -> MemorySurface {
        MemorySurface::new((1024.0, 768.0), Camera::new(LngLat::new(0.0, 0.0), 1.0))
    }

    fn ready_view(config: &MapConfig) -> MapView<MemorySurface> {
        let mut view = MapView::new(surface(), "map", config);
        let loaded = view.surface_mut().complete_style_load();
        assert_eq!(view.handle_event(&loaded), ViewOutcome::Replayed);
        view
    }

    #[test]
    fn test_writes_before_load_are_replayed() {
        let mut view = MapView::new(surface(), "map", &MapConfig::default());
        view.set_records(records(), now());
        assert!(view.surface().source(EVENTS_SOURCE_ID).is_none());

        let loaded = view.surface_mut().complete_style_load();
        assert_eq!(view.handle_event(&loaded), ViewOutcome::Replayed);

        let source = view.surface().source(EVENTS_SOURCE_ID).unwrap();
        assert_eq!(source.data.len(), 3);
        assert_eq!(view.controller().state(), SurfaceState::Ready);
    }

    #[test]
    fn test_layer_stack_order() {
        let mut view = ready_view(&MapConfig::default());
        view.set_corridor(
            &[LngLat::new(-46.5, -24.0), LngLat::new(-46.2, -23.8)],
            &[vec![LngLat::new(-46.5, -23.8), LngLat::new(-46.2, -24.0)]],
            &[],
        );
        view.toggle_measurement();
        view.set_records(records(), now());

        assert_eq!(
            view.controller().layer_order(),
            vec![
                "events-heat",
                "events-points",
                "crossings-points",
                "measurement-line",
                "measurement-points",
            ]
        );
    }

    #[test]
    fn test_zoom_crossover_is_exclusive() {
        let mut view = ready_view(&MapConfig::default().with_heatmap_zoom_threshold(9.0));
        view.set_records(records(), now());

        let below = view.set_zoom(8.99);
        assert!(below.heatmap && !below.points);
        assert!(!view.surface().layer("events-points").unwrap().visible);

        let at = view.set_zoom(9.0);
        assert!(!at.heatmap && at.points);
        assert!(view.surface().layer("events-points").unwrap().visible);
        assert!(!view.surface().layer("events-heat").unwrap().visible);
    }

    #[test]
    fn test_filter_clears_focus() {
        let mut view = ready_view(&MapConfig::default());
        view.set_records(records(), now());
        assert!(view.focus("a"));
        assert!(view.surface().popup().is_some());

        view.set_filter(RecordFilter::new().with_severity(Severity::Low), now());
        assert_eq!(view.focused(), None);
        assert!(view.surface().popup().is_none());
    }

    #[test]
    fn test_focus_outside_filter_is_rejected() {
        let mut view = ready_view(&MapConfig::default());
        view.set_records(records(), now());
        view.set_filter(RecordFilter::new().with_severity(Severity::High), now());

        assert!(!view.focus("b"));
        assert!(view.focus("a"));
        assert_eq!(view.focused(), Some("a"));
        assert!(view.zoom() >= 14.0);
    }

    #[test]
    fn test_click_on_point_focuses() {
        let mut view = ready_view(&MapConfig::default());
        view.set_records(records(), now());
        view.set_zoom(12.0);

        let click = view.surface().click_feature("events-points", "c").unwrap();
        assert_eq!(view.handle_event(&click), ViewOutcome::Focused("c".to_string()));
        assert!(view.surface().popup().unwrap().html.contains("Event c"));
    }

    #[test]
    fn test_measurement_takes_clicks() {
        let mut view = ready_view(&MapConfig::default());
        view.set_records(records(), now());
        view.set_zoom(12.0);
        assert!(view.toggle_measurement());

        let click = view.surface().click_feature("events-points", "a").unwrap();
        assert_eq!(
            view.handle_event(&click),
            ViewOutcome::Measured { distance_km: None }
        );
        let second = view.surface().click_map(LngLat::new(-46.30, -23.86));
        match view.handle_event(&second) {
            ViewOutcome::Measured {
                distance_km: Some(km),
            } => assert!((km - 10.0).abs() < 0.1, "{}", km),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(view.focused(), None);

        assert!(!view.toggle_measurement());
        let source = view.surface().source("measurement").unwrap();
        assert!(source.data.is_empty());
    }

    #[test]
    fn test_click_on_empty_map_is_ignored() {
        let mut view = ready_view(&MapConfig::default());
        let click = view.surface().click_map(LngLat::new(0.0, 0.0));
        assert_eq!(view.handle_event(&click), ViewOutcome::Ignored);
    }

    #[test]
    fn test_cluster_click_expands() {
        let config = MapConfig::default().with_clustering(ClusterOptions::default());
        let mut view = ready_view(&config);
        view.set_records(records(), now());
        view.set_zoom(10.0);
        view.surface_mut().set_cluster_expansion_zoom(13.0);

        let mut properties = Map::new();
        properties.insert("cluster".into(), json!(true));
        properties.insert("cluster_id".into(), json!(7));
        properties.insert("point_count".into(), json!(2));
        let click = SurfaceEvent::Click {
            point: LngLat::new(-46.33, -23.96),
            layer_id: Some("events-clusters".to_string()),
            properties: Some(properties),
        };
        assert_eq!(
            view.handle_event(&click),
            ViewOutcome::ClusterExpanding { cluster_id: 7 }
        );

        let events = view.surface_mut().take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            view.handle_event(&events[0]),
            ViewOutcome::ClusterExpanded { zoom: 13.0 }
        );
        assert_eq!(view.surface().camera().zoom, 13.0);
        assert_eq!(view.zoom(), 13.0);
    }

    #[test]
    fn test_basemap_swap_replays_overlays() {
        let mut view = ready_view(&MapConfig::default());
        view.set_records(records(), now());
        let before = view.controller().layer_order();

        assert_eq!(view.set_basemap("streets"), Dispatch::Applied);
        assert_eq!(view.controller().state(), SurfaceState::StyleSwapping);
        assert_eq!(view.set_basemap("streets"), Dispatch::Skipped);

        let loaded = view.surface_mut().complete_style_load();
        assert_eq!(view.handle_event(&loaded), ViewOutcome::Replayed);
        assert_eq!(view.controller().layer_order(), before);
        assert_eq!(view.surface().source(EVENTS_SOURCE_ID).unwrap().data.len(), 3);
    }

    #[test]
    fn test_failed_swap_restores_previous_basemap() {
        let mut view = ready_view(&MapConfig::default());
        view.set_basemap("topo");
        view.surface_mut().fail_next_style_load("404");

        let failed = view.surface_mut().complete_style_load();
        assert_eq!(view.handle_event(&failed), ViewOutcome::StyleFailed);
        assert_eq!(view.basemap().id, "imagery");
        assert_eq!(view.take_notices().len(), 1);

        let loaded = view.surface_mut().complete_style_load();
        assert_eq!(view.handle_event(&loaded), ViewOutcome::Replayed);
    }

    #[test]
    fn test_mapbox_basemap_without_token_uses_default() {
        let view = MapView::new(
            surface(),
            "map",
            &MapConfig::default().with_basemap("mapbox-outdoors"),
        );
        assert_eq!(view.basemap().id, "imagery");
    }

    #[test]
    fn test_terrain_follows_basemap() {
        let config = MapConfig::default().with_mapbox_token("pk.test");
        let mut view = ready_view(&config);

        // Imagery has no elevation source
        assert!(!view.set_terrain(true));
        assert!(view.surface().terrain().is_none());

        view.set_basemap("mapbox-outdoors");
        let loaded = view.surface_mut().complete_style_load();
        view.handle_event(&loaded);
        assert!(view.terrain_enabled());
        assert!(view.surface().terrain().is_some());

        assert!(!view.set_terrain(false));
        assert!(view.surface().terrain().is_none());
    }

    #[test]
    fn test_corridor_summary_and_ranking() {
        let mut view = ready_view(&MapConfig::default());
        view.set_records(records(), now());
        let summary = view.set_corridor(
            &[LngLat::new(-46.5, -24.0), LngLat::new(-46.2, -23.8)],
            &[vec![LngLat::new(-46.5, -23.8), LngLat::new(-46.2, -24.0)]],
            &[vec![LngLat::new(-46.35, -24.1), LngLat::new(-46.35, -23.7)]],
        );
        assert_eq!(summary.highway, 1);
        assert_eq!(summary.railway, 1);
        assert_eq!(view.surface().source("crossings").unwrap().data.len(), 2);

        let ranking = view.risk_ranking();
        assert_eq!(ranking.len(), 3);
        for pair in ranking.windows(2) {
            assert!(pair[0].composite_score >= pair[1].composite_score);
        }
    }

    #[test]
    fn test_teardown_disposes_once() {
        let mut view = ready_view(&MapConfig::default());
        assert!(view.teardown());
        assert!(view.surface().is_disposed());
        assert!(!view.teardown());
        assert_eq!(
            view.surface()
                .count_calls(|c| matches!(c, SurfaceCall::Dispose)),
            1
        );
    }
}
