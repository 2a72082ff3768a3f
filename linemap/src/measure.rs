//! Two-point distance measurement.
//!
//! While armed, every map click is recorded in a window of the last two
//! points. Once two points exist the great-circle distance between them is
//! available and a dashed line joins them on the map.
//!
//! # Example
//!
//! ```
//! use linemap::coord::LngLat;
//! use linemap::measure::{MeasureState, MeasurementTool};
//!
//! let mut tool = MeasurementTool::new();
//! tool.click(LngLat::new(0.0, 0.0)); // ignored while idle
//! assert_eq!(tool.state(), MeasureState::Idle);
//!
//! tool.toggle_on();
//! tool.click(LngLat::new(0.0, 0.0));
//! let km = tool.click(LngLat::new(0.0, 1.0)).unwrap();
//! assert!((km - 111.19).abs() < 0.01);
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::controller::{Dispatch, MapSurfaceController};
use crate::coord::{haversine_km, LngLat};
use crate::feature::{Feature, FeatureCollection, Geometry};
use crate::paint::MEASUREMENT_COLOR;
use crate::surface::{LayerDescriptor, LayerKind, RenderSurface, SourceDescriptor};
use crate::sync::LayerSyncEngine;

pub const MEASUREMENT_SOURCE_ID: &str = "measurement";
pub const MEASUREMENT_LINE_LAYER_ID: &str = "measurement-line";
pub const MEASUREMENT_POINTS_LAYER_ID: &str = "measurement-points";

/// Number of points a measurement keeps.
const WINDOW: usize = 2;

/// Observable state of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    Idle,
    Armed,
    OnePoint,
    TwoPoints,
}

impl MeasureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureState::Idle => "idle",
            MeasureState::Armed => "armed",
            MeasureState::OnePoint => "one_point",
            MeasureState::TwoPoints => "two_points",
        }
    }
}

impl fmt::Display for MeasureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Click-driven distance tool.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTool {
    active: bool,
    points: VecDeque<LngLat>,
    distance_km: Option<f64>,
}

impl MeasurementTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MeasureState {
        match (self.active, self.points.len()) {
            (false, _) => MeasureState::Idle,
            (true, 0) => MeasureState::Armed,
            (true, 1) => MeasureState::OnePoint,
            (true, _) => MeasureState::TwoPoints,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Recorded points, oldest first.
    pub fn points(&self) -> Vec<LngLat> {
        self.points.iter().copied().collect()
    }

    /// Distance between the two recorded points, in kilometres.
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    /// Start capturing clicks. Returns `false` if already armed.
    pub fn toggle_on(&mut self) -> bool {
        if self.active {
            return false;
        }
        debug!("Measurement armed");
        self.active = true;
        true
    }

    /// Stop capturing and forget points and distance.
    ///
    /// Returns `false` if the tool was already idle.
    pub fn toggle_off(&mut self) -> bool {
        if !self.active {
            return false;
        }
        debug!("Measurement cleared");
        self.active = false;
        self.points.clear();
        self.distance_km = None;
        true
    }

    /// Flip between idle and armed; returns whether the tool is now armed.
    pub fn toggle(&mut self) -> bool {
        if self.active {
            self.toggle_off();
        } else {
            self.toggle_on();
        }
        self.active
    }

    /// Record a click. The oldest point is dropped once two are held.
    ///
    /// Returns the distance when two points exist. Clicks while idle are
    /// ignored and return `None`.
    pub fn click(&mut self, point: LngLat) -> Option<f64> {
        if !self.active {
            return None;
        }
        if self.points.len() == WINDOW {
            self.points.pop_front();
        }
        self.points.push_back(point);

        self.distance_km = match (self.points.front(), self.points.back()) {
            (Some(a), Some(b)) if self.points.len() == WINDOW => Some(haversine_km(*a, *b)),
            _ => None,
        };
        debug!(points = self.points.len(), distance_km = ?self.distance_km, "Measurement point added");
        self.distance_km
    }

    /// Human-readable distance, e.g. `1.25 km` or `850 m`.
    pub fn label(&self) -> Option<String> {
        self.distance_km.map(format_distance)
    }

    /// Markers for every point plus a line once two exist.
    pub fn collection(&self) -> FeatureCollection {
        let mut features: Vec<Feature> = self
            .points
            .iter()
            .enumerate()
            .map(|(index, point)| marker(index, *point))
            .collect();

        if let Some(km) = self.distance_km {
            let mut properties = Map::new();
            properties.insert("id".into(), json!("measurement-segment"));
            properties.insert("distance_km".into(), json!(km));
            features.push(Feature {
                id: None,
                geometry: Geometry::LineString(self.points()),
                properties,
            });
        }
        FeatureCollection::new(features)
    }

    /// Dashed line and marker layers over the measurement source.
    pub fn layers(&self) -> [LayerDescriptor; 2] {
        [
            LayerDescriptor::new(MEASUREMENT_LINE_LAYER_ID, MEASUREMENT_SOURCE_ID, LayerKind::Line)
                .with_filter(json!(["==", ["geometry-type"], "LineString"]))
                .with_paint("line-color", json!(MEASUREMENT_COLOR))
                .with_paint("line-width", json!(3))
                .with_paint("line-dasharray", json!([2, 2])),
            LayerDescriptor::new(MEASUREMENT_POINTS_LAYER_ID, MEASUREMENT_SOURCE_ID, LayerKind::Circle)
                .with_filter(json!(["==", ["geometry-type"], "Point"]))
                .with_paint("circle-radius", json!(6))
                .with_paint("circle-color", json!(MEASUREMENT_COLOR))
                .with_paint("circle-stroke-color", json!("#ffffff"))
                .with_paint("circle-stroke-width", json!(2)),
        ]
    }

    /// Push the current points to the surface.
    ///
    /// The source is kept when the tool goes idle and simply emptied, so
    /// rendering an idle tool twice touches the surface once.
    pub fn render<S: RenderSurface>(
        &self,
        sync: &mut LayerSyncEngine,
        controller: &mut MapSurfaceController<S>,
    ) -> Dispatch {
        let dispatch = sync.put_source(
            controller,
            SourceDescriptor::new(MEASUREMENT_SOURCE_ID, self.collection()),
        );
        for layer in self.layers() {
            sync.ensure_layer(controller, layer);
        }
        dispatch
    }
}

fn marker(index: usize, point: LngLat) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".into(), Value::String(format!("measurement-{}", index)));
    Feature {
        id: None,
        geometry: Geometry::Point(point),
        properties,
    }
}

/// Format a distance in kilometres, switching to metres below 1 km.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.2} km", km)
    }
}
