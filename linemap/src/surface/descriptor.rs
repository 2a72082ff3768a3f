//! Source and layer descriptors.

use std::fmt;

use serde_json::{Map, Value};

use crate::coord::{LngLat, MAX_ZOOM, MIN_ZOOM};
use crate::feature::FeatureCollection;

/// Point clustering options of a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Cluster radius in pixels
    pub radius: u32,
    /// Highest zoom at which points are clustered
    pub max_zoom: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 50,
            max_zoom: 14.0,
        }
    }
}

/// A named feature-collection payload on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    pub id: String,
    pub data: FeatureCollection,
    pub cluster: Option<ClusterOptions>,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<String>, data: FeatureCollection) -> Self {
        Self {
            id: id.into(),
            data,
            cluster: None,
        }
    }

    /// Enable point clustering.
    pub fn clustered(mut self, options: ClusterOptions) -> Self {
        self.cluster = Some(options);
        self
    }
}

/// Rendering primitive of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Circle,
    Heatmap,
    Line,
    Fill,
    Symbol,
    /// Cluster bubbles over a clustered source
    Cluster,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Circle => "circle",
            LayerKind::Heatmap => "heatmap",
            LayerKind::Line => "line",
            LayerKind::Fill => "fill",
            LayerKind::Symbol => "symbol",
            LayerKind::Cluster => "cluster",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zoom interval `[min, max)` a layer renders in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom < self.max
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        // Upper bound past MAX_ZOOM so the top level still renders
        Self::new(MIN_ZOOM, MAX_ZOOM + 2.0)
    }
}

/// Declarative description of one layer.
///
/// Layer ids are unique across a surface. `paint` and `layout` hold
/// style properties keyed by name; `filter` is a style expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub id: String,
    pub source_id: String,
    pub kind: LayerKind,
    pub paint: Map<String, Value>,
    pub layout: Map<String, Value>,
    pub filter: Option<Value>,
    pub zoom_range: ZoomRange,
    pub visible: bool,
}

impl LayerDescriptor {
    pub fn new(id: impl Into<String>, source_id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            kind,
            paint: Map::new(),
            layout: Map::new(),
            filter: None,
            zoom_range: ZoomRange::default(),
            visible: true,
        }
    }

    pub fn with_paint(mut self, key: &str, value: Value) -> Self {
        self.paint.insert(key.to_string(), value);
        self
    }

    pub fn with_layout(mut self, key: &str, value: Value) -> Self {
        self.layout.insert(key.to_string(), value);
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_zoom_range(mut self, min: f64, max: f64) -> Self {
        self.zoom_range = ZoomRange::new(min, max);
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// True if replacing `self` with `other` needs a remove and re-add
    /// rather than an in-place update.
    pub fn requires_recreate(&self, other: &LayerDescriptor) -> bool {
        self.source_id != other.source_id || self.kind != other.kind
    }
}

/// Popup content anchored on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub anchor: LngLat,
    /// Pre-escaped HTML
    pub html: String,
}
