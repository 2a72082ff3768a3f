//! Feature overlays.
//!
//! [`ClusterHeatmapLayer`] renders one record set as a severity-weighted
//! heatmap at low zoom and as points (optionally clustered) from the zoom
//! threshold up. [`CrossingLayer`] renders corridor crossing points colored
//! by obstacle class.

mod crossing;

pub use crossing::{CrossingLayer, CROSSINGS_SOURCE_ID};

use serde_json::{json, Value};
use tracing::debug;

use crate::controller::MapSurfaceController;
use crate::coord::MAX_ZOOM;
use crate::feature::{FeatureCollection, FeatureRecord, Severity};
use crate::paint;
use crate::surface::{ClusterOptions, LayerDescriptor, LayerKind, RenderSurface, SourceDescriptor};
use crate::sync::LayerSyncEngine;

/// Default zoom at which the heatmap hands over to points.
pub const DEFAULT_HEATMAP_ZOOM_THRESHOLD: f64 = 9.0;

/// Property carrying the severity weight on render copies.
pub const WEIGHT_PROPERTY: &str = "weight";

/// Heatmap weight and point sizing factor of a severity.
pub fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 0.25,
        Severity::Medium => 0.6,
        Severity::High => 1.0,
    }
}

/// Which half of a [`ClusterHeatmapLayer`] is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub heatmap: bool,
    pub points: bool,
}

/// Heatmap below a zoom threshold, points at or above it, over one source.
///
/// With clustering enabled the point half becomes three layers: cluster
/// bubbles, their count labels, and the unclustered points.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHeatmapLayer {
    id: String,
    threshold: f64,
    clustering: Option<ClusterOptions>,
}

impl ClusterHeatmapLayer {
    /// Overlay whose source is named `id` and whose layers are prefixed by it.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            threshold: DEFAULT_HEATMAP_ZOOM_THRESHOLD,
            clustering: None,
        }
    }

    /// Zoom at which points replace the heatmap.
    pub fn with_threshold(mut self, zoom: f64) -> Self {
        self.threshold = zoom.clamp(0.0, MAX_ZOOM);
        self
    }

    /// Cluster points at or above the threshold.
    pub fn with_clustering(mut self, options: ClusterOptions) -> Self {
        self.clustering = Some(options);
        self
    }

    pub fn source_id(&self) -> &str {
        &self.id
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn clustering(&self) -> Option<ClusterOptions> {
        self.clustering
    }

    pub fn heatmap_layer_id(&self) -> String {
        format!("{}-heat", self.id)
    }

    pub fn points_layer_id(&self) -> String {
        format!("{}-points", self.id)
    }

    pub fn cluster_layer_id(&self) -> String {
        format!("{}-clusters", self.id)
    }

    pub fn cluster_count_layer_id(&self) -> String {
        format!("{}-cluster-count", self.id)
    }

    /// Layers showing individual features (clicks on these focus a record).
    pub fn is_feature_layer(&self, layer_id: &str) -> bool {
        layer_id == self.points_layer_id()
    }

    /// Layers showing cluster bubbles (clicks on these expand a cluster).
    pub fn is_cluster_layer(&self, layer_id: &str) -> bool {
        self.clustering.is_some()
            && (layer_id == self.cluster_layer_id() || layer_id == self.cluster_count_layer_id())
    }

    /// Visibility of both halves at `zoom`.
    ///
    /// The crossover is exclusive: exactly one half is visible at any zoom.
    pub fn apply_zoom(&self, zoom: f64) -> LayerVisibility {
        let points = zoom >= self.threshold;
        LayerVisibility {
            heatmap: !points,
            points,
        }
    }

    /// Render copies of `records` with the severity weight attached.
    pub fn weighted<'a, I>(&self, records: I) -> FeatureCollection
    where
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let features = records
            .into_iter()
            .map(|record| {
                let mut feature = record.to_feature();
                feature
                    .properties
                    .insert(WEIGHT_PROPERTY.into(), json!(severity_weight(record.severity)));
                feature
            })
            .collect();
        FeatureCollection::new(features)
    }

    /// Source descriptor for `records`.
    pub fn source<'a, I>(&self, records: I) -> SourceDescriptor
    where
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let source = SourceDescriptor::new(self.id.clone(), self.weighted(records));
        match self.clustering {
            Some(options) => source.clustered(options),
            None => source,
        }
    }

    /// Layer descriptors bottom to top, with visibility set for `zoom`.
    pub fn layers(&self, zoom: f64) -> Vec<LayerDescriptor> {
        let visibility = self.apply_zoom(zoom);
        let mut layers = vec![self.heatmap_layer().with_visibility(visibility.heatmap)];
        if self.clustering.is_some() {
            layers.push(self.cluster_layer().with_visibility(visibility.points));
            layers.push(self.cluster_count_layer().with_visibility(visibility.points));
        }
        layers.push(self.points_layer().with_visibility(visibility.points));
        layers
    }

    /// Ids of the layers making up the point half.
    fn point_layer_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(3);
        if self.clustering.is_some() {
            ids.push(self.cluster_layer_id());
            ids.push(self.cluster_count_layer_id());
        }
        ids.push(self.points_layer_id());
        ids
    }

    /// Push `records` and the layers for `zoom` through the sync engine.
    ///
    /// Cluster layers left over from a clustered configuration are removed
    /// when clustering is off.
    pub fn sync<'a, S, I>(
        &self,
        sync: &mut LayerSyncEngine,
        controller: &mut MapSurfaceController<S>,
        records: I,
        zoom: f64,
    ) -> LayerVisibility
    where
        S: RenderSurface,
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let source = self.source(records);
        debug!(source_id = %self.id, features = source.data.len(), "Syncing cluster/heatmap overlay");
        sync.put_source(controller, source);

        if self.clustering.is_none() {
            sync.remove_layer(controller, &self.cluster_count_layer_id());
            sync.remove_layer(controller, &self.cluster_layer_id());
        }
        for layer in self.layers(zoom) {
            sync.ensure_layer(controller, layer);
        }
        self.apply_zoom(zoom)
    }

    /// Toggle the two halves for a new zoom. Only flips that change
    /// something reach the surface.
    pub fn set_zoom<S: RenderSurface>(
        &self,
        sync: &mut LayerSyncEngine,
        controller: &mut MapSurfaceController<S>,
        zoom: f64,
    ) -> LayerVisibility {
        let visibility = self.apply_zoom(zoom);
        sync.set_visibility(controller, &self.heatmap_layer_id(), visibility.heatmap);
        for id in self.point_layer_ids() {
            sync.set_visibility(controller, &id, visibility.points);
        }
        visibility
    }

    fn heatmap_layer(&self) -> LayerDescriptor {
        LayerDescriptor::new(self.heatmap_layer_id(), self.id.clone(), LayerKind::Heatmap)
            .with_zoom_range(0.0, self.threshold)
            .with_paint("heatmap-weight", json!(["get", WEIGHT_PROPERTY]))
            .with_paint("heatmap-intensity", json!(1))
            .with_paint("heatmap-radius", json!(20))
            .with_paint("heatmap-opacity", json!(0.8))
            .with_paint("heatmap-color", paint::heatmap_color_expression())
    }

    fn points_layer(&self) -> LayerDescriptor {
        let layer = LayerDescriptor::new(self.points_layer_id(), self.id.clone(), LayerKind::Circle)
            .with_zoom_range(self.threshold, MAX_ZOOM + 2.0)
            .with_paint("circle-color", paint::severity_color_expression())
            .with_paint("circle-radius", paint::weight_radius_expression(4.0, 10.0))
            .with_paint("circle-stroke-color", json!("#ffffff"))
            .with_paint("circle-stroke-width", json!(1));
        match self.clustering {
            Some(_) => layer.with_filter(paint::unclustered_filter()),
            None => layer,
        }
    }

    fn cluster_layer(&self) -> LayerDescriptor {
        LayerDescriptor::new(self.cluster_layer_id(), self.id.clone(), LayerKind::Cluster)
            .with_zoom_range(self.threshold, MAX_ZOOM + 2.0)
            .with_filter(paint::clustered_filter())
            .with_paint("circle-color", paint::cluster_color_expression())
            .with_paint("circle-radius", paint::cluster_radius_expression())
    }

    fn cluster_count_layer(&self) -> LayerDescriptor {
        LayerDescriptor::new(self.cluster_count_layer_id(), self.id.clone(), LayerKind::Symbol)
            .with_zoom_range(self.threshold, MAX_ZOOM + 2.0)
            .with_filter(paint::clustered_filter())
            .with_layout("text-field", json!(["get", "point_count_abbreviated"]))
            .with_layout("text-size", json!(12))
            .with_paint("text-color", json!("#ffffff"))
    }
}

/// Read the cluster id from the properties of a clicked cluster feature.
pub fn cluster_id(properties: &serde_json::Map<String, Value>) -> Option<u64> {
    properties.get("cluster_id").and_then(Value::as_u64)
}
