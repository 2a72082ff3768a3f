//! Crossing point overlay.

use serde_json::{json, Map, Value};

use crate::controller::{Dispatch, MapSurfaceController};
use crate::feature::{Feature, FeatureCollection, Geometry};
use crate::geometry::CrossingPoint;
use crate::paint;
use crate::surface::{LayerDescriptor, LayerKind, RenderSurface, SourceDescriptor};
use crate::sync::LayerSyncEngine;

pub const CROSSINGS_SOURCE_ID: &str = "crossings";

/// Circle layer of corridor crossings, colored by obstacle tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossingLayer;

impl CrossingLayer {
    pub fn layer_id(&self) -> &'static str {
        "crossings-points"
    }

    /// One point feature per crossing, with `id` and `tag` properties.
    pub fn collection(&self, crossings: &[CrossingPoint]) -> FeatureCollection {
        let features = crossings
            .iter()
            .enumerate()
            .map(|(index, crossing)| {
                let id = format!("crossing-{}", index);
                let mut properties = Map::new();
                properties.insert("id".into(), Value::String(id.clone()));
                properties.insert("tag".into(), json!(crossing.tag));
                Feature {
                    id: Some(Value::String(id)),
                    geometry: Geometry::Point(crossing.coordinate),
                    properties,
                }
            })
            .collect();
        FeatureCollection::new(features)
    }

    pub fn layer(&self) -> LayerDescriptor {
        LayerDescriptor::new(self.layer_id(), CROSSINGS_SOURCE_ID, LayerKind::Circle)
            .with_paint("circle-color", paint::obstacle_color_expression())
            .with_paint("circle-radius", json!(6))
            .with_paint("circle-stroke-color", json!("#ffffff"))
            .with_paint("circle-stroke-width", json!(2))
    }

    /// Replace the rendered crossings.
    pub fn sync<S: RenderSurface>(
        &self,
        sync: &mut LayerSyncEngine,
        controller: &mut MapSurfaceController<S>,
        crossings: &[CrossingPoint],
    ) -> Dispatch {
        let source = SourceDescriptor::new(CROSSINGS_SOURCE_ID, self.collection(crossings));
        let dispatch = sync.put_source(controller, source);
        sync.ensure_layer(controller, self.layer());
        dispatch
    }
}
