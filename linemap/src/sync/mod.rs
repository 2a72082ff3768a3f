//! Layer synchronization.
//!
//! [`LayerSyncEngine`] is the single writer of custom sources and layers. It
//! keeps the [`DesiredState`] and turns every change into the minimal set of
//! surface operations, dispatched through the [`MapSurfaceController`] that
//! owns the surface. The controller is passed explicitly to each call; the
//! engine never holds on to it.
//!
//! After a style swap the surface has forgotten everything, so the whole
//! desired state is replayed with [`LayerSyncEngine::replay`].
//!
//! # Example
//!
//! ```
//! use linemap::coord::{Camera, LngLat};
//! use linemap::controller::MapSurfaceController;
//! use linemap::feature::FeatureCollection;
//! use linemap::style::StyleRef;
//! use linemap::surface::{LayerDescriptor, LayerKind, MemorySurface};
//! use linemap::sync::LayerSyncEngine;
//!
//! let surface = MemorySurface::new((800.0, 600.0), Camera::new(LngLat::new(0.0, 0.0), 2.0));
//! let mut controller = MapSurfaceController::create(
//!     surface,
//!     "map",
//!     Camera::new(LngLat::new(-46.6, -23.5), 10.0),
//!     StyleRef::Url("https://example.test/style.json".into()),
//! );
//! let mut sync = LayerSyncEngine::new();
//!
//! // Writes before the style loads are queued
//! sync.upsert_source(&mut controller, "events", FeatureCollection::empty());
//! sync.ensure_layer(&mut controller, LayerDescriptor::new("events-points", "events", LayerKind::Circle));
//!
//! let loaded = controller.surface_mut().complete_style_load();
//! if controller.on_surface_event(&loaded) {
//!     sync.replay(&mut controller);
//! }
//! assert_eq!(controller.layer_order(), vec!["events-points"]);
//! ```

mod desired;
mod diff;

pub use desired::DesiredState;
pub use diff::{diff, order_moves, SyncOp};

use std::collections::HashSet;

use tracing::debug;

use crate::controller::{Dispatch, MapSurfaceController, SurfaceOp};
use crate::feature::FeatureCollection;
use crate::surface::{LayerDescriptor, RenderSurface, SourceDescriptor};

/// Reconciles the desired overlay state onto a surface.
#[derive(Debug, Default)]
pub struct LayerSyncEngine {
    desired: DesiredState,
}

impl LayerSyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state the surface is being driven towards.
    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    /// Set the data of source `id`, creating it if needed.
    ///
    /// An existing source keeps its clustering options and is updated in
    /// place.
    pub fn upsert_source<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        id: &str,
        data: FeatureCollection,
    ) -> Dispatch {
        let source = match self.desired.source(id) {
            Some(existing) => SourceDescriptor {
                data,
                ..existing.clone()
            },
            None => SourceDescriptor::new(id, data),
        };
        self.put_source(controller, source)
    }

    /// Create or update a source from a full descriptor.
    ///
    /// A data change replaces the source in place. Changing the clustering
    /// options of an existing source is the exception: clustering is fixed
    /// when a source is created, so the source is removed and re-added along
    /// with its layers.
    pub fn put_source<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        source: SourceDescriptor,
    ) -> Dispatch {
        match self.desired.source(&source.id) {
            Some(existing) if *existing == source => Dispatch::Skipped,
            Some(existing) if existing.cluster != source.cluster => {
                let next = self.desired.clone().with_source(source);
                self.reconcile(controller, next);
                Dispatch::Applied
            }
            _ => {
                debug!(source_id = %source.id, features = source.data.len(), "Upserting source");
                self.desired.put_source(source.clone());
                controller.dispatch(SurfaceOp::UpsertSource(source))
            }
        }
    }

    /// Make sure `layer` exists as described.
    ///
    /// New layers go on top. Changes to paint, layout, filter, zoom range or
    /// visibility are applied in place; a changed source or kind recreates
    /// the layer at the same position.
    pub fn ensure_layer<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        layer: LayerDescriptor,
    ) -> Dispatch {
        match self.desired.layer(&layer.id) {
            Some(existing) if *existing == layer => Dispatch::Skipped,
            Some(existing) if existing.requires_recreate(&layer) => {
                let before = self.layer_above(&layer.id);
                debug!(layer_id = %layer.id, kind = %layer.kind, "Recreating layer");
                self.desired.put_layer(layer.clone());
                controller.dispatch(SurfaceOp::RemoveLayer(layer.id.clone()));
                controller.dispatch(SurfaceOp::AddLayer { layer, before })
            }
            Some(_) => {
                debug!(layer_id = %layer.id, "Updating layer in place");
                self.desired.put_layer(layer.clone());
                controller.dispatch(SurfaceOp::UpdateLayer(layer))
            }
            None => {
                debug!(layer_id = %layer.id, source_id = %layer.source_id, "Adding layer");
                self.desired.put_layer(layer.clone());
                controller.dispatch(SurfaceOp::AddLayer {
                    layer,
                    before: None,
                })
            }
        }
    }

    /// Show or hide a layer. Unknown layers are ignored.
    pub fn set_visibility<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        id: &str,
        visible: bool,
    ) -> Dispatch {
        let Some(layer) = self.desired.layer_mut(id) else {
            return Dispatch::Skipped;
        };
        if layer.visible == visible {
            return Dispatch::Skipped;
        }
        layer.visible = visible;
        controller.dispatch(SurfaceOp::SetVisibility {
            id: id.to_string(),
            visible,
        })
    }

    /// Remove a layer. Removing an unknown layer is a no-op.
    pub fn remove_layer<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        id: &str,
    ) -> Dispatch {
        if self.desired.take_layer(id).is_none() {
            return Dispatch::Skipped;
        }
        debug!(layer_id = id, "Removing layer");
        controller.dispatch(SurfaceOp::RemoveLayer(id.to_string()))
    }

    /// Remove a source and every layer drawing from it.
    pub fn remove_source<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        id: &str,
    ) -> Dispatch {
        if self.desired.source(id).is_none() {
            return Dispatch::Skipped;
        }
        for layer_id in self.desired.layers_using(id) {
            self.remove_layer(controller, &layer_id);
        }
        self.desired.take_source(id);
        debug!(source_id = id, "Removing source");
        controller.dispatch(SurfaceOp::RemoveSource(id.to_string()))
    }

    /// Put managed layers in the given bottom-to-top order.
    ///
    /// Unknown and repeated ids are ignored. Managed layers missing from
    /// `ids` keep their relative order and end up above the listed ones.
    /// Only layers whose relative position changed are moved, so calling
    /// this twice with the same list moves nothing the second time.
    ///
    /// Returns the number of moves dispatched.
    pub fn apply_order<S, I>(&mut self, controller: &mut MapSurfaceController<S>, ids: I) -> usize
    where
        S: RenderSurface,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut target: Vec<String> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if self.desired.layer(id).is_some() && seen.insert(id.to_string()) {
                target.push(id.to_string());
            }
        }
        for id in self.desired.order() {
            if !seen.contains(id) {
                target.push(id.clone());
            }
        }

        let moves = order_moves(self.desired.order(), &target);
        let count = moves.len();
        if count > 0 {
            debug!(moves = count, "Reordering layers");
        }
        for op in moves {
            controller.dispatch(op.into());
        }
        self.desired.set_order(target);
        count
    }

    /// Drive the surface to `next` and adopt it as the desired state.
    ///
    /// Returns the operations that were dispatched.
    pub fn reconcile<S: RenderSurface>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        next: DesiredState,
    ) -> Vec<SyncOp> {
        let ops = diff(&self.desired, &next);
        debug!(ops = ops.len(), "Reconciling desired state");
        for op in &ops {
            controller.dispatch(op.clone().into());
        }
        self.desired = next;
        ops
    }

    /// Re-apply the whole desired state, e.g. after a style swap.
    ///
    /// Existing sources get their data replaced, existing layers are kept,
    /// and the final order is corrected against what the surface reports.
    pub fn replay<S: RenderSurface>(&self, controller: &mut MapSurfaceController<S>) {
        debug!(
            sources = self.desired.sources().count(),
            layers = self.desired.order().len(),
            "Replaying desired state"
        );
        for source in self.desired.sources() {
            controller.dispatch(SurfaceOp::UpsertSource(source.clone()));
        }
        for layer in self.desired.layers() {
            controller.dispatch(SurfaceOp::AddLayer {
                layer: layer.clone(),
                before: None,
            });
        }

        if controller.is_ready() {
            let managed: Vec<String> = controller
                .layer_order()
                .into_iter()
                .filter(|id| self.desired.layer(id).is_some())
                .collect();
            for op in order_moves(&managed, self.desired.order()) {
                controller.dispatch(op.into());
            }
        }
    }

    /// Id of the layer directly above `id` in the desired order.
    fn layer_above(&self, id: &str) -> Option<String> {
        let order = self.desired.order();
        let index = order.iter().position(|l| l == id)?;
        order.get(index + 1).cloned()
    }
}
