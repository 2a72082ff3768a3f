//! Rendering surface abstraction.
//!
//! The engine never draws anything itself. It drives a [`RenderSurface`]: a
//! stateful map widget with an imperative API for sources, layers, camera,
//! popups and event listeners. A surface loads its base style
//! asynchronously; until the load completes every source/layer call fails
//! with [`SurfaceError::NotReady`], and loading a new style drops every
//! custom source and layer. Completion is reported back as a
//! [`SurfaceEvent`] the host routes to the map view.
//!
//! [`MemorySurface`] is an in-memory implementation with the same rules,
//! used for headless previews and tests.

mod descriptor;
mod memory;

pub use descriptor::{
    ClusterOptions, LayerDescriptor, LayerKind, Popup, SourceDescriptor, ZoomRange,
};
pub use memory::{MemorySurface, SurfaceCall};

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::coord::{Camera, LngLat};
use crate::feature::FeatureCollection;
use crate::style::StyleRef;

/// Errors reported by a surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// Style not loaded yet (initial load or a swap in progress).
    #[error("Surface is not ready")]
    NotReady,

    /// Target source does not exist.
    #[error("Source '{0}' does not exist")]
    SourceMissing(String),

    /// Target layer does not exist.
    #[error("Layer '{0}' does not exist")]
    LayerMissing(String),

    /// Source id already taken.
    #[error("Source '{0}' already exists")]
    DuplicateSource(String),

    /// Layer id already taken.
    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    /// Source still referenced by a layer.
    #[error("Source '{source_id}' is used by layer '{layer_id}'")]
    SourceInUse { source_id: String, layer_id: String },

    /// Surface has been disposed.
    #[error("Surface has been disposed")]
    Disposed,
}

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Interaction kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseMove,
    MouseEnter,
    MouseLeave,
}

/// Callback delivered by a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The requested style finished loading.
    StyleLoaded,
    /// The requested style failed to load.
    StyleError { message: String },
    /// Click on the map. `layer_id` and `properties` are set when the click
    /// hit a feature of a listened layer.
    Click {
        point: LngLat,
        layer_id: Option<String>,
        properties: Option<Map<String, Value>>,
    },
    /// Pointer moved over the map.
    MouseMove {
        point: LngLat,
        layer_id: Option<String>,
    },
    /// Answer to a cluster expansion request.
    ClusterExpansion {
        source_id: String,
        cluster_id: u64,
        center: LngLat,
        zoom: f64,
    },
}

/// A stateful, asynchronously-styled map widget.
///
/// Source and layer calls require a loaded style. Camera, popup, listener
/// and resize calls work at any time before disposal. Listeners are bound
/// by layer id and survive style swaps.
pub trait RenderSurface {
    /// True once the last requested style has loaded.
    fn is_style_loaded(&self) -> bool;

    /// Request a new base style. Drops every custom source and layer.
    fn set_style(&mut self, style: &StyleRef) -> Result<(), SurfaceError>;

    fn add_source(&mut self, source: &SourceDescriptor) -> Result<(), SurfaceError>;
    fn set_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<(), SurfaceError>;
    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError>;
    fn has_source(&self, id: &str) -> bool;

    /// Add a layer below `before`, or on top when `before` is `None`.
    fn add_layer(&mut self, layer: &LayerDescriptor, before: Option<&str>)
        -> Result<(), SurfaceError>;
    /// Apply paint, layout, filter, zoom range and visibility in place.
    fn update_layer(&mut self, layer: &LayerDescriptor) -> Result<(), SurfaceError>;
    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError>;
    /// Move a layer below `before`, or to the top when `before` is `None`.
    fn move_layer(&mut self, id: &str, before: Option<&str>) -> Result<(), SurfaceError>;
    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), SurfaceError>;
    fn has_layer(&self, id: &str) -> bool;
    /// Layer ids bottom to top.
    fn layer_order(&self) -> Vec<String>;

    /// Enable terrain over the elevation source `source`, or disable it.
    ///
    /// Enabling provisions the raster-dem source named `source` when it is
    /// not on the surface yet, so callers never add it themselves.
    fn set_terrain(&mut self, source: Option<&str>) -> Result<(), SurfaceError>;

    fn camera(&self) -> Camera;
    fn jump_to(&mut self, camera: Camera) -> Result<(), SurfaceError>;
    fn ease_to(&mut self, camera: Camera, duration_ms: u64) -> Result<(), SurfaceError>;
    /// Viewport size in pixels.
    fn viewport(&self) -> (f64, f64);
    /// Re-read the container size.
    fn resize(&mut self) -> Result<(), SurfaceError>;

    fn show_popup(&mut self, popup: &Popup) -> Result<(), SurfaceError>;
    fn remove_popup(&mut self);

    /// Ask for the zoom at which a cluster breaks apart. Answered later
    /// with [`SurfaceEvent::ClusterExpansion`].
    fn request_cluster_expansion(
        &mut self,
        source_id: &str,
        cluster_id: u64,
        center: LngLat,
    ) -> Result<(), SurfaceError>;

    fn on(&mut self, kind: EventKind, layer_id: Option<&str>) -> Result<ListenerId, SurfaceError>;
    fn off(&mut self, id: ListenerId);

    /// Release every resource. Further calls fail with
    /// [`SurfaceError::Disposed`].
    fn dispose(&mut self);
}
