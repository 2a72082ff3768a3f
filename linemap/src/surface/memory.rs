//! In-memory rendering surface.

use std::collections::BTreeMap;

use crate::coord::{Camera, LngLat, MAX_ZOOM};
use crate::feature::FeatureCollection;
use crate::style::StyleRef;

use super::{
    EventKind, LayerDescriptor, ListenerId, Popup, RenderSurface, SourceDescriptor,
    SurfaceError, SurfaceEvent,
};

/// Zoom levels a cluster expansion adds when no explicit answer is set.
const DEFAULT_EXPANSION_STEP: f64 = 2.0;

/// A successful mutation recorded by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    SetStyle(String),
    AddSource(String),
    SetSourceData(String),
    RemoveSource(String),
    AddLayer { id: String, before: Option<String> },
    UpdateLayer(String),
    RemoveLayer(String),
    MoveLayer { id: String, before: Option<String> },
    SetVisibility { id: String, visible: bool },
    SetTerrain(Option<String>),
    JumpTo(Camera),
    EaseTo { camera: Camera, duration_ms: u64 },
    Resize,
    ShowPopup,
    RemovePopup,
    RequestClusterExpansion { source_id: String, cluster_id: u64 },
    On(ListenerId),
    Off(ListenerId),
    Dispose,
}

/// Headless [`RenderSurface`] that keeps its state in memory.
///
/// Style loads never complete on their own: call
/// [`MemorySurface::complete_style_load`] and route the returned event to
/// the view, the same way a real surface's callback would arrive later.
///
/// # Example
///
/// ```
/// use linemap::coord::{Camera, LngLat};
/// use linemap::style::StyleRef;
/// use linemap::surface::{MemorySurface, RenderSurface, SurfaceEvent};
///
/// let mut surface = MemorySurface::new((800.0, 600.0), Camera::new(LngLat::new(0.0, 0.0), 3.0));
/// surface.set_style(&StyleRef::Url("https://example.test/style.json".into())).unwrap();
/// assert!(!surface.is_style_loaded());
/// assert_eq!(surface.complete_style_load(), SurfaceEvent::StyleLoaded);
/// assert!(surface.is_style_loaded());
/// ```
#[derive(Debug)]
pub struct MemorySurface {
    style: Option<StyleRef>,
    pending_style: Option<StyleRef>,
    loaded: bool,
    disposed: bool,
    fail_next_style: Option<String>,
    sources: BTreeMap<String, SourceDescriptor>,
    /// Bottom to top
    layers: Vec<LayerDescriptor>,
    terrain: Option<String>,
    camera: Camera,
    viewport: (f64, f64),
    popup: Option<Popup>,
    listeners: BTreeMap<ListenerId, (EventKind, Option<String>)>,
    next_listener: u64,
    expansion_zoom: Option<f64>,
    events: Vec<SurfaceEvent>,
    calls: Vec<SurfaceCall>,
}

impl MemorySurface {
    /// Create a surface with no style requested yet.
    pub fn new(viewport: (f64, f64), camera: Camera) -> Self {
        Self {
            style: None,
            pending_style: None,
            loaded: false,
            disposed: false,
            fail_next_style: None,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            terrain: None,
            camera,
            viewport,
            popup: None,
            listeners: BTreeMap::new(),
            next_listener: 1,
            expansion_zoom: None,
            events: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Make the next style load fail with `message`.
    pub fn fail_next_style_load(&mut self, message: impl Into<String>) {
        self.fail_next_style = Some(message.into());
    }

    /// Finish the pending style load and return the resulting callback.
    ///
    /// With nothing pending this reports the current load state again.
    pub fn complete_style_load(&mut self) -> SurfaceEvent {
        let Some(style) = self.pending_style.take() else {
            return if self.loaded {
                SurfaceEvent::StyleLoaded
            } else {
                SurfaceEvent::StyleError {
                    message: "no style requested".to_string(),
                }
            };
        };

        if let Some(message) = self.fail_next_style.take() {
            tracing::debug!(style = %style, "Memory surface style load failed");
            return SurfaceEvent::StyleError { message };
        }

        self.style = Some(style);
        self.loaded = true;
        SurfaceEvent::StyleLoaded
    }

    /// Fix the zoom reported for cluster expansion requests.
    pub fn set_cluster_expansion_zoom(&mut self, zoom: f64) {
        self.expansion_zoom = Some(zoom);
    }

    /// Change the container size (call `resize` afterwards, as a host would).
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// Drain callbacks queued by asynchronous requests.
    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Build the click callback for the feature `feature_id` of `layer_id`.
    ///
    /// Returns `None` if the layer is absent, hidden, or its source holds no
    /// such feature.
    pub fn click_feature(&self, layer_id: &str, feature_id: &str) -> Option<SurfaceEvent> {
        let layer = self.layer(layer_id).filter(|l| l.visible)?;
        let source = self.sources.get(&layer.source_id)?;
        let feature = source
            .data
            .features
            .iter()
            .find(|f| f.properties.get("id").and_then(|v| v.as_str()) == Some(feature_id))?;
        let point = feature.geometry.anchor()?;
        Some(SurfaceEvent::Click {
            point,
            layer_id: Some(layer_id.to_string()),
            properties: Some(feature.properties.clone()),
        })
    }

    /// Build a click callback on empty map.
    pub fn click_map(&self, point: LngLat) -> SurfaceEvent {
        SurfaceEvent::Click {
            point,
            layer_id: None,
            properties: None,
        }
    }

    pub fn style(&self) -> Option<&StyleRef> {
        self.style.as_ref()
    }

    pub fn source(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.get(id)
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn terrain(&self) -> Option<&str> {
        self.terrain.as_deref()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Every successful mutation so far.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn check_alive(&self) -> Result<(), SurfaceError> {
        if self.disposed {
            Err(SurfaceError::Disposed)
        } else {
            Ok(())
        }
    }

    fn check_loaded(&self) -> Result<(), SurfaceError> {
        self.check_alive()?;
        if self.loaded {
            Ok(())
        } else {
            Err(SurfaceError::NotReady)
        }
    }

    fn layer_index(&self, id: &str) -> Result<usize, SurfaceError> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| SurfaceError::LayerMissing(id.to_string()))
    }

    fn insert_index(&self, before: Option<&str>) -> Result<usize, SurfaceError> {
        match before {
            Some(before) => self.layer_index(before),
            None => Ok(self.layers.len()),
        }
    }
}

impl RenderSurface for MemorySurface {
    fn is_style_loaded(&self) -> bool {
        self.loaded && !self.disposed
    }

    fn set_style(&mut self, style: &StyleRef) -> Result<(), SurfaceError> {
        self.check_alive()?;
        self.sources.clear();
        self.layers.clear();
        self.terrain = None;
        self.loaded = false;
        self.pending_style = Some(style.clone());
        self.calls.push(SurfaceCall::SetStyle(style.label()));
        Ok(())
    }

    fn add_source(&mut self, source: &SourceDescriptor) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        if self.sources.contains_key(&source.id) {
            return Err(SurfaceError::DuplicateSource(source.id.clone()));
        }
        self.sources.insert(source.id.clone(), source.clone());
        self.calls.push(SurfaceCall::AddSource(source.id.clone()));
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| SurfaceError::SourceMissing(id.to_string()))?;
        source.data = data.clone();
        self.calls.push(SurfaceCall::SetSourceData(id.to_string()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        if !self.sources.contains_key(id) {
            return Err(SurfaceError::SourceMissing(id.to_string()));
        }
        if let Some(layer) = self.layers.iter().find(|l| l.source_id == id) {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        self.sources.remove(id);
        self.calls.push(SurfaceCall::RemoveSource(id.to_string()));
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_layer(
        &mut self,
        layer: &LayerDescriptor,
        before: Option<&str>,
    ) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        if self.has_layer(&layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id.clone()));
        }
        if !self.sources.contains_key(&layer.source_id) {
            return Err(SurfaceError::SourceMissing(layer.source_id.clone()));
        }
        let index = self.insert_index(before)?;
        self.layers.insert(index, layer.clone());
        self.calls.push(SurfaceCall::AddLayer {
            id: layer.id.clone(),
            before: before.map(str::to_string),
        });
        Ok(())
    }

    fn update_layer(&mut self, layer: &LayerDescriptor) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        let index = self.layer_index(&layer.id)?;
        let existing = &mut self.layers[index];
        existing.paint = layer.paint.clone();
        existing.layout = layer.layout.clone();
        existing.filter = layer.filter.clone();
        existing.zoom_range = layer.zoom_range;
        existing.visible = layer.visible;
        self.calls.push(SurfaceCall::UpdateLayer(layer.id.clone()));
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        let index = self.layer_index(id)?;
        self.layers.remove(index);
        self.calls.push(SurfaceCall::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn move_layer(&mut self, id: &str, before: Option<&str>) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        let from = self.layer_index(id)?;
        if before == Some(id) {
            return Ok(());
        }
        // Validate the target before mutating
        self.insert_index(before)?;
        let layer = self.layers.remove(from);
        let to = match self.insert_index(before) {
            Ok(index) => index,
            Err(err) => {
                self.layers.insert(from, layer);
                return Err(err);
            }
        };
        self.layers.insert(to, layer);
        self.calls.push(SurfaceCall::MoveLayer {
            id: id.to_string(),
            before: before.map(str::to_string),
        });
        Ok(())
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        let index = self.layer_index(id)?;
        self.layers[index].visible = visible;
        self.calls.push(SurfaceCall::SetVisibility {
            id: id.to_string(),
            visible,
        });
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn layer_order(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    fn set_terrain(&mut self, source: Option<&str>) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        if let Some(source) = source {
            // The elevation source is provisioned by the surface itself
            self.sources
                .entry(source.to_string())
                .or_insert_with(|| SourceDescriptor::new(source, FeatureCollection::empty()));
        }
        self.terrain = source.map(str::to_string);
        self.calls.push(SurfaceCall::SetTerrain(self.terrain.clone()));
        Ok(())
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn jump_to(&mut self, camera: Camera) -> Result<(), SurfaceError> {
        self.check_alive()?;
        self.camera = camera;
        self.calls.push(SurfaceCall::JumpTo(camera));
        Ok(())
    }

    fn ease_to(&mut self, camera: Camera, duration_ms: u64) -> Result<(), SurfaceError> {
        self.check_alive()?;
        // Easing is not animated here; the camera lands immediately
        self.camera = camera;
        self.calls.push(SurfaceCall::EaseTo {
            camera,
            duration_ms,
        });
        Ok(())
    }

    fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    fn resize(&mut self) -> Result<(), SurfaceError> {
        self.check_alive()?;
        self.calls.push(SurfaceCall::Resize);
        Ok(())
    }

    fn show_popup(&mut self, popup: &Popup) -> Result<(), SurfaceError> {
        self.check_alive()?;
        self.popup = Some(popup.clone());
        self.calls.push(SurfaceCall::ShowPopup);
        Ok(())
    }

    fn remove_popup(&mut self) {
        if self.popup.take().is_some() {
            self.calls.push(SurfaceCall::RemovePopup);
        }
    }

    fn request_cluster_expansion(
        &mut self,
        source_id: &str,
        cluster_id: u64,
        center: LngLat,
    ) -> Result<(), SurfaceError> {
        self.check_loaded()?;
        if !self.sources.contains_key(source_id) {
            return Err(SurfaceError::SourceMissing(source_id.to_string()));
        }
        let zoom = self
            .expansion_zoom
            .unwrap_or(self.camera.zoom + DEFAULT_EXPANSION_STEP)
            .min(MAX_ZOOM);
        self.events.push(SurfaceEvent::ClusterExpansion {
            source_id: source_id.to_string(),
            cluster_id,
            center,
            zoom,
        });
        self.calls.push(SurfaceCall::RequestClusterExpansion {
            source_id: source_id.to_string(),
            cluster_id,
        });
        Ok(())
    }

    fn on(&mut self, kind: EventKind, layer_id: Option<&str>) -> Result<ListenerId, SurfaceError> {
        self.check_alive()?;
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners
            .insert(id, (kind, layer_id.map(str::to_string)));
        self.calls.push(SurfaceCall::On(id));
        Ok(id)
    }

    fn off(&mut self, id: ListenerId) {
        if self.listeners.remove(&id).is_some() {
            self.calls.push(SurfaceCall::Off(id));
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.loaded = false;
        self.sources.clear();
        self.layers.clear();
        self.popup = None;
        self.listeners.clear();
        self.calls.push(SurfaceCall::Dispose);
    }
}
